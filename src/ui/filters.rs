/// Filter panel and week navigator
use iced::widget::{button, checkbox, column, pick_list, row, text, Row};
use iced::{alignment, Alignment, Element, Length};

use timetable_viewer::state::filter::FilterOptions;
use timetable_viewer::{FilterKey, FilterState};

use crate::Message;

const PICK_WIDTH: f32 = 170.0;

/// One drop-down per categorical key, each with a clear button
pub fn filter_panel<'a>(options: &FilterOptions, filters: &FilterState) -> Element<'a, Message> {
    let mut panel = Row::new().spacing(12).align_y(Alignment::End);

    for key in FilterKey::CATEGORICAL {
        let selected = Some(filters.get(key).to_string()).filter(|value| !value.is_empty());
        let has_value = selected.is_some();

        let picker = pick_list(options.get(key).to_vec(), selected, move |value| {
            Message::FilterSelected(key, value)
        })
        .placeholder(format!("Any {}", key.label().to_lowercase()))
        .width(Length::Fixed(PICK_WIDTH));

        let clear = button(text("×").size(14))
            .padding([4, 8])
            .on_press_maybe(has_value.then_some(Message::FilterCleared(key)));

        panel = panel.push(
            column![
                text(key.label()).size(12),
                row![picker, clear].spacing(4).align_y(Alignment::Center),
            ]
            .spacing(4),
        );
    }

    panel
        .push(
            button("Clear all")
                .padding([6, 12])
                .on_press(Message::ClearAll),
        )
        .into()
}

/// Previous / this week / next, plus the favourites switch
pub fn week_navigator<'a>(week: &str, favourite: bool, loading: bool) -> Element<'a, Message> {
    let week_label = if week.is_empty() {
        "All weeks".to_string()
    } else {
        week.to_string()
    };

    row![
        button("◀").padding([6, 12]).on_press(Message::PreviousWeek),
        text(week_label)
            .size(18)
            .width(Length::Fixed(140.0))
            .align_x(alignment::Horizontal::Center),
        button("▶").padding([6, 12]).on_press(Message::NextWeek),
        button("This week").padding([6, 12]).on_press(Message::ThisWeek),
        checkbox("Remember filters", favourite).on_toggle(Message::FavouriteToggled),
        button(if loading { "Loading..." } else { "Reload" })
            .padding([6, 12])
            .on_press_maybe((!loading).then_some(Message::Reload)),
    ]
    .spacing(12)
    .align_y(Alignment::Center)
    .into()
}
