use iced::widget::{canvas, column, container, scrollable, text, Column};
use iced::{Element, Length, Task, Theme};
use std::sync::Arc;

use timetable_viewer::config::AppConfig;
use timetable_viewer::logging;
use timetable_viewer::state::filter::FilterOptions;
use timetable_viewer::state::layout::parse_clock;
use timetable_viewer::state::preferences::{MemoryPreferences, PreferenceStore, SqlitePreferences};
use timetable_viewer::state::repository::{RealtimeDbSource, RecordRepository, RecordSource};
use timetable_viewer::{FilterKey, LayoutResult, Timetable};

// Declare the ui module
mod ui;

/// Main application state
struct TimetableApp {
    /// Records, filters and remembered preferences
    timetable: Timetable,
    /// Drop-down choices, rebuilt after every load
    options: FilterOptions,
    /// Filtered and laid-out records, rebuilt after every change
    result: LayoutResult,
    /// Where records are fetched from
    source: Arc<dyn RecordSource>,
    /// Drawing window in minutes since midnight
    grid_window: (i32, i32),
    /// A fetch is in flight
    loading: bool,
    /// Status message to display to the user
    status: String,
}

/// Application messages (events)
#[derive(Debug, Clone)]
pub enum Message {
    /// Background load finished with the record count or the error
    RecordsLoaded(Result<usize, String>),
    FilterSelected(FilterKey, String),
    FilterCleared(FilterKey),
    ClearAll,
    PreviousWeek,
    NextWeek,
    ThisWeek,
    FavouriteToggled(bool),
    Reload,
}

impl TimetableApp {
    /// Create a new instance of the application and start the first fetch
    fn new() -> (Self, Task<Message>) {
        let config = AppConfig::load().unwrap_or_else(|err| {
            tracing::warn!("{}; using default configuration", err);
            AppConfig::default()
        });

        let preferences: Box<dyn PreferenceStore> =
            match SqlitePreferences::open(&config.preferences_path) {
                Ok(store) => Box::new(store),
                Err(err) => {
                    tracing::warn!("{}; filters will not be remembered across runs", err);
                    Box::new(MemoryPreferences::new())
                }
            };

        let timetable = Timetable::new(RecordRepository::new(), preferences, config.retention_days);
        let source: Arc<dyn RecordSource> =
            Arc::new(RealtimeDbSource::new(&config.database_url, &config.collection));

        let grid_window = (
            parse_clock(&config.grid_start).unwrap_or(8 * 60),
            parse_clock(&config.grid_end).unwrap_or(20 * 60),
        );

        tracing::info!(source = %source.describe(), "timetable viewer starting");

        let result = timetable.layout();
        let app = TimetableApp {
            timetable,
            options: FilterOptions::default(),
            result,
            source,
            grid_window,
            loading: true,
            status: "Loading timetable...".to_string(),
        };
        let task = app.fetch();
        (app, task)
    }

    /// Load into the shared repository; a failure keeps the current records
    fn fetch(&self) -> Task<Message> {
        let repository = self.timetable.repository().clone();
        let source = Arc::clone(&self.source);
        Task::perform(
            async move {
                repository
                    .load(source.as_ref())
                    .await
                    .map_err(|err| err.to_string())
            },
            Message::RecordsLoaded,
        )
    }

    /// Handle application messages and update state
    fn update(&mut self, message: Message) -> Task<Message> {
        let task = self.apply(message);
        self.result = self.timetable.layout();
        task
    }

    fn apply(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::RecordsLoaded(loaded) => {
                self.loading = false;
                match loaded {
                    Ok(count) => {
                        self.status = format!("{} classes loaded.", count);
                        self.options = self.timetable.filter_options();
                    }
                    Err(error) => {
                        self.status = format!("Could not load the timetable: {}", error);
                    }
                }
            }
            Message::FilterSelected(key, value) => self.timetable.select(key, value),
            Message::FilterCleared(key) => self.timetable.clear(key),
            Message::ClearAll => self.timetable.clear_all(),
            Message::PreviousWeek => self.timetable.previous_week(),
            Message::NextWeek => self.timetable.next_week(),
            Message::ThisWeek => self.timetable.this_week(),
            Message::FavouriteToggled(enabled) => self.timetable.set_favourite(enabled),
            Message::Reload => {
                if !self.loading {
                    self.loading = true;
                    self.status = "Reloading timetable...".to_string();
                    return self.fetch();
                }
            }
        }

        Task::none()
    }

    /// Build the user interface
    fn view(&self) -> Element<Message> {
        let result = &self.result;

        let mut summary = format!("{} matching classes", result.matched);
        if !result.layout.rejected().is_empty() {
            summary.push_str(&format!(
                ", {} with times outside the grid",
                result.layout.rejected().len()
            ));
        }

        let grid = ui::grid::WeekGrid::new(result.layout.clone(), self.grid_window);
        let grid_height = grid.height();

        let content: Column<Message> = column![
            text("Timetable").size(32),
            ui::filters::filter_panel(&self.options, self.timetable.filters()),
            ui::filters::week_navigator(&result.week, self.timetable.favourite(), self.loading),
            text(format!("{} · {}", self.status, summary)).size(14),
            scrollable(
                canvas(grid)
                    .width(Length::Fill)
                    .height(Length::Fixed(grid_height)),
            )
            .height(Length::Fill),
        ]
        .spacing(16)
        .padding(24);

        container(content)
            .width(Length::Fill)
            .height(Length::Fill)
            .into()
    }

    /// Set the application theme
    fn theme(&self) -> Theme {
        Theme::Dark
    }
}

fn main() -> iced::Result {
    logging::init();

    iced::application("Timetable", TimetableApp::update, TimetableApp::view)
        .theme(TimetableApp::theme)
        .centered()
        .run_with(TimetableApp::new)
}
