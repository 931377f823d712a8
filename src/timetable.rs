/// Composition root
///
/// [`Timetable`] ties the loaded records, the current filter selection and
/// the injected preference store together. The View talks only to this type.
use chrono::{Datelike, Local, NaiveDate};
use std::sync::Arc;

use crate::state::data::{FilterKey, FilterState, ScheduleRecord};
use crate::state::filter::{self, FilterOptions};
use crate::state::layout::{self, Layout};
use crate::state::preferences::{self, PreferenceStore};
use crate::state::repository::RecordRepository;
use crate::week::{self, Direction, WeekRange};

/// Everything the grid needs for one render
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayoutResult {
    /// Selected week label, empty when the week is unconstrained
    pub week: String,
    /// Records that passed the filters, placed or not
    pub matched: usize,
    pub layout: Layout,
}

/// Filter then lay out; `year` anchors the week labels
pub fn compose(records: &[ScheduleRecord], filters: &FilterState, year: i32) -> LayoutResult {
    let filtered = filter::apply_filters(records, filters, year);
    LayoutResult {
        week: filters.get(FilterKey::WeekRange).to_string(),
        matched: filtered.len(),
        layout: layout::build_layout(&filtered),
    }
}

pub struct Timetable {
    repository: RecordRepository,
    preferences: Box<dyn PreferenceStore>,
    filters: FilterState,
    favourite: bool,
    retention_days: i64,
    /// Fixed "today" for tests; the local clock otherwise
    reference_date: Option<NaiveDate>,
}

impl Timetable {
    /// Seed the filters from `preferences`, defaulting the week to the
    /// current one.
    pub fn new(
        repository: RecordRepository,
        preferences: Box<dyn PreferenceStore>,
        retention_days: i64,
    ) -> Self {
        Self::build(repository, preferences, retention_days, None)
    }

    pub fn with_reference_date(
        repository: RecordRepository,
        preferences: Box<dyn PreferenceStore>,
        retention_days: i64,
        today: NaiveDate,
    ) -> Self {
        Self::build(repository, preferences, retention_days, Some(today))
    }

    fn build(
        repository: RecordRepository,
        preferences: Box<dyn PreferenceStore>,
        retention_days: i64,
        reference_date: Option<NaiveDate>,
    ) -> Self {
        let today = reference_date.unwrap_or_else(|| Local::now().date_naive());
        let current = week::current_week_label_at(today).label();
        let filters = preferences::seed_filter_state(preferences.as_ref(), &current);
        let favourite = preferences::favourite(preferences.as_ref());

        tracing::debug!(?filters, favourite, "filter state seeded");

        Timetable {
            repository,
            preferences,
            filters,
            favourite,
            retention_days,
            reference_date,
        }
    }

    fn today(&self) -> NaiveDate {
        self.reference_date
            .unwrap_or_else(|| Local::now().date_naive())
    }

    fn current_week(&self) -> WeekRange {
        week::current_week_label_at(self.today())
    }

    pub fn filters(&self) -> &FilterState {
        &self.filters
    }

    pub fn favourite(&self) -> bool {
        self.favourite
    }

    pub fn repository(&self) -> &RecordRepository {
        &self.repository
    }

    pub fn records(&self) -> Arc<Vec<ScheduleRecord>> {
        self.repository.snapshot()
    }

    /// Choices for each categorical drop-down
    pub fn filter_options(&self) -> FilterOptions {
        filter::filter_options(&self.records())
    }

    /// Filter and lay out the current record snapshot
    pub fn layout(&self) -> LayoutResult {
        compose(&self.records(), &self.filters, self.today().year())
    }

    pub fn select(&mut self, key: FilterKey, value: impl Into<String>) {
        self.filters.set(key, value);
        self.filters_changed();
    }

    pub fn clear(&mut self, key: FilterKey) {
        self.filters.clear(key);
        self.filters_changed();
    }

    /// Drop every categorical filter and return to the current week
    pub fn clear_all(&mut self) {
        self.filters = FilterState::new().with(FilterKey::WeekRange, self.current_week().label());
        self.filters_changed();
    }

    pub fn next_week(&mut self) {
        self.step(Direction::Forward);
    }

    pub fn previous_week(&mut self) {
        self.step(Direction::Backward);
    }

    pub fn this_week(&mut self) {
        let label = self.current_week().label();
        self.select(FilterKey::WeekRange, label);
    }

    fn step(&mut self, direction: Direction) {
        let label = self.filters.get(FilterKey::WeekRange).to_string();
        let stepped = if label.is_empty() {
            self.current_week().step(direction)
        } else {
            match week::step_week_in(&label, direction, self.today().year()) {
                Ok(stepped) => stepped,
                Err(err) => {
                    tracing::warn!(kind = ?err.kind(), "{}; stepping from the current week", err);
                    self.current_week().step(direction)
                }
            }
        };
        self.select(FilterKey::WeekRange, stepped.label());
    }

    /// Turn remembering filters on or off.
    ///
    /// The flag itself is always stored. Turning it on also writes the
    /// current selection right away.
    pub fn set_favourite(&mut self, enabled: bool) {
        if let Err(err) =
            preferences::set_favourite(self.preferences.as_mut(), enabled, self.retention_days)
        {
            tracing::warn!(kind = ?err.kind(), "could not store favourites flag: {}", err);
        }
        self.favourite = enabled;
        self.filters_changed();
    }

    fn filters_changed(&mut self) {
        match preferences::persist_filter_state(
            self.preferences.as_mut(),
            &self.filters,
            self.retention_days,
        ) {
            Ok(true) => tracing::debug!("filters remembered"),
            Ok(false) => {}
            Err(err) => tracing::warn!(kind = ?err.kind(), "could not remember filters: {}", err),
        }
    }
}

impl std::fmt::Debug for Timetable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Timetable")
            .field("records", &self.repository.len())
            .field("filters", &self.filters)
            .field("favourite", &self.favourite)
            .finish()
    }
}
