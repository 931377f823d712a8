/// State management module
///
/// This module handles all timetable state, including:
/// - The record model and filter keys (data.rs)
/// - Loading and holding the record set (repository.rs)
/// - Filtering the loaded set (filter.rs)
/// - Placing records on the weekly grid (layout.rs)
/// - Remembered filter values (preferences.rs)

pub mod data;
pub mod filter;
pub mod layout;
pub mod preferences;
pub mod repository;
