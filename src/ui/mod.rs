/// User interface pieces
///
/// - `filters.rs` builds the filter panel and the week navigator
/// - `grid.rs` draws the weekly grid on a canvas

pub mod filters;
pub mod grid;
