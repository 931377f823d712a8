/// Filter Engine
///
/// Categorical keys match by exact string equality. The week key is matched
/// by range overlap against the record's own week label, so a semester-long
/// record shows up in every week it covers.
use std::collections::{BTreeMap, BTreeSet};

use super::data::{FilterKey, FilterState, ScheduleRecord};
use crate::week;

/// Keep the records that satisfy every non-empty filter, in input order.
///
/// `year` anchors the year-less week labels.
pub fn apply_filters(
    records: &[ScheduleRecord],
    filters: &FilterState,
    year: i32,
) -> Vec<ScheduleRecord> {
    if filters.is_unconstrained() {
        return records.to_vec();
    }

    records
        .iter()
        .filter(|record| matches(record, filters, year))
        .cloned()
        .collect()
}

/// Whether one record passes the filter state
pub fn matches(record: &ScheduleRecord, filters: &FilterState, year: i32) -> bool {
    filters.active().all(|(key, wanted)| match key {
        FilterKey::WeekRange => week::ranges_overlap_in(&record.week_range, wanted, year),
        _ => record.field(key) == wanted,
    })
}

/// Distinct non-empty values per categorical key, sorted
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterOptions {
    values: BTreeMap<FilterKey, Vec<String>>,
}

impl FilterOptions {
    pub fn get(&self, key: FilterKey) -> &[String] {
        self.values.get(&key).map(Vec::as_slice).unwrap_or(&[])
    }
}

/// Collect the drop-down choices for each categorical key
pub fn filter_options(records: &[ScheduleRecord]) -> FilterOptions {
    let mut values = BTreeMap::new();
    for key in FilterKey::CATEGORICAL {
        let distinct: BTreeSet<&str> = records
            .iter()
            .map(|record| record.field(key))
            .filter(|value| !value.is_empty())
            .collect();
        values.insert(key, distinct.into_iter().map(str::to_string).collect());
    }
    FilterOptions { values }
}
