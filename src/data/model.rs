use std::collections::{BTreeSet, HashSet};

use serde::{Deserialize, Serialize};

use super::error::DataError;
use super::filter::YearRange;

/// Columns every input file must provide. Any other column is ignored.
pub const REQUIRED_COLUMNS: [&str; 7] = [
    "region",
    "year",
    "category",
    "value",
    "powertrain",
    "parameter",
    "mode",
];

// ---------------------------------------------------------------------------
// Record – one row of the input table
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub region: String,
    pub year: i32,
    pub category: String,
    pub value: f64,
    pub powertrain: String,
    pub parameter: String,
    pub mode: String,
}

// ---------------------------------------------------------------------------
// RecordSet – the complete loaded dataset
// ---------------------------------------------------------------------------

/// The full parsed dataset with pre-computed label indices.
///
/// Built once at startup and never mutated afterwards; every filter produces
/// a [`FilteredView`](super::filter::FilteredView) over it instead.
#[derive(Debug, Clone)]
pub struct RecordSet {
    records: Vec<Record>,
    /// Distinct labels per categorical column, in first-appearance order.
    regions: Vec<String>,
    powertrains: Vec<String>,
    modes: Vec<String>,
    categories: Vec<String>,
    /// Sorted distinct years.
    years: BTreeSet<i32>,
    year_bounds: YearRange,
}

impl RecordSet {
    /// Build label indices from the loaded records.
    pub fn from_records(records: Vec<Record>) -> Result<Self, DataError> {
        let years: BTreeSet<i32> = records.iter().map(|r| r.year).collect();
        let (Some(&min), Some(&max)) = (years.first(), years.last()) else {
            return Err(DataError::Empty);
        };

        let owned = |labels: Vec<&str>| -> Vec<String> {
            labels.into_iter().map(str::to_string).collect()
        };
        let regions = owned(distinct_in_order(records.iter().map(|r| r.region.as_str())));
        let powertrains = owned(distinct_in_order(
            records.iter().map(|r| r.powertrain.as_str()),
        ));
        let modes = owned(distinct_in_order(records.iter().map(|r| r.mode.as_str())));
        let categories = owned(distinct_in_order(
            records.iter().map(|r| r.category.as_str()),
        ));

        Ok(RecordSet {
            records,
            regions,
            powertrains,
            modes,
            categories,
            years,
            year_bounds: YearRange::spanning(min, max),
        })
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn get(&self, index: usize) -> Option<&Record> {
        self.records.get(index)
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn regions(&self) -> &[String] {
        &self.regions
    }

    pub fn powertrains(&self) -> &[String] {
        &self.powertrains
    }

    pub fn modes(&self) -> &[String] {
        &self.modes
    }

    pub fn categories(&self) -> &[String] {
        &self.categories
    }

    pub fn years(&self) -> &BTreeSet<i32> {
        &self.years
    }

    /// Smallest and largest year present.
    pub fn year_bounds(&self) -> YearRange {
        self.year_bounds
    }
}

/// Distinct values in order of first appearance.
pub fn distinct_in_order<'a, I>(values: I) -> Vec<&'a str>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut seen = HashSet::new();
    values.into_iter().filter(|v| seen.insert(*v)).collect()
}


#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::*;

    #[test]
    fn empty_record_set_is_rejected() {
        assert_eq!(
            RecordSet::from_records(Vec::new()).unwrap_err(),
            DataError::Empty
        );
    }

    #[test]
    fn regions_keep_first_appearance_order() {
        let set = RecordSet::from_records(vec![
            record("South", 2021, 1.0),
            record("North", 2020, 1.0),
            record("South", 2020, 1.0),
        ])
        .unwrap();
        assert_eq!(set.regions(), ["South", "North"]);
    }

    #[test]
    fn year_bounds_span_min_and_max() {
        let set = north_south();
        assert_eq!(set.year_bounds().start(), 2020);
        assert_eq!(set.year_bounds().end(), 2022);
        assert_eq!(set.years().iter().copied().collect::<Vec<_>>(), [2020, 2021, 2022]);
    }

    #[test]
    fn distinct_in_order_drops_repeats() {
        assert_eq!(distinct_in_order(["b", "a", "b", "c", "a"]), ["b", "a", "c"]);
    }
}
