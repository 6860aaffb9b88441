use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::error::DataError;
use super::model::{Record, RecordSet};

// ---------------------------------------------------------------------------
// YearRange – closed, ordered year interval
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "[i32; 2]", into = "[i32; 2]")]
pub struct YearRange {
    start: i32,
    end: i32,
}

impl YearRange {
    /// Build `[start, end]`. Fails when `start > end`.
    pub fn new(start: i32, end: i32) -> Result<Self, DataError> {
        if start > end {
            return Err(DataError::InvertedYearRange { start, end });
        }
        Ok(YearRange { start, end })
    }

    /// Range over already ordered bounds.
    pub(crate) fn spanning(min: i32, max: i32) -> Self {
        YearRange {
            start: min.min(max),
            end: max.max(min),
        }
    }

    pub fn start(&self) -> i32 {
        self.start
    }

    pub fn end(&self) -> i32 {
        self.end
    }

    pub fn contains(&self, year: i32) -> bool {
        self.start <= year && year <= self.end
    }
}

impl TryFrom<[i32; 2]> for YearRange {
    type Error = DataError;

    fn try_from([start, end]: [i32; 2]) -> Result<Self, Self::Error> {
        YearRange::new(start, end)
    }
}

impl From<YearRange> for [i32; 2] {
    fn from(range: YearRange) -> Self {
        [range.start, range.end]
    }
}

// ---------------------------------------------------------------------------
// Selection – the state of the filter controls
// ---------------------------------------------------------------------------

/// Current filter selections.
///
/// An empty `regions` set means "no region filter" (show all regions).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection {
    #[serde(default)]
    pub regions: BTreeSet<String>,
    pub years: YearRange,
}

impl Selection {
    pub fn new<I, S>(regions: I, years: YearRange) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Selection {
            regions: regions.into_iter().map(Into::into).collect(),
            years,
        }
    }

    /// All regions over the given years.
    pub fn all_regions(years: YearRange) -> Self {
        Selection {
            regions: BTreeSet::new(),
            years,
        }
    }

    /// Whether a record passes both predicates.
    pub fn matches(&self, record: &Record) -> bool {
        self.years.contains(record.year)
            && (self.regions.is_empty() || self.regions.contains(&record.region))
    }
}

// ---------------------------------------------------------------------------
// FilteredView – read-only subset of the record set
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct FilteredView<'a> {
    records: &'a RecordSet,
    indices: Vec<usize>,
}

impl<'a> FilteredView<'a> {
    /// Indices into the underlying record set, in source order.
    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    pub fn iter(&self) -> impl Iterator<Item = &'a Record> + '_ {
        let records = self.records;
        self.indices.iter().filter_map(move |&i| records.get(i))
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }
}

/// Return the view of records passing `selection`: one linear scan, no index.
pub fn filter<'a>(records: &'a RecordSet, selection: &Selection) -> FilteredView<'a> {
    let indices = records
        .records()
        .iter()
        .enumerate()
        .filter(|(_, record)| selection.matches(record))
        .map(|(i, _)| i)
        .collect();
    FilteredView { records, indices }
}
