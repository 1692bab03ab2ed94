#![forbid(unsafe_code)]

//! Discovery counts per year.

use std::collections::BTreeMap;

use crate::record::PlanetRecord;

/// One histogram bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct YearCount {
    pub year: i32,
    pub count: usize,
}

/// Group records by discovery year, ascending. Unknown years form no bucket.
pub fn count_by_year<R: AsRef<PlanetRecord>>(records: &[R]) -> Vec<YearCount> {
    let mut buckets: BTreeMap<i32, usize> = BTreeMap::new();
    for year in records.iter().filter_map(|r| r.as_ref().discovery_year()) {
        *buckets.entry(year).or_default() += 1;
    }
    buckets
        .into_iter()
        .map(|(year, count)| YearCount { year, count })
        .collect()
}

/// Sum of all bucket counts.
pub fn total(counts: &[YearCount]) -> usize {
    counts.iter().map(|c| c.count).sum()
}

/// Tallest bucket, the histogram's y-domain upper bound.
pub fn peak(counts: &[YearCount]) -> Option<usize> {
    counts.iter().map(|c| c.count).max()
}
