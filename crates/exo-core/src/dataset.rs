#![forbid(unsafe_code)]

//! The immutable, ordered record store.
//!
//! Records are sorted by discovery year ascending with unknown years last.
//! The sort is stable, so ties keep input order. After [`Dataset::load`] the
//! sequence never changes; every derived view is a fresh `Vec`.

use std::sync::Arc;

use crate::error::{CoreError, Result};
use crate::record::{NumericField, PlanetRecord};

/// Closed `(min, max)` interval over the non-null values of a field.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Extent {
    pub min: f64,
    pub max: f64,
}

impl Extent {
    /// Default domain for fields without any values.
    pub const UNIT: Extent = Extent { min: 0.0, max: 1.0 };

    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub fn span(&self) -> f64 {
        self.max - self.min
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }

    /// Widen to include `value`.
    fn include(self, value: f64) -> Self {
        Self {
            min: self.min.min(value),
            max: self.max.max(value),
        }
    }
}

/// Sorted, shared, read-only collection of records.
///
/// Cloning is cheap: the records live behind an `Arc`.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    records: Arc<[Arc<PlanetRecord>]>,
}

impl Dataset {
    /// Build the store from normalized records.
    pub fn load(rows: impl IntoIterator<Item = PlanetRecord>) -> Self {
        let mut rows: Vec<PlanetRecord> = rows.into_iter().collect();
        // `false < true`, so known years sort ahead of unknown ones.
        rows.sort_by_key(|r| (r.discovery_year().is_none(), r.discovery_year()));
        Self {
            records: rows.into_iter().map(Arc::new).collect(),
        }
    }

    pub fn records(&self) -> &[Arc<PlanetRecord>] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Fresh copy of the full sequence.
    pub fn to_vec(&self) -> Vec<Arc<PlanetRecord>> {
        self.records.to_vec()
    }

    /// Whether this exact record (by identity) belongs to the store.
    pub fn contains(&self, record: &Arc<PlanetRecord>) -> bool {
        self.records.iter().any(|r| Arc::ptr_eq(r, record))
    }

    /// `(min, max)` over non-null values, `None` when the field is empty.
    pub fn extent(&self, field: NumericField) -> Option<Extent> {
        self.records
            .iter()
            .filter_map(|r| r.value(field))
            .fold(None, |acc: Option<Extent>, v| match acc {
                None => Some(Extent::new(v, v)),
                Some(e) => Some(e.include(v)),
            })
    }

    /// Extent with the [`Extent::UNIT`] fallback.
    pub fn extent_or_unit(&self, field: NumericField) -> Extent {
        self.extent(field).unwrap_or(Extent::UNIT)
    }

    /// Extent, reporting an empty field as [`CoreError::EmptyExtent`].
    pub fn try_extent(&self, field: NumericField) -> Result<Extent> {
        self.extent(field).ok_or(CoreError::EmptyExtent(field))
    }

    /// First and last known discovery year.
    pub fn year_range(&self) -> Option<(i32, i32)> {
        let first = self.records.first()?.discovery_year()?;
        let last = self
            .records
            .iter()
            .rev()
            .find_map(|r| r.discovery_year())
            .unwrap_or(first);
        Some((first, last))
    }

    /// Every known discovery year, ascending and without repeats.
    pub fn distinct_years(&self) -> Vec<i32> {
        let mut years: Vec<i32> = self
            .records
            .iter()
            .filter_map(|r| r.discovery_year())
            .collect();
        years.dedup();
        years
    }

    /// Records discovered in `year`, in store order.
    pub fn records_in_year(&self, year: i32) -> Vec<Arc<PlanetRecord>> {
        self.records
            .iter()
            .filter(|r| r.discovery_year() == Some(year))
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn planet(name: &str, year: Option<i32>) -> PlanetRecord {
        let record = PlanetRecord::new(name);
        match year {
            Some(y) => record.with(NumericField::DiscoveryYear, f64::from(y)),
            None => record,
        }
    }

    fn names(dataset: &Dataset) -> Vec<&str> {
        dataset.records().iter().map(|r| r.name()).collect()
    }

    #[test]
    fn sorts_by_year_with_unknown_years_last() {
        let dataset = Dataset::load([
            planet("a", Some(2021)),
            planet("b", None),
            planet("c", Some(2019)),
            planet("d", Some(2020)),
            planet("e", None),
        ]);
        assert_eq!(names(&dataset), vec!["c", "d", "a", "b", "e"]);
    }

    #[test]
    fn sort_is_stable_for_ties() {
        let dataset = Dataset::load([
            planet("first", Some(2019)),
            planet("later", Some(2020)),
            planet("second", Some(2019)),
            planet("third", Some(2019)),
        ]);
        assert_eq!(names(&dataset), vec!["first", "second", "third", "later"]);
    }

    #[test]
    fn extent_scans_only_present_values() {
        let dataset = Dataset::load([
            PlanetRecord::new("a").with(NumericField::StellarMass, 0.8),
            PlanetRecord::new("b"),
            PlanetRecord::new("c").with(NumericField::StellarMass, 1.3),
            PlanetRecord::new("d").with(NumericField::StellarMass, 0.2),
        ]);
        assert_eq!(
            dataset.extent(NumericField::StellarMass),
            Some(Extent::new(0.2, 1.3))
        );
    }

    #[test]
    fn empty_field_has_no_extent() {
        let dataset = Dataset::load([PlanetRecord::new("a"), PlanetRecord::new("b")]);
        assert_eq!(dataset.extent(NumericField::Distance), None);
        assert_eq!(dataset.extent_or_unit(NumericField::Distance), Extent::UNIT);
        assert!(matches!(
            dataset.try_extent(NumericField::Distance),
            Err(CoreError::EmptyExtent(NumericField::Distance))
        ));
    }

    #[test]
    fn year_queries() {
        let dataset = Dataset::load([
            planet("a", Some(2021)),
            planet("b", Some(2019)),
            planet("c", None),
            planet("d", Some(2019)),
        ]);
        assert_eq!(dataset.year_range(), Some((2019, 2021)));
        assert_eq!(dataset.distinct_years(), vec![2019, 2021]);
        let in_2019: Vec<_> = dataset.records_in_year(2019);
        assert_eq!(in_2019.len(), 2);
        assert!(dataset.records_in_year(2030).is_empty());
    }

    #[test]
    fn year_range_of_yearless_dataset_is_none() {
        assert_eq!(Dataset::load([planet("a", None)]).year_range(), None);
        assert_eq!(Dataset::default().year_range(), None);
    }

    #[test]
    fn membership_is_by_identity() {
        let dataset = Dataset::load([planet("twin", Some(2020))]);
        let inside = Arc::clone(&dataset.records()[0]);
        let lookalike = Arc::new(planet("twin", Some(2020)));
        assert!(dataset.contains(&inside));
        assert!(!dataset.contains(&lookalike));
    }

    #[test]
    fn derived_views_do_not_alias_the_store() {
        let dataset = Dataset::load([planet("a", Some(2020))]);
        let mut view = dataset.to_vec();
        view.clear();
        assert_eq!(dataset.len(), 1);
    }
}
