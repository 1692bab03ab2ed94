#![forbid(unsafe_code)]

//! Typed exoplanet records and the source column schema.
//!
//! A [`PlanetRecord`] upholds one invariant: every numeric field is either a
//! finite number or `None`. The fields are private and every setter routes
//! through the same coercion the normalizer uses, so the invariant cannot be
//! broken from outside this module.

use std::fmt;

use crate::normalize::RawRow;

/// Columns consumed from the source table. Any other column is dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Column {
    Name,
    DiscoveryYear,
    EquilibriumTemp,
    OrbitalEccentricity,
    Distance,
    StellarMass,
    StellarRadius,
    SemiMajorAxis,
    PlanetRadius,
}

impl Column {
    pub const ALL: [Column; 9] = [
        Column::Name,
        Column::DiscoveryYear,
        Column::EquilibriumTemp,
        Column::OrbitalEccentricity,
        Column::Distance,
        Column::StellarMass,
        Column::StellarRadius,
        Column::SemiMajorAxis,
        Column::PlanetRadius,
    ];

    /// Header name in the source table.
    pub const fn header(self) -> &'static str {
        match self {
            Column::Name => "pl_name",
            Column::DiscoveryYear => "disc_year",
            Column::EquilibriumTemp => "pl_eqt",
            Column::OrbitalEccentricity => "pl_orbeccen",
            Column::Distance => "sy_dist",
            Column::StellarMass => "st_mass",
            Column::StellarRadius => "st_rad",
            Column::SemiMajorAxis => "pl_orbsmax",
            Column::PlanetRadius => "pl_radj",
        }
    }

    pub fn from_header(header: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.header() == header)
    }

    /// The numeric field stored under this column, if any.
    pub const fn numeric(self) -> Option<NumericField> {
        match self {
            Column::Name => None,
            Column::DiscoveryYear => Some(NumericField::DiscoveryYear),
            Column::EquilibriumTemp => Some(NumericField::EquilibriumTemp),
            Column::OrbitalEccentricity => Some(NumericField::OrbitalEccentricity),
            Column::Distance => Some(NumericField::Distance),
            Column::StellarMass => Some(NumericField::StellarMass),
            Column::StellarRadius => Some(NumericField::StellarRadius),
            Column::SemiMajorAxis => Some(NumericField::SemiMajorAxis),
            Column::PlanetRadius => Some(NumericField::PlanetRadius),
        }
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.header())
    }
}

/// Numeric fields of a [`PlanetRecord`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum NumericField {
    DiscoveryYear,
    EquilibriumTemp,
    OrbitalEccentricity,
    Distance,
    StellarMass,
    StellarRadius,
    SemiMajorAxis,
    PlanetRadius,
}

impl NumericField {
    pub const ALL: [NumericField; 8] = [
        NumericField::DiscoveryYear,
        NumericField::EquilibriumTemp,
        NumericField::OrbitalEccentricity,
        NumericField::Distance,
        NumericField::StellarMass,
        NumericField::StellarRadius,
        NumericField::SemiMajorAxis,
        NumericField::PlanetRadius,
    ];

    pub const fn column(self) -> Column {
        match self {
            NumericField::DiscoveryYear => Column::DiscoveryYear,
            NumericField::EquilibriumTemp => Column::EquilibriumTemp,
            NumericField::OrbitalEccentricity => Column::OrbitalEccentricity,
            NumericField::Distance => Column::Distance,
            NumericField::StellarMass => Column::StellarMass,
            NumericField::StellarRadius => Column::StellarRadius,
            NumericField::SemiMajorAxis => Column::SemiMajorAxis,
            NumericField::PlanetRadius => Column::PlanetRadius,
        }
    }

    /// Human-readable label with units.
    pub const fn label(self) -> &'static str {
        match self {
            NumericField::DiscoveryYear => "Discovery Year",
            NumericField::EquilibriumTemp => "Equilibrium Temperature [K]",
            NumericField::OrbitalEccentricity => "Orbital Eccentricity",
            NumericField::Distance => "Distance [pc]",
            NumericField::StellarMass => "Stellar Mass [Solar mass]",
            NumericField::StellarRadius => "Stellar Radius [Solar radius]",
            NumericField::SemiMajorAxis => "Orbital Semi-Major Axis [AU]",
            NumericField::PlanetRadius => "Planet Radius [Jupiter radius]",
        }
    }
}

impl fmt::Display for NumericField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column().header())
    }
}

/// One normalized row of the catalog.
///
/// Records are shared as `Arc<PlanetRecord>` once loaded; selection in the
/// UI is by pointer identity, so two records with identical fields remain
/// distinct entities.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PlanetRecord {
    name: String,
    discovery_year: Option<i32>,
    equilibrium_temp_k: Option<f64>,
    orbital_eccentricity: Option<f64>,
    distance_pc: Option<f64>,
    stellar_mass_solar: Option<f64>,
    stellar_radius_solar: Option<f64>,
    orbital_semi_major_axis_au: Option<f64>,
    planet_radius_jupiter: Option<f64>,
}

impl PlanetRecord {
    /// Create a record with every numeric field unset.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Builder-style setter. Non-finite values (and non-integral years)
    /// are stored as `None`.
    #[must_use]
    pub fn with(mut self, field: NumericField, value: f64) -> Self {
        self.set(field, Some(value));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn discovery_year(&self) -> Option<i32> {
        self.discovery_year
    }

    pub fn equilibrium_temp_k(&self) -> Option<f64> {
        self.equilibrium_temp_k
    }

    pub fn orbital_eccentricity(&self) -> Option<f64> {
        self.orbital_eccentricity
    }

    pub fn distance_pc(&self) -> Option<f64> {
        self.distance_pc
    }

    pub fn stellar_mass_solar(&self) -> Option<f64> {
        self.stellar_mass_solar
    }

    pub fn stellar_radius_solar(&self) -> Option<f64> {
        self.stellar_radius_solar
    }

    pub fn orbital_semi_major_axis_au(&self) -> Option<f64> {
        self.orbital_semi_major_axis_au
    }

    pub fn planet_radius_jupiter(&self) -> Option<f64> {
        self.planet_radius_jupiter
    }

    /// Read any numeric field; the discovery year is widened to `f64`.
    pub fn value(&self, field: NumericField) -> Option<f64> {
        match field {
            NumericField::DiscoveryYear => self.discovery_year.map(f64::from),
            NumericField::EquilibriumTemp => self.equilibrium_temp_k,
            NumericField::OrbitalEccentricity => self.orbital_eccentricity,
            NumericField::Distance => self.distance_pc,
            NumericField::StellarMass => self.stellar_mass_solar,
            NumericField::StellarRadius => self.stellar_radius_solar,
            NumericField::SemiMajorAxis => self.orbital_semi_major_axis_au,
            NumericField::PlanetRadius => self.planet_radius_jupiter,
        }
    }

    /// Store a value, coercing anything outside the invariant to `None`.
    ///
    /// Returns `false` when a present value had to be dropped.
    pub(crate) fn set(&mut self, field: NumericField, value: Option<f64>) -> bool {
        let finite = value.filter(|v| v.is_finite());
        let slot = match field {
            NumericField::DiscoveryYear => {
                self.discovery_year = finite.and_then(year_from_f64);
                return value.is_none() || self.discovery_year.is_some();
            }
            NumericField::EquilibriumTemp => &mut self.equilibrium_temp_k,
            NumericField::OrbitalEccentricity => &mut self.orbital_eccentricity,
            NumericField::Distance => &mut self.distance_pc,
            NumericField::StellarMass => &mut self.stellar_mass_solar,
            NumericField::StellarRadius => &mut self.stellar_radius_solar,
            NumericField::SemiMajorAxis => &mut self.orbital_semi_major_axis_au,
            NumericField::PlanetRadius => &mut self.planet_radius_jupiter,
        };
        *slot = finite;
        value.is_none() || finite.is_some()
    }

    /// Render the record back into raw table form.
    ///
    /// Feeding the result to [`normalize`](crate::normalize::normalize)
    /// yields an equal record.
    pub fn to_raw_row(&self) -> RawRow {
        let mut row = RawRow::with_capacity(Column::ALL.len());
        row.insert(Column::Name.header().to_owned(), self.name.clone());
        for field in NumericField::ALL {
            let cell = match field {
                NumericField::DiscoveryYear => {
                    self.discovery_year.map(|y| y.to_string()).unwrap_or_default()
                }
                _ => self.value(field).map(|v| v.to_string()).unwrap_or_default(),
            };
            row.insert(field.column().header().to_owned(), cell);
        }
        row
    }
}

impl AsRef<PlanetRecord> for PlanetRecord {
    fn as_ref(&self) -> &PlanetRecord {
        self
    }
}

fn year_from_f64(value: f64) -> Option<i32> {
    if value.fract() != 0.0 || value < f64::from(i32::MIN) || value > f64::from(i32::MAX) {
        return None;
    }
    Some(value as i32)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_lookup_round_trips() {
        for column in Column::ALL {
            assert_eq!(Column::from_header(column.header()), Some(column));
        }
        assert_eq!(Column::from_header("pl_bmassj"), None);
    }

    #[test]
    fn only_the_name_column_is_not_numeric() {
        let non_numeric: Vec<_> = Column::ALL
            .into_iter()
            .filter(|c| c.numeric().is_none())
            .collect();
        assert_eq!(non_numeric, vec![Column::Name]);
        for field in NumericField::ALL {
            assert_eq!(field.column().numeric(), Some(field));
        }
    }

    #[test]
    fn builder_drops_non_finite_values() {
        let record = PlanetRecord::new("TOI-700 d")
            .with(NumericField::EquilibriumTemp, f64::NAN)
            .with(NumericField::StellarMass, f64::INFINITY)
            .with(NumericField::PlanetRadius, 0.1);
        assert_eq!(record.equilibrium_temp_k(), None);
        assert_eq!(record.stellar_mass_solar(), None);
        assert_eq!(record.planet_radius_jupiter(), Some(0.1));
    }

    #[test]
    fn fractional_years_are_not_years() {
        let record = PlanetRecord::new("x").with(NumericField::DiscoveryYear, 2019.5);
        assert_eq!(record.discovery_year(), None);

        let record = PlanetRecord::new("x").with(NumericField::DiscoveryYear, 2019.0);
        assert_eq!(record.discovery_year(), Some(2019));
        assert_eq!(record.value(NumericField::DiscoveryYear), Some(2019.0));
    }

    #[test]
    fn set_reports_dropped_values() {
        let mut record = PlanetRecord::new("x");
        assert!(record.set(NumericField::Distance, Some(12.5)));
        assert!(record.set(NumericField::Distance, None));
        assert!(!record.set(NumericField::Distance, Some(f64::NAN)));
        assert!(!record.set(NumericField::DiscoveryYear, Some(1e12)));
    }

    #[test]
    fn raw_row_carries_every_schema_column() {
        let record = PlanetRecord::new("LHS 3844 b")
            .with(NumericField::DiscoveryYear, 2018.0)
            .with(NumericField::OrbitalEccentricity, 0.0);
        let row = record.to_raw_row();
        assert_eq!(row.len(), Column::ALL.len());
        assert_eq!(row["pl_name"], "LHS 3844 b");
        assert_eq!(row["disc_year"], "2018");
        assert_eq!(row["pl_orbeccen"], "0");
        assert_eq!(row["st_mass"], "");
    }
}
