#![forbid(unsafe_code)]

//! Earth reference ranges and highlight predicates.
//!
//! The comparison scene lines a single planet up against the range of values
//! under which Earth-like conditions hold. The overview marks planets in the
//! temperate band and hosts that resemble the Sun.

use crate::axis::AxisField;
use crate::record::{NumericField, PlanetRecord};

/// Liquid-water temperature band in kelvin.
pub const TEMPERATE_BAND_K: RefRange = RefRange::new(273.15, 373.15);
/// Eccentricity range considered near-circular.
pub const LOW_ECCENTRICITY: RefRange = RefRange::new(0.0, 0.2);
/// Stellar mass and radius band (solar units) for a Sun-like host.
pub const SUN_LIKE_HOST: RefRange = RefRange::new(0.8, 1.2);

/// Closed reference interval.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RefRange {
    pub min: f64,
    pub max: f64,
}

impl RefRange {
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }

    /// Degenerate ranges mark a single reference point (the Sun).
    pub fn is_point(&self) -> bool {
        self.min == self.max
    }
}

/// What a reference range describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ReferenceBody {
    Earth,
    HostStar,
}

/// Parameters shown in the comparison scene, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ComparisonParameter {
    EquilibriumTemp,
    SemiMajorAxis,
    PlanetRadius,
    OrbitalEccentricity,
    StellarRadius,
    StellarMass,
}

impl ComparisonParameter {
    pub const ALL: [ComparisonParameter; 6] = [
        ComparisonParameter::EquilibriumTemp,
        ComparisonParameter::SemiMajorAxis,
        ComparisonParameter::PlanetRadius,
        ComparisonParameter::OrbitalEccentricity,
        ComparisonParameter::StellarRadius,
        ComparisonParameter::StellarMass,
    ];

    pub const fn field(self) -> NumericField {
        match self {
            ComparisonParameter::EquilibriumTemp => NumericField::EquilibriumTemp,
            ComparisonParameter::SemiMajorAxis => NumericField::SemiMajorAxis,
            ComparisonParameter::PlanetRadius => NumericField::PlanetRadius,
            ComparisonParameter::OrbitalEccentricity => NumericField::OrbitalEccentricity,
            ComparisonParameter::StellarRadius => NumericField::StellarRadius,
            ComparisonParameter::StellarMass => NumericField::StellarMass,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            ComparisonParameter::EquilibriumTemp => "Equilibrium Temperature",
            ComparisonParameter::SemiMajorAxis => "Orbital Semi-Major Axis (AU)",
            ComparisonParameter::PlanetRadius => "Planet Radius (Jupiter Radii)",
            ComparisonParameter::OrbitalEccentricity => "Orbital Eccentricity",
            ComparisonParameter::StellarRadius => "Stellar Radius (Solar Rad.)",
            ComparisonParameter::StellarMass => "Stellar Mass (Solar Mass)",
        }
    }

    pub const fn reference(self) -> RefRange {
        match self {
            ComparisonParameter::EquilibriumTemp => TEMPERATE_BAND_K,
            ComparisonParameter::SemiMajorAxis => RefRange::new(0.9, 1.5),
            ComparisonParameter::PlanetRadius => RefRange::new(0.0892, 0.1427),
            ComparisonParameter::OrbitalEccentricity => LOW_ECCENTRICITY,
            ComparisonParameter::StellarRadius => RefRange::new(1.0, 1.0),
            ComparisonParameter::StellarMass => RefRange::new(1.0, 1.0),
        }
    }

    pub const fn body(self) -> ReferenceBody {
        match self {
            ComparisonParameter::StellarRadius | ComparisonParameter::StellarMass => {
                ReferenceBody::HostStar
            }
            _ => ReferenceBody::Earth,
        }
    }
}

/// One row of the comparison scene.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ComparisonRow {
    pub parameter: ComparisonParameter,
    pub reference: RefRange,
    pub planet: Option<f64>,
}

impl ComparisonRow {
    /// `None` when the planet has no value for the parameter.
    pub fn within_reference(&self) -> Option<bool> {
        self.planet.map(|v| self.reference.contains(v))
    }

    /// Upper end of a shared scale covering both reference and planet.
    pub fn scale_max(&self) -> f64 {
        self.planet
            .map_or(self.reference.max, |v| v.max(self.reference.max))
    }
}

/// Rows comparing `record` against the reference ranges.
pub fn comparison_rows(record: &PlanetRecord) -> Vec<ComparisonRow> {
    ComparisonParameter::ALL
        .into_iter()
        .map(|parameter| ComparisonRow {
            parameter,
            reference: parameter.reference(),
            planet: record.value(parameter.field()),
        })
        .collect()
}

/// Temperature in the liquid-water band and a near-circular orbit.
pub fn is_potentially_habitable(record: &PlanetRecord) -> bool {
    let temperate = record
        .equilibrium_temp_k()
        .is_some_and(|t| TEMPERATE_BAND_K.contains(t));
    let circular = record
        .orbital_eccentricity()
        .is_some_and(|e| LOW_ECCENTRICITY.contains(e));
    temperate && circular
}

/// Host star mass and radius both within the Sun-like band.
pub fn has_sun_like_host(record: &PlanetRecord) -> bool {
    let mass = record
        .stellar_mass_solar()
        .is_some_and(|m| SUN_LIKE_HOST.contains(m));
    let radius = record
        .stellar_radius_solar()
        .is_some_and(|r| SUN_LIKE_HOST.contains(r));
    mass && radius
}

/// Earth (or solar) reference range along a dashboard axis.
pub fn axis_reference(axis: AxisField) -> RefRange {
    match axis {
        AxisField::EquilibriumTemp => ComparisonParameter::EquilibriumTemp.reference(),
        AxisField::OrbitalEccentricity => ComparisonParameter::OrbitalEccentricity.reference(),
        AxisField::PlanetRadius => ComparisonParameter::PlanetRadius.reference(),
        AxisField::StellarMass => ComparisonParameter::StellarMass.reference(),
        AxisField::StellarRadius => ComparisonParameter::StellarRadius.reference(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temperate() -> PlanetRecord {
        PlanetRecord::new("TOI-700 d")
            .with(NumericField::EquilibriumTemp, 300.0)
            .with(NumericField::OrbitalEccentricity, 0.03)
            .with(NumericField::StellarMass, 0.95)
            .with(NumericField::StellarRadius, 1.05)
    }

    #[test]
    fn habitable_needs_both_conditions() {
        assert!(is_potentially_habitable(&temperate()));
        let eccentric = temperate().with(NumericField::OrbitalEccentricity, 0.45);
        assert!(!is_potentially_habitable(&eccentric));
        let unknown = PlanetRecord::new("x").with(NumericField::EquilibriumTemp, 300.0);
        assert!(!is_potentially_habitable(&unknown));
    }

    #[test]
    fn band_edges_are_inclusive() {
        let edge = PlanetRecord::new("edge")
            .with(NumericField::EquilibriumTemp, 373.15)
            .with(NumericField::OrbitalEccentricity, 0.0);
        assert!(is_potentially_habitable(&edge));
    }

    #[test]
    fn sun_like_host() {
        assert!(has_sun_like_host(&temperate()));
        let dwarf = temperate().with(NumericField::StellarMass, 0.42);
        assert!(!has_sun_like_host(&dwarf));
    }

    #[test]
    fn comparison_rows_follow_display_order() {
        let rows = comparison_rows(&temperate());
        let params: Vec<_> = rows.iter().map(|r| r.parameter).collect();
        assert_eq!(params, ComparisonParameter::ALL.to_vec());

        assert_eq!(rows[0].planet, Some(300.0));
        assert_eq!(rows[0].within_reference(), Some(true));
        assert_eq!(rows[1].planet, None);
        assert_eq!(rows[1].within_reference(), None);
        assert_eq!(rows[5].parameter.body(), ReferenceBody::HostStar);
    }

    #[test]
    fn scale_covers_planet_and_reference() {
        let rows = comparison_rows(&temperate().with(NumericField::EquilibriumTemp, 1400.0));
        assert_eq!(rows[0].scale_max(), 1400.0);
        assert_eq!(rows[1].scale_max(), 1.5);
    }

    #[test]
    fn stellar_references_are_points() {
        assert!(ComparisonParameter::StellarMass.reference().is_point());
        assert!(!ComparisonParameter::PlanetRadius.reference().is_point());
        assert!(axis_reference(AxisField::StellarRadius).is_point());
    }
}
