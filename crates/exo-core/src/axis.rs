#![forbid(unsafe_code)]

//! Fields selectable as dashboard axes, with their fixed plotting domains.

use std::fmt;

use crate::dataset::Extent;
use crate::error::{CoreError, Result};
use crate::record::NumericField;

/// A dashboard axis choice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum AxisField {
    EquilibriumTemp,
    OrbitalEccentricity,
    PlanetRadius,
    StellarMass,
    StellarRadius,
}

impl AxisField {
    pub const ALL: [AxisField; 5] = [
        AxisField::EquilibriumTemp,
        AxisField::OrbitalEccentricity,
        AxisField::PlanetRadius,
        AxisField::StellarMass,
        AxisField::StellarRadius,
    ];

    pub const fn field(self) -> NumericField {
        match self {
            AxisField::EquilibriumTemp => NumericField::EquilibriumTemp,
            AxisField::OrbitalEccentricity => NumericField::OrbitalEccentricity,
            AxisField::PlanetRadius => NumericField::PlanetRadius,
            AxisField::StellarMass => NumericField::StellarMass,
            AxisField::StellarRadius => NumericField::StellarRadius,
        }
    }

    /// Column key used by selectors (`pl_eqt`, `st_mass`, ...).
    pub const fn key(self) -> &'static str {
        self.field().column().header()
    }

    pub const fn title(self) -> &'static str {
        match self {
            AxisField::EquilibriumTemp => "Equilibrium Temperature",
            AxisField::OrbitalEccentricity => "Orbital Eccentricity",
            AxisField::PlanetRadius => "Planet Radius [Jupiter Radius]",
            AxisField::StellarMass => "Stellar Mass [Solar mass]",
            AxisField::StellarRadius => "Stellar Radius [Solar Radius]",
        }
    }

    /// Fixed plotting domain, independent of the data.
    pub const fn domain(self) -> Extent {
        match self {
            AxisField::EquilibriumTemp => Extent::new(0.0, 5000.0),
            AxisField::OrbitalEccentricity => Extent::new(0.0, 1.0),
            AxisField::PlanetRadius => Extent::new(0.0, 10.0),
            AxisField::StellarMass => Extent::new(0.0, 5.0),
            AxisField::StellarRadius => Extent::new(0.0, 5.0),
        }
    }

    pub fn from_key(key: &str) -> Result<Self> {
        let key = key.trim();
        Self::ALL
            .into_iter()
            .find(|a| a.key() == key)
            .ok_or_else(|| CoreError::UnknownField(key.to_owned()))
    }
}

impl fmt::Display for AxisField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_resolve_back_to_fields() {
        for axis in AxisField::ALL {
            assert_eq!(AxisField::from_key(axis.key()).ok(), Some(axis));
        }
        assert_eq!(AxisField::from_key(" st_rad ").ok(), Some(AxisField::StellarRadius));
    }

    #[test]
    fn non_axis_columns_are_rejected() {
        assert!(matches!(
            AxisField::from_key("sy_dist"),
            Err(CoreError::UnknownField(name)) if name == "sy_dist"
        ));
    }

    #[test]
    fn domains_start_at_zero() {
        for axis in AxisField::ALL {
            let domain = axis.domain();
            assert_eq!(domain.min, 0.0);
            assert!(domain.span() > 0.0, "{axis} has an empty domain");
        }
    }
}
