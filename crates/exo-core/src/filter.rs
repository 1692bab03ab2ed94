#![forbid(unsafe_code)]

//! Dashboard filter state and predicate composition.
//!
//! # Semantics
//!
//! Each threshold has a slider with a rest position: the minimum for a
//! lower bound, the maximum for an upper bound. A threshold at rest is
//! *inactive* and contributes no predicate at all, so a slider nobody touched
//! never excludes records that lack that measurement. Once active, a
//! threshold excludes every record missing the field.
//!
//! Active predicates are ANDed. There is no OR and no negation. With every
//! predicate inactive, [`apply`] returns the full dataset in store order.

use std::sync::Arc;

use crate::axis::AxisField;
use crate::dataset::Dataset;
use crate::error::{CoreError, Result};
use crate::record::{NumericField, PlanetRecord};

/// Which side of the threshold a record must be on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bound {
    /// Keep records with `value >= threshold`.
    Lower,
    /// Keep records with `value <= threshold`.
    Upper,
}

/// The dashboard's threshold sliders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Threshold {
    MinEquilibriumTemp,
    MaxEccentricity,
    MaxPlanetRadius,
    MaxStellarMass,
    MaxStellarRadius,
}

impl Threshold {
    pub const ALL: [Threshold; 5] = [
        Threshold::MinEquilibriumTemp,
        Threshold::MaxEccentricity,
        Threshold::MaxPlanetRadius,
        Threshold::MaxStellarMass,
        Threshold::MaxStellarRadius,
    ];

    pub const fn field(self) -> NumericField {
        match self {
            Threshold::MinEquilibriumTemp => NumericField::EquilibriumTemp,
            Threshold::MaxEccentricity => NumericField::OrbitalEccentricity,
            Threshold::MaxPlanetRadius => NumericField::PlanetRadius,
            Threshold::MaxStellarMass => NumericField::StellarMass,
            Threshold::MaxStellarRadius => NumericField::StellarRadius,
        }
    }

    pub const fn bound(self) -> Bound {
        match self {
            Threshold::MinEquilibriumTemp => Bound::Lower,
            _ => Bound::Upper,
        }
    }

    /// Parameter name used by [`FilterParam::parse`].
    pub const fn key(self) -> &'static str {
        match self {
            Threshold::MinEquilibriumTemp => "min_equilibrium_temp",
            Threshold::MaxEccentricity => "max_eccentricity",
            Threshold::MaxPlanetRadius => "max_planet_radius",
            Threshold::MaxStellarMass => "max_stellar_mass",
            Threshold::MaxStellarRadius => "max_stellar_radius",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.key() == key)
    }
}

/// Range and granularity of one slider.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SliderSpec {
    pub min: f64,
    pub max: f64,
    pub step: f64,
}

impl SliderSpec {
    pub const fn new(min: f64, max: f64, step: f64) -> Self {
        Self { min, max, step }
    }

    /// Pin `value` into `min..=max`. An inverted range pins to `max`
    /// rather than panicking; [`FilterConfig::validate`] rejects those.
    pub fn clamp(&self, value: f64) -> f64 {
        value.max(self.min).min(self.max)
    }

    /// The inactive sentinel for a threshold with this bound.
    pub fn rest(&self, bound: Bound) -> f64 {
        match bound {
            Bound::Lower => self.min,
            Bound::Upper => self.max,
        }
    }

    fn validate(&self, name: &str) -> Result<()> {
        let finite = self.min.is_finite() && self.max.is_finite() && self.step.is_finite();
        if !finite || self.min >= self.max || self.step <= 0.0 {
            return Err(CoreError::invalid(format!(
                "slider {name} needs finite min < max and step > 0 (got {}..{} step {})",
                self.min, self.max, self.step
            )));
        }
        Ok(())
    }
}

/// Slider ranges and default axes for the dashboard.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct FilterConfig {
    pub equilibrium_temp: SliderSpec,
    pub eccentricity: SliderSpec,
    pub planet_radius: SliderSpec,
    pub stellar_mass: SliderSpec,
    pub stellar_radius: SliderSpec,
    pub default_x: AxisField,
    pub default_y: AxisField,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            equilibrium_temp: SliderSpec::new(0.0, 5000.0, 50.0),
            eccentricity: SliderSpec::new(0.0, 1.0, 0.01),
            planet_radius: SliderSpec::new(0.0, 10.0, 0.1),
            stellar_mass: SliderSpec::new(0.0, 5.0, 0.1),
            stellar_radius: SliderSpec::new(0.0, 10.0, 0.1),
            default_x: AxisField::EquilibriumTemp,
            default_y: AxisField::StellarMass,
        }
    }
}

impl FilterConfig {
    pub fn slider(&self, threshold: Threshold) -> SliderSpec {
        match threshold {
            Threshold::MinEquilibriumTemp => self.equilibrium_temp,
            Threshold::MaxEccentricity => self.eccentricity,
            Threshold::MaxPlanetRadius => self.planet_radius,
            Threshold::MaxStellarMass => self.stellar_mass,
            Threshold::MaxStellarRadius => self.stellar_radius,
        }
    }

    #[must_use]
    pub fn with_slider(mut self, threshold: Threshold, spec: SliderSpec) -> Self {
        let slot = match threshold {
            Threshold::MinEquilibriumTemp => &mut self.equilibrium_temp,
            Threshold::MaxEccentricity => &mut self.eccentricity,
            Threshold::MaxPlanetRadius => &mut self.planet_radius,
            Threshold::MaxStellarMass => &mut self.stellar_mass,
            Threshold::MaxStellarRadius => &mut self.stellar_radius,
        };
        *slot = spec;
        self
    }

    #[must_use]
    pub fn with_default_axes(mut self, x: AxisField, y: AxisField) -> Self {
        self.default_x = x;
        self.default_y = y;
        self
    }

    pub fn validate(&self) -> Result<()> {
        for threshold in Threshold::ALL {
            self.slider(threshold).validate(threshold.key())?;
        }
        Ok(())
    }

    /// A filter state with every threshold at rest.
    pub fn defaults(&self) -> FilterState {
        FilterState::new(*self)
    }
}

/// One renderer-reported parameter change.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterParam {
    Threshold(Threshold, f64),
    /// Case-insensitive substring, matched as typed. A blank query is
    /// inactive; surrounding spaces are otherwise significant.
    NameQuery(String),
    XField(AxisField),
    YField(AxisField),
    ShowEarthOverlay(bool),
}

impl FilterParam {
    pub fn key(&self) -> &'static str {
        match self {
            FilterParam::Threshold(t, _) => t.key(),
            FilterParam::NameQuery(_) => "name_query",
            FilterParam::XField(_) => "x_field",
            FilterParam::YField(_) => "y_field",
            FilterParam::ShowEarthOverlay(_) => "show_earth_overlay",
        }
    }

    /// Build a parameter from a `(field name, value)` pair.
    pub fn parse(name: &str, value: &str) -> Result<Self> {
        let name = name.trim();
        if let Some(threshold) = Threshold::from_key(name) {
            let parsed = value.trim().parse::<f64>().map_err(|_| {
                CoreError::invalid(format!("{name} expects a number, got {value:?}"))
            })?;
            return Ok(FilterParam::Threshold(threshold, parsed));
        }
        match name {
            "name_query" => Ok(FilterParam::NameQuery(value.to_owned())),
            "x_field" => AxisField::from_key(value).map(FilterParam::XField),
            "y_field" => AxisField::from_key(value).map(FilterParam::YField),
            "show_earth_overlay" => parse_flag(value)
                .map(FilterParam::ShowEarthOverlay)
                .ok_or_else(|| {
                    CoreError::invalid(format!("{name} expects a boolean, got {value:?}"))
                }),
            other => Err(CoreError::UnknownField(other.to_owned())),
        }
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "on" | "yes" => Some(true),
        "false" | "0" | "off" | "no" => Some(false),
        _ => None,
    }
}

/// A single filter condition.
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    AtLeast(NumericField, f64),
    AtMost(NumericField, f64),
    /// Lowercased needle matched against the lowercased name.
    NameContains(String),
}

impl Predicate {
    pub fn matches(&self, record: &PlanetRecord) -> bool {
        match self {
            Predicate::AtLeast(field, threshold) => {
                record.value(*field).is_some_and(|v| v >= *threshold)
            }
            Predicate::AtMost(field, threshold) => {
                record.value(*field).is_some_and(|v| v <= *threshold)
            }
            Predicate::NameContains(needle) => record.name().to_lowercase().contains(needle.as_str()),
        }
    }
}

/// Conjunction of the active predicates.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CompositePredicate {
    predicates: Vec<Predicate>,
}

impl CompositePredicate {
    pub fn matches(&self, record: &PlanetRecord) -> bool {
        self.predicates.iter().all(|p| p.matches(record))
    }

    pub fn len(&self) -> usize {
        self.predicates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.predicates.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Predicate> {
        self.predicates.iter()
    }
}

/// Current dashboard parameters.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct FilterState {
    config: FilterConfig,
    min_equilibrium_temp: f64,
    max_eccentricity: f64,
    max_planet_radius: f64,
    max_stellar_mass: f64,
    max_stellar_radius: f64,
    name_query: String,
    x_field: AxisField,
    y_field: AxisField,
    show_earth_overlay: bool,
}

impl Default for FilterState {
    fn default() -> Self {
        Self::new(FilterConfig::default())
    }
}

impl FilterState {
    /// Every threshold at its rest position, default axes, no overlay.
    pub fn new(config: FilterConfig) -> Self {
        let rest = |t: Threshold| config.slider(t).rest(t.bound());
        Self {
            config,
            min_equilibrium_temp: rest(Threshold::MinEquilibriumTemp),
            max_eccentricity: rest(Threshold::MaxEccentricity),
            max_planet_radius: rest(Threshold::MaxPlanetRadius),
            max_stellar_mass: rest(Threshold::MaxStellarMass),
            max_stellar_radius: rest(Threshold::MaxStellarRadius),
            name_query: String::new(),
            x_field: config.default_x,
            y_field: config.default_y,
            show_earth_overlay: false,
        }
    }

    pub fn config(&self) -> &FilterConfig {
        &self.config
    }

    pub fn threshold(&self, threshold: Threshold) -> f64 {
        match threshold {
            Threshold::MinEquilibriumTemp => self.min_equilibrium_temp,
            Threshold::MaxEccentricity => self.max_eccentricity,
            Threshold::MaxPlanetRadius => self.max_planet_radius,
            Threshold::MaxStellarMass => self.max_stellar_mass,
            Threshold::MaxStellarRadius => self.max_stellar_radius,
        }
    }

    fn threshold_mut(&mut self, threshold: Threshold) -> &mut f64 {
        match threshold {
            Threshold::MinEquilibriumTemp => &mut self.min_equilibrium_temp,
            Threshold::MaxEccentricity => &mut self.max_eccentricity,
            Threshold::MaxPlanetRadius => &mut self.max_planet_radius,
            Threshold::MaxStellarMass => &mut self.max_stellar_mass,
            Threshold::MaxStellarRadius => &mut self.max_stellar_radius,
        }
    }

    /// Whether the threshold has left its rest position.
    pub fn is_active(&self, threshold: Threshold) -> bool {
        self.threshold(threshold) != self.config.slider(threshold).rest(threshold.bound())
    }

    pub fn name_query(&self) -> &str {
        &self.name_query
    }

    pub fn x_field(&self) -> AxisField {
        self.x_field
    }

    pub fn y_field(&self) -> AxisField {
        self.y_field
    }

    pub fn show_earth_overlay(&self) -> bool {
        self.show_earth_overlay
    }

    /// Apply one parameter change.
    ///
    /// Threshold values are clamped to the slider range; non-finite values
    /// and invalid slider ranges are rejected and leave the state untouched.
    pub fn set(&mut self, param: FilterParam) -> Result<()> {
        match param {
            FilterParam::Threshold(threshold, value) => {
                if !value.is_finite() {
                    return Err(CoreError::invalid(format!(
                        "{} must be finite, got {value}",
                        threshold.key()
                    )));
                }
                let slider = self.config.slider(threshold);
                slider.validate(threshold.key())?;
                let clamped = slider.clamp(value);
                *self.threshold_mut(threshold) = clamped;
            }
            FilterParam::NameQuery(query) => self.name_query = query,
            FilterParam::XField(axis) => self.x_field = axis,
            FilterParam::YField(axis) => self.y_field = axis,
            FilterParam::ShowEarthOverlay(on) => self.show_earth_overlay = on,
        }
        Ok(())
    }

    /// Compose the active predicates.
    pub fn predicates(&self) -> CompositePredicate {
        let mut predicates = Vec::new();
        for threshold in Threshold::ALL {
            if !self.is_active(threshold) {
                continue;
            }
            let value = self.threshold(threshold);
            predicates.push(match threshold.bound() {
                Bound::Lower => Predicate::AtLeast(threshold.field(), value),
                Bound::Upper => Predicate::AtMost(threshold.field(), value),
            });
        }
        if !self.name_query.trim().is_empty() {
            predicates.push(Predicate::NameContains(self.name_query.to_lowercase()));
        }
        CompositePredicate { predicates }
    }

    pub fn active_count(&self) -> usize {
        self.predicates().len()
    }
}

/// The active subset: records passing every active predicate, in store
/// order.
pub fn apply(dataset: &Dataset, state: &FilterState) -> Vec<Arc<PlanetRecord>> {
    let predicate = state.predicates();
    if predicate.is_empty() {
        return dataset.to_vec();
    }
    dataset
        .records()
        .iter()
        .filter(|r| predicate.matches(r))
        .cloned()
        .collect()
}
