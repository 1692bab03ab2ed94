#![forbid(unsafe_code)]

//! Exoplanet narrative core data pipeline.
//!
//! This crate turns raw catalog rows into an immutable, ordered [`Dataset`]
//! and derives every view the narrative scenes need from it:
//!
//! - [`normalize`] - defensive parsing of raw rows into [`PlanetRecord`]s
//! - [`table`] - a small CSV reader and the one-shot dataset loader
//! - [`dataset`] - the sorted record store and per-field extents
//! - [`filter`] - threshold/selector state and predicate composition
//! - [`aggregate`] - discovery counts per year
//! - [`earth`] - Earth reference ranges and highlight predicates
//!
//! # Role in the workspace
//! `exo-core` owns no interaction state. The scene controller and the
//! message-driven session live in `exo-runtime`, which consumes the types
//! defined here.

pub mod aggregate;
pub mod axis;
pub mod dataset;
pub mod earth;
pub mod error;
pub mod filter;
pub mod normalize;
pub mod record;
pub mod table;

pub use aggregate::{YearCount, count_by_year};
pub use axis::AxisField;
pub use dataset::{Dataset, Extent};
pub use earth::{ComparisonParameter, ComparisonRow, RefRange, comparison_rows};
pub use error::{CoreError, Result};
pub use filter::{FilterConfig, FilterParam, FilterState, Predicate, SliderSpec, Threshold};
pub use normalize::{ParseDegradation, RawRow, normalize, normalize_with_report};
pub use record::{Column, NumericField, PlanetRecord};
pub use table::{Loaded, Table, load_path, load_str};
