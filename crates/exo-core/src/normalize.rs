#![forbid(unsafe_code)]

//! Record normalization at the table boundary.
//!
//! Every numeric cell goes through the same rule: trim, treat empty and
//! `nan` (any case) as missing, parse as a decimal number, and drop anything
//! that fails to parse or is not finite. Normalization never fails; a bad
//! cell costs one value, never the row and never the load.

use std::collections::HashMap;

use crate::record::{Column, NumericField, PlanetRecord};

/// Raw row as read from the source table: column header to cell text.
pub type RawRow = HashMap<String, String>;

/// A present cell that could not be kept as a number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseDegradation {
    pub column: Column,
    pub raw: String,
}

/// Classification of a single numeric cell.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NumericCell {
    /// Empty or an explicit `nan` marker.
    Missing,
    Value(f64),
    /// Present but unparseable or non-finite.
    Invalid,
}

/// Classify a raw numeric cell.
pub fn classify(raw: &str) -> NumericCell {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("nan") {
        return NumericCell::Missing;
    }
    match trimmed.parse::<f64>() {
        Ok(v) if v.is_finite() => NumericCell::Value(v),
        _ => NumericCell::Invalid,
    }
}

/// Parse a raw numeric cell, `None` for anything that is not a finite number.
pub fn parse_numeric(raw: &str) -> Option<f64> {
    match classify(raw) {
        NumericCell::Value(v) => Some(v),
        NumericCell::Missing | NumericCell::Invalid => None,
    }
}

/// Convert a raw row into a [`PlanetRecord`].
///
/// Columns outside the schema are ignored. A missing name becomes the empty
/// string.
pub fn normalize(row: &RawRow) -> PlanetRecord {
    normalize_with_report(row).0
}

/// Like [`normalize`], also returning the cells that degraded to `None`.
///
/// Missing cells (empty, `nan`, absent) are not degradations.
pub fn normalize_with_report(row: &RawRow) -> (PlanetRecord, Vec<ParseDegradation>) {
    let name = row.get(Column::Name.header()).cloned().unwrap_or_default();
    let mut record = PlanetRecord::new(name);
    let mut degraded = Vec::new();

    for field in NumericField::ALL {
        let column = field.column();
        let Some(raw) = row.get(column.header()) else {
            continue;
        };
        let kept = match classify(raw) {
            NumericCell::Missing => true,
            NumericCell::Value(v) => record.set(field, Some(v)),
            NumericCell::Invalid => false,
        };
        if !kept {
            degraded.push(ParseDegradation {
                column,
                raw: raw.clone(),
            });
        }
    }

    (record, degraded)
}
