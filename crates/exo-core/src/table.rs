#![forbid(unsafe_code)]

//! Source table reading and the one-shot dataset load.
//!
//! Supports the CSV subset the catalog exports use:
//! - comma-separated fields, LF or CRLF line endings
//! - double-quoted fields with `""` escapes and embedded newlines
//! - `#` comment lines ahead of the header row
//! - a leading byte-order mark
//!
//! Only the schema columns survive into [`RawRow`]s; every other column is
//! dropped before normalization.

use std::iter::Peekable;
use std::path::Path;
use std::str::Chars;

use crate::dataset::Dataset;
use crate::error::{CoreError, Result};
use crate::normalize::{RawRow, normalize_with_report};
use crate::record::Column;

// ---------------------------------------------------------------------------
// Table
// ---------------------------------------------------------------------------

/// A parsed table: header row plus data rows, cells as text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    header: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Table {
    /// Split `input` into header and rows.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Table`] when there is no header row or a quoted
    /// field is never closed.
    pub fn parse(input: &str) -> Result<Self> {
        let input = input.strip_prefix('\u{feff}').unwrap_or(input);
        let mut records = TableParser::new(input).parse()?.into_iter();
        let header = records.next().ok_or_else(|| CoreError::Table {
            line: 1,
            message: "no header row".into(),
        })?;
        Ok(Self {
            header: header.into_iter().map(|h| h.trim().to_owned()).collect(),
            rows: records.collect(),
        })
    }

    pub fn header(&self) -> &[String] {
        &self.header
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Schema columns present in the header, with their positions.
    pub fn schema_positions(&self) -> Vec<(Column, usize)> {
        Column::ALL
            .into_iter()
            .filter_map(|c| self.header.iter().position(|h| h == c.header()).map(|i| (c, i)))
            .collect()
    }

    /// Schema columns the header lacks.
    pub fn missing_columns(&self) -> Vec<Column> {
        Column::ALL
            .into_iter()
            .filter(|c| !self.header.iter().any(|h| h == c.header()))
            .collect()
    }

    /// Data rows restricted to the schema columns.
    ///
    /// Short rows simply lack the trailing cells.
    pub fn raw_rows(&self) -> impl Iterator<Item = RawRow> + '_ {
        let positions = self.schema_positions();
        self.rows.iter().map(move |row| {
            positions
                .iter()
                .filter_map(|(column, idx)| {
                    row.get(*idx)
                        .map(|cell| (column.header().to_owned(), cell.clone()))
                })
                .collect()
        })
    }
}

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

/// Outcome of a dataset load.
#[derive(Debug, Clone)]
pub struct Loaded {
    pub dataset: Dataset,
    /// Data rows read from the table.
    pub rows: usize,
    /// Numeric cells that were present but degraded to `None`.
    pub degraded_cells: usize,
    /// Schema columns absent from the header.
    pub missing_columns: Vec<Column>,
}

/// Parse, normalize and store the table in `input`.
pub fn load_str(input: &str) -> Result<Loaded> {
    let table = Table::parse(input)?;
    let missing_columns = table.missing_columns();
    let mut degraded_cells = 0;
    let mut records = Vec::with_capacity(table.len());

    for raw in table.raw_rows() {
        let (record, issues) = normalize_with_report(&raw);
        #[cfg(feature = "tracing")]
        for issue in &issues {
            tracing::trace!(
                column = %issue.column,
                raw = %issue.raw,
                planet = record.name(),
                "numeric cell degraded to null"
            );
        }
        degraded_cells += issues.len();
        records.push(record);
    }

    #[cfg(feature = "tracing")]
    tracing::debug!(
        rows = table.len(),
        degraded_cells,
        missing_columns = missing_columns.len(),
        "table normalized"
    );

    Ok(Loaded {
        dataset: Dataset::load(records),
        rows: table.len(),
        degraded_cells,
        missing_columns,
    })
}

/// Read and load the table at `path`.
///
/// Bytes that are not valid UTF-8 are replaced with U+FFFD; a stray
/// Latin-1 byte costs one character, never the load.
pub fn load_path(path: impl AsRef<Path>) -> Result<Loaded> {
    let bytes = std::fs::read(path.as_ref())?;
    let text = String::from_utf8_lossy(&bytes);
    #[cfg(feature = "tracing")]
    if matches!(text, std::borrow::Cow::Owned(_)) {
        tracing::warn!(
            path = %path.as_ref().display(),
            "source table is not valid UTF-8; invalid bytes replaced"
        );
    }
    load_str(&text)
}

// ---------------------------------------------------------------------------
// Internal parser
// ---------------------------------------------------------------------------

struct TableParser<'a> {
    chars: Peekable<Chars<'a>>,
    line: usize,
    records: Vec<Vec<String>>,
    record: Vec<String>,
    field: String,
    quoted: bool,
}

impl<'a> TableParser<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            chars: input.chars().peekable(),
            line: 1,
            records: Vec::new(),
            record: Vec::new(),
            field: String::new(),
            quoted: false,
        }
    }

    fn parse(mut self) -> Result<Vec<Vec<String>>> {
        while let Some(c) = self.chars.next() {
            let at_record_start = self.record.is_empty() && self.field.is_empty() && !self.quoted;
            match c {
                '#' if at_record_start && self.records.is_empty() => self.skip_line(),
                '"' if self.field.is_empty() && !self.quoted => self.read_quoted()?,
                ',' => self.end_field(),
                '\r' => {}
                '\n' => {
                    self.end_record();
                    self.line += 1;
                }
                other => self.field.push(other),
            }
        }
        if !self.field.is_empty() || !self.record.is_empty() || self.quoted {
            self.end_record();
        }
        Ok(self.records)
    }

    fn skip_line(&mut self) {
        for c in self.chars.by_ref() {
            if c == '\n' {
                self.line += 1;
                break;
            }
        }
    }

    fn read_quoted(&mut self) -> Result<()> {
        let start_line = self.line;
        self.quoted = true;
        loop {
            match self.chars.next() {
                Some('"') => {
                    if self.chars.peek() == Some(&'"') {
                        self.chars.next();
                        self.field.push('"');
                    } else {
                        return Ok(());
                    }
                }
                Some(c) => {
                    if c == '\n' {
                        self.line += 1;
                    }
                    self.field.push(c);
                }
                None => {
                    return Err(CoreError::Table {
                        line: start_line,
                        message: "unterminated quoted field".into(),
                    });
                }
            }
        }
    }

    fn end_field(&mut self) {
        self.record.push(std::mem::take(&mut self.field));
        self.quoted = false;
    }

    fn end_record(&mut self) {
        let was_quoted = self.quoted;
        self.end_field();
        let blank = !was_quoted && self.record.len() == 1 && self.record[0].is_empty();
        let record = std::mem::take(&mut self.record);
        if !blank {
            self.records.push(record);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
# This file was produced by the catalog export
# COLUMN pl_name: Planet Name
pl_name,hostname,disc_year,pl_eqt,pl_orbeccen,sy_dist,st_mass,st_rad,pl_orbsmax,pl_radj
TOI-700 d,TOI-700,2020,269,0.032,31.1265,0.42,0.42,0.1633,0.104
\"WASP-126 b\",WASP-126,2019,1480,,233.1,1.12,1.27,0.0449,0.96
LHS 3844 b,LHS 3844,2018,805,NaN,14.8864,0.15,0.19,0.00623,0.116
";

    #[test]
    fn parses_header_and_rows_after_comments() {
        let table = Table::parse(SAMPLE).unwrap();
        assert_eq!(table.header()[0], "pl_name");
        assert_eq!(table.header().len(), 10);
        assert_eq!(table.len(), 3);
        assert_eq!(table.rows()[1][0], "WASP-126 b");
        assert!(table.missing_columns().is_empty());
    }

    #[test]
    fn raw_rows_drop_non_schema_columns() {
        let table = Table::parse(SAMPLE).unwrap();
        let first = table.raw_rows().next().unwrap();
        assert_eq!(first.len(), Column::ALL.len());
        assert!(!first.contains_key("hostname"));
        assert_eq!(first["pl_eqt"], "269");
    }

    #[test]
    fn quoted_fields_keep_commas_quotes_and_newlines() {
        let input = "pl_name,disc_year\r\n\"Kepler \"\"odd\"\", b\",2019\r\n\"multi\nline\",2020\r\n";
        let table = Table::parse(input).unwrap();
        assert_eq!(table.rows()[0][0], "Kepler \"odd\", b");
        assert_eq!(table.rows()[0][1], "2019");
        assert_eq!(table.rows()[1][0], "multi\nline");
    }

    #[test]
    fn blank_lines_and_bom_are_skipped() {
        let input = "\u{feff}pl_name,disc_year\n\nA,2020\n\nB,2021";
        let table = Table::parse(input).unwrap();
        assert_eq!(table.header()[0], "pl_name");
        assert_eq!(table.len(), 2);
        assert_eq!(table.rows()[1], vec!["B".to_owned(), "2021".to_owned()]);
    }

    #[test]
    fn short_rows_lack_trailing_cells() {
        let table = Table::parse("pl_name,disc_year,pl_eqt\nA,2020\n").unwrap();
        let raw = table.raw_rows().next().unwrap();
        assert_eq!(raw.get("disc_year").map(String::as_str), Some("2020"));
        assert!(!raw.contains_key("pl_eqt"));
    }

    #[test]
    fn unterminated_quote_is_an_error() {
        let err = Table::parse("pl_name\n\"open\n").unwrap_err();
        assert!(matches!(err, CoreError::Table { line: 2, .. }));
    }

    #[test]
    fn empty_input_has_no_header() {
        assert!(matches!(
            Table::parse("# only a comment\n"),
            Err(CoreError::Table { line: 1, .. })
        ));
    }

    #[test]
    fn missing_schema_columns_are_reported() {
        let table = Table::parse("pl_name,disc_year\nA,2020\n").unwrap();
        let missing = table.missing_columns();
        assert_eq!(missing.len(), Column::ALL.len() - 2);
        assert!(missing.contains(&Column::StellarMass));
    }

    #[test]
    fn load_str_sorts_and_counts_degradations() {
        let input = "pl_name,disc_year,pl_eqt\nlate,2021,300\nearly,2018,oops\nnone,,\n";
        let loaded = load_str(input).unwrap();
        assert_eq!(loaded.rows, 3);
        assert_eq!(loaded.degraded_cells, 1);
        let names: Vec<_> = loaded.dataset.records().iter().map(|r| r.name()).collect();
        assert_eq!(names, vec!["early", "late", "none"]);
        assert_eq!(loaded.missing_columns.len(), Column::ALL.len() - 3);
    }

    #[test]
    fn load_sample_dataset() {
        let loaded = load_str(SAMPLE).unwrap();
        assert_eq!(loaded.dataset.len(), 3);
        assert_eq!(loaded.degraded_cells, 0);
        assert_eq!(loaded.dataset.year_range(), Some((2018, 2020)));
    }
}
