#![forbid(unsafe_code)]

//! Header comparison between two catalog exports.
//!
//! Used when a new export lands: which columns appeared or vanished, and
//! does each file still carry every column the loader reads.

use std::collections::BTreeSet;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use exo_core::{Column, Result, Table};

/// Columns listed per side before eliding the rest.
const MAX_LISTED: usize = 80;
/// Cells shown per preview row.
const PREVIEW_CELLS: usize = 8;

/// Header summary of one file.
#[derive(Debug, Clone, PartialEq)]
pub struct FileSummary {
    pub path: PathBuf,
    pub columns: usize,
    /// Header row followed by up to `preview` data rows.
    pub preview: Vec<Vec<String>>,
    /// Schema columns the header lacks.
    pub missing: Vec<Column>,
}

impl FileSummary {
    fn new(path: &Path, table: &Table, preview: usize) -> Self {
        let mut rows = Vec::with_capacity(preview + 1);
        rows.push(table.header().to_vec());
        rows.extend(table.rows().iter().take(preview).cloned());
        Self {
            path: path.to_path_buf(),
            columns: table.header().len(),
            preview: rows,
            missing: table.missing_columns(),
        }
    }
}

/// Result of comparing two headers.
#[derive(Debug, Clone, PartialEq)]
pub struct HeaderReport {
    pub left: FileSummary,
    pub right: FileSummary,
    /// Sorted columns present only in the left file.
    pub only_left: Vec<String>,
    /// Sorted columns present only in the right file.
    pub only_right: Vec<String>,
    preview_rows: usize,
}

impl HeaderReport {
    /// Whether both files carry the full schema.
    pub fn both_loadable(&self) -> bool {
        self.left.missing.is_empty() && self.right.missing.is_empty()
    }
}

/// Compare two already-parsed tables.
pub fn compare(
    left_path: &Path,
    left: &Table,
    right_path: &Path,
    right: &Table,
    preview: usize,
) -> HeaderReport {
    let left_set: BTreeSet<&str> = left.header().iter().map(String::as_str).collect();
    let right_set: BTreeSet<&str> = right.header().iter().map(String::as_str).collect();
    HeaderReport {
        left: FileSummary::new(left_path, left, preview),
        right: FileSummary::new(right_path, right, preview),
        only_left: left_set
            .difference(&right_set)
            .map(|s| (*s).to_owned())
            .collect(),
        only_right: right_set
            .difference(&left_set)
            .map(|s| (*s).to_owned())
            .collect(),
        preview_rows: preview,
    }
}

/// Read and compare two files.
pub fn compare_files(left: &Path, right: &Path, preview: usize) -> Result<HeaderReport> {
    let left_table = Table::parse(&fs::read_to_string(left)?)?;
    let right_table = Table::parse(&fs::read_to_string(right)?)?;
    Ok(compare(left, &left_table, right, &right_table, preview))
}

fn write_only(f: &mut fmt::Formatter<'_>, side: usize, columns: &[String]) -> fmt::Result {
    writeln!(f, "Only in file {side} ({}):", columns.len())?;
    for column in columns.iter().take(MAX_LISTED) {
        writeln!(f, "  - {column}")?;
    }
    if columns.len() > MAX_LISTED {
        writeln!(f, "  ... ({} more)", columns.len() - MAX_LISTED)?;
    }
    writeln!(f)
}

fn write_preview(f: &mut fmt::Formatter<'_>, file: &FileSummary, rows: usize) -> fmt::Result {
    writeln!(f, "Preview: {} (header + {rows} rows)", file.path.display())?;
    for (i, row) in file.preview.iter().enumerate() {
        let first: Vec<&str> = row.iter().take(PREVIEW_CELLS).map(String::as_str).collect();
        writeln!(f, "  row[{i}]: cols={}  first_8={first:?}", row.len())?;
    }
    writeln!(f)
}

fn write_schema(f: &mut fmt::Formatter<'_>, side: usize, file: &FileSummary) -> fmt::Result {
    if file.missing.is_empty() {
        writeln!(f, "Schema: file {side} has every required column")
    } else {
        let names: Vec<&str> = file.missing.iter().map(|c| c.header()).collect();
        writeln!(f, "Schema: file {side} is missing {}", names.join(", "))
    }
}

impl fmt::Display for HeaderReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "File 1: {}  columns={}",
            self.left.path.display(),
            self.left.columns
        )?;
        writeln!(
            f,
            "File 2: {}  columns={}",
            self.right.path.display(),
            self.right.columns
        )?;
        writeln!(f)?;

        write_only(f, 1, &self.only_left)?;
        write_only(f, 2, &self.only_right)?;

        write_preview(f, &self.left, self.preview_rows)?;
        write_preview(f, &self.right, self.preview_rows)?;

        write_schema(f, 1, &self.left)?;
        write_schema(f, 2, &self.right)
    }
}
