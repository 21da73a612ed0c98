// SPDX-License-Identifier: AGPL-3.0-or-later
//! Sovereign delimited-table parser — zero external parsing dependencies.
//!
//! Streams rows from disk via [`BufReader`]. Handles both plain and
//! gzip-compressed files (`.gz` extension, via `flate2::read::GzDecoder`).
//!
//! # Format
//!
//! One header line naming the columns, then one line per observation.
//! The delimiter is comma by default; [`parse_table_with`] accepts tab
//! or semicolon exports from spreadsheet tools. Fields are never quoted
//! in these datasets — a quote character in a field is a parse error
//! rather than a silently misaligned row.
//!
//! Parsed output is a [`Table`]: header index plus row storage with
//! typed field accessors that report the offending row and column on
//! failure.

use crate::error::{Error, Result};
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// A parsed delimited table: header plus row-major field storage.
#[derive(Debug, Clone)]
pub struct Table {
    /// Column name -> column index.
    columns: HashMap<String, usize>,
    /// Column names in file order.
    header: Vec<String>,
    /// Row-major field storage; every row has `header.len()` fields.
    rows: Vec<Vec<String>>,
}

impl Table {
    /// Number of data rows (header excluded).
    #[must_use]
    pub fn n_rows(&self) -> usize {
        self.rows.len()
    }

    /// Column names in file order.
    #[must_use]
    pub fn header(&self) -> &[String] {
        &self.header
    }

    /// Whether the table has a column of the given name.
    #[must_use]
    pub fn has_column(&self, name: &str) -> bool {
        self.columns.contains_key(name)
    }

    /// Raw string field at (`row`, `column`).
    ///
    /// # Errors
    ///
    /// [`Error::Table`] if the column is unknown or the row is out of
    /// range.
    pub fn field(&self, row: usize, column: &str) -> Result<&str> {
        let &col = self
            .columns
            .get(column)
            .ok_or_else(|| Error::Table(format!("no column '{column}'")))?;
        let fields = self
            .rows
            .get(row)
            .ok_or_else(|| Error::Table(format!("row {row} out of range")))?;
        Ok(fields[col].as_str())
    }

    /// Field parsed as `f64`.
    ///
    /// # Errors
    ///
    /// [`Error::Table`] on unknown column, out-of-range row, or a field
    /// that does not parse as a number.
    pub fn f64_field(&self, row: usize, column: &str) -> Result<f64> {
        let raw = self.field(row, column)?;
        raw.parse().map_err(|_| {
            Error::Table(format!("row {}, column '{column}': '{raw}' is not a number", row + 2))
        })
    }

    /// Field parsed as `i32` (log10 dilution exponents).
    ///
    /// # Errors
    ///
    /// [`Error::Table`] on unknown column, out-of-range row, or a field
    /// that does not parse as a signed integer.
    pub fn i32_field(&self, row: usize, column: &str) -> Result<i32> {
        let raw = self.field(row, column)?;
        raw.parse().map_err(|_| {
            Error::Table(format!(
                "row {}, column '{column}': '{raw}' is not an integer",
                row + 2
            ))
        })
    }

    /// Field parsed as `u32` (replicate block identifiers).
    ///
    /// # Errors
    ///
    /// [`Error::Table`] on unknown column, out-of-range row, or a field
    /// that does not parse as an unsigned integer.
    pub fn u32_field(&self, row: usize, column: &str) -> Result<u32> {
        let raw = self.field(row, column)?;
        raw.parse().map_err(|_| {
            Error::Table(format!(
                "row {}, column '{column}': '{raw}' is not a positive integer",
                row + 2
            ))
        })
    }
}

/// Open a table file for buffered reading.
///
/// Detects gzip compression from the `.gz` file extension and wraps
/// the stream with [`flate2::read::GzDecoder`] when needed.
fn open_reader(path: &Path) -> Result<Box<dyn BufRead>> {
    let file = File::open(path).map_err(|e| Error::Io {
        path: path.to_path_buf(),
        source: e,
    })?;
    let ext = path
        .extension()
        .and_then(std::ffi::OsStr::to_str)
        .unwrap_or("");
    if ext.eq_ignore_ascii_case("gz") {
        let decoder = flate2::read::GzDecoder::new(file);
        Ok(Box::new(BufReader::new(decoder)))
    } else {
        Ok(Box::new(BufReader::new(file)))
    }
}

/// Split one line on `delimiter`, trimming field whitespace.
///
/// Rejects quote characters: these datasets never quote fields, so a
/// quote means the export format changed.
fn split_line(line: &str, delimiter: char, line_no: usize) -> Result<Vec<String>> {
    if line.contains('"') {
        return Err(Error::Table(format!(
            "line {line_no}: quoted fields are not supported"
        )));
    }
    Ok(line
        .trim_end_matches(['\n', '\r'])
        .split(delimiter)
        .map(|f| f.trim().to_string())
        .collect())
}

/// Parse a comma-delimited table file (plain or `.gz`).
///
/// # Errors
///
/// [`Error::Io`] if the file cannot be opened or read; [`Error::Table`]
/// for an empty file, duplicate column names, or a row whose field
/// count differs from the header.
pub fn parse_table(path: &Path) -> Result<Table> {
    parse_table_with(path, ',')
}

/// Parse a delimited table file with an explicit delimiter.
///
/// # Errors
///
/// Same as [`parse_table`].
pub fn parse_table_with(path: &Path, delimiter: char) -> Result<Table> {
    let reader = open_reader(path)?;
    let mut header: Vec<String> = Vec::new();
    let mut columns: HashMap<String, usize> = HashMap::new();
    let mut rows: Vec<Vec<String>> = Vec::new();

    for (idx, line) in reader.lines().enumerate() {
        let line = line.map_err(|e| Error::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        let line_no = idx + 1;
        if line.trim().is_empty() {
            continue;
        }
        let fields = split_line(&line, delimiter, line_no)?;
        if header.is_empty() {
            for (col, name) in fields.iter().enumerate() {
                if columns.insert(name.clone(), col).is_some() {
                    return Err(Error::Table(format!("duplicate column '{name}'")));
                }
            }
            header = fields;
        } else {
            if fields.len() != header.len() {
                return Err(Error::Table(format!(
                    "line {line_no}: {} fields, header has {}",
                    fields.len(),
                    header.len()
                )));
            }
            rows.push(fields);
        }
    }

    if header.is_empty() {
        return Err(Error::Table("empty file: no header line".into()));
    }

    Ok(Table {
        columns,
        header,
        rows,
    })
}
