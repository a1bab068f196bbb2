// crates/load-gate-core/src/core/dataset.rs
// ============================================================================
// Module: Per-User Dataset
// Description: Delimited tabular dataset parsed from submission text.
// Purpose: Provide cleaned columns and rows for cross-reference validation.
// Dependencies: std
// ============================================================================

//! ## Overview
//! The dataset carries one row of input data per virtual user. Parsing is a
//! pure function of the submitted text and is deliberately forgiving: columns
//! are always extracted on a best-effort basis so the validation report can
//! list them even when the dataset itself fails its structural check. The raw
//! text, not this parsed form, is what gets persisted; execution re-parses it.
//!
//! Fields may be double-quoted with `""` escapes. Quoted fields do not span
//! lines; an unterminated quote consumes the remainder of its line.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;

// ============================================================================
// SECTION: Dataset
// ============================================================================

/// Parsed per-user dataset.
///
/// # Invariants
/// - `columns` holds trimmed, non-empty header names in header order.
/// - `rows` holds only rows with at least one non-empty cell; keys and values
///   are trimmed.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Dataset {
    /// Whether the source text contained a header line at all.
    has_header_line: bool,
    /// Cleaned column names in header order.
    columns: Vec<String>,
    /// Data rows mapped column name to cell value.
    rows: Vec<BTreeMap<String, String>>,
}

impl Dataset {
    /// Parses dataset text. Never fails; structural violations are reported by
    /// [`crate::runtime::validator::check_dataset`].
    #[must_use]
    pub fn parse(text: &str) -> Self {
        let mut lines = text.lines();
        let Some(header_line) = lines.next().filter(|line| !line.trim().is_empty()) else {
            return Self::default();
        };
        let headers: Vec<String> =
            split_record(header_line).into_iter().map(|cell| cell.trim().to_string()).collect();
        let columns: Vec<String> =
            headers.iter().filter(|name| !name.is_empty()).cloned().collect();

        let mut rows = Vec::new();
        for line in lines {
            let cells = split_record(line);
            if !cells.iter().any(|cell| !cell.trim().is_empty()) {
                continue;
            }
            let mut row = BTreeMap::new();
            for (name, cell) in headers.iter().zip(cells.iter()) {
                if name.is_empty() {
                    continue;
                }
                row.insert(name.clone(), cell.trim().to_string());
            }
            rows.push(row);
        }

        Self {
            has_header_line: true,
            columns,
            rows,
        }
    }

    /// Returns true when the source text contained a header line.
    #[must_use]
    pub const fn has_header_line(&self) -> bool {
        self.has_header_line
    }

    /// Returns the cleaned column names in header order.
    #[must_use]
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Returns the data rows in source order.
    #[must_use]
    pub fn rows(&self) -> &[BTreeMap<String, String>] {
        &self.rows
    }
}

// ============================================================================
// SECTION: Record Splitting
// ============================================================================

/// Splits one delimited record into cells, honoring double quotes.
fn split_record(line: &str) -> Vec<String> {
    let mut cells = Vec::new();
    let mut cell = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();
    while let Some(ch) = chars.next() {
        match ch {
            '"' if in_quotes => {
                if chars.peek() == Some(&'"') {
                    cell.push('"');
                    let _ = chars.next();
                } else {
                    in_quotes = false;
                }
            }
            '"' => in_quotes = true,
            ',' if !in_quotes => {
                cells.push(std::mem::take(&mut cell));
            }
            _ => cell.push(ch),
        }
    }
    cells.push(cell);
    cells
}

// ============================================================================
// SECTION: Tests
// ============================================================================
