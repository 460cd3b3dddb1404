//! Normalization of free-text values against a lookup table
//!
//! The lookup is built from a wide table: the first column holds the raw
//! string as recorded in the survey, every following column holds one
//! candidate replacement (`replacement_1` .. `replacement_10` in the usual
//! layout). A raw string that names several things ("Vermillion and Gila")
//! maps to several normalized strings, and each matching row is copied once
//! per normalized string.

use std::collections::HashSet;

use indexmap::IndexMap;
use polars::prelude::*;
use tracing::{debug, warn};

use super::cell::{cells_of, column_cells};
use super::error::{PrepError, PrepResult};

/// Column names of the long-form lookup table
pub const RAWSTRING_COLUMN: &str = "rawstring";
pub const NORMALIZED_COLUMN: &str = "normalized";

/// Case-insensitive mapping from raw strings to their normalized forms
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LookupTable {
    entries: IndexMap<String, Vec<String>>,
}

impl LookupTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a normalized form for a raw string.
    ///
    /// The raw string is lowercased. Repeating a normalized form for the same
    /// key has no effect.
    pub fn insert(&mut self, raw: &str, normalized: impl Into<String>) {
        let normalized = normalized.into();
        let forms = self.entries.entry(raw.to_lowercase()).or_default();
        if !forms.contains(&normalized) {
            forms.push(normalized);
        }
    }

    /// Normalized forms for a raw string, in table order
    pub fn get(&self, raw: &str) -> Option<&[String]> {
        self.entries
            .get(&raw.to_lowercase())
            .map(Vec::as_slice)
            .filter(|forms| !forms.is_empty())
    }

    /// Number of distinct raw strings
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All (rawstring, normalized) pairs in table order
    pub fn pairs(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .flat_map(|(raw, forms)| forms.iter().map(move |n| (raw.as_str(), n.as_str())))
    }

    /// Long-form table with columns `rawstring` and `normalized`
    pub fn to_frame(&self) -> PrepResult<DataFrame> {
        let (raw, normalized): (Vec<&str>, Vec<&str>) = self.pairs().unzip();
        Ok(DataFrame::new(vec![
            Column::new(RAWSTRING_COLUMN.into(), raw),
            Column::new(NORMALIZED_COLUMN.into(), normalized),
        ])?)
    }
}

/// Build a lookup table from a wide normalization table.
///
/// Raw strings are lowercased before de-duplication, so `"GHA"` and `"gha"`
/// are the same key and the first row wins. Missing replacement slots are
/// skipped, as are rows without a raw string.
pub fn build_lookup(wide: &DataFrame) -> PrepResult<LookupTable> {
    if wide.width() < 2 {
        return Err(PrepError::malformed(
            "normalization table",
            format!(
                "expected a raw string column and at least one replacement column, found {} column(s)",
                wide.width()
            ),
        ));
    }

    let columns = wide.get_columns();
    let raw_cells = cells_of(&columns[0]);
    let slots: Vec<_> = columns[1..].iter().map(cells_of).collect();

    let mut lookup = LookupTable::new();
    let mut seen: HashSet<String> = HashSet::new();

    for (row, raw) in raw_cells.iter().enumerate() {
        let Some(key) = raw.lookup_key() else {
            continue;
        };
        if !seen.insert(key.clone()) {
            debug!(rawstring = %key, row, "duplicate raw string in normalization table, keeping first");
            continue;
        }
        for slot in &slots {
            if let Some(normalized) = slot[row].render() {
                lookup.insert(&key, normalized);
            }
        }
    }

    Ok(lookup)
}

/// Result of normalizing one column
#[derive(Debug, Clone)]
pub struct NormalizeOutcome {
    pub frame: DataFrame,
    /// Raw values without a lookup entry, in the order they were met
    pub unmatched: Vec<String>,
}

/// Replace the values of `column` by their normalized forms.
///
/// A row whose value maps to k normalized strings is emitted k times in a
/// row, once per normalized string. A row without a match is kept with its
/// original value and reported. The target column comes back as a String
/// column.
pub fn normalize_column(
    df: &DataFrame,
    lookup: &LookupTable,
    column: &str,
) -> PrepResult<NormalizeOutcome> {
    let cells = column_cells(df, column)?;

    let mut rows: Vec<IdxSize> = Vec::with_capacity(cells.len());
    let mut values: Vec<Option<String>> = Vec::with_capacity(cells.len());
    let mut unmatched = Vec::new();

    for (row, cell) in cells.iter().enumerate() {
        match cell.lookup_key().and_then(|key| lookup.get(&key)) {
            Some(forms) => {
                for form in forms {
                    rows.push(row as IdxSize);
                    values.push(Some(form.clone()));
                }
            }
            None => {
                warn!(
                    column,
                    row,
                    value = %cell,
                    "No entry found in normalization table, keeping original value"
                );
                unmatched.push(cell.to_string());
                rows.push(row as IdxSize);
                values.push(cell.render());
            }
        }
    }

    let indices = IdxCa::from_vec("rows".into(), rows);
    let mut frame = df.take(&indices)?;
    frame.with_column(Column::new(column.into(), values))?;

    debug!(
        column,
        rows_in = df.height(),
        rows_out = frame.height(),
        unmatched = unmatched.len(),
        "normalized column"
    );

    Ok(NormalizeOutcome { frame, unmatched })
}
