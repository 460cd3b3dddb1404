//! Error types for the data preparation steps.
//!
//! Only hard failures live here. Unmatched split tokens and unmatched
//! normalization values are not errors: the first are ignored, the second are
//! reported through `tracing` and passed through unchanged.

use polars::prelude::PolarsError;
use thiserror::Error;

/// Errors raised by the split, normalize, remap and aggregate steps.
#[derive(Debug, Error)]
pub enum PrepError {
    /// A step referenced a column that is not in the dataset.
    #[error("Column '{0}' not found in dataset")]
    ColumnNotFound(String),

    /// A step would create a column whose name is already taken.
    #[error("Column '{0}' already exists in dataset")]
    DuplicateColumn(String),

    /// An instruction or lookup table does not have the expected shape.
    #[error("Malformed {table}: {reason}")]
    MalformedTable {
        /// Which table was rejected (e.g. "normalization table")
        table: String,
        /// What was wrong with it
        reason: String,
    },

    /// A value has no entry in the category group map.
    #[error("Unmapped category '{value}' in column '{column}' at row {row}")]
    UnmappedCategory {
        column: String,
        value: String,
        /// Zero-based row position in the dataset handed to the remapper
        row: usize,
    },

    /// An aggregation instruction names a function that does not exist.
    #[error(
        "Unsupported aggregation function '{0}'. Use one of: mean, median, max, min, dummy, one, two, three, four, five, six"
    )]
    UnsupportedAggregation(String),

    /// A numeric reduction met text that does not parse as a number.
    #[error("Column '{column}' holds non-numeric value '{value}' at row {row}")]
    NonNumeric {
        column: String,
        value: String,
        row: usize,
    },

    #[error(transparent)]
    Polars(#[from] PolarsError),
}

impl PrepError {
    pub(crate) fn malformed(table: &str, reason: impl Into<String>) -> Self {
        PrepError::MalformedTable {
            table: table.to_string(),
            reason: reason.into(),
        }
    }
}

/// Result alias used across the pipeline modules.
pub type PrepResult<T> = Result<T, PrepError>;
