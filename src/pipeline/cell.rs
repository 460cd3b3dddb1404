//! Dynamic cell values read from a DataFrame
//!
//! Survey columns mix numbers, free text and gaps. Every step reads cells
//! through [`Cell`] so that nulls and float NaN collapse into one missing
//! sentinel, while text such as `""` or `"nan"` stays text.

use std::fmt;

use polars::prelude::*;

use super::error::{PrepError, PrepResult};

/// A single dataset value
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Number(f64),
    Text(String),
    Missing,
}

impl Cell {
    pub fn is_missing(&self) -> bool {
        matches!(self, Cell::Missing)
    }

    /// Textual form of the value, `None` when missing.
    ///
    /// Integral numbers render without a fractional part so that a numeric
    /// `3.0` matches the token `"3"`.
    pub fn render(&self) -> Option<String> {
        match self {
            Cell::Number(v) => Some(render_number(*v)),
            Cell::Text(s) => Some(s.clone()),
            Cell::Missing => None,
        }
    }

    /// Lowercased text used for case-insensitive lookups
    pub fn lookup_key(&self) -> Option<String> {
        self.render().map(|s| s.to_lowercase())
    }

    /// Numeric value, parsing text when it holds a number.
    ///
    /// Returns `Ok(None)` for missing cells and an error for text that is not
    /// a number.
    pub fn as_number(&self, column: &str, row: usize) -> PrepResult<Option<f64>> {
        match self {
            Cell::Number(v) => Ok(Some(*v)),
            Cell::Missing => Ok(None),
            Cell::Text(s) => match s.trim().parse::<f64>() {
                Ok(v) if v.is_nan() => Ok(None),
                Ok(v) => Ok(Some(v)),
                Err(_) => Err(PrepError::NonNumeric {
                    column: column.to_string(),
                    value: s.clone(),
                    row,
                }),
            },
        }
    }
}

impl From<AnyValue<'_>> for Cell {
    fn from(value: AnyValue<'_>) -> Self {
        match value {
            AnyValue::Null => Cell::Missing,
            AnyValue::Boolean(b) => Cell::Number(if b { 1.0 } else { 0.0 }),
            AnyValue::String(s) => Cell::Text(s.to_string()),
            AnyValue::StringOwned(s) => Cell::Text(s.to_string()),
            AnyValue::List(series) => {
                // List cells behave like their comma-joined text
                let tokens: Vec<String> = series
                    .iter()
                    .filter_map(|v| Cell::from(v).render())
                    .collect();
                Cell::Text(tokens.join(","))
            }
            other => match other.extract::<f64>() {
                Some(v) if v.is_nan() => Cell::Missing,
                Some(v) => Cell::Number(v),
                None => Cell::Text(other.to_string()),
            },
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.render() {
            Some(s) => write!(f, "{}", s),
            None => write!(f, "NaN"),
        }
    }
}

/// Render a number the way survey codes are written
pub fn render_number(v: f64) -> String {
    if v.is_finite() && v.fract() == 0.0 && v.abs() < 1e15 {
        format!("{}", v as i64)
    } else {
        format!("{}", v)
    }
}

/// Read a column of the DataFrame as cells
pub fn column_cells(df: &DataFrame, name: &str) -> PrepResult<Vec<Cell>> {
    let column = df
        .column(name)
        .map_err(|_| PrepError::ColumnNotFound(name.to_string()))?;

    Ok(cells_of(column))
}

/// Convert any column to cells, in row order
///
/// Frames read from files or stacked together hold several chunks; the
/// series is rechunked before iterating.
pub fn cells_of(column: &Column) -> Vec<Cell> {
    column
        .as_materialized_series()
        .rechunk()
        .iter()
        .map(Cell::from)
        .collect()
}
