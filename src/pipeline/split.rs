//! Splitting multi-valued categorical columns into indicator columns
//!
//! A survey answer such as `"1,3"` (morning and evening sightings) becomes one
//! 0/1 column per known code. Codes outside the value/label map are ignored.

use indexmap::IndexMap;
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::cell::{cells_of, render_number, Cell};
use super::error::{PrepError, PrepResult};

/// Raw category token -> output column name. Iteration order is output order.
pub type ValueLabelMap = IndexMap<String, String>;

/// One column to split and the indicator columns to create from it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SplitInstruction {
    #[serde(alias = "variable_name")]
    pub column: String,
    pub values_and_labels: ValueLabelMap,
}

impl SplitInstruction {
    pub fn new(column: impl Into<String>, values_and_labels: ValueLabelMap) -> Self {
        Self {
            column: column.into(),
            values_and_labels,
        }
    }
}

/// Break a cell into category tokens.
///
/// Text longer than one character is split on commas (tokens keep their
/// surrounding whitespace). Numbers and single characters are one token.
/// Missing cells have no tokens.
pub fn tokenize(cell: &Cell) -> Vec<String> {
    match cell {
        Cell::Missing => Vec::new(),
        Cell::Number(v) => vec![render_number(*v)],
        Cell::Text(s) if s.chars().count() > 1 => s.split(',').map(str::to_string).collect(),
        Cell::Text(s) => vec![s.clone()],
    }
}

/// Split one column into binary indicator columns.
///
/// The result has the same height as `values` and one Int32 column per map
/// entry, named by the map values in map order.
pub fn split_categorical(values: &Column, labels: &ValueLabelMap) -> PrepResult<DataFrame> {
    let cells = cells_of(values);
    let mut indicators: Vec<Vec<i32>> = vec![vec![0; cells.len()]; labels.len()];

    for (row, cell) in cells.iter().enumerate() {
        let tokens = tokenize(cell);
        if tokens.is_empty() {
            continue;
        }
        for (slot, key) in labels.keys().enumerate() {
            if tokens.iter().any(|t| t == key) {
                indicators[slot][row] = 1;
            }
        }
    }

    let mut columns: Vec<Column> = Vec::with_capacity(labels.len());
    for (label, flags) in labels.values().zip(indicators) {
        if columns.iter().any(|c| c.name().as_str() == label.as_str()) {
            return Err(PrepError::DuplicateColumn(label.clone()));
        }
        columns.push(Column::new(label.as_str().into(), flags));
    }

    Ok(DataFrame::new(columns)?)
}

/// Apply every split instruction in order.
///
/// Each split column is dropped and its indicator columns are appended at the
/// end of the frame.
pub fn split_columns(df: &DataFrame, table: &[SplitInstruction]) -> PrepResult<DataFrame> {
    let mut out = df.clone();

    for instruction in table {
        let source = out
            .column(&instruction.column)
            .map_err(|_| PrepError::ColumnNotFound(instruction.column.clone()))?
            .clone();

        let indicators = split_categorical(&source, &instruction.values_and_labels)?;
        out = out.drop(&instruction.column)?;

        for name in indicators.get_column_names() {
            if out.get_column_index(name.as_str()).is_some() {
                return Err(PrepError::DuplicateColumn(name.to_string()));
            }
        }

        out = if out.width() == 0 {
            indicators
        } else {
            out.hstack(indicators.get_columns())?
        };

        debug!(
            column = %instruction.column,
            indicators = instruction.values_and_labels.len(),
            "split categorical column"
        );
    }

    Ok(out)
}
