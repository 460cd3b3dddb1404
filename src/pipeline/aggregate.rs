//! Aggregation of columns up to a grouping key
//!
//! Each instruction pairs a column with a reduction. Numeric reductions
//! (mean, median, max, min) skip missing values. The `one` .. `six`
//! reductions answer "did any row in the group record this code" with 1/0.
//! `dummy` one-hot encodes a column first and reduces every generated column
//! with `max`.

use std::fmt;
use std::str::FromStr;

use indexmap::IndexSet;
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::cell::{column_cells, Cell};
use super::error::{PrepError, PrepResult};

/// Reduction applied to one column within each group
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AggFunction {
    Mean,
    Median,
    Max,
    Min,
    /// One-hot encode, then reduce each generated column with `Max`
    Dummy,
    /// 1 if any row equals the code (1..=6), else 0
    Equals(u8),
}

const CODE_NAMES: [&str; 6] = ["one", "two", "three", "four", "five", "six"];

impl FromStr for AggFunction {
    type Err = PrepError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim().to_lowercase();
        match name.as_str() {
            "mean" => Ok(AggFunction::Mean),
            "median" => Ok(AggFunction::Median),
            "max" => Ok(AggFunction::Max),
            "min" => Ok(AggFunction::Min),
            "dummy" => Ok(AggFunction::Dummy),
            _ => CODE_NAMES
                .iter()
                .position(|code| *code == name)
                .map(|i| AggFunction::Equals(i as u8 + 1))
                .ok_or_else(|| PrepError::UnsupportedAggregation(s.to_string())),
        }
    }
}

impl fmt::Display for AggFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AggFunction::Mean => write!(f, "mean"),
            AggFunction::Median => write!(f, "median"),
            AggFunction::Max => write!(f, "max"),
            AggFunction::Min => write!(f, "min"),
            AggFunction::Dummy => write!(f, "dummy"),
            AggFunction::Equals(n) => match CODE_NAMES.get((*n as usize).wrapping_sub(1)) {
                Some(name) => write!(f, "{}", name),
                None => write!(f, "equals({})", n),
            },
        }
    }
}

impl AggFunction {
    /// Group aggregation expression over a Float64 column.
    ///
    /// Mean, median, max and min come back as Float64 and are null for a
    /// group without values. `Equals` comes back as Int32 0/1. `Dummy` is not
    /// a reduction on its own and is rejected.
    pub fn expr(&self, column: &str) -> PrepResult<Expr> {
        let values = col(column);
        let expr = match self {
            AggFunction::Mean => values.mean(),
            AggFunction::Median => values.median(),
            AggFunction::Max => values.max(),
            AggFunction::Min => values.min(),
            AggFunction::Equals(code) => values
                .eq(lit(f64::from(*code)))
                .any(true)
                .cast(DataType::Int32),
            AggFunction::Dummy => {
                return Err(PrepError::UnsupportedAggregation(self.to_string()));
            }
        };
        Ok(expr)
    }
}

/// One (column, function) aggregation instruction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AggregationInstruction {
    #[serde(alias = "variable")]
    pub column: String,
    #[serde(alias = "agg_function")]
    pub function: String,
}

impl AggregationInstruction {
    pub fn new(column: impl Into<String>, function: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            function: function.into(),
        }
    }

    /// Resolve the function name
    pub fn resolve(&self) -> PrepResult<AggFunction> {
        self.function.parse()
    }
}

/// Read `column` as Float64, parsing numeric text.
///
/// Numeric reductions reject text that is not a number. For the code
/// reductions such text simply never matches.
fn numeric_values(df: &DataFrame, column: &str, function: AggFunction) -> PrepResult<Column> {
    let values = column_cells(df, column)?
        .iter()
        .enumerate()
        .map(|(row, cell)| match function {
            AggFunction::Equals(_) => Ok(cell.as_number(column, row).unwrap_or(None)),
            _ => cell.as_number(column, row),
        })
        .collect::<PrepResult<Vec<Option<f64>>>>()?;

    Ok(Column::new(column.into(), values))
}

/// Rows that belong to a group: the key is neither null nor NaN
fn has_key(group_by: &str, dtype: &DataType) -> Expr {
    let present = col(group_by).is_not_null();
    if dtype.is_float() {
        present.and(col(group_by).is_not_nan())
    } else {
        present
    }
}

/// Reduce one column per group of `group_by`.
///
/// Returns the grouping column (first-appearance order, original dtype) and
/// the reduced column, named after `column`. Rows without a key are dropped.
pub fn aggregate_column(
    df: &DataFrame,
    group_by: &str,
    column: &str,
    function: AggFunction,
) -> PrepResult<DataFrame> {
    let key = df
        .column(group_by)
        .map_err(|_| PrepError::ColumnNotFound(group_by.to_string()))?
        .clone();
    if column == group_by {
        return Err(PrepError::DuplicateColumn(column.to_string()));
    }
    let expr = function.expr(column)?;
    let values = numeric_values(df, column, function)?;
    let predicate = has_key(group_by, key.dtype());

    let grouped = DataFrame::new(vec![key, values])?
        .lazy()
        .filter(predicate)
        .group_by_stable([col(group_by)])
        .agg([expr])
        .collect()?;

    Ok(grouped)
}

/// Distinct rendered values of a column, numbers first (ascending) then
/// text (lexicographic), with one 0/1 flag vector per value.
fn one_hot(name: &str, cells: &[Cell]) -> Vec<(String, Vec<i32>)> {
    let mut numbers: Vec<f64> = Vec::new();
    let mut texts: Vec<String> = Vec::new();
    for cell in cells {
        match cell {
            Cell::Number(v) if !numbers.contains(v) => numbers.push(*v),
            Cell::Text(s) if !texts.contains(s) => texts.push(s.clone()),
            _ => {}
        }
    }
    numbers.sort_by(|a, b| a.total_cmp(b));
    texts.sort();

    // A number and a text that render alike share one column
    let values: IndexSet<String> = numbers
        .into_iter()
        .filter_map(|v| Cell::Number(v).render())
        .chain(texts)
        .collect();

    let rendered: Vec<Option<String>> = cells.iter().map(Cell::render).collect();
    values
        .into_iter()
        .map(|value| {
            let flags = rendered
                .iter()
                .map(|r| i32::from(r.as_deref() == Some(value.as_str())))
                .collect();
            (format!("{}_{}", name, value), flags)
        })
        .collect()
}

/// One-hot encode columns.
///
/// Returns only the generated Int32 columns, named `<column>_<value>`. Values
/// are ordered numbers first (ascending), then text (lexicographic). Missing
/// values get no column.
pub fn dummy_encode(df: &DataFrame, columns: &[String]) -> PrepResult<DataFrame> {
    let mut encoded: Vec<Column> = Vec::new();

    for name in columns {
        let cells = column_cells(df, name)?;
        for (label, flags) in one_hot(name, &cells) {
            if df.get_column_index(&label).is_some()
                || encoded.iter().any(|c| c.name().as_str() == label)
            {
                return Err(PrepError::DuplicateColumn(label));
            }
            encoded.push(Column::new(label.into(), flags));
        }
    }

    Ok(DataFrame::new(encoded)?)
}

/// Aggregate the dataset to one row per distinct value of `group_by`.
///
/// The output holds the grouping column (first-appearance order, original
/// dtype) followed by one column per instruction, named after the aggregated
/// column. Per-instruction results are inner-joined on the group key. Rows
/// whose key is missing are dropped.
pub fn aggregate(
    df: &DataFrame,
    group_by: &str,
    instructions: &[AggregationInstruction],
) -> PrepResult<DataFrame> {
    let resolved = instructions
        .iter()
        .map(|instruction| Ok((instruction.column.clone(), instruction.resolve()?)))
        .collect::<PrepResult<Vec<(String, AggFunction)>>>()?;

    let key_dtype = df
        .column(group_by)
        .map_err(|_| PrepError::ColumnNotFound(group_by.to_string()))?
        .dtype()
        .clone();

    let dummy_columns: Vec<String> = resolved
        .iter()
        .filter(|(_, function)| *function == AggFunction::Dummy)
        .map(|(column, _)| column.clone())
        .collect::<IndexSet<_>>()
        .into_iter()
        .collect();

    let mut plan: Vec<(String, AggFunction)> = resolved
        .into_iter()
        .filter(|(column, _)| !dummy_columns.contains(column))
        .collect();

    let mut data = df.clone();
    if !dummy_columns.is_empty() {
        let dummies = dummy_encode(df, &dummy_columns)?;
        for name in dummies.get_column_names() {
            plan.push((name.to_string(), AggFunction::Max));
        }
        if dummies.width() > 0 {
            data = data.hstack(dummies.get_columns())?;
        }
        debug!(columns = ?dummy_columns, generated = dummies.width(), "dummy encoded columns");
    }

    let mut output_names: IndexSet<&str> = IndexSet::new();
    output_names.insert(group_by);
    for (column, _) in &plan {
        if !output_names.insert(column.as_str()) {
            return Err(PrepError::DuplicateColumn(column.clone()));
        }
    }

    let inner = JoinArgs {
        maintain_order: MaintainOrderJoin::Left,
        ..JoinArgs::new(JoinType::Inner)
    };

    let mut merged: Option<LazyFrame> = None;
    for (column, function) in &plan {
        let result = aggregate_column(&data, group_by, column, *function)?.lazy();
        merged = Some(match merged {
            None => result,
            Some(left) => left.join(result, [col(group_by)], [col(group_by)], inner.clone()),
        });
    }

    let out = match merged {
        Some(lf) => lf.collect()?,
        None => data
            .select([group_by])?
            .lazy()
            .filter(has_key(group_by, &key_dtype))
            .unique_stable(None, UniqueKeepStrategy::First)
            .collect()?,
    };

    debug!(
        group_by,
        groups = out.height(),
        instructions = plan.len(),
        "aggregated dataset"
    );

    Ok(out)
}
