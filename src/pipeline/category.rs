//! Remapping normalized values to coarser group labels

use std::collections::HashMap;

use polars::prelude::*;
use tracing::debug;

use super::cell::column_cells;
use super::error::{PrepError, PrepResult};

/// Normalized value -> group label (e.g. "acorn woodpecker" -> "woodpecker")
pub type CategoryGroupMap = HashMap<String, String>;

/// Replace every value of `column` with its group label.
///
/// The map must cover every value present in the column. The first value
/// without an entry (missing values included) fails the whole call.
pub fn remap_categories(
    df: &DataFrame,
    column: &str,
    groups: &CategoryGroupMap,
) -> PrepResult<DataFrame> {
    let cells = column_cells(df, column)?;

    let labels = cells
        .iter()
        .enumerate()
        .map(|(row, cell)| {
            cell.render()
                .and_then(|value| groups.get(&value))
                .map(String::as_str)
                .ok_or_else(|| PrepError::UnmappedCategory {
                    column: column.to_string(),
                    value: cell.to_string(),
                    row,
                })
        })
        .collect::<PrepResult<Vec<&str>>>()?;

    let mut out = df.clone();
    out.with_column(Column::new(column.into(), labels))?;

    debug!(column, groups = groups.len(), "remapped categories");
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn groups() -> CategoryGroupMap {
        [
            ("acorn woodpecker", "woodpecker"),
            ("gila woodpecker", "woodpecker"),
            ("prickly pear", "cactus"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
    }

    #[test]
    fn test_remap_replaces_values() {
        let df = df! {
            "org" => ["acorn woodpecker", "prickly pear", "gila woodpecker"],
            "n" => [1i32, 2, 3],
        }
        .unwrap();

        let out = remap_categories(&df, "org", &groups()).unwrap();
        let org: Vec<&str> = out.column("org").unwrap().str().unwrap().into_no_null_iter().collect();

        assert_eq!(org, vec!["woodpecker", "cactus", "woodpecker"]);
        assert_eq!(out.get_column_names(), &["org", "n"]);
    }

    #[test]
    fn test_remap_is_case_sensitive() {
        let df = df! { "org" => ["Prickly Pear"] }.unwrap();

        let err = remap_categories(&df, "org", &groups()).unwrap_err();
        assert!(matches!(err, PrepError::UnmappedCategory { row: 0, .. }));
    }

    #[test]
    fn test_remap_missing_value_is_unmapped() {
        let df = df! { "org" => [Some("prickly pear"), None] }.unwrap();

        let err = remap_categories(&df, "org", &groups()).unwrap_err();
        match err {
            PrepError::UnmappedCategory { column, value, row } => {
                assert_eq!(column, "org");
                assert_eq!(value, "NaN");
                assert_eq!(row, 1);
            }
            other => panic!("Expected UnmappedCategory, got {other:?}"),
        }
    }
}
