//! Shared test utilities and fixture generators

#![allow(dead_code)]

use polars::prelude::*;
use std::path::PathBuf;
use tempfile::TempDir;

/// Bird sighting survey rows
///
/// - `org`: free-text species as recorded (mixed case, abbreviations)
/// - `sight`: multi-valued time-of-day codes ("1,3" = morning and evening)
/// - `n`: number of birds seen (one missing)
/// - `activity`: single activity code
pub fn create_survey_dataframe() -> DataFrame {
    df! {
        "org" => ["GHA", "Prickly Pear", "gha", "Unknown Bird"],
        "sight" => [Some("1,3"), Some("2"), None, Some("3")],
        "n" => [Some(5.0f64), Some(2.0), Some(1.0), None],
        "activity" => [3i32, 1, 3, 6],
    }
    .unwrap()
}

/// Survey rows cycling through four recorded species
///
/// Row `i` uses pattern `i % 4` for `org` and `sight`, so every species
/// keeps its sighting codes. `activity` cycles 1..=6 independently; the
/// "Unknown Bird" rows never record activity 3. Written to CSV, a frame of
/// this size is read back in several chunks.
pub fn create_large_survey_dataframe(rows: usize) -> DataFrame {
    const ORGS: [&str; 4] = ["GHA", "Prickly Pear", "opuntia", "Unknown Bird"];
    const SIGHTS: [Option<&str>; 4] = [Some("1,3"), Some("2"), Some("3"), None];

    let org: Vec<&str> = (0..rows).map(|i| ORGS[i % 4]).collect();
    let sight: Vec<Option<&str>> = (0..rows).map(|i| SIGHTS[i % 4]).collect();
    let n: Vec<Option<f64>> = (0..rows)
        .map(|i| if i % 10 == 9 { None } else { Some((i % 7) as f64) })
        .collect();
    let activity: Vec<i32> = (0..rows).map(|i| (i % 6) as i32 + 1).collect();

    df! {
        "org" => org,
        "sight" => sight,
        "n" => n,
        "activity" => activity,
    }
    .unwrap()
}

/// Wide normalization table: raw string followed by replacement slots
pub fn create_normalization_table() -> DataFrame {
    df! {
        "rawstring" => ["gha", "prickly pear", "opuntia"],
        "replacement_1" => [Some("gila woodpecker"), Some("prickly pear"), Some("prickly pear")],
        "replacement_2" => [Some("gila thrasher"), None, None],
    }
    .unwrap()
}

/// Create a temporary directory with a test CSV file
pub fn create_temp_csv(df: &mut DataFrame) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let csv_path = temp_dir.path().join("test_data.csv");

    let mut file = std::fs::File::create(&csv_path).unwrap();
    CsvWriter::new(&mut file).finish(df).unwrap();

    (temp_dir, csv_path)
}

/// Write a CSV file into an existing directory
pub fn write_csv(dir: &TempDir, name: &str, df: &mut DataFrame) -> PathBuf {
    let path = dir.path().join(name);
    let mut file = std::fs::File::create(&path).unwrap();
    CsvWriter::new(&mut file).finish(df).unwrap();
    path
}

/// Assert that a DataFrame has expected shape
pub fn assert_shape(df: &DataFrame, expected_rows: usize, expected_cols: usize) {
    let (rows, cols) = df.shape();
    assert_eq!(rows, expected_rows, "Row count mismatch: expected {}, got {}", expected_rows, rows);
    assert_eq!(cols, expected_cols, "Column count mismatch: expected {}, got {}", expected_cols, cols);
}

/// Assert that a DataFrame contains specific columns
pub fn assert_has_columns(df: &DataFrame, expected_cols: &[&str]) {
    let actual_cols: Vec<String> = df.get_column_names().iter().map(|s| s.to_string()).collect();
    for col in expected_cols {
        assert!(
            actual_cols.contains(&col.to_string()),
            "Missing expected column: '{}'. Actual columns: {:?}",
            col,
            actual_cols
        );
    }
}

/// Assert that a DataFrame does NOT contain specific columns
pub fn assert_missing_columns(df: &DataFrame, unexpected_cols: &[&str]) {
    let actual_cols: Vec<String> = df.get_column_names().iter().map(|s| s.to_string()).collect();
    for col in unexpected_cols {
        assert!(
            !actual_cols.contains(&col.to_string()),
            "Unexpected column still present: '{}'",
            col
        );
    }
}

/// Values of a String column (nulls as None)
pub fn str_values(df: &DataFrame, name: &str) -> Vec<Option<String>> {
    df.column(name)
        .unwrap()
        .str()
        .unwrap()
        .into_iter()
        .map(|v| v.map(|s| s.to_string()))
        .collect()
}

/// Values of any numeric column as f64 (nulls as None)
pub fn f64_values(df: &DataFrame, name: &str) -> Vec<Option<f64>> {
    df.column(name)
        .unwrap()
        .cast(&DataType::Float64)
        .unwrap()
        .f64()
        .unwrap()
        .into_iter()
        .collect()
}

/// Values of an indicator or code column as i32
pub fn i32_values(df: &DataFrame, name: &str) -> Vec<i32> {
    df.column(name)
        .unwrap()
        .cast(&DataType::Int32)
        .unwrap()
        .i32()
        .unwrap()
        .into_no_null_iter()
        .collect()
}
