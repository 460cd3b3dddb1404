//! Integration tests for the full preparation pipeline

use indexmap::IndexMap;
use polars::prelude::*;
use qualprep::pipeline::*;

#[path = "common/mod.rs"]
mod common;

use common::*;

fn full_config(groups: CategoryGroupMap) -> PipelineConfig {
    PipelineConfig {
        split: Some(vec![SplitInstruction::new(
            "sight",
            IndexMap::from([
                ("1".to_string(), "morning".to_string()),
                ("3".to_string(), "evening".to_string()),
            ]),
        )]),
        normalization: Some(NormalizationStep {
            column: "org".into(),
            table: create_normalization_table(),
        }),
        category: Some(CategoryStep {
            column: "org".into(),
            groups,
        }),
        aggregation: Some(AggregationStep {
            column: "org".into(),
            instructions: vec![
                AggregationInstruction::new("n", "mean"),
                AggregationInstruction::new("morning", "max"),
                AggregationInstruction::new("evening", "max"),
                AggregationInstruction::new("activity", "three"),
            ],
        }),
    }
}

fn bird_groups() -> CategoryGroupMap {
    CategoryGroupMap::from([
        ("gila woodpecker".to_string(), "woodpecker".to_string()),
        ("gila thrasher".to_string(), "thrasher".to_string()),
        ("prickly pear".to_string(), "cactus".to_string()),
        ("Unknown Bird".to_string(), "unknown".to_string()),
    ])
}

#[test]
fn test_full_pipeline() {
    let df = create_survey_dataframe();

    let outcome = run_pipeline(&df, &full_config(bird_groups())).unwrap();
    let out = &outcome.frame;

    assert_eq!(
        out.get_column_names(),
        &["org", "n", "morning", "evening", "activity"]
    );
    assert_eq!(
        str_values(out, "org"),
        vec![
            Some("woodpecker".to_string()),
            Some("thrasher".to_string()),
            Some("cactus".to_string()),
            Some("unknown".to_string()),
        ]
    );
    assert_eq!(
        f64_values(out, "n"),
        vec![Some(3.0), Some(3.0), Some(2.0), None]
    );
    assert_eq!(i32_values(out, "morning"), vec![1, 1, 0, 0]);
    assert_eq!(i32_values(out, "evening"), vec![1, 1, 0, 1]);
    assert_eq!(i32_values(out, "activity"), vec![1, 1, 0, 0]);
}

#[test]
fn test_stage_reports() {
    let df = create_survey_dataframe();

    let outcome = run_pipeline(&df, &full_config(bird_groups())).unwrap();
    let stages: Vec<Stage> = outcome.stages.iter().map(|s| s.stage).collect();

    assert_eq!(
        stages,
        vec![Stage::Split, Stage::Normalize, Stage::Remap, Stage::Aggregate]
    );

    let split = &outcome.stages[0];
    assert_eq!((split.rows_before, split.rows_after), (4, 4));
    assert_eq!((split.columns_before, split.columns_after), (4, 5));

    let normalize = &outcome.stages[1];
    assert_eq!((normalize.rows_before, normalize.rows_after), (4, 6));
    assert_eq!(normalize.unmatched, vec!["Unknown Bird"]);

    let aggregate = &outcome.stages[3];
    assert_eq!(aggregate.rows_after, 4);
}

#[test]
fn test_unmapped_category_aborts_pipeline() {
    let df = create_survey_dataframe();
    let mut groups = bird_groups();
    groups.remove("Unknown Bird");

    let result = run_pipeline(&df, &full_config(groups));

    match result {
        Err(PrepError::UnmappedCategory { value, .. }) => assert_eq!(value, "Unknown Bird"),
        other => panic!("Expected UnmappedCategory, got {:?}", other.map(|o| o.frame)),
    }
}

#[test]
fn test_stages_are_skippable() {
    let df = create_survey_dataframe();
    let mut config = full_config(bird_groups());
    config.normalization = None;
    config.category = None;
    config.aggregation = None;

    let outcome = run_pipeline(&df, &config).unwrap();

    assert_eq!(outcome.stages.len(), 1);
    assert_shape(&outcome.frame, 4, 5);
    assert_has_columns(&outcome.frame, &["org", "n", "activity", "morning", "evening"]);
}

#[test]
fn test_pipeline_does_not_modify_input() {
    let df = create_survey_dataframe();
    let before = df.clone();

    let _ = run_pipeline(&df, &full_config(bird_groups())).unwrap();

    assert!(df.equals_missing(&before));
}

#[test]
fn test_pipeline_from_csv() {
    let mut df = create_survey_dataframe();
    let (_temp_dir, csv_path) = create_temp_csv(&mut df);

    let loaded = load_dataset(&csv_path, 100).unwrap();
    let outcome = run_pipeline(&loaded, &full_config(bird_groups())).unwrap();

    assert_eq!(outcome.frame.height(), 4);
    assert_eq!(i32_values(&outcome.frame, "evening"), vec![1, 1, 0, 1]);
}

#[test]
fn test_pipeline_from_large_csv() {
    let mut df = create_large_survey_dataframe(240);
    let (_temp_dir, csv_path) = create_temp_csv(&mut df);

    let loaded = load_dataset(&csv_path, 100).unwrap();
    assert_eq!(loaded.height(), 240);

    let outcome = run_pipeline(&loaded, &full_config(bird_groups())).unwrap();
    let out = &outcome.frame;

    assert_eq!(
        str_values(out, "org"),
        vec![
            Some("woodpecker".to_string()),
            Some("thrasher".to_string()),
            Some("cactus".to_string()),
            Some("unknown".to_string()),
        ]
    );
    assert_eq!(i32_values(out, "morning"), vec![1, 1, 0, 0]);
    assert_eq!(i32_values(out, "evening"), vec![1, 1, 1, 0]);
    assert_eq!(i32_values(out, "activity"), vec![1, 1, 1, 0]);
    // 60 GHA rows fan out into two species each
    assert_eq!(outcome.stages[1].rows_after, 300);
}

#[test]
fn test_pipeline_on_stacked_frame() {
    let mut df = create_survey_dataframe();
    df.vstack_mut(&create_survey_dataframe()).unwrap();
    assert!(df.column("org").unwrap().n_chunks() > 1);

    let outcome = run_pipeline(&df, &full_config(bird_groups())).unwrap();

    assert_eq!(outcome.frame.height(), 4);
    assert_eq!(i32_values(&outcome.frame, "evening"), vec![1, 1, 0, 1]);
}
