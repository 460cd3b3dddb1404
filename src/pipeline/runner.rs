//! Pipeline orchestration: split -> normalize -> remap -> aggregate
//!
//! Every stage is optional and runs in this fixed order. The first failing
//! stage aborts the run and no partial result is returned.

use std::fmt;

use polars::prelude::*;
use tracing::info;

use super::aggregate::{aggregate, AggregationInstruction};
use super::category::{remap_categories, CategoryGroupMap};
use super::error::PrepResult;
use super::normalize::{build_lookup, normalize_column};
use super::split::{split_columns, SplitInstruction};

/// Normalization stage settings
#[derive(Debug, Clone)]
pub struct NormalizationStep {
    /// Column whose values are normalized
    pub column: String,
    /// Wide normalization table (raw string, replacement_1, ...)
    pub table: DataFrame,
}

/// Category remapping stage settings
#[derive(Debug, Clone)]
pub struct CategoryStep {
    pub column: String,
    pub groups: CategoryGroupMap,
}

/// Aggregation stage settings
#[derive(Debug, Clone)]
pub struct AggregationStep {
    /// Grouping column
    pub column: String,
    pub instructions: Vec<AggregationInstruction>,
}

/// Which stages to run and how. `None` skips a stage.
#[derive(Debug, Clone, Default)]
pub struct PipelineConfig {
    pub split: Option<Vec<SplitInstruction>>,
    pub normalization: Option<NormalizationStep>,
    pub category: Option<CategoryStep>,
    pub aggregation: Option<AggregationStep>,
}

impl PipelineConfig {
    /// Number of stages that will run
    pub fn stage_count(&self) -> usize {
        [
            self.split.is_some(),
            self.normalization.is_some(),
            self.category.is_some(),
            self.aggregation.is_some(),
        ]
        .into_iter()
        .filter(|enabled| *enabled)
        .count()
    }
}

/// Pipeline stage identifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Split,
    Normalize,
    Remap,
    Aggregate,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Split => write!(f, "Split categorical columns"),
            Stage::Normalize => write!(f, "Normalize values"),
            Stage::Remap => write!(f, "Remap categories"),
            Stage::Aggregate => write!(f, "Aggregate"),
        }
    }
}

/// Shape of the data around one executed stage
#[derive(Debug, Clone)]
pub struct StageReport {
    pub stage: Stage,
    pub rows_before: usize,
    pub rows_after: usize,
    pub columns_before: usize,
    pub columns_after: usize,
    /// Raw values without a normalization entry (normalize stage only)
    pub unmatched: Vec<String>,
}

impl StageReport {
    fn new(stage: Stage, before: &DataFrame, after: &DataFrame) -> Self {
        Self {
            stage,
            rows_before: before.height(),
            rows_after: after.height(),
            columns_before: before.width(),
            columns_after: after.width(),
            unmatched: Vec::new(),
        }
    }
}

/// Final data plus one report per executed stage
#[derive(Debug, Clone)]
pub struct PipelineOutcome {
    pub frame: DataFrame,
    pub stages: Vec<StageReport>,
}

/// Run the configured stages on a copy of `df`.
pub fn run_pipeline(df: &DataFrame, config: &PipelineConfig) -> PrepResult<PipelineOutcome> {
    run_pipeline_observed(df, config, |_| {})
}

/// Run the configured stages, calling `observer` after each completed stage.
pub fn run_pipeline_observed<F>(
    df: &DataFrame,
    config: &PipelineConfig,
    mut observer: F,
) -> PrepResult<PipelineOutcome>
where
    F: FnMut(&StageReport),
{
    // Rows are positional, so a fresh contiguous copy is all the index reset needs
    let mut data = df.clone();
    data.rechunk_mut();
    let mut stages = Vec::with_capacity(config.stage_count());

    let mut record = |report: StageReport, stages: &mut Vec<StageReport>| {
        info!(
            stage = %report.stage,
            rows = report.rows_after,
            columns = report.columns_after,
            "stage complete"
        );
        observer(&report);
        stages.push(report);
    };

    if let Some(table) = &config.split {
        let next = split_columns(&data, table)?;
        record(StageReport::new(Stage::Split, &data, &next), &mut stages);
        data = next;
    }

    if let Some(step) = &config.normalization {
        let lookup = build_lookup(&step.table)?;
        let outcome = normalize_column(&data, &lookup, &step.column)?;
        let mut report = StageReport::new(Stage::Normalize, &data, &outcome.frame);
        report.unmatched = outcome.unmatched;
        record(report, &mut stages);
        data = outcome.frame;
    }

    if let Some(step) = &config.category {
        let next = remap_categories(&data, &step.column, &step.groups)?;
        record(StageReport::new(Stage::Remap, &data, &next), &mut stages);
        data = next;
    }

    if let Some(step) = &config.aggregation {
        let next = aggregate(&data, &step.column, &step.instructions)?;
        record(StageReport::new(Stage::Aggregate, &data, &next), &mut stages);
        data = next;
    }

    Ok(PipelineOutcome {
        frame: data,
        stages,
    })
}
