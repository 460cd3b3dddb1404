//! Pipeline configuration file
//!
//! The configuration is a JSON document with one optional section per stage.
//! Mappings are plain JSON objects; `values_and_labels` keeps the order in
//! which the file lists its entries, which becomes the indicator column
//! order.
//!
//! ```json
//! {
//!   "split": [{ "column": "sight", "values_and_labels": { "1": "morning", "3": "evening" } }],
//!   "normalization": { "column": "org", "table": "normalization.csv" },
//!   "category": { "column": "org", "groups": { "gila woodpecker": "woodpecker" } },
//!   "aggregation": { "column": "org", "instructions": [{ "variable": "n", "function": "mean" }] }
//! }
//! ```

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::pipeline::{
    load_dataset, AggregationInstruction, AggregationStep, CategoryGroupMap, CategoryStep,
    NormalizationStep, PipelineConfig, PrepError, SplitInstruction,
};

/// Normalization section: the column to normalize and the wide table to use
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NormalizationSection {
    pub column: String,
    /// Path to the wide normalization table, relative to the config file
    pub table: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CategorySection {
    pub column: String,
    pub groups: CategoryGroupMap,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AggregationSection {
    /// Grouping column
    pub column: String,
    pub instructions: Vec<AggregationInstruction>,
}

/// Parsed pipeline configuration file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PipelineFile {
    #[serde(default)]
    pub split: Option<Vec<SplitInstruction>>,
    #[serde(default)]
    pub normalization: Option<NormalizationSection>,
    #[serde(default)]
    pub category: Option<CategorySection>,
    #[serde(default)]
    pub aggregation: Option<AggregationSection>,
}

impl PipelineFile {
    /// Parse and validate a configuration from JSON text
    pub fn from_json(text: &str) -> Result<Self> {
        let file: PipelineFile =
            serde_json::from_str(text).context("Failed to parse pipeline configuration")?;
        file.validate()?;
        Ok(file)
    }

    /// Read, parse and validate a configuration file
    pub fn from_path(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::from_json(&text).with_context(|| format!("Invalid config file: {}", path.display()))
    }

    /// Check instruction tables before any data is touched
    pub fn validate(&self) -> Result<(), PrepError> {
        if let Some(split) = &self.split {
            for instruction in split {
                if instruction.column.trim().is_empty() {
                    return Err(PrepError::malformed(
                        "split instructions",
                        "column name must not be empty",
                    ));
                }
            }
        }

        if let Some(aggregation) = &self.aggregation {
            for instruction in &aggregation.instructions {
                instruction.resolve()?;
            }
        }

        Ok(())
    }

    /// Load referenced tables and build the runtime configuration.
    ///
    /// Relative table paths are resolved against `base_dir`.
    pub fn into_pipeline_config(
        self,
        base_dir: &Path,
        infer_schema_length: usize,
    ) -> Result<PipelineConfig> {
        let normalization = match self.normalization {
            Some(section) => {
                let path = if section.table.is_absolute() {
                    section.table.clone()
                } else {
                    base_dir.join(&section.table)
                };
                let table = load_dataset(&path, infer_schema_length).with_context(|| {
                    format!("Failed to load normalization table: {}", path.display())
                })?;
                Some(NormalizationStep {
                    column: section.column,
                    table,
                })
            }
            None => None,
        };

        Ok(PipelineConfig {
            split: self.split,
            normalization,
            category: self.category.map(|section| CategoryStep {
                column: section.column,
                groups: section.groups,
            }),
            aggregation: self.aggregation.map(|section| AggregationStep {
                column: section.column,
                instructions: section.instructions,
            }),
        })
    }
}
