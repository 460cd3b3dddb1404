//! Pipeline summary report

use comfy_table::{presets::UTF8_FULL_CONDENSED, Attribute, Cell, Color, Table};
use console::style;

use crate::pipeline::{Stage, StageReport};

/// Maximum unmatched values listed before truncating
const MAX_LISTED_UNMATCHED: usize = 20;

/// Summary of one pipeline run
#[derive(Debug, Default)]
pub struct PipelineSummary {
    pub initial_rows: usize,
    pub initial_columns: usize,
    pub stages: Vec<StageReport>,
}

impl PipelineSummary {
    pub fn new(initial_rows: usize, initial_columns: usize) -> Self {
        Self {
            initial_rows,
            initial_columns,
            ..Default::default()
        }
    }

    pub fn add_stage(&mut self, report: StageReport) {
        self.stages.push(report);
    }

    pub fn final_shape(&self) -> (usize, usize) {
        self.stages
            .last()
            .map(|s| (s.rows_after, s.columns_after))
            .unwrap_or((self.initial_rows, self.initial_columns))
    }

    /// Distinct unmatched normalization values, in first-seen order
    pub fn unmatched_values(&self) -> Vec<&str> {
        let mut values: Vec<&str> = Vec::new();
        for report in self.stages.iter().filter(|s| s.stage == Stage::Normalize) {
            for value in &report.unmatched {
                if !values.contains(&value.as_str()) {
                    values.push(value);
                }
            }
        }
        values
    }

    /// Build the stage table
    pub fn table(&self) -> Table {
        let mut table = Table::new();
        table.load_preset(UTF8_FULL_CONDENSED);
        table.set_header(vec![
            Cell::new("Stage").add_attribute(Attribute::Bold),
            Cell::new("Rows").add_attribute(Attribute::Bold),
            Cell::new("Columns").add_attribute(Attribute::Bold),
            Cell::new("Unmatched").add_attribute(Attribute::Bold),
        ]);

        table.add_row(vec![
            Cell::new("📁 Input"),
            Cell::new(self.initial_rows),
            Cell::new(self.initial_columns),
            Cell::new("-"),
        ]);

        for report in &self.stages {
            let rows = if report.rows_after == report.rows_before {
                Cell::new(report.rows_after)
            } else {
                Cell::new(format!("{} → {}", report.rows_before, report.rows_after))
                    .fg(Color::Yellow)
            };
            let unmatched = if report.stage == Stage::Normalize {
                Cell::new(report.unmatched.len()).fg(if report.unmatched.is_empty() {
                    Color::White
                } else {
                    Color::Red
                })
            } else {
                Cell::new("-")
            };
            table.add_row(vec![
                Cell::new(report.stage.to_string()),
                rows,
                Cell::new(format!("{} → {}", report.columns_before, report.columns_after)),
                unmatched,
            ]);
        }

        let (rows, columns) = self.final_shape();
        table.add_row(vec![
            Cell::new("✅ Output"),
            Cell::new(rows).fg(Color::Green).add_attribute(Attribute::Bold),
            Cell::new(columns).fg(Color::Green).add_attribute(Attribute::Bold),
            Cell::new("-"),
        ]);

        table
    }

    pub fn display(&self) {
        println!();
        println!(
            "    {} {}",
            style("📋").cyan(),
            style("PIPELINE SUMMARY").white().bold()
        );
        println!("    {}", style("─".repeat(50)).dim());
        println!();

        // Indent the table
        for line in self.table().to_string().lines() {
            println!("    {}", line);
        }

        let unmatched = self.unmatched_values();
        if !unmatched.is_empty() {
            println!();
            println!(
                "    {} {} {}",
                style("📝").cyan(),
                style("UNMATCHED VALUES (kept as recorded)").white().bold(),
                style(format!("({})", unmatched.len())).dim()
            );
            println!("    {}", style("─".repeat(50)).dim());
            for value in unmatched.iter().take(MAX_LISTED_UNMATCHED) {
                println!("        {} {}", style("•").dim(), value);
            }
            if unmatched.len() > MAX_LISTED_UNMATCHED {
                println!(
                    "        {}",
                    style(format!("… and {} more", unmatched.len() - MAX_LISTED_UNMATCHED)).dim()
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report(stage: Stage, rows: (usize, usize), unmatched: &[&str]) -> StageReport {
        StageReport {
            stage,
            rows_before: rows.0,
            rows_after: rows.1,
            columns_before: 3,
            columns_after: 3,
            unmatched: unmatched.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn test_final_shape_defaults_to_input() {
        let summary = PipelineSummary::new(10, 4);
        assert_eq!(summary.final_shape(), (10, 4));
    }

    #[test]
    fn test_unmatched_values_deduplicated() {
        let mut summary = PipelineSummary::new(3, 3);
        summary.add_stage(report(Stage::Normalize, (3, 4), &["Owl?", "bird", "Owl?"]));
        summary.add_stage(report(Stage::Aggregate, (4, 2), &[]));

        assert_eq!(summary.unmatched_values(), vec!["Owl?", "bird"]);
        assert_eq!(summary.final_shape(), (2, 3));
    }

    #[test]
    fn test_table_lists_every_stage() {
        let mut summary = PipelineSummary::new(3, 3);
        summary.add_stage(report(Stage::Split, (3, 3), &[]));
        summary.add_stage(report(Stage::Normalize, (3, 5), &["x"]));

        let rendered = summary.table().to_string();
        assert!(rendered.contains("Split categorical columns"));
        assert!(rendered.contains("Normalize values"));
        assert!(rendered.contains("3 → 5"));
    }
}
