//! qualprep: Survey Data Preparation CLI
//!
//! Runs the split -> normalize -> remap -> aggregate pipeline on a CSV or
//! Parquet dataset, driven by a JSON configuration file.

use std::path::Path;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use console::style;

use qualprep::cli::{confirm_overwrite, logging::init_logging, Cli, Commands};
use qualprep::config::PipelineFile;
use qualprep::pipeline::{build_lookup, load_dataset, run_pipeline_observed, save_dataset};
use qualprep::report::PipelineSummary;
use qualprep::utils::{
    create_spinner, finish_spinner, print_banner, print_completion, print_config, print_info,
    print_step_header, print_success, print_warning,
};

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose)?;

    let output_path = cli.command.output_path();

    match &cli.command {
        Commands::Run {
            input,
            config,
            no_confirm,
            infer_schema_length,
            ..
        } => run(input, config, &output_path, *no_confirm, *infer_schema_length),
        Commands::Lookup {
            normalization,
            infer_schema_length,
            ..
        } => lookup(normalization, &output_path, *infer_schema_length),
    }
}

fn run(
    input: &Path,
    config_path: &Path,
    output_path: &Path,
    no_confirm: bool,
    infer_schema_length: usize,
) -> Result<()> {
    print_banner(env!("CARGO_PKG_VERSION"));

    let pipeline_file = PipelineFile::from_path(config_path)?;
    let mut stage_names = Vec::new();
    if pipeline_file.split.is_some() {
        stage_names.push("Split categorical columns");
    }
    if pipeline_file.normalization.is_some() {
        stage_names.push("Normalize values");
    }
    if pipeline_file.category.is_some() {
        stage_names.push("Remap categories");
    }
    if pipeline_file.aggregation.is_some() {
        stage_names.push("Aggregate");
    }
    print_config(input, config_path, output_path, &stage_names);

    // Step 1: Load dataset and instruction tables
    print_step_header(1, "Load Data");
    let step_start = Instant::now();
    let spinner = create_spinner("Loading dataset...");
    let df = load_dataset(input, infer_schema_length)?;
    let base_dir = config_path.parent().unwrap_or_else(|| Path::new("."));
    let pipeline_config = pipeline_file.into_pipeline_config(base_dir, infer_schema_length)?;
    finish_spinner(&spinner, "Dataset and instructions loaded", true);

    let (rows, cols) = df.shape();
    println!("\n    {} Dataset Statistics:", style("✧").cyan());
    println!("      Rows: {}", rows);
    println!("      Columns: {}", cols);
    print_info(&format!("Loaded in {:.2?}", step_start.elapsed()));

    // Step 2: Run the configured stages
    print_step_header(2, "Prepare Data");
    let mut summary = PipelineSummary::new(rows, cols);
    let step_start = Instant::now();
    let outcome = if pipeline_config.stage_count() == 0 {
        print_info("No stages configured, data is passed through unchanged");
        run_pipeline_observed(&df, &pipeline_config, |_| {})?
    } else {
        let spinner = create_spinner("Running pipeline...");
        let outcome = run_pipeline_observed(&df, &pipeline_config, |report| {
            spinner.println(format!(
                "    {} {} ({} rows, {} columns)",
                style("✓").green().bold(),
                report.stage,
                report.rows_after,
                report.columns_after
            ));
        })?;
        let unmatched: usize = outcome.stages.iter().map(|s| s.unmatched.len()).sum();
        if unmatched > 0 {
            finish_spinner(&spinner, "Pipeline complete with unmatched values", false);
        } else {
            finish_spinner(&spinner, "Pipeline complete", true);
        }
        outcome
    };
    print_info(&format!("Prepared in {:.2?}", step_start.elapsed()));

    for report in &outcome.stages {
        summary.add_stage(report.clone());
    }
    let unmatched = summary.unmatched_values();
    if !unmatched.is_empty() {
        print_warning(&format!(
            "{} distinct value(s) without a normalization entry, kept as recorded",
            unmatched.len()
        ));
    }

    // Step 3: Save output
    print_step_header(3, "Save Results");
    if !confirm_overwrite(output_path, no_confirm)? {
        println!("Cancelled by user.");
        return Ok(());
    }
    let spinner = create_spinner("Writing output file...");
    let mut frame = outcome.frame;
    save_dataset(&mut frame, output_path)?;
    finish_spinner(&spinner, &format!("Saved to {}", output_path.display()), true);

    summary.display();
    print_completion();

    Ok(())
}

fn lookup(normalization: &Path, output_path: &Path, infer_schema_length: usize) -> Result<()> {
    let wide = load_dataset(normalization, infer_schema_length)?;
    let table = build_lookup(&wide)
        .with_context(|| format!("Invalid normalization table: {}", normalization.display()))?;

    let mut long = table.to_frame()?;
    save_dataset(&mut long, output_path)?;

    print_success(&format!(
        "Lookup with {} raw string(s) and {} pair(s) saved to {}",
        table.len(),
        long.height(),
        output_path.display()
    ));

    Ok(())
}
