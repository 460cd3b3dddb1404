//! Command-line argument definitions using clap

use clap::{ArgAction, Parser, Subcommand};
use std::path::{Path, PathBuf};

/// qualprep - Split, normalize and aggregate survey data
#[derive(Parser, Debug)]
#[command(name = "qualprep")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace).
    /// RUST_LOG takes precedence when set.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the preparation pipeline described by a JSON config
    Run {
        /// Input data file (CSV or Parquet)
        #[arg(short, long)]
        input: PathBuf,

        /// Pipeline configuration file (JSON)
        #[arg(short, long)]
        config: PathBuf,

        /// Output file path (CSV or Parquet, determined by extension).
        /// Defaults to input directory with '_prepared' suffix (e.g., data.csv -> data_prepared.csv).
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Overwrite an existing output file without asking
        #[arg(long, default_value = "false")]
        no_confirm: bool,

        /// Number of rows to use for schema inference (CSV only).
        /// Use 0 for full table scan.
        #[arg(long, default_value = "10000")]
        infer_schema_length: usize,
    },

    /// Build the long-form lookup table from a wide normalization table
    Lookup {
        /// Wide normalization table (raw string, replacement_1, ...)
        #[arg(short, long)]
        normalization: PathBuf,

        /// Output file path. Defaults to '<stem>_lookup.csv' next to the input.
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Number of rows to use for schema inference (CSV only).
        #[arg(long, default_value = "10000")]
        infer_schema_length: usize,
    },
}

/// Derive a sibling path: `dir/stem<suffix>.<extension>`.
///
/// The input's own extension is used when `extension` is None.
pub fn derive_output_path(input: &Path, suffix: &str, extension: Option<&str>) -> PathBuf {
    let parent = input.parent().unwrap_or_else(|| Path::new("."));
    let stem = input
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("output");
    let extension = extension
        .or_else(|| input.extension().and_then(|e| e.to_str()))
        .unwrap_or("csv");
    parent.join(format!("{}{}.{}", stem, suffix, extension))
}

impl Commands {
    /// Output path, derived from the input when not given explicitly.
    pub fn output_path(&self) -> PathBuf {
        match self {
            Commands::Run { input, output, .. } => output
                .clone()
                .unwrap_or_else(|| derive_output_path(input, "_prepared", None)),
            Commands::Lookup {
                normalization,
                output,
                ..
            } => output
                .clone()
                .unwrap_or_else(|| derive_output_path(normalization, "_lookup", Some("csv"))),
        }
    }
}
