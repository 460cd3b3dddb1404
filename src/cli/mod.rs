//! CLI module - argument parsing, logging setup and interactive prompts

mod args;
pub mod logging;
mod prompts;

pub use args::{derive_output_path, Cli, Commands};
pub use prompts::*;
