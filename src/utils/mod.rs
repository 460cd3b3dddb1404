//! Utilities - terminal output and stage spinners

mod output;

pub use output::*;
