//! qualprep: Survey Data Preparation Library
//!
//! Splits multi-valued categorical columns into indicators, normalizes
//! free-text values against a lookup table, remaps them to coarser groups
//! and aggregates the result to one row per group.

pub mod cli;
pub mod config;
pub mod pipeline;
pub mod report;
pub mod utils;
