//! Pipeline module - the data preparation steps and their orchestration

pub mod aggregate;
pub mod category;
pub mod cell;
pub mod error;
pub mod loader;
pub mod normalize;
pub mod runner;
pub mod split;

pub use aggregate::*;
pub use category::*;
pub use cell::{column_cells, Cell};
pub use error::*;
pub use loader::*;
pub use normalize::*;
pub use runner::*;
pub use split::*;
