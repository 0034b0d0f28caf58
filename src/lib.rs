// Crate root: declare modules and control visibility
pub mod config;
pub mod dwarf;
pub mod error;
pub mod extract;
pub mod logging;
pub mod param_map;
pub mod report;
pub mod symbols;

// Re-export commonly used API from the library for binaries/tests
pub use config::{Cli, Config};
pub use error::ExtractError;
pub use extract::{extract, run, ExtractStats, Report};
pub use report::{OutputEntry, OutputFormat};
