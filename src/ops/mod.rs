//! High-level operations.
//!
//! This module contains the implementation of p3build commands.

pub mod build;
pub mod finalize;
pub mod info;
pub mod interrogate;

pub use build::{build, prepare_config, prepare_output_dir, BuildOptions, BuildOutcome};
pub use finalize::{find_binary, finalize, FinalizeOptions, FinalizeResult};
pub use info::{describe, field_value, format_report, InfoField};
pub use interrogate::{interrogate, InterrogateOptions};
