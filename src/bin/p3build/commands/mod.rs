//! Command implementations

pub mod build;
pub mod completions;
pub mod finalize;
pub mod info;
pub mod interrogate;
