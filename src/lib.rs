//! p3build - builds native C++ extension modules against the Panda3D SDK
//!
//! The library probes the SDK through its Python interpreter, turns the
//! project's `config.ini` into CMake arguments and drives CMake, streaming
//! the tool output as it arrives. The `p3build` binary is a thin CLI on top.

pub mod builder;
pub mod ops;
pub mod util;

/// Test utilities and mocks for unit tests.
///
/// This module is only available when compiling with `--cfg test` or
/// running tests. It provides a recording command runner and SDK fixtures.
#[cfg(test)]
pub mod test_support;

pub use builder::{BuildContext, CMake};
pub use util::config::Config;
pub use util::context::GlobalContext;
pub use util::errors::{BuildError, Result};
