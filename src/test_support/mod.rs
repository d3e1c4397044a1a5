//! Test utilities and mocks for unit tests.
//!
//! [`MockRunner`] stands in for [`ProcessRunner`](crate::util::process::ProcessRunner)
//! so the build stages can be exercised without CMake or a Panda3D SDK.
//!
//! # Example
//!
//! ```rust,ignore
//! use p3build::test_support::{fixtures, MockRunner};
//!
//! #[test]
//! fn test_example() {
//!     let mut runner = MockRunner::new();
//!     runner.fail_on("--build", 2, "error C2065: undeclared identifier");
//!
//!     // Hand `&mut runner` to the code under test...
//!     assert_eq!(runner.calls().len(), 2);
//! }
//! ```

pub mod fixtures;

use std::path::PathBuf;

use crate::util::errors::{BuildError, Result};
use crate::util::process::{CommandRunner, ErrorFormatter, ProcessBuilder};

// Re-export fixtures for convenience
pub use fixtures::*;

/// One command seen by a [`MockRunner`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedCall {
    /// Program and arguments, space separated.
    pub command: String,
    /// Working directory the command was given.
    pub cwd: Option<PathBuf>,
    /// Whether the caller supplied an error formatter.
    pub had_formatter: bool,
}

/// Scripted failure for commands containing `pattern`.
#[derive(Debug, Clone)]
struct Failure {
    pattern: String,
    status: i32,
    output: String,
}

/// Command runner that records calls instead of spawning processes.
///
/// Every command succeeds unless a failure was scripted for it with
/// [`MockRunner::fail_on`].
#[derive(Debug, Default)]
pub struct MockRunner {
    failures: Vec<Failure>,
    calls: Vec<RecordedCall>,
}

impl MockRunner {
    /// Create a runner on which every command succeeds.
    pub fn new() -> Self {
        MockRunner::default()
    }

    /// Make commands containing `pattern` exit with `status`, printing `output`.
    pub fn fail_on(&mut self, pattern: &str, status: i32, output: &str) -> &mut Self {
        self.failures.push(Failure {
            pattern: pattern.to_string(),
            status,
            output: output.to_string(),
        });
        self
    }

    /// Get all commands that were run, in order.
    pub fn calls(&self) -> &[RecordedCall] {
        &self.calls
    }

    /// Check if a command containing `pattern` was run.
    pub fn was_called(&self, pattern: &str) -> bool {
        self.calls.iter().any(|c| c.command.contains(pattern))
    }
}

impl CommandRunner for MockRunner {
    fn run(&mut self, cmd: &ProcessBuilder, formatter: Option<ErrorFormatter<'_>>) -> Result<()> {
        let command = cmd.display_command();
        self.calls.push(RecordedCall {
            command: command.clone(),
            cwd: cmd.get_cwd().map(PathBuf::from),
            had_formatter: formatter.is_some(),
        });

        let failure = self
            .failures
            .iter()
            .find(|f| command.contains(&f.pattern));

        match failure {
            None => Ok(()),
            Some(failure) => Err(BuildError::CommandFailed {
                command,
                status: Some(failure.status),
                diagnosis: formatter.map(|format| format(&failure.output)),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_runner_records_calls() {
        let mut runner = MockRunner::new();
        let cmd = ProcessBuilder::new("cmake").args(["--build", "."]).cwd("/tmp/out");

        runner.run(&cmd, None).unwrap();

        assert_eq!(
            runner.calls(),
            [RecordedCall {
                command: "cmake --build .".into(),
                cwd: Some(PathBuf::from("/tmp/out")),
                had_formatter: false,
            }]
        );
        assert!(runner.was_called("--build"));
    }

    #[test]
    fn test_mock_runner_scripted_failure_uses_formatter() {
        let mut runner = MockRunner::new();
        runner.fail_on("configure-me", 1, "No CMAKE_CXX_COMPILER could be found.");

        let formatter = |output: &str| format!("diagnosed: {}", output.trim());
        let err = runner
            .run(&ProcessBuilder::new("cmake").arg("configure-me"), Some(&formatter))
            .unwrap_err();

        match err {
            BuildError::CommandFailed {
                status, diagnosis, ..
            } => {
                assert_eq!(status, Some(1));
                assert_eq!(diagnosis.as_deref(), Some("diagnosed: No CMAKE_CXX_COMPILER could be found."));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
