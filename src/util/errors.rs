//! Fatal error kinds.
//!
//! Every problem the build wrapper detects is terminal: there is no retry
//! and no partial result. Each stage returns `Result<T, BuildError>` and the
//! binary turns an error into a printed diagnostic and a nonzero exit code.

use std::io;
use std::path::PathBuf;

use miette::Diagnostic as MietteDiagnostic;
use thiserror::Error;

use crate::builder::toolchain::OptionalLib;
use crate::util::diagnostic::Diagnostic;

/// Convenience alias used across the library.
pub type Result<T, E = BuildError> = std::result::Result<T, E>;

/// A fatal, unrecoverable build error.
#[derive(Debug, Error, MietteDiagnostic)]
pub enum BuildError {
    #[error("failed to locate path")]
    #[diagnostic(code(p3build::path_not_found))]
    PathNotFound {
        /// Optional explanation shown above the attempted paths.
        message: String,
        attempted: Vec<PathBuf>,
    },

    #[error("unable to determine the Visual Studio version of your Panda3D build")]
    #[diagnostic(
        code(p3build::unknown_compiler),
        help("build against a Panda3D SDK compiled with one of the known Visual Studio versions")
    )]
    UnknownCompiler { compiler: String, known: Vec<String> },

    #[error("the Panda3D installation at `{}` ships no headers", .panda3d_dir.display())]
    #[diagnostic(
        code(p3build::headers_missing),
        help("install the full Panda3D SDK, or point LOCAL_PANDA_BUILD at a source build")
    )]
    HeadersMissing { panda3d_dir: PathBuf },

    #[error("your Panda3D build was not compiled with {} support, but it is required", .library.name())]
    #[diagnostic(
        code(p3build::missing_library),
        help("set require_lib_<name>=0 in config.ini or use a Panda3D build that includes it")
    )]
    MissingLibrary { library: OptionalLib },

    #[error("`{command}` failed with exit code {}", exit_code(.status))]
    #[diagnostic(code(p3build::command_failed))]
    CommandFailed {
        command: String,
        status: Option<i32>,
        diagnosis: Option<String>,
    },

    #[error("failed to execute `{command}`")]
    #[diagnostic(code(p3build::spawn))]
    Spawn {
        command: String,
        #[source]
        source: io::Error,
    },

    #[error("I/O error at `{}`", .path.display())]
    #[diagnostic(code(p3build::io))]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to query the Panda3D SDK through `{}`: {message}", .python.display())]
    #[diagnostic(
        code(p3build::sdk_probe),
        help("make sure `import panda3d.core` works with this interpreter, or pass --python")
    )]
    SdkProbe { python: PathBuf, message: String },

    #[error("no Python interpreter found")]
    #[diagnostic(
        code(p3build::python_not_found),
        help("pass --python or set P3BUILD_PYTHON")
    )]
    PythonNotFound { tried: Vec<String> },

    #[error("no module name configured")]
    #[diagnostic(code(p3build::module_name_missing), help("set module_name in config.ini"))]
    ModuleNameMissing,

    #[error("failed to find the compiled module")]
    #[diagnostic(
        code(p3build::artifact_not_found),
        help("run `p3build build` first")
    )]
    ArtifactNotFound { candidates: Vec<PathBuf> },

    #[error("unsupported operating system `{os}`")]
    #[diagnostic(code(p3build::unsupported_platform))]
    UnsupportedPlatform { os: String },
}

fn exit_code(status: &Option<i32>) -> String {
    match status {
        Some(code) => code.to_string(),
        None => "<signal>".to_string(),
    }
}

impl BuildError {
    /// Wrap an I/O error with the path it happened at.
    pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        BuildError::Io {
            path: path.into(),
            source,
        }
    }

    /// Convert to a user-facing diagnostic listing everything that was tried.
    pub fn to_diagnostic(&self) -> Diagnostic {
        let mut diag = Diagnostic::error(self.to_string());

        match self {
            BuildError::PathNotFound { message, attempted } => {
                if !message.is_empty() {
                    diag = diag.with_context(message.clone());
                }
                diag = diag.with_context("we tried to find a folder or file on the following paths:");
                for path in attempted {
                    diag = diag.with_context(format!("[-] {}", path.display()));
                }
            }
            BuildError::UnknownCompiler { compiler, known } => {
                diag = diag.with_context(format!("unknown compiler string was: '{}'", compiler));
                diag = diag.with_context("known visual studio versions are:");
                for entry in known {
                    diag = diag.with_context(format!("- {}", entry));
                }
            }
            BuildError::CommandFailed {
                diagnosis: Some(diagnosis),
                ..
            } => {
                for line in diagnosis.lines().filter(|l| !l.trim().is_empty()) {
                    diag = diag.with_context(line.to_string());
                }
            }
            BuildError::Spawn { source, .. } | BuildError::Io { source, .. } => {
                diag = diag.with_context(source.to_string());
            }
            BuildError::PythonNotFound { tried } => {
                diag = diag.with_context(format!("searched PATH for: {}", tried.join(", ")));
            }
            BuildError::ArtifactNotFound { candidates } => {
                for path in candidates {
                    diag = diag.with_context(format!("[-] {}", path.display()));
                }
            }
            _ => {}
        }

        if let Some(help) = MietteDiagnostic::help(self) {
            diag = diag.with_suggestion(help.to_string());
        }

        diag
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path_not_found_lists_every_attempt() {
        let err = BuildError::PathNotFound {
            message: "Failed to find binary path".into(),
            attempted: vec![PathBuf::from("/a/bin"), PathBuf::from("/usr/bin")],
        };

        let output = err.to_diagnostic().format(false);
        assert!(output.contains("error: failed to locate path"));
        assert!(output.contains("Failed to find binary path"));
        assert!(output.contains("[-] /a/bin"));
        assert!(output.contains("[-] /usr/bin"));
    }

    #[test]
    fn test_missing_library_has_help() {
        let err = BuildError::MissingLibrary {
            library: OptionalLib::Bullet,
        };

        assert!(err.to_string().contains("bullet support"));
        let output = err.to_diagnostic().format(false);
        assert!(output.contains("require_lib_<name>=0"));
    }

    #[test]
    fn test_command_failed_message() {
        let err = BuildError::CommandFailed {
            command: "cmake --build .".into(),
            status: Some(2),
            diagnosis: Some("line one\n\nline two".into()),
        };

        assert_eq!(err.to_string(), "`cmake --build .` failed with exit code 2");
        let output = err.to_diagnostic().format(false);
        assert!(output.contains("line one"));
        assert!(output.contains("line two"));
    }
}
