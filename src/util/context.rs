//! Process-wide inputs, gathered once and passed explicitly.
//!
//! Nothing here mutates process state: the working directory is never
//! changed, and commands receive their base directory as a parameter.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::util::config::CONFIG_FILE;
use crate::util::errors::{BuildError, Result};
use crate::util::fs::normalize_path;
use crate::util::shell::Shell;

/// Environment variable redirecting SDK bin/lib/include discovery to a local build.
pub const LOCAL_PANDA_BUILD: &str = "LOCAL_PANDA_BUILD";

/// Environment variable naming the Python interpreter to use.
pub const PYTHON_ENV: &str = "P3BUILD_PYTHON";

/// Global context containing configuration paths and overrides.
#[derive(Debug, Clone)]
pub struct GlobalContext {
    /// Directory holding `config.ini` and the top-level `CMakeLists.txt`
    project_root: PathBuf,

    /// Value of `LOCAL_PANDA_BUILD`, if set
    sdk_override: Option<PathBuf>,

    /// Explicit Python interpreter
    python: Option<PathBuf>,

    shell: Arc<Shell>,
}

impl GlobalContext {
    /// Create a context for the project at `project_root`, reading the
    /// `LOCAL_PANDA_BUILD` override from the environment.
    pub fn new(project_root: impl AsRef<Path>, shell: Arc<Shell>) -> Result<Self> {
        let root = project_root.as_ref();
        if !root.is_dir() {
            return Err(BuildError::io(
                root,
                std::io::Error::new(std::io::ErrorKind::NotFound, "project directory not found"),
            ));
        }

        let sdk_override = std::env::var_os(LOCAL_PANDA_BUILD)
            .filter(|v| !v.is_empty())
            .map(PathBuf::from);

        Ok(GlobalContext {
            project_root: normalize_path(root),
            sdk_override,
            python: None,
            shell,
        })
    }

    /// Use the given interpreter instead of searching PATH.
    pub fn with_python(mut self, python: Option<PathBuf>) -> Self {
        self.python = python;
        self
    }

    /// Override (or clear) the local SDK build directory.
    pub fn with_sdk_override(mut self, dir: Option<PathBuf>) -> Self {
        self.sdk_override = dir;
        self
    }

    pub fn project_root(&self) -> &Path {
        &self.project_root
    }

    /// Path of the persisted configuration.
    pub fn config_path(&self) -> PathBuf {
        self.project_root.join(CONFIG_FILE)
    }

    pub fn sdk_override(&self) -> Option<&Path> {
        self.sdk_override.as_deref()
    }

    pub fn python(&self) -> Option<&Path> {
        self.python.as_deref()
    }

    pub fn shell(&self) -> &Arc<Shell> {
        &self.shell
    }
}
