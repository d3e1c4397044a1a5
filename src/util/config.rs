//! The persisted `key=value` build configuration.
//!
//! The file lives at `config.ini` in the project root and holds one entry per
//! line. Values are plain strings: nothing is validated or coerced, and
//! booleans are interpreted on use with [`is_truthy`].
//!
//! Loading keeps two quirks of the format as-is:
//! - a line with several `=` maps the key to the text after the *last* `=`
//! - a non-blank line without any `=` is dropped
//!
//! Values containing `=` or newlines will not round-trip through
//! [`Config::save`].

use std::collections::BTreeMap;
use std::path::Path;

use crate::builder::toolchain::OptionalLib;
use crate::util::errors::Result;
use crate::util::fs::{read_to_string, write_string};

/// File name of the configuration inside the project root.
pub const CONFIG_FILE: &str = "config.ini";

/// Name of the native module being built.
pub const MODULE_NAME: &str = "module_name";

/// Optimization level passed to the CMake project.
pub const OPTIMIZE: &str = "optimize";

/// Whether to build with debug symbols (`RelWithDebInfo`).
pub const GENERATE_PDB: &str = "generate_pdb";

/// Verbosity of the interrogate step.
pub const VERBOSE_IGATE: &str = "verbose_igate";

/// Optimization level used when neither the command line nor the config sets one.
pub const DEFAULT_OPTIMIZE: &str = "3";

/// Parse a config boolean. Accepts `1`, `true`, `yes` and `y`, case-insensitively.
pub fn is_truthy(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "y"
    )
}

/// Build configuration as a sorted string map.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Config {
    entries: BTreeMap<String, String>,
}

impl Config {
    /// Create an empty configuration.
    pub fn new() -> Self {
        Config::default()
    }

    /// The configuration written for a fresh project.
    pub fn with_defaults() -> Self {
        let mut config = Config::new();
        config.set(GENERATE_PDB, "1");
        config.set(MODULE_NAME, "");
        config.set(OPTIMIZE, DEFAULT_OPTIMIZE);
        for lib in OptionalLib::ALL {
            config.set(lib.config_key(), "0");
        }
        config.set(VERBOSE_IGATE, "0");
        config
    }

    /// Parse the `key=value` text format.
    pub fn parse(contents: &str) -> Self {
        let mut entries = BTreeMap::new();

        for line in contents.lines() {
            if line.trim().is_empty() {
                continue;
            }

            let Some((key, _)) = line.split_once('=') else {
                tracing::debug!("ignoring config line without `=`: {}", line);
                continue;
            };
            let value = line.rsplit('=').next().unwrap_or_default();

            entries.insert(key.trim().to_string(), value.trim().to_string());
        }

        Config { entries }
    }

    /// Load a configuration file. A missing file is an error.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = read_to_string(path)?;
        Ok(Config::parse(&contents))
    }

    /// Render the file contents: one `key=value` line per entry, sorted by key.
    pub fn to_file_string(&self) -> String {
        self.entries
            .iter()
            .map(|(k, v)| format!("{}={}\n", k, v))
            .collect()
    }

    /// Overwrite `path` with this configuration.
    pub fn save(&self, path: &Path) -> Result<()> {
        write_string(path, &self.to_file_string())
    }

    /// Get a raw value.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    /// Set a value, replacing any previous one.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.entries.insert(key.into(), value.into());
    }

    /// Check if a key is present.
    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Iterate entries in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// The configured module name, if set and not blank.
    pub fn module_name(&self) -> Option<&str> {
        self.get(MODULE_NAME).map(str::trim).filter(|s| !s.is_empty())
    }

    /// Whether debug symbols should be generated.
    pub fn generate_pdb(&self) -> bool {
        self.get(GENERATE_PDB).is_some_and(is_truthy)
    }

    /// Whether the given optional library is marked as required.
    pub fn requires(&self, lib: OptionalLib) -> bool {
        self.get(lib.config_key()).is_some_and(is_truthy)
    }

    /// CMake build type selected by the `generate_pdb` flag.
    pub fn build_type(&self) -> &'static str {
        if self.generate_pdb() {
            "RelWithDebInfo"
        } else {
            "Release"
        }
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Config {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Config {
            entries: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}
