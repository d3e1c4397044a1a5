//! Visual Studio versions a Panda3D SDK may have been built with.

use crate::util::errors::{BuildError, Result};

/// A compiler descriptor: MSC version, CMake generator and short suffix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MsvcVersion {
    /// Value of `_MSC_VER`
    pub version: u32,
    /// CMake generator name
    pub generator: &'static str,
    /// Short platform suffix, e.g. `vc140`
    pub suffix: &'static str,
}

impl MsvcVersion {
    const fn new(version: u32, generator: &'static str, suffix: &'static str) -> Self {
        MsvcVersion {
            version,
            generator,
            suffix,
        }
    }

    /// Substring identifying this version in the SDK's compiler string.
    pub fn search_string(&self) -> String {
        format!("MSC v.{}", self.version)
    }

    /// Suffix used by the third-party package directories (`vc14` for `vc140`).
    pub fn thirdparty_suffix(&self) -> &'static str {
        self.suffix.strip_suffix('0').unwrap_or(self.suffix)
    }
}

/// Known versions, oldest first. The first match wins.
pub const MSVC_VERSIONS: [MsvcVersion; 6] = [
    MsvcVersion::new(1400, "Visual Studio 8 2005", "vc80"),
    MsvcVersion::new(1500, "Visual Studio 9 2008", "vc90"),
    MsvcVersion::new(1600, "Visual Studio 10 2010", "vc100"),
    MsvcVersion::new(1700, "Visual Studio 11 2012", "vc110"),
    MsvcVersion::new(1800, "Visual Studio 12 2013", "vc120"),
    MsvcVersion::new(1900, "Visual Studio 14 2015", "vc140"),
];

/// Find the descriptor whose search string occurs in `compiler`.
pub fn match_msvc_version(compiler: &str) -> Result<&'static MsvcVersion> {
    if let Some(found) = MSVC_VERSIONS
        .iter()
        .find(|v| compiler.contains(&v.search_string()))
    {
        return Ok(found);
    }

    let known: Vec<String> = MSVC_VERSIONS
        .iter()
        .map(|v| format!("{} ({})", v.generator, v.search_string()))
        .collect();

    tracing::error!("unable to detect visual studio version of your Panda3D build");
    tracing::error!("unknown compiler string was: '{}'", compiler);
    for entry in &known {
        tracing::error!("- {}", entry);
    }

    Err(BuildError::UnknownCompiler {
        compiler: compiler.to_string(),
        known,
    })
}
