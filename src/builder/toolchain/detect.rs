//! Panda3D SDK detection.
//!
//! Everything the build needs to know about the SDK comes from one run of
//! the Python interpreter that has `panda3d` installed. A small script
//! prints a JSON object which is deserialized into [`SdkInfo`].

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::{is_64_bit_platform, CompilerFamily, OptionalLib};
use crate::util::errors::{BuildError, Result};
use crate::util::process::{decode_lossy, find_executable, ProcessBuilder};

/// Interpreters searched on PATH, in order, when none is configured.
pub const PYTHON_CANDIDATES: [&str; 3] = ["python3", "python", "ppython"];

/// Queries the SDK. Each optional component is probed inside its own
/// `try`, so any failure there reports the component as absent.
const PROBE_SCRIPT: &str = r#"
import json, os, sys
import panda3d
import panda3d.core
from panda3d.core import PandaSystem, ExecutionEnvironment

ps = PandaSystem.get_global_ptr()

def has(system, module=None):
    try:
        if module:
            __import__(module)
        return bool(ps.has_system(system))
    except Exception:
        return False

print(json.dumps({
    "python_executable": sys.executable,
    "python_version": [sys.version_info[0], sys.version_info[1]],
    "panda3d_dir": os.path.dirname(panda3d.__file__),
    "core_module": panda3d.core.__file__,
    "dtool_name": ExecutionEnvironment.get_dtool_name(),
    "version_string": PandaSystem.get_version_string(),
    "major_version": PandaSystem.get_major_version(),
    "minor_version": PandaSystem.get_minor_version(),
    "platform": PandaSystem.get_platform(),
    "compiler": PandaSystem.get_compiler(),
    "components": {
        "eigen": has("eigen"),
        "bullet": has("Bullet", "panda3d.bullet"),
        "freetype": has("Freetype"),
    },
}))
"#;

/// Facts reported by the Python interpreter and its Panda3D SDK.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SdkInfo {
    /// Interpreter the module is built for
    pub python_executable: PathBuf,
    /// `(major, minor)` of that interpreter
    pub python_version: (u32, u32),
    /// Directory of the `panda3d` package
    pub panda3d_dir: PathBuf,
    /// File of the `panda3d.core` extension module
    pub core_module: PathBuf,
    /// Path of the loaded dtool library
    pub dtool_name: PathBuf,
    pub version_string: String,
    pub major_version: u32,
    pub minor_version: u32,
    /// Target platform of the SDK, e.g. `win_amd64`
    pub platform: String,
    /// Compiler string, e.g. `MSC v.1900 64 bit (AMD64)`
    pub compiler: String,
    #[serde(default)]
    pub components: BTreeMap<String, bool>,
}

impl SdkInfo {
    /// Parse the probe script's output.
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json.trim())
    }

    /// 1.10 and later ship `p3interrogatedb` and the newer interrogate flags.
    pub fn is_modern(&self) -> bool {
        self.major_version > 1 || (self.major_version == 1 && self.minor_version > 9)
    }

    /// 1.x releases before 1.10.
    pub fn is_legacy_1x(&self) -> bool {
        self.major_version == 1 && self.minor_version < 10
    }

    pub fn is_64_bit(&self) -> bool {
        is_64_bit_platform(&self.platform)
    }

    pub fn compiler_family(&self) -> CompilerFamily {
        CompilerFamily::from_compiler_string(&self.compiler)
    }

    /// Whether the SDK includes `lib`. Anything other than a positive probe
    /// result, including a missing entry, means absent.
    pub fn has_component(&self, lib: OptionalLib) -> bool {
        self.components.get(lib.name()).copied().unwrap_or(false)
    }

    /// Version with every `.0` removed, as used in some package names.
    pub fn short_version(&self) -> String {
        self.version_string.replace(".0", "")
    }

    /// Directory holding the interpreter.
    pub fn python_dir(&self) -> &Path {
        self.python_executable
            .parent()
            .unwrap_or_else(|| Path::new("."))
    }
}

/// Pick the Python interpreter: explicit choice first, then PATH.
pub fn find_python(explicit: Option<&Path>) -> Result<PathBuf> {
    if let Some(python) = explicit {
        return Ok(python.to_path_buf());
    }

    PYTHON_CANDIDATES
        .iter()
        .find_map(|name| find_executable(name))
        .ok_or_else(|| BuildError::PythonNotFound {
            tried: PYTHON_CANDIDATES.iter().map(|s| s.to_string()).collect(),
        })
}

/// Run the probe script with `python` and parse the result.
pub fn probe_sdk(python: &Path) -> Result<SdkInfo> {
    tracing::debug!("probing Panda3D SDK with {}", python.display());

    let output = ProcessBuilder::new(python)
        .arg("-c")
        .arg(PROBE_SCRIPT)
        .env("PYTHONIOENCODING", "utf-8")
        .exec()
        .map_err(|e| BuildError::SdkProbe {
            python: python.to_path_buf(),
            message: e.to_string(),
        })?;

    if !output.status.success() {
        let stderr = decode_lossy(&output.stderr);
        let last = stderr
            .lines()
            .rev()
            .find(|l| !l.trim().is_empty())
            .unwrap_or("interpreter exited with an error")
            .trim()
            .to_string();
        return Err(BuildError::SdkProbe {
            python: python.to_path_buf(),
            message: last,
        });
    }

    let stdout = decode_lossy(&output.stdout);
    let info = SdkInfo::from_json(&stdout).map_err(|e| BuildError::SdkProbe {
        python: python.to_path_buf(),
        message: format!("unexpected probe output: {}", e),
    })?;

    tracing::debug!(
        "found Panda3D {} ({}, {}) for Python {}.{}",
        info.version_string,
        info.platform,
        info.compiler,
        info.python_version.0,
        info.python_version.1
    );

    Ok(info)
}
