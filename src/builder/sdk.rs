//! Locating the Panda3D SDK's binaries, headers and libraries.
//!
//! The search order matters: `LOCAL_PANDA_BUILD` always wins, then the
//! SDK-relative layout for the host OS, then system-wide fallbacks.

use std::path::{Path, PathBuf};

use super::toolchain::{HostOs, MsvcVersion, SdkInfo};
use crate::util::errors::{BuildError, Result};
use crate::util::fs::{absolute_path, first_existing_path, is_subdirectory};

const THIRDPARTY_HINT: &str = "The thirdparty directory could not be found. You can get it from \
https://www.panda3d.org/forums/viewtopic.php?f=9&t=18775 by downloading a prebuilt version or by \
compiling it yourself.";

/// Directory layout of the SDK being built against.
#[derive(Debug, Clone)]
pub struct SdkLayout {
    host: HostOs,
    override_dir: Option<PathBuf>,
    sdk_dir: PathBuf,
    dtool_name: PathBuf,
}

impl SdkLayout {
    /// Derive the layout from the probed SDK and an optional local build directory.
    pub fn new(host: HostOs, sdk: &SdkInfo, override_dir: Option<&Path>) -> Self {
        let sdk_dir = match override_dir {
            Some(dir) => dir.to_path_buf(),
            None => absolute_path(&sdk.panda3d_dir.join("..")),
        };

        SdkLayout {
            host,
            override_dir: override_dir.map(Path::to_path_buf),
            sdk_dir,
            dtool_name: sdk.dtool_name.clone(),
        }
    }

    /// Root of the SDK.
    pub fn sdk_dir(&self) -> &Path {
        &self.sdk_dir
    }

    pub fn is_local_build(&self) -> bool {
        self.override_dir.is_some()
    }

    fn find_in_sdk(&self, folder: &str, marker: &str, on_error: &str) -> Result<PathBuf> {
        first_existing_path(&[folder], Some(marker), Some(&self.sdk_dir), on_error)
    }

    /// Directory with `interrogate` and `interrogate_module`.
    pub fn bin_dir(&self) -> Result<PathBuf> {
        if let Some(dir) = &self.override_dir {
            return Ok(dir.join("bin"));
        }

        match self.host {
            HostOs::Windows => self.find_in_sdk("bin", "interrogate.exe", "Failed to find binary path"),
            HostOs::MacOs => self.find_in_sdk("bin", "interrogate", "Failed to find binary path"),
            HostOs::Linux | HostOs::FreeBsd => {
                let lib = self.lib_dir()?;
                let search = [
                    lib.join("../bin"),
                    PathBuf::from("/usr/bin"),
                    PathBuf::from("/usr/local/bin"),
                ];
                first_existing_path(&search, Some("interrogate"), None, "Failed to find binary path")
            }
            HostOs::Other => Err(self.unsupported()),
        }
    }

    /// Directory with the SDK's link libraries.
    pub fn lib_dir(&self) -> Result<PathBuf> {
        if let Some(dir) = &self.override_dir {
            return Ok(dir.join("lib"));
        }

        match self.host {
            HostOs::Windows => self.find_in_sdk("lib", "libpanda.lib", ""),
            HostOs::Linux | HostOs::MacOs | HostOs::FreeBsd => Ok(self
                .dtool_name
                .parent()
                .map(Path::to_path_buf)
                .unwrap_or_else(|| self.sdk_dir.join("lib"))),
            HostOs::Other => Err(self.unsupported()),
        }
    }

    /// Directory with `dtoolbase.h` and the rest of the headers.
    pub fn include_dir(&self) -> Result<PathBuf> {
        if let Some(dir) = &self.override_dir {
            return Ok(dir.join("include"));
        }

        match self.host {
            HostOs::Windows | HostOs::MacOs => self.find_in_sdk("include", "dtoolbase.h", ""),
            HostOs::Linux | HostOs::FreeBsd => {
                let lib = self.lib_dir()?;
                let search = [
                    lib.join("../include"),
                    PathBuf::from("/usr/include/panda3d"),
                    PathBuf::from("/usr/local/include/panda3d"),
                ];
                first_existing_path(&search, Some("dtoolbase.h"), None, "")
            }
            HostOs::Other => Err(self.unsupported()),
        }
    }

    /// Windows third-party package directory (`thirdparty/win-libs-vc14-x64` and friends).
    pub fn thirdparty_dir(&self, msvc: &MsvcVersion, is_64_bit: bool) -> Result<PathBuf> {
        let candidates = thirdparty_candidates(msvc, is_64_bit);
        first_existing_path(&candidates, None, Some(&self.sdk_dir), THIRDPARTY_HINT)
    }

    fn unsupported(&self) -> BuildError {
        BuildError::UnsupportedPlatform {
            os: self.host.to_string(),
        }
    }
}

/// Every combination of base dir, thirdparty suffix and win-libs suffix, in priority order.
pub fn thirdparty_candidates(msvc: &MsvcVersion, is_64_bit: bool) -> Vec<PathBuf> {
    let bit_suffix = if is_64_bit { "-x64" } else { "" };
    let full_suffix = format!("-{}{}", msvc.thirdparty_suffix(), bit_suffix);

    let bases = [
        ".".to_string(),
        "..".to_string(),
        "../..".to_string(),
        "thirdparty".to_string(),
        format!("thirdparty{}", full_suffix),
    ];
    let suffixes = ["", full_suffix.as_str()];

    let mut candidates = Vec::with_capacity(bases.len() * suffixes.len() * suffixes.len());
    for base in &bases {
        for thirdparty_suffix in suffixes {
            for folder_suffix in suffixes {
                candidates.push(
                    Path::new(base)
                        .join(format!("thirdparty{}", thirdparty_suffix))
                        .join(format!("win-libs{}", folder_suffix)),
                );
            }
        }
    }
    candidates
}

/// Whether `panda3d` was installed into the interpreter's own tree (pip),
/// a layout that ships no headers to build against.
pub fn is_headerless_install(sdk: &SdkInfo, override_dir: Option<&Path>) -> bool {
    override_dir.is_none() && is_subdirectory(sdk.python_dir(), &sdk.panda3d_dir)
}
