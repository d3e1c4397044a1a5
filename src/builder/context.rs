//! Everything known about the toolchain before CMake runs.

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use super::sdk::{is_headerless_install, SdkLayout};
use super::toolchain::{find_python, match_msvc_version, probe_sdk, HostOs, MsvcVersion, SdkInfo};
use crate::util::errors::Result;
use crate::util::GlobalContext;

/// Probe results and resolved SDK paths for one configuration.
#[derive(Debug, Clone)]
pub struct BuildContext {
    pub host: HostOs,
    pub sdk: SdkInfo,
    pub layout: SdkLayout,
    /// Matched Visual Studio version (Windows only)
    pub msvc: Option<&'static MsvcVersion>,
    /// panda3d came from pip and ships no headers
    pub headerless: bool,
    /// A pre-1.10 SDK ships `core.lib` in its lib dir
    pub legacy_core_lib: bool,
    /// Third-party package directory, resolved on first use
    pub thirdparty: OnceLock<PathBuf>,
}

impl BuildContext {
    /// Probe the SDK through the configured interpreter and resolve
    /// everything the CMake arguments depend on.
    pub fn discover(gctx: &GlobalContext) -> Result<Self> {
        let python = find_python(gctx.python())?;
        let sdk = probe_sdk(&python)?;
        Self::from_sdk(HostOs::current(), sdk, gctx.sdk_override())
    }

    /// Resolve the remaining facts for an already probed SDK.
    pub fn from_sdk(host: HostOs, sdk: SdkInfo, sdk_override: Option<&Path>) -> Result<Self> {
        let layout = SdkLayout::new(host, &sdk, sdk_override);

        let msvc = if host.is_windows() {
            Some(match_msvc_version(&sdk.compiler)?)
        } else {
            None
        };

        let legacy_core_lib = if sdk.is_modern() {
            false
        } else {
            layout.lib_dir()?.join("core.lib").is_file()
        };

        let headerless = is_headerless_install(&sdk, sdk_override);

        Ok(BuildContext {
            host,
            sdk,
            layout,
            msvc,
            headerless,
            legacy_core_lib,
            thirdparty: OnceLock::new(),
        })
    }

    /// Windows third-party package directory.
    ///
    /// Only the CMake configure step needs it, so it is looked up on the first
    /// call rather than during discovery. `None` on every other host.
    pub fn thirdparty_dir(&self) -> Result<Option<&Path>> {
        let Some(msvc) = self.msvc else {
            return Ok(None);
        };
        if let Some(dir) = self.thirdparty.get() {
            return Ok(Some(dir.as_path()));
        }

        let dir = self.layout.thirdparty_dir(msvc, self.sdk.is_64_bit())?;
        Ok(Some(self.thirdparty.get_or_init(|| dir).as_path()))
    }

    /// Name of the per-configuration output directory, e.g.
    /// `win_amd64_panda1.10.13_py39_vc140` or `linux_x86_64_panda1.10.13_py38`.
    pub fn output_dir_name(&self) -> String {
        let compiler_suffix = self
            .msvc
            .map(|m| format!("_{}", m.suffix))
            .unwrap_or_default();

        format!(
            "{}_panda{}_py{}{}{}",
            self.sdk.platform.to_lowercase(),
            self.sdk.version_string,
            self.sdk.python_version.0,
            self.sdk.python_version.1,
            compiler_suffix
        )
    }

    /// Output directory below the project root.
    pub fn output_dir(&self, project_root: &Path) -> PathBuf {
        project_root.join(self.output_dir_name())
    }
}
