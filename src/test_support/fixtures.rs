//! Test fixtures for common test scenarios.
//!
//! Probe results for the three supported desktop platforms, build contexts
//! derived from them without touching the filesystem, and helpers that lay
//! out a fake SDK or project on disk.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use tempfile::TempDir;

use crate::builder::context::BuildContext;
use crate::builder::sdk::SdkLayout;
use crate::builder::toolchain::{HostOs, OptionalLib, SdkInfo, MSVC_VERSIONS};
use crate::util::config::CONFIG_FILE;

fn all_components() -> BTreeMap<String, bool> {
    OptionalLib::ALL
        .iter()
        .map(|lib| (lib.name().to_string(), true))
        .collect()
}

/// Panda3D 1.10.13 from the distribution packages, Python 3.8.
pub fn sdk_info_linux() -> SdkInfo {
    SdkInfo {
        python_executable: PathBuf::from("/usr/bin/python3"),
        python_version: (3, 8),
        panda3d_dir: PathBuf::from("/usr/lib/python3/dist-packages/panda3d"),
        core_module: PathBuf::from(
            "/usr/lib/python3/dist-packages/panda3d/core.cpython-38-x86_64-linux-gnu.so",
        ),
        dtool_name: PathBuf::from("/usr/lib/x86_64-linux-gnu/panda3d/libp3dtool.so.1.10"),
        version_string: "1.10.13".into(),
        major_version: 1,
        minor_version: 10,
        platform: "linux_x86_64".into(),
        compiler: "GCC 9.3.0".into(),
        components: all_components(),
    }
}

/// The 64-bit Windows SDK installer with its bundled Python 3.9.
pub fn sdk_info_windows() -> SdkInfo {
    SdkInfo {
        python_executable: PathBuf::from("C:/Panda3D-1.10.13-x64/python/python.exe"),
        python_version: (3, 9),
        panda3d_dir: PathBuf::from("C:/Panda3D-1.10.13-x64/panda3d"),
        core_module: PathBuf::from("C:/Panda3D-1.10.13-x64/panda3d/core.pyd"),
        dtool_name: PathBuf::from("C:/Panda3D-1.10.13-x64/bin/libp3dtool.dll"),
        version_string: "1.10.13".into(),
        major_version: 1,
        minor_version: 10,
        platform: "win_amd64".into(),
        compiler: "MSC v.1900 64 bit (AMD64)".into(),
        components: all_components(),
    }
}

/// The macOS SDK image, Python 3.9.
pub fn sdk_info_macos() -> SdkInfo {
    SdkInfo {
        python_executable: PathBuf::from("/usr/local/bin/python3.9"),
        python_version: (3, 9),
        panda3d_dir: PathBuf::from("/Developer/Panda3D/panda3d"),
        core_module: PathBuf::from("/Developer/Panda3D/panda3d/core.cpython-39-darwin.so"),
        dtool_name: PathBuf::from("/Developer/Panda3D/lib/libp3dtool.1.10.dylib"),
        version_string: "1.10.13".into(),
        major_version: 1,
        minor_version: 10,
        platform: "macosx-10.9-x86_64".into(),
        compiler: "Clang 4.2.1 Compatible Apple LLVM 11.0.0 (clang-1100.0.33.8)".into(),
        components: all_components(),
    }
}

/// A context for `host` assembled directly from the matching probe fixture.
///
/// Unlike [`BuildContext::from_sdk`] nothing is looked up on disk; the
/// Windows third-party directory is filled in up front.
pub fn build_context(host: HostOs) -> BuildContext {
    let sdk = match host {
        HostOs::Windows => sdk_info_windows(),
        HostOs::MacOs => sdk_info_macos(),
        _ => sdk_info_linux(),
    };

    let (msvc, thirdparty) = if host.is_windows() {
        (
            Some(&MSVC_VERSIONS[5]),
            OnceLock::from(PathBuf::from(
                "C:/Panda3D-1.10.13-x64/thirdparty/win-libs-vc14-x64",
            )),
        )
    } else {
        (None, OnceLock::new())
    };

    BuildContext {
        host,
        layout: SdkLayout::new(host, &sdk, None),
        sdk,
        msvc,
        headerless: false,
        legacy_core_lib: false,
        thirdparty,
    }
}

/// Lay out a Linux-style SDK below `root` and return a probe result
/// pointing at it.
pub fn fake_linux_sdk(root: &Path) -> SdkInfo {
    for dir in ["bin", "include", "lib", "panda3d"] {
        fs::create_dir_all(root.join(dir)).unwrap();
    }
    fs::write(root.join("bin/interrogate"), "").unwrap();
    fs::write(root.join("bin/interrogate_module"), "").unwrap();
    fs::write(root.join("include/dtoolbase.h"), "").unwrap();
    fs::write(root.join("lib/libp3dtool.so.1.10"), "").unwrap();

    let mut sdk = sdk_info_linux();
    sdk.panda3d_dir = root.join("panda3d");
    sdk.core_module = root.join("panda3d/core.so");
    sdk.dtool_name = root.join("lib/libp3dtool.so.1.10");
    sdk
}

/// A project directory with a `source/` folder and, if given, a `config.ini`.
pub fn project(config: Option<&str>) -> TempDir {
    let tmp = TempDir::new().unwrap();
    fs::create_dir_all(tmp.path().join("source")).unwrap();
    if let Some(contents) = config {
        fs::write(tmp.path().join(CONFIG_FILE), contents).unwrap();
    }
    tmp
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixtures_match_their_host() {
        assert!(build_context(HostOs::Windows).msvc.is_some());
        assert!(build_context(HostOs::Linux).msvc.is_none());
        assert!(sdk_info_macos().is_64_bit());
    }

    #[test]
    fn test_fake_sdk_layout_resolves() {
        let tmp = TempDir::new().unwrap();
        let sdk = fake_linux_sdk(tmp.path());
        let layout = SdkLayout::new(HostOs::Linux, &sdk, None);

        assert!(layout.bin_dir().unwrap().join("interrogate").is_file());
        assert!(layout.include_dir().unwrap().join("dtoolbase.h").is_file());
    }
}
