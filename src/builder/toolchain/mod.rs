//! Platform and toolchain facts.
//!
//! Host OS predicates come from the running binary's target OS. Bitness and
//! compiler come from what the Panda3D SDK reports about itself, not from
//! the host, because the extension must match the SDK it links against.

pub mod detect;
pub mod msvc;

use std::fmt;

pub use detect::{find_python, probe_sdk, SdkInfo};
pub use msvc::{match_msvc_version, MsvcVersion, MSVC_VERSIONS};

/// Operating system the build runs on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HostOs {
    Windows,
    Linux,
    MacOs,
    FreeBsd,
    Other,
}

impl HostOs {
    /// The OS this binary was compiled for.
    pub fn current() -> Self {
        HostOs::from_os_str(std::env::consts::OS)
    }

    /// Map an OS identifier (`windows`, `linux`, `macos`/`darwin`, `freebsd`).
    pub fn from_os_str(os: &str) -> Self {
        match os.to_ascii_lowercase().as_str() {
            "windows" => HostOs::Windows,
            "linux" => HostOs::Linux,
            "macos" | "darwin" => HostOs::MacOs,
            "freebsd" => HostOs::FreeBsd,
            _ => HostOs::Other,
        }
    }

    pub fn is_windows(self) -> bool {
        self == HostOs::Windows
    }

    pub fn is_linux(self) -> bool {
        self == HostOs::Linux
    }

    pub fn is_macos(self) -> bool {
        self == HostOs::MacOs
    }

    pub fn is_freebsd(self) -> bool {
        self == HostOs::FreeBsd
    }

    /// Extension of a compiled Python module on this OS.
    pub fn module_extension(self) -> &'static str {
        if self.is_windows() {
            "pyd"
        } else {
            "so"
        }
    }
}

impl fmt::Display for HostOs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            HostOs::Windows => "windows",
            HostOs::Linux => "linux",
            HostOs::MacOs => "macos",
            HostOs::FreeBsd => "freebsd",
            HostOs::Other => std::env::consts::OS,
        };
        f.write_str(name)
    }
}

/// Whether an SDK platform string (e.g. `win_amd64`) describes a 64-bit build.
pub fn is_64_bit_platform(platform: &str) -> bool {
    let platform = platform.to_ascii_lowercase();
    ["amd64", "x86_64", "aarch64", "arm64"]
        .iter()
        .any(|suffix| platform.ends_with(suffix))
}

/// Compiler family, from the first word of the SDK's compiler string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompilerFamily {
    Msc,
    Gcc,
    Clang,
    Other(String),
}

impl CompilerFamily {
    /// Parse e.g. `MSC v.1900 64 bit (AMD64)` or `GCC 9.3.0`.
    pub fn from_compiler_string(compiler: &str) -> Self {
        let first = compiler
            .split_whitespace()
            .next()
            .unwrap_or_default()
            .to_ascii_uppercase();
        match first.as_str() {
            "MSC" => CompilerFamily::Msc,
            "GCC" => CompilerFamily::Gcc,
            "CLANG" => CompilerFamily::Clang,
            _ => CompilerFamily::Other(first),
        }
    }
}

impl fmt::Display for CompilerFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompilerFamily::Msc => f.write_str("MSC"),
            CompilerFamily::Gcc => f.write_str("GCC"),
            CompilerFamily::Clang => f.write_str("CLANG"),
            CompilerFamily::Other(name) => f.write_str(name),
        }
    }
}

/// Optional Panda3D components the native module may depend on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OptionalLib {
    Eigen,
    Bullet,
    Freetype,
}

impl OptionalLib {
    pub const ALL: [OptionalLib; 3] = [OptionalLib::Eigen, OptionalLib::Bullet, OptionalLib::Freetype];

    /// Lowercase name used in config keys and probe output.
    pub fn name(self) -> &'static str {
        match self {
            OptionalLib::Eigen => "eigen",
            OptionalLib::Bullet => "bullet",
            OptionalLib::Freetype => "freetype",
        }
    }

    /// Config key marking the library as required.
    pub fn config_key(self) -> &'static str {
        match self {
            OptionalLib::Eigen => "require_lib_eigen",
            OptionalLib::Bullet => "require_lib_bullet",
            OptionalLib::Freetype => "require_lib_freetype",
        }
    }

    /// CMake definition announcing the library.
    pub fn cmake_flag(self) -> &'static str {
        match self {
            OptionalLib::Eigen => "-DHAVE_LIB_EIGEN=TRUE",
            OptionalLib::Bullet => "-DHAVE_LIB_BULLET=TRUE",
            OptionalLib::Freetype => "-DHAVE_LIB_FREETYPE=TRUE",
        }
    }
}

impl fmt::Display for OptionalLib {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_host_os_from_identifier() {
        assert!(HostOs::from_os_str("windows").is_windows());
        assert!(HostOs::from_os_str("Linux").is_linux());
        assert!(HostOs::from_os_str("darwin").is_macos());
        assert!(HostOs::from_os_str("macos").is_macos());
        assert!(HostOs::from_os_str("freebsd").is_freebsd());
        assert_eq!(HostOs::from_os_str("haiku"), HostOs::Other);
    }

    #[test]
    fn test_predicates_are_exclusive() {
        let os = HostOs::Linux;
        assert!(!os.is_windows() && !os.is_macos() && !os.is_freebsd());
    }

    #[test]
    fn test_64_bit_platform() {
        assert!(is_64_bit_platform("win_amd64"));
        assert!(is_64_bit_platform("linux_x86_64"));
        assert!(is_64_bit_platform("macosx-11.0-arm64"));
        assert!(!is_64_bit_platform("win32"));
        assert!(!is_64_bit_platform("linux_i386"));
    }

    #[test]
    fn test_compiler_family() {
        assert_eq!(
            CompilerFamily::from_compiler_string("MSC v.1900 64 bit (AMD64)"),
            CompilerFamily::Msc
        );
        assert_eq!(CompilerFamily::from_compiler_string("GCC 9.3.0"), CompilerFamily::Gcc);
        assert_eq!(
            CompilerFamily::from_compiler_string("clang 12.0.0"),
            CompilerFamily::Clang
        );
        assert_eq!(
            CompilerFamily::from_compiler_string("icc 19"),
            CompilerFamily::Other("ICC".into())
        );
        assert_eq!(CompilerFamily::Gcc.to_string(), "GCC");
    }

    #[test]
    fn test_optional_lib_names() {
        assert_eq!(OptionalLib::Bullet.config_key(), "require_lib_bullet");
        assert_eq!(OptionalLib::Freetype.cmake_flag(), "-DHAVE_LIB_FREETYPE=TRUE");
        assert_eq!(OptionalLib::Eigen.to_string(), "eigen");
    }
}
