//! Binding generation with Panda3D's `interrogate` tools.
//!
//! `interrogate` parses the module's headers into `interrogate.in` and
//! `interrogate_wrapper.cpp`. `interrogate_module` then produces the module
//! init code in `interrogate_module.cpp`. Both run inside the source dir.

use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use super::toolchain::{CompilerFamily, SdkInfo};
use crate::util::errors::{BuildError, Result};
use crate::util::fs::relative_path;
use crate::util::process::ProcessBuilder;

/// Generated files that must never be fed back into interrogate.
const GENERATED: [&str; 2] = ["interrogate_module.cpp", "interrogate_wrapper.cpp"];

/// Inputs of one interrogate run.
#[derive(Debug, Clone)]
pub struct InterrogateJob<'a> {
    pub module: &'a str,
    pub verbose: u8,
    pub source_dir: &'a Path,
    pub bin_dir: &'a Path,
    pub include_dir: &'a Path,
    pub sdk: &'a SdkInfo,
}

fn is_generated(name: &str) -> bool {
    let lower = name.to_ascii_lowercase();
    GENERATED.iter().any(|g| lower.contains(g))
}

/// All headers below `source_dir`, relative to it and sorted.
///
/// Protobuf headers (`*.pb.h`) and generated files are skipped.
pub fn find_sources(source_dir: &Path) -> Result<Vec<PathBuf>> {
    let mut sources = Vec::new();

    for entry in WalkDir::new(source_dir).follow_links(true) {
        let entry = entry.map_err(|e| {
            let path = e.path().unwrap_or(source_dir).to_path_buf();
            BuildError::io(path, e.into())
        })?;
        if !entry.file_type().is_file() {
            continue;
        }

        let name = entry.file_name().to_string_lossy();
        if !name.ends_with(".h") || name.ends_with(".pb.h") || is_generated(&name) {
            continue;
        }

        sources.push(relative_path(source_dir, entry.path()));
    }

    sources.sort();
    Ok(sources)
}

/// Immediate subdirectories of `source_dir`, used as include paths.
pub fn include_subdirs(source_dir: &Path) -> Result<Vec<String>> {
    let entries = std::fs::read_dir(source_dir).map_err(|e| BuildError::io(source_dir, e))?;

    let mut dirs = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| BuildError::io(source_dir, e))?;
        if entry.path().is_dir() {
            dirs.push(entry.file_name().to_string_lossy().into_owned());
        }
    }
    dirs.sort();
    Ok(dirs)
}

/// Preprocessor defines needed to parse Panda3D headers with this compiler.
pub fn parser_defines(sdk: &SdkInfo) -> Vec<&'static str> {
    let mut defines = vec!["INTERROGATE", "CPPPARSER", "__STDC__=1", "__cplusplus=201103L"];
    let is_64_bit = sdk.is_64_bit();

    match sdk.compiler_family() {
        CompilerFamily::Msc => {
            defines.extend(["__inline", "_X86_", "WIN32_VC", "WIN32", "_WIN32"]);
            if is_64_bit {
                defines.extend(["WIN64_VC", "WIN64", "_WIN64"]);
            }
            // 1600 is VC2010; interrogate only needs a plausible value.
            defines.extend([
                "_MSC_VER=1600",
                "\"__declspec(param)=\"",
                "__cdecl",
                "_near",
                "_far",
                "__near",
                "__far",
                "__stdcall",
            ]);
        }
        CompilerFamily::Gcc => {
            defines.push("__attribute__(x)=");
            defines.push(if is_64_bit { "_LP64" } else { "__i386__" });
        }
        CompilerFamily::Clang | CompilerFamily::Other(_) => {}
    }

    defines
}

fn tool_path(bin_dir: &Path, name: &str) -> PathBuf {
    bin_dir.join(format!("{}{}", name, std::env::consts::EXE_SUFFIX))
}

/// The `interrogate` command for `sources` and `subdirs`.
pub fn interrogate_command(job: &InterrogateJob<'_>, sources: &[PathBuf], subdirs: &[String]) -> ProcessBuilder {
    let mut cmd = ProcessBuilder::new(tool_path(job.bin_dir, "interrogate"));

    match job.verbose {
        0 => {}
        1 => cmd = cmd.arg("-v"),
        _ => cmd = cmd.arg("-vv"),
    }

    cmd = cmd.args(["-fnames", "-string", "-refcount", "-assert", "-python-native"]);
    cmd = cmd.arg(format!("-S{}/parser-inc", job.include_dir.display()));
    cmd = cmd.arg(format!("-S{}/", job.include_dir.display()));

    for dir in subdirs {
        cmd = cmd.arg(format!("-I{}", dir));
    }

    cmd = cmd.args(["-srcdir", ".", "-oc", "interrogate_wrapper.cpp", "-od", "interrogate.in"]);
    cmd = cmd.args(["-module", job.module, "-library", job.module]);

    if job.sdk.is_modern() {
        cmd = cmd.arg("-nomangle");
    }
    if job.sdk.is_legacy_1x() {
        // Old interrogate can't handle volatile.
        cmd = cmd.arg("-Dvolatile=");
    }

    for define in parser_defines(job.sdk) {
        cmd = cmd.arg(format!("-D{}", define));
    }

    cmd.args(sources).cwd(job.source_dir)
}

/// The `interrogate_module` command.
pub fn interrogate_module_command(job: &InterrogateJob<'_>) -> ProcessBuilder {
    let mut cmd = ProcessBuilder::new(tool_path(job.bin_dir, "interrogate_module")).arg("-python-native");

    if job.sdk.is_modern() {
        cmd = cmd.args(["-import", "panda3d.core"]);
    }

    cmd.args(["-module", job.module, "-library", job.module])
        .args(["-oc", "interrogate_module.cpp", "interrogate.in"])
        .cwd(job.source_dir)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::fixtures;
    use std::fs;
    use tempfile::TempDir;

    fn job<'a>(sdk: &'a SdkInfo, source_dir: &'a Path, verbose: u8) -> InterrogateJob<'a> {
        InterrogateJob {
            module: "RSNative",
            verbose,
            source_dir,
            bin_dir: Path::new("/sdk/bin"),
            include_dir: Path::new("/sdk/include"),
            sdk,
        }
    }

    #[test]
    fn test_find_sources_filters_headers() {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path();
        fs::create_dir_all(root.join("pssm")).unwrap();
        fs::write(root.join("ExampleClass.h"), "").unwrap();
        fs::write(root.join("ExampleClass.cpp"), "").unwrap();
        fs::write(root.join("pssm/Camera.h"), "").unwrap();
        fs::write(root.join("pssm/messages.pb.h"), "").unwrap();
        fs::write(root.join("interrogate_wrapper.cpp"), "").unwrap();

        let sources = find_sources(root).unwrap();
        assert_eq!(
            sources,
            vec![PathBuf::from("ExampleClass.h"), Path::new("pssm").join("Camera.h")]
        );
    }

    #[test]
    fn test_include_subdirs() {
        let tmp = TempDir::new().unwrap();
        fs::create_dir_all(tmp.path().join("b_dir")).unwrap();
        fs::create_dir_all(tmp.path().join("a_dir")).unwrap();
        fs::write(tmp.path().join("file.h"), "").unwrap();

        assert_eq!(include_subdirs(tmp.path()).unwrap(), vec!["a_dir", "b_dir"]);
    }

    #[test]
    fn test_interrogate_command_modern_gcc() {
        let sdk = fixtures::sdk_info_linux();
        let job = job(&sdk, Path::new("/project/source"), 2);
        let cmd = interrogate_command(&job, &[PathBuf::from("ExampleClass.h")], &["pssm".to_string()]);
        let args = cmd.get_args();

        assert_eq!(args[0], "-vv");
        assert!(args.contains(&"-S/sdk/include/parser-inc".to_string()));
        assert!(args.contains(&"-Ipssm".to_string()));
        assert!(args.contains(&"-nomangle".to_string()));
        assert!(!args.contains(&"-Dvolatile=".to_string()));
        assert!(args.contains(&"-D__attribute__(x)=".to_string()));
        assert!(args.contains(&"-D_LP64".to_string()));
        assert_eq!(args.last().unwrap(), "ExampleClass.h");
        assert_eq!(cmd.get_cwd(), Some(Path::new("/project/source")));

        let module_pos = args.iter().position(|a| a == "-module").unwrap();
        assert_eq!(args[module_pos + 1], "RSNative");
    }

    #[test]
    fn test_interrogate_command_legacy_msvc() {
        let mut sdk = fixtures::sdk_info_windows();
        sdk.major_version = 1;
        sdk.minor_version = 9;
        let job = job(&sdk, Path::new("."), 0);
        let cmd = interrogate_command(&job, &[], &[]);
        let args = cmd.get_args();

        assert_eq!(args[0], "-fnames");
        assert!(args.contains(&"-Dvolatile=".to_string()));
        assert!(!args.contains(&"-nomangle".to_string()));
        assert!(args.contains(&"-D_WIN64".to_string()));
        assert!(args.contains(&"-D_MSC_VER=1600".to_string()));
    }

    #[test]
    fn test_interrogate_module_command() {
        let sdk = fixtures::sdk_info_linux();
        let job = job(&sdk, Path::new("/project/source"), 0);
        let cmd = interrogate_module_command(&job);

        assert_eq!(
            cmd.get_args(),
            [
                "-python-native",
                "-import",
                "panda3d.core",
                "-module",
                "RSNative",
                "-library",
                "RSNative",
                "-oc",
                "interrogate_module.cpp",
                "interrogate.in"
            ]
        );
    }

    #[test]
    fn test_clang_adds_no_compiler_defines() {
        let sdk = fixtures::sdk_info_macos();
        assert_eq!(parser_defines(&sdk).len(), 4);
    }
}
