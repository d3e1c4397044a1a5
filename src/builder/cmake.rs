//! CMake invocation for the native module.
//!
//! Argument assembly is pure: [`configure_args`] and [`build_args`] only read
//! the configuration and the [`BuildContext`]. Running the commands is left
//! to a [`CommandRunner`].

use std::path::{Path, PathBuf};

use super::context::BuildContext;
use super::toolchain::{HostOs, OptionalLib};
use crate::util::config::{Config, DEFAULT_OPTIMIZE, OPTIMIZE, VERBOSE_IGATE};
use crate::util::errors::{BuildError, Result};
use crate::util::process::{find_cmake, CommandRunner, ProcessBuilder};

/// Output lines kept in the diagnosis of an unrecognised CMake failure.
const ERROR_TAIL_LINES: usize = 20;

/// Assemble the `-D`/`-G` arguments for the configure step.
///
/// Fails if the SDK ships no headers, or if a library marked as required
/// in the config is not part of the SDK.
pub fn configure_args(config: &Config, optimize: Option<u32>, ctx: &BuildContext) -> Result<Vec<String>> {
    let sdk = &ctx.sdk;
    let mut args = Vec::new();

    args.push(format!("-DCMAKE_BUILD_TYPE={}", config.build_type()));
    args.push(format!(
        "-DPYTHON_EXECUTABLE:STRING={}",
        sdk.python_executable.display()
    ));
    args.push(format!(
        "-DPROJECT_NAME:STRING={}",
        config.module_name().ok_or(BuildError::ModuleNameMissing)?
    ));

    if ctx.headerless {
        return Err(BuildError::HeadersMissing {
            panda3d_dir: sdk.panda3d_dir.clone(),
        });
    }

    args.push(format!("-DINTERROGATE_LIB:STRING={}", interrogate_lib(ctx)));

    if ctx.host.is_windows() {
        if let Some(msvc) = ctx.msvc {
            let bit_suffix = if sdk.is_64_bit() { " Win64" } else { "" };
            args.push(format!("-G{}{}", msvc.generator, bit_suffix));
        }
    }
    if ctx.host.is_macos() {
        args.push("-DCMAKE_CL_64:STRING=1".to_string());
    }

    let (py_major, py_minor) = sdk.python_version;
    if ctx.host.is_windows() {
        args.push(format!("-DPYTHONVER:STRING={}{}", py_major, py_minor));
    }
    if ctx.host.is_linux() || ctx.host.is_freebsd() {
        args.push(format!("-DPYTHONVERDOT:STRING={}.{}", py_major, py_minor));
    }

    let thirdparty = match ctx.thirdparty_dir()? {
        Some(dir) if ctx.host.is_windows() => dir.display().to_string(),
        _ => String::new(),
    };
    args.push(format!("-DTHIRDPARTY_DIR:STRING={}", thirdparty));

    for lib in OptionalLib::ALL {
        let present = sdk.has_component(lib);
        if config.requires(lib) && !present {
            tracing::error!(
                "your Panda3D build was not compiled with {} support, but it is required",
                lib
            );
            return Err(BuildError::MissingLibrary { library: lib });
        }
        if present {
            args.push(lib.cmake_flag().to_string());
        }
    }

    let optimize = match optimize {
        Some(level) => level.to_string(),
        None => config.get(OPTIMIZE).unwrap_or(DEFAULT_OPTIMIZE).to_string(),
    };
    args.push(format!("-DOPTIMIZE={}", optimize));

    args.push(format!(
        "-DIGATE_VERBOSE={}",
        config.get(VERBOSE_IGATE).unwrap_or("0")
    ));

    Ok(args)
}

/// Name of the library providing the interrogate database.
///
/// 1.10+ ships `p3interrogatedb`. Older SDKs have it inside `core`, except
/// buildbot builds which only have `libpanda`.
pub fn interrogate_lib(ctx: &BuildContext) -> String {
    let lib_prefix = if ctx.host.is_windows() { "lib" } else { "" };

    if ctx.sdk.is_modern() {
        format!("{}p3interrogatedb", lib_prefix)
    } else if ctx.legacy_core_lib {
        "core".to_string()
    } else {
        format!("{}panda", lib_prefix)
    }
}

/// Parallel jobs for the native build tool: all logical CPUs but one.
pub fn default_jobs() -> usize {
    let cpus = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    cpus.saturating_sub(1).max(1)
}

/// Arguments for `cmake --build` inside the output directory.
pub fn build_args(config: &Config, host: HostOs, jobs: usize) -> Vec<String> {
    let mut args = vec![
        "--build".to_string(),
        ".".to_string(),
        "--config".to_string(),
        config.build_type().to_string(),
    ];

    match host {
        // MSBuild picks the CPU count itself when none is given.
        HostOs::Windows => args.extend(["--".to_string(), "/m".to_string()]),
        HostOs::Linux | HostOs::MacOs | HostOs::FreeBsd => {
            args.extend(["--".to_string(), format!("-j{}", jobs.max(1))])
        }
        HostOs::Other => {}
    }

    args
}

/// Turn CMake's configure output into an actionable message.
pub fn format_cmake_error(output: &str, ctx: &BuildContext) -> String {
    let mut lines = vec!["CMake Error:".to_string()];

    if output.contains("Re-run cmake with a different source directory.") {
        lines.push("You moved the project folder, please add ' --clean' to the command line.".into());
    } else if output.contains("No CMAKE_CXX_COMPILER could be found.")
        || output.contains("No CMAKE_C_COMPILER could be found.")
    {
        lines.push("Could not find the required compiler!".into());
        match ctx.msvc {
            Some(msvc) if ctx.host.is_windows() => {
                let bitness = if ctx.sdk.is_64_bit() { " 64 bit" } else { "" };
                lines.push("Please make sure you installed the following compiler:".into());
                lines.push(format!("{}{}", msvc.generator, bitness));
            }
            _ => lines.push(format!("The required compiler is: {}", ctx.sdk.compiler)),
        }
    } else {
        let tail: Vec<&str> = output.lines().rev().take(ERROR_TAIL_LINES).collect();
        lines.extend(tail.into_iter().rev().map(str::to_string));
    }

    lines.join("\n")
}

/// The `cmake` executable and the project it configures.
pub struct CMake {
    program: PathBuf,
    source_dir: PathBuf,
}

impl CMake {
    /// Locate `cmake` on PATH.
    pub fn locate(source_dir: impl Into<PathBuf>) -> Result<Self> {
        let program = find_cmake().ok_or_else(|| BuildError::PathNotFound {
            message: "CMake is required to build the native module. Install CMake and ensure it's in your PATH.".into(),
            attempted: vec![PathBuf::from("cmake")],
        })?;
        Ok(Self::with_program(program, source_dir))
    }

    /// Use a specific `cmake` binary.
    pub fn with_program(program: impl Into<PathBuf>, source_dir: impl Into<PathBuf>) -> Self {
        CMake {
            program: program.into(),
            source_dir: source_dir.into(),
        }
    }

    /// The configure command, run inside `build_dir`.
    pub fn configure_command(&self, build_dir: &Path, args: &[String]) -> ProcessBuilder {
        ProcessBuilder::new(&self.program)
            .arg(&self.source_dir)
            .args(args)
            .cwd(build_dir)
    }

    /// The build command, run inside `build_dir`.
    pub fn build_command(&self, build_dir: &Path, args: &[String]) -> ProcessBuilder {
        ProcessBuilder::new(&self.program).args(args).cwd(build_dir)
    }

    /// Run the configure step, explaining common failures.
    pub fn configure(
        &self,
        runner: &mut dyn CommandRunner,
        build_dir: &Path,
        args: &[String],
        ctx: &BuildContext,
    ) -> Result<()> {
        tracing::info!("configuring CMake project in {}", build_dir.display());
        let formatter = |output: &str| format_cmake_error(output, ctx);
        runner.run(&self.configure_command(build_dir, args), Some(&formatter))
    }

    /// Run the build step.
    pub fn build(&self, runner: &mut dyn CommandRunner, build_dir: &Path, args: &[String]) -> Result<()> {
        tracing::info!("building CMake project in {}", build_dir.display());
        runner.run(&self.build_command(build_dir, args), None)
    }
}
