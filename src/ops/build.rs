//! Implementation of `p3build build`.
//!
//! The stages run strictly in order and any error aborts the build:
//! config, output directory, CMake configure, CMake build, and optionally
//! copying the module into place.

use std::path::{Path, PathBuf};

use crate::builder::cmake::{build_args, configure_args, default_jobs, CMake};
use crate::builder::BuildContext;
use crate::ops::finalize::{finalize, FinalizeOptions, FinalizeResult};
use crate::util::config::{Config, MODULE_NAME};
use crate::util::errors::{BuildError, Result};
use crate::util::fs::{ensure_dir, remove_dir_all_if_exists};
use crate::util::process::CommandRunner;
use crate::util::shell::{Shell, Status};
use crate::util::GlobalContext;

/// Options for the build command.
#[derive(Debug, Clone, Default)]
pub struct BuildOptions {
    /// Optimization level, overriding `optimize` from the config
    pub optimize: Option<u32>,

    /// Wipe the output directory first
    pub clean: bool,

    /// Number of parallel jobs (defaults to one less than the CPU count)
    pub jobs: Option<usize>,

    /// Copy the built module here afterwards
    pub copy_to: Option<PathBuf>,

    /// Also archive the module here, if the directory exists
    pub store_dir: Option<PathBuf>,
}

/// Build result.
#[derive(Debug)]
pub struct BuildOutcome {
    /// Directory CMake generated into
    pub output_dir: PathBuf,

    /// Files copied by the finalize step, if it ran
    pub finalized: Option<FinalizeResult>,
}

/// Load `config.ini`, creating it with defaults if it doesn't exist.
///
/// If no module name is configured, `prompt` is asked exactly once and the
/// answer is saved before returning, so a later failure doesn't lose it.
pub fn prepare_config(path: &Path, prompt: &mut dyn FnMut() -> Result<String>) -> Result<Config> {
    let (mut config, mut dirty) = if path.is_file() {
        (Config::load(path)?, false)
    } else {
        tracing::info!("no config found at {}, creating one", path.display());
        (Config::with_defaults(), true)
    };

    if config.module_name().is_none() {
        let name = prompt()?;
        let name = name.trim();
        if name.is_empty() {
            return Err(BuildError::ModuleNameMissing);
        }
        config.set(MODULE_NAME, name);
        dirty = true;
    }

    if dirty {
        config.save(path)?;
    }

    Ok(config)
}

/// Create the output directory, wiping it first when `clean` is set.
pub fn prepare_output_dir(shell: &Shell, output_dir: &Path, clean: bool) -> Result<()> {
    if clean && output_dir.exists() {
        remove_dir_all_if_exists(output_dir)?;
        shell.status(Status::Removed, output_dir.display());
    }

    if !output_dir.is_dir() {
        ensure_dir(output_dir)?;
        shell.status(Status::Created, output_dir.display());
    }

    Ok(())
}

/// Configure and build the native module.
pub fn build(
    gctx: &GlobalContext,
    config: &Config,
    ctx: &BuildContext,
    cmake: &CMake,
    runner: &mut dyn CommandRunner,
    opts: &BuildOptions,
) -> Result<BuildOutcome> {
    let shell = gctx.shell();
    let module = config.module_name().ok_or(BuildError::ModuleNameMissing)?;

    let output_dir = ctx.output_dir(gctx.project_root());
    prepare_output_dir(shell, &output_dir, opts.clean)?;

    // Everything that can be rejected up front is, before CMake starts.
    let args = configure_args(config, opts.optimize, ctx)?;

    let span = shell.span(
        Status::Building,
        format!(
            "{} (Panda3D {}, {})",
            module,
            ctx.sdk.version_string,
            config.build_type()
        ),
    );

    shell.status(Status::Configuring, output_dir.display());
    cmake.configure(runner, &output_dir, &args, ctx)?;

    let jobs = opts.jobs.unwrap_or_else(default_jobs);
    cmake.build(runner, &output_dir, &build_args(config, ctx.host, jobs))?;

    let finalized = match &opts.copy_to {
        Some(dest_dir) => {
            let finalize_opts = FinalizeOptions {
                dest_dir: dest_dir.clone(),
                store_dir: opts.store_dir.clone(),
            };
            Some(finalize(
                shell,
                &output_dir,
                module,
                ctx.host,
                &ctx.sdk.platform,
                &finalize_opts,
            )?)
        }
        None => None,
    };

    span.finish_with_message(module);

    Ok(BuildOutcome {
        output_dir,
        finalized,
    })
}
