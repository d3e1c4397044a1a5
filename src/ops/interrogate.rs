//! Implementation of `p3build interrogate`.

use std::path::Path;

use crate::builder::interrogate::{
    find_sources, include_subdirs, interrogate_command, interrogate_module_command, InterrogateJob,
};
use crate::builder::BuildContext;
use crate::util::errors::Result;
use crate::util::process::CommandRunner;
use crate::util::shell::{Shell, Status};

/// Options for the interrogate command.
#[derive(Debug, Clone)]
pub struct InterrogateOptions<'a> {
    /// Module and library name
    pub module: &'a str,

    /// 0 = quiet, 1 = `-v`, 2 = `-vv`
    pub verbose: u8,

    /// Directory holding the module's headers; both tools run inside it
    pub source_dir: &'a Path,
}

/// Generate the binding sources for the module in `opts.source_dir`.
pub fn interrogate(
    shell: &Shell,
    ctx: &BuildContext,
    runner: &mut dyn CommandRunner,
    opts: &InterrogateOptions<'_>,
) -> Result<()> {
    let bin_dir = ctx.layout.bin_dir()?;
    let include_dir = ctx.layout.include_dir()?;

    let job = InterrogateJob {
        module: opts.module,
        verbose: opts.verbose,
        source_dir: opts.source_dir,
        bin_dir: &bin_dir,
        include_dir: &include_dir,
        sdk: &ctx.sdk,
    };

    let sources = find_sources(opts.source_dir)?;
    let subdirs = include_subdirs(opts.source_dir)?;
    tracing::debug!("found {} headers in {}", sources.len(), opts.source_dir.display());

    shell.status(
        Status::Generating,
        format!("bindings for {} ({} headers)", opts.module, sources.len()),
    );
    runner.run(&interrogate_command(&job, &sources, &subdirs), None)?;
    runner.run(&interrogate_module_command(&job), None)?;

    Ok(())
}
