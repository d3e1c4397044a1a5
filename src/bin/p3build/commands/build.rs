//! `p3build build` command

use std::io::{self, BufRead, Write};
use std::sync::Arc;

use anyhow::Result;

use crate::cli::BuildArgs;
use p3build::builder::{BuildContext, CMake};
use p3build::ops::build::{build, prepare_config, BuildOptions};
use p3build::util::process::ProcessRunner;
use p3build::{BuildError, GlobalContext};

/// Ask for the module name on stdin.
fn prompt_module_name() -> p3build::Result<String> {
    eprint!("Enter the name of the native module: ");
    let _ = io::stderr().flush();

    let mut line = String::new();
    io::stdin()
        .lock()
        .read_line(&mut line)
        .map_err(|e| BuildError::io("<stdin>", e))?;
    Ok(line)
}

pub fn execute(gctx: &GlobalContext, args: BuildArgs) -> Result<()> {
    // Saved before anything else can fail.
    let config = prepare_config(&gctx.config_path(), &mut prompt_module_name)?;

    let ctx = BuildContext::discover(gctx)?;
    let cmake = CMake::locate(gctx.project_root())?;
    let mut runner = ProcessRunner::new(Arc::clone(gctx.shell()));

    let opts = BuildOptions {
        optimize: args.optimize,
        clean: args.clean,
        jobs: args.jobs,
        copy_to: args.copy_to,
        store_dir: args.store,
    };

    let outcome = build(gctx, &config, &ctx, &cmake, &mut runner, &opts)?;
    gctx.shell()
        .note(format!("build output in {}", outcome.output_dir.display()));

    Ok(())
}
