//! `p3build interrogate` command
//!
//! Invoked by the CMake project from inside the source directory.

use std::sync::Arc;

use anyhow::{Context, Result};

use crate::cli::InterrogateArgs;
use p3build::builder::BuildContext;
use p3build::ops::interrogate::{interrogate, InterrogateOptions};
use p3build::util::fs::normalize_path;
use p3build::util::process::ProcessRunner;
use p3build::GlobalContext;

pub fn execute(gctx: &GlobalContext, args: InterrogateArgs) -> Result<()> {
    let source_dir = match args.source_dir {
        Some(dir) => normalize_path(&dir),
        None => std::env::current_dir().context("failed to read the current directory")?,
    };

    let ctx = BuildContext::discover(gctx)?;
    let mut runner = ProcessRunner::new(Arc::clone(gctx.shell()));

    let opts = InterrogateOptions {
        module: &args.module,
        verbose: args.verbose_level,
        source_dir: &source_dir,
    };
    interrogate(gctx.shell(), &ctx, &mut runner, &opts)?;

    Ok(())
}
