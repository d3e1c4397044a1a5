//! `p3build finalize` command

use anyhow::Result;

use crate::cli::FinalizeArgs;
use p3build::builder::BuildContext;
use p3build::ops::finalize::{finalize, FinalizeOptions};
use p3build::{BuildError, Config, GlobalContext};

pub fn execute(gctx: &GlobalContext, args: FinalizeArgs) -> Result<()> {
    let config = Config::load(&gctx.config_path())?;
    let module = config.module_name().ok_or(BuildError::ModuleNameMissing)?;

    let ctx = BuildContext::discover(gctx)?;
    let output_dir = ctx.output_dir(gctx.project_root());

    let opts = FinalizeOptions {
        dest_dir: args.dest,
        store_dir: args.store,
    };
    finalize(
        gctx.shell(),
        &output_dir,
        module,
        ctx.host,
        &ctx.sdk.platform,
        &opts,
    )?;

    Ok(())
}
