//! `p3build info` command

use std::io::{self, Write};

use anyhow::Result;

use crate::cli::InfoArgs;
use p3build::builder::BuildContext;
use p3build::ops::info::{describe, field_value, format_report};
use p3build::GlobalContext;

pub fn execute(gctx: &GlobalContext, args: InfoArgs) -> Result<()> {
    let ctx = BuildContext::discover(gctx)?;
    let mut stdout = io::stdout().lock();

    match args.print {
        Some(field) => write!(stdout, "{}", field_value(&ctx, field.into())?)?,
        None => write!(stdout, "{}", format_report(&describe(&ctx)))?,
    }
    stdout.flush()?;

    Ok(())
}
