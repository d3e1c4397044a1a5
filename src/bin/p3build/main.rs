//! p3build CLI - builds Panda3D native extension modules

use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use p3build::util::diagnostic::emit;
use p3build::util::shell::Shell;
use p3build::{BuildError, GlobalContext};

mod cli;
mod commands;

use cli::{Cli, Commands};

fn main() {
    let cli = Cli::parse();

    init_logging(cli.debug);

    let shell = Arc::new(Shell::from_flags(cli.quiet, cli.verbose, cli.color));
    if let Err(e) = run(cli, Arc::clone(&shell)) {
        match e.downcast_ref::<BuildError>() {
            Some(err) => emit(&err.to_diagnostic(), shell.use_color()),
            None => eprintln!("error: {:#}", e),
        }
        std::process::exit(1);
    }
}

/// Log to stderr so stdout stays clean for `info --print`.
fn init_logging(debug: bool) {
    let default = if debug { "p3build=debug" } else { "p3build=info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();
}

fn run(cli: Cli, shell: Arc<Shell>) -> Result<()> {
    let Cli {
        command,
        project_dir,
        python,
        ..
    } = cli;

    let gctx = move || -> Result<GlobalContext> {
        Ok(GlobalContext::new(&project_dir, shell)?.with_python(python))
    };

    match command {
        Commands::Build(args) => commands::build::execute(&gctx()?, args),
        Commands::Interrogate(args) => commands::interrogate::execute(&gctx()?, args),
        Commands::Finalize(args) => commands::finalize::execute(&gctx()?, args),
        Commands::Info(args) => commands::info::execute(&gctx()?, args),
        Commands::Completions(args) => commands::completions::execute(args),
    }
}
