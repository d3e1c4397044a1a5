//! CLI definitions using clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_complete::Shell as CompletionShell;

use p3build::ops::InfoField;
use p3build::util::shell::ColorChoice;

/// p3build - builds Panda3D native extension modules with CMake
#[derive(Parser)]
#[command(name = "p3build")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Echo the output of every tool that runs
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub debug: bool,

    /// Only print errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// When to use colors: auto, always or never
    #[arg(long, global = true, default_value = "auto")]
    pub color: ColorChoice,

    /// Project directory holding config.ini and CMakeLists.txt
    #[arg(short = 'C', long, global = true, default_value = ".")]
    pub project_dir: PathBuf,

    /// Python interpreter with panda3d installed
    #[arg(long, global = true, env = "P3BUILD_PYTHON")]
    pub python: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Configure and build the native module
    Build(BuildArgs),

    /// Generate binding sources with interrogate (called from CMake)
    Interrogate(InterrogateArgs),

    /// Copy the built module into place
    Finalize(FinalizeArgs),

    /// Show the detected Panda3D SDK
    Info(InfoArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(Args)]
pub struct BuildArgs {
    /// Optimization level, overriding `optimize` in config.ini
    #[arg(long)]
    pub optimize: Option<u32>,

    /// Remove the output directory before building
    #[arg(long)]
    pub clean: bool,

    /// Number of parallel jobs
    #[arg(short, long)]
    pub jobs: Option<usize>,

    /// Copy the built module to this directory
    #[arg(long)]
    pub copy_to: Option<PathBuf>,

    /// Also archive the module here, named by platform
    #[arg(long, requires = "copy_to")]
    pub store: Option<PathBuf>,
}

#[derive(Args)]
pub struct InterrogateArgs {
    /// Name of the module and library
    pub module: String,

    /// Verbosity of interrogate (0-2)
    #[arg(default_value_t = 0, value_parser = clap::value_parser!(u8).range(0..=2))]
    pub verbose_level: u8,

    /// Directory with the module's headers (defaults to current directory)
    #[arg(long)]
    pub source_dir: Option<PathBuf>,
}

#[derive(Args)]
pub struct FinalizeArgs {
    /// Destination directory
    #[arg(long)]
    pub dest: PathBuf,

    /// Also archive the module here, named by platform
    #[arg(long)]
    pub store: Option<PathBuf>,
}

#[derive(Args)]
pub struct InfoArgs {
    /// Print a single value without a trailing newline
    #[arg(long, value_enum)]
    pub print: Option<PrintArg>,
}

#[derive(Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: CompletionShell,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum PrintArg {
    SdkPath,
    CorePath,
    LibPath,
    BinPath,
    IncludePath,
    ShortVersion,
}

impl From<PrintArg> for InfoField {
    fn from(arg: PrintArg) -> Self {
        match arg {
            PrintArg::SdkPath => InfoField::SdkPath,
            PrintArg::CorePath => InfoField::CorePath,
            PrintArg::LibPath => InfoField::LibPath,
            PrintArg::BinPath => InfoField::BinPath,
            PrintArg::IncludePath => InfoField::IncludePath,
            PrintArg::ShortVersion => InfoField::ShortVersion,
        }
    }
}
