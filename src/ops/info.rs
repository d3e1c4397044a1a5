//! Implementation of `p3build info`.
//!
//! Single values are printed without a trailing newline so CMake scripts
//! can capture them with `execute_process`.

use std::path::{Path, PathBuf};

use crate::builder::toolchain::OptionalLib;
use crate::builder::BuildContext;
use crate::util::errors::Result;

/// A single value `info --print` can emit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InfoField {
    SdkPath,
    CorePath,
    LibPath,
    BinPath,
    IncludePath,
    ShortVersion,
}

fn display(path: &Path) -> String {
    path.display().to_string()
}

/// Resolve one value.
pub fn field_value(ctx: &BuildContext, field: InfoField) -> Result<String> {
    let layout = &ctx.layout;
    Ok(match field {
        InfoField::SdkPath => display(layout.sdk_dir()),
        InfoField::CorePath => display(&ctx.sdk.core_module),
        InfoField::LibPath => display(&layout.lib_dir()?),
        InfoField::BinPath => display(&layout.bin_dir()?),
        InfoField::IncludePath => display(&layout.include_dir()?),
        InfoField::ShortVersion => ctx.sdk.short_version(),
    })
}

/// Everything known about the SDK, as `(label, value)` rows.
///
/// Directories that can't be located are reported instead of failing, so
/// the listing also works against an incomplete install.
pub fn describe(ctx: &BuildContext) -> Vec<(&'static str, String)> {
    let sdk = &ctx.sdk;
    let layout = &ctx.layout;
    let or_missing = |found: Result<PathBuf>| match found {
        Ok(path) => display(&path),
        Err(_) => "(not found)".to_string(),
    };

    let mut rows = vec![
        ("Panda3D", format!("{} ({})", sdk.version_string, sdk.platform)),
        (
            "Python",
            format!(
                "{} ({}.{})",
                sdk.python_executable.display(),
                sdk.python_version.0,
                sdk.python_version.1
            ),
        ),
        ("SDK-Path", display(layout.sdk_dir())),
        ("BIN-Path", or_missing(layout.bin_dir())),
        ("LIB-Path", or_missing(layout.lib_dir())),
        ("INC-Path", or_missing(layout.include_dir())),
        ("Core", display(&sdk.core_module)),
        ("Compiler", format!("{} ({})", sdk.compiler_family(), sdk.compiler)),
    ];

    if layout.is_local_build() {
        rows.push(("Local build", "yes".to_string()));
    }
    match ctx.thirdparty_dir() {
        Ok(Some(dir)) => rows.push(("Thirdparty", display(dir))),
        Ok(None) => {}
        Err(_) => rows.push(("Thirdparty", "(not found)".to_string())),
    }
    if ctx.headerless {
        rows.push(("Headers", "missing (pip install)".to_string()));
    }

    let components: Vec<String> = OptionalLib::ALL
        .iter()
        .map(|&lib| {
            let mark = if sdk.has_component(lib) { "+" } else { "-" };
            format!("{}{}", mark, lib)
        })
        .collect();
    rows.push(("Components", components.join(" ")));

    rows
}

/// Render [`describe`] as aligned lines.
pub fn format_report(rows: &[(&'static str, String)]) -> String {
    let width = rows.iter().map(|(label, _)| label.len()).max().unwrap_or(0);
    rows.iter()
        .map(|(label, value)| format!("{:>width$}: {}\n", label, value, width = width))
        .collect()
}
