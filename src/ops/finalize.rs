//! Copying the built module out of the output directory.

use std::path::{Path, PathBuf};

use crate::builder::toolchain::HostOs;
use crate::util::errors::{BuildError, Result};
use crate::util::fs::{copy_file, ensure_dir};
use crate::util::shell::{Shell, Status};

/// Where to put the built module.
#[derive(Debug, Clone)]
pub struct FinalizeOptions {
    /// Directory receiving `<module>.pyd`/`<module>.so` and `<module>.pdb`
    pub dest_dir: PathBuf,
    /// Optional archive of per-platform builds; skipped if it doesn't exist
    pub store_dir: Option<PathBuf>,
}

/// The artifact found in the output directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuiltBinary {
    pub binary: PathBuf,
    /// Debug symbols next to the binary, if they were generated
    pub symbols: Option<PathBuf>,
}

/// Files written by [`finalize`].
#[derive(Debug, Clone, Default)]
pub struct FinalizeResult {
    pub copied: Vec<PathBuf>,
}

/// Places the build may have left the module binary, in search order.
pub fn binary_candidates(output_dir: &Path, module: &str, host: HostOs) -> Vec<PathBuf> {
    if host.is_windows() {
        ["Release", "RelWithDebInfo"]
            .iter()
            .map(|config| output_dir.join(config).join(format!("{}.dll", module)))
            .collect()
    } else {
        vec![output_dir.join(format!("{}.so", module))]
    }
}

/// Locate the built binary. When several candidates exist the last one wins.
pub fn find_binary(output_dir: &Path, module: &str, host: HostOs) -> Result<BuiltBinary> {
    let candidates = binary_candidates(output_dir, module, host);

    let found = candidates.iter().rev().find(|c| c.is_file()).map(|binary| {
        let pdb = binary.with_extension("pdb");
        BuiltBinary {
            binary: binary.clone(),
            symbols: pdb.is_file().then_some(pdb),
        }
    });

    found.ok_or(BuildError::ArtifactNotFound { candidates })
}

/// Copy the built module (and its symbols) into place.
pub fn finalize(
    shell: &Shell,
    output_dir: &Path,
    module: &str,
    host: HostOs,
    platform: &str,
    opts: &FinalizeOptions,
) -> Result<FinalizeResult> {
    let built = find_binary(output_dir, module, host)?;
    let ext = host.module_extension();
    let mut result = FinalizeResult::default();

    ensure_dir(&opts.dest_dir)?;

    let target = opts.dest_dir.join(format!("{}.{}", module, ext));
    copy_file(&built.binary, &target)?;
    shell.status(Status::Copied, target.display());
    result.copied.push(target);

    if let Some(symbols) = &built.symbols {
        let target = opts.dest_dir.join(format!("{}.pdb", module));
        copy_file(symbols, &target)?;
        shell.status(Status::Copied, target.display());
        result.copied.push(target);
    }

    match opts.store_dir.as_deref() {
        Some(store) if store.is_dir() => {
            let target = store.join(format!("{}_{}.{}", module, platform, ext));
            copy_file(&built.binary, &target)?;
            shell.status(Status::Copied, target.display());
            result.copied.push(target);
        }
        Some(store) => shell.warn(format!("store directory {} not found, skipping", store.display())),
        None => {}
    }

    Ok(result)
}
