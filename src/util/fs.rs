//! Filesystem utilities and the candidate-path resolver.

use std::fs;
use std::path::{Component, Path, PathBuf};

use crate::util::errors::{BuildError, Result};

/// Return the first candidate directory that exists.
///
/// Candidates are tried in order, joined onto `base_dir` when one is given.
/// With `required_file`, a candidate only matches if it also contains a
/// regular file of that name directly inside it. The match is returned
/// canonicalized, see [`canonicalize`]. When nothing matches, every
/// attempted absolute path is logged and returned in [`BuildError::PathNotFound`].
pub fn first_existing_path<P: AsRef<Path>>(
    candidates: &[P],
    required_file: Option<&str>,
    base_dir: Option<&Path>,
    on_error: &str,
) -> Result<PathBuf> {
    let mut attempted = Vec::with_capacity(candidates.len());

    for candidate in candidates {
        let path = match base_dir {
            Some(base) => base.join(candidate.as_ref()),
            None => candidate.as_ref().to_path_buf(),
        };

        let matches = path.is_dir()
            && required_file.map_or(true, |name| path.join(name).is_file());

        if matches {
            return canonicalize(&path);
        }

        attempted.push(absolute_path(&path));
    }

    if !on_error.is_empty() {
        tracing::error!("{}", on_error);
    }
    tracing::error!("we tried to find a folder or file on the following paths:");
    for path in &attempted {
        tracing::error!("[-] {}", path.display());
    }

    Err(BuildError::PathNotFound {
        message: on_error.to_string(),
        attempted,
    })
}

/// Make a path absolute and fold away `.` and `..` without touching the disk.
pub fn absolute_path(path: &Path) -> PathBuf {
    let joined = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .map(|cwd| cwd.join(path))
            .unwrap_or_else(|_| path.to_path_buf())
    };

    let mut out = PathBuf::new();
    for component in joined.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

/// Resolve symlinks and make `path` absolute.
///
/// On Windows the result is a plain `C:\...` path rather than the verbatim
/// `\\?\` form, since CMake and interrogate get these paths with
/// forward-slash suffixes appended.
pub fn canonicalize(path: &Path) -> Result<PathBuf> {
    dunce::canonicalize(path).map_err(|e| BuildError::io(path, e))
}

/// Canonicalize a path, but don't fail if it doesn't exist yet.
/// Falls back to the lexically normalized absolute path.
pub fn normalize_path(path: &Path) -> PathBuf {
    dunce::canonicalize(path).unwrap_or_else(|_| absolute_path(path))
}

/// Check whether `sub` is `base` or lives below it.
pub fn is_subdirectory(base: &Path, sub: &Path) -> bool {
    normalize_path(sub).starts_with(normalize_path(base))
}

/// Remove a directory and all its contents, if it exists.
pub fn remove_dir_all_if_exists(path: &Path) -> Result<()> {
    if path.exists() {
        fs::remove_dir_all(path).map_err(|e| BuildError::io(path, e))?;
    }
    Ok(())
}

/// Ensure a directory exists, creating it if necessary.
pub fn ensure_dir(path: &Path) -> Result<()> {
    if !path.is_dir() {
        tracing::debug!("creating directory {}", path.display());
        fs::create_dir_all(path).map_err(|e| BuildError::io(path, e))?;
    }
    Ok(())
}

/// Read a file to string.
pub fn read_to_string(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|e| BuildError::io(path, e))
}

/// Write a string to a file, creating parent directories if needed.
pub fn write_string(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        ensure_dir(parent)?;
    }
    fs::write(path, contents).map_err(|e| BuildError::io(path, e))
}

/// Copy a single file, overwriting the destination.
pub fn copy_file(src: &Path, dst: &Path) -> Result<()> {
    tracing::debug!("copying {} -> {}", src.display(), dst.display());
    fs::copy(src, dst).map_err(|e| BuildError::io(dst, e))?;
    Ok(())
}

/// Get the relative path from `base` to `path`.
pub fn relative_path(base: &Path, path: &Path) -> PathBuf {
    pathdiff::diff_paths(path, base).unwrap_or_else(|| path.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_first_existing_path_prefers_earlier_candidate() {
        let tmp = TempDir::new().unwrap();
        fs::create_dir_all(tmp.path().join("a")).unwrap();
        fs::create_dir_all(tmp.path().join("b")).unwrap();

        let found = first_existing_path(&["a", "b"], None, Some(tmp.path()), "").unwrap();
        assert_eq!(found, dunce::canonicalize(tmp.path().join("a")).unwrap());
    }

    #[test]
    fn test_first_existing_path_skips_plain_file() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("bin"), "not a dir").unwrap();
        fs::create_dir_all(tmp.path().join("usr/bin")).unwrap();

        let found = first_existing_path(&["bin", "usr/bin"], None, Some(tmp.path()), "").unwrap();
        assert_eq!(found, dunce::canonicalize(tmp.path().join("usr/bin")).unwrap());
    }

    #[test]
    fn test_first_existing_path_requires_marker_file() {
        let tmp = TempDir::new().unwrap();
        fs::create_dir_all(tmp.path().join("include")).unwrap();
        fs::create_dir_all(tmp.path().join("panda3d/include")).unwrap();
        fs::write(tmp.path().join("panda3d/include/dtoolbase.h"), "").unwrap();

        let found = first_existing_path(
            &["include", "panda3d/include"],
            Some("dtoolbase.h"),
            Some(tmp.path()),
            "",
        )
        .unwrap();
        assert_eq!(found, dunce::canonicalize(tmp.path().join("panda3d/include")).unwrap());
    }

    #[cfg(windows)]
    #[test]
    fn test_resolved_path_has_no_verbatim_prefix() {
        let tmp = TempDir::new().unwrap();
        fs::create_dir_all(tmp.path().join("include")).unwrap();

        let found = first_existing_path(&["include"], None, Some(tmp.path()), "").unwrap();
        assert!(!found.to_string_lossy().starts_with(r"\\?\"));
        assert!(found.join("parser-inc").is_absolute());
    }

    #[test]
    fn test_marker_must_be_a_file() {
        let tmp = TempDir::new().unwrap();
        fs::create_dir_all(tmp.path().join("bin/interrogate")).unwrap();

        let err = first_existing_path(&["bin"], Some("interrogate"), Some(tmp.path()), "")
            .unwrap_err();
        assert!(matches!(err, BuildError::PathNotFound { .. }));
    }

    #[test]
    fn test_first_existing_path_reports_all_attempts() {
        let tmp = TempDir::new().unwrap();

        let err = first_existing_path(
            &["missing", "sub/../other"],
            None,
            Some(tmp.path()),
            "Failed to find binary path",
        )
        .unwrap_err();

        match err {
            BuildError::PathNotFound { message, attempted } => {
                assert_eq!(message, "Failed to find binary path");
                assert_eq!(attempted.len(), 2);
                assert!(attempted[0].ends_with("missing"));
                assert!(attempted[1].ends_with("other"));
                assert!(attempted.iter().all(|p| p.is_absolute()));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_absolute_path_folds_parent_components() {
        let path = absolute_path(Path::new("/sdk/lib/../bin/./tools"));
        assert_eq!(path, PathBuf::from("/sdk/bin/tools"));
    }

    #[test]
    fn test_is_subdirectory() {
        let tmp = TempDir::new().unwrap();
        let inner = tmp.path().join("Lib/site-packages/panda3d");
        fs::create_dir_all(&inner).unwrap();

        assert!(is_subdirectory(tmp.path(), &inner));
        assert!(!is_subdirectory(&inner, tmp.path()));
    }
}
