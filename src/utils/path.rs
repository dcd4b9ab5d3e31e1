//! Path resolution against explicit base directories.
//!
//! Declarations never depend on the working directory or on who declared
//! them: every relative path is joined onto the directory of the manifest
//! that mentions it.

use std::path::{Path, PathBuf};

/// Resolve `path` against `base`, expanding a leading `~`.
///
/// Absolute paths are kept (normalized); relative ones are joined onto `base`.
pub fn resolve(base: &Path, path: &Path) -> PathBuf {
    let expanded = expand_tilde(path);
    if expanded.is_absolute() {
        normalize_path(&expanded)
    } else {
        normalize_path(&base.join(expanded))
    }
}

/// Normalize a path to absolute, using canonicalize if the path exists.
pub fn normalize_path(path: &Path) -> PathBuf {
    path.canonicalize().unwrap_or_else(|_| {
        // For non-existent paths, manually make them absolute
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            std::env::current_dir()
                .map(|cwd| cwd.join(path))
                .unwrap_or_else(|_| path.to_path_buf())
        }
    })
}

fn expand_tilde(path: &Path) -> PathBuf {
    match path.to_str() {
        Some(raw) if raw.starts_with('~') => PathBuf::from(shellexpand::tilde(raw).into_owned()),
        _ => path.to_path_buf(),
    }
}
