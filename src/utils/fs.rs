//! Filesystem primitives used by the build steps.
//!
//! Every failure names the path it happened on.

use crate::compiler::BuildError;
use anyhow::{Context, Result};
use std::{
    fs,
    path::{Path, PathBuf},
};
use walkdir::WalkDir;

/// Read a whole file as UTF-8 text.
pub fn read_text(path: &Path) -> Result<String, BuildError> {
    fs::read_to_string(path).map_err(|err| BuildError::Read(path.to_path_buf(), err))
}

/// Write `text` to `path`, replacing any existing file.
pub fn write_text(path: &Path, text: impl AsRef<[u8]>) -> Result<(), BuildError> {
    fs::write(path, text).map_err(|err| BuildError::Write(path.to_path_buf(), err))
}

/// Read and concatenate files in order.
pub fn read_concat<P: AsRef<Path>>(paths: &[P]) -> Result<String, BuildError> {
    let mut out = String::new();
    for path in paths {
        out.push_str(&read_text(path.as_ref())?);
    }
    Ok(out)
}

/// Create a directory and its parents. Existing directories are fine.
pub fn create_dir_fresh(path: &Path) -> Result<(), BuildError> {
    fs::create_dir_all(path).map_err(|err| BuildError::Write(path.to_path_buf(), err))
}

/// Recursively delete `path`, like `rm -rf`.
///
/// Missing paths are not an error. The filesystem root is never deleted.
pub fn remove_dir_all_guarded(path: &Path) -> Result<()> {
    let resolved = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());
    if resolved.parent().is_none() {
        return Err(BuildError::Path(resolved).into());
    }
    if !path.exists() {
        return Ok(());
    }
    fs::remove_dir_all(path).with_context(|| format!("could not delete `{}`", path.display()))?;
    if path.exists() {
        anyhow::bail!("could not delete `{}`", path.display());
    }
    Ok(())
}

/// Copy one file, creating the destination's parent directories.
pub fn copy_file(from: &Path, to: &Path) -> Result<()> {
    if let Some(parent) = to.parent() {
        create_dir_fresh(parent)?;
    }
    fs::copy(from, to)
        .with_context(|| format!("could not copy `{}` to `{}`", from.display(), to.display()))?;
    Ok(())
}

/// Copy directory `src` itself into `dst` (`dst/<src name>/...`).
pub fn copy_dir(src: &Path, dst: &Path) -> Result<PathBuf> {
    let name = src
        .file_name()
        .with_context(|| format!("`{}` has no directory name", src.display()))?;
    let target = dst.join(name);
    copy_dir_contents(src, &target)?;
    Ok(target)
}

/// Copy everything inside `src` into `dst`.
///
/// Files, sub-directories and symbolic links are preserved; links are
/// recreated rather than followed. Returns the number of entries copied.
pub fn copy_dir_contents(src: &Path, dst: &Path) -> Result<usize> {
    create_dir_fresh(dst)?;
    let mut copied = 0;

    for entry in WalkDir::new(src).min_depth(1) {
        let entry = entry.with_context(|| format!("could not walk `{}`", src.display()))?;
        let relative = entry.path().strip_prefix(src)?;
        let target = dst.join(relative);
        let file_type = entry.file_type();

        if file_type.is_dir() {
            create_dir_fresh(&target)?;
        } else if file_type.is_symlink() {
            copy_symlink(entry.path(), &target)?;
        } else {
            copy_file(entry.path(), &target)?;
        }
        copied += 1;
    }

    Ok(copied)
}

fn copy_symlink(link: &Path, target: &Path) -> Result<()> {
    let pointee =
        fs::read_link(link).with_context(|| format!("could not read link `{}`", link.display()))?;
    if target.symlink_metadata().is_ok() {
        fs::remove_file(target)
            .with_context(|| format!("could not replace `{}`", target.display()))?;
    }

    #[cfg(unix)]
    std::os::unix::fs::symlink(&pointee, target)
        .with_context(|| format!("could not link `{}`", target.display()))?;

    #[cfg(windows)]
    {
        let result = if link.is_dir() {
            std::os::windows::fs::symlink_dir(&pointee, target)
        } else {
            std::os::windows::fs::symlink_file(&pointee, target)
        };
        result.with_context(|| format!("could not link `{}`", target.display()))?;
    }

    Ok(())
}
