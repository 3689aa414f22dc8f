//! Base-directory resolution for path references

use crate::error::{FlakeRefError, Result};
use std::path::{Component, Path, PathBuf};

/// Lexically normalise a path: drop `.`, fold `..` into its parent
///
/// Symlinks are not resolved and the filesystem is not consulted.
#[must_use]
pub fn normalize(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::Prefix(_) | Component::RootDir | Component::Normal(_) => {
                normalized.push(component.as_os_str());
            }
            Component::CurDir => {}
            Component::ParentDir => {
                normalized.pop();
            }
        }
    }
    normalized
}

/// Resolve `raw` against `base_dir` into an absolute, UTF-8 path
pub(crate) fn resolve(raw: &str, base_dir: &Path) -> Result<PathBuf> {
    if raw.is_empty() {
        return Err(FlakeRefError::invalid_path(raw, "path is empty"));
    }

    let resolved = normalize(&base_dir.join(raw));
    if !resolved.is_absolute() {
        return Err(FlakeRefError::invalid_path(
            resolved.to_string_lossy(),
            "base directory is not absolute",
        ));
    }
    if resolved.to_str().is_none() {
        return Err(FlakeRefError::invalid_path(
            resolved.to_string_lossy(),
            "path is not valid UTF-8",
        ));
    }

    Ok(resolved)
}
