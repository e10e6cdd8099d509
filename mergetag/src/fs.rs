//! File system-related utilities.

use std::fs;
use std::path::{Path, PathBuf};

use eyre::Result;
use log::debug;

use crate::Error;

/// Canonicalize the given path if it exists. If it does not exist, returns
/// `Ok(None)`.
pub fn maybe_canonicalize<P>(path: P) -> Result<Option<PathBuf>>
where
    P: AsRef<Path>,
{
    let path = path.as_ref();
    if path.exists() {
        Ok(Some(path.canonicalize()?))
    } else {
        Ok(None)
    }
}

pub fn ensure_parent_path_exists(path: &Path) -> Result<()> {
    let parent = path
        .parent()
        .ok_or_else(|| Error::PathMissingParent(path.to_path_buf()))?;
    ensure_path_exists(parent)
}

pub fn ensure_path_exists(path: &Path) -> Result<()> {
    if !path.as_os_str().is_empty() && !path.is_dir() {
        fs::create_dir_all(path)?;
        debug!("Created path: {}", path.display());
    }
    Ok(())
}
