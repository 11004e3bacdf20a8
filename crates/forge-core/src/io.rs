//! Filesystem helpers for generated artifacts.

use crate::error::Result;
use std::io::Write;
use std::path::Path;

/// Replace `path` with `data` in one rename. The staging file lives next to
/// the target, prefixed `.forge-`. Missing parent directories are created.
pub fn atomic_write(path: &Path, data: &[u8]) -> Result<()> {
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    ensure_dir(parent)?;
    let mut staged = tempfile::Builder::new()
        .prefix(".forge-")
        .tempfile_in(parent)?;
    staged.write_all(data)?;
    staged.as_file().sync_all()?;
    staged.persist(path).map_err(|e| e.error)?;
    Ok(())
}

pub fn ensure_dir(path: &Path) -> Result<()> {
    std::fs::create_dir_all(path)?;
    Ok(())
}

/// Like [`atomic_write`], but leaves an existing file untouched. Returns
/// whether anything was written.
pub fn write_if_missing(path: &Path, data: &[u8]) -> Result<bool> {
    let fresh = !path.try_exists()?;
    if fresh {
        atomic_write(path, data)?;
    }
    Ok(fresh)
}
