//! File system utilities.

use crate::Result;
use std::path::{Path, PathBuf};

/// Check if a path exists and is a directory.
pub fn ensure_directory(path: &Path) -> Result<()> {
    if !path.exists() {
        return Err(crate::Error::PathNotFound(path.display().to_string()));
    }
    if !path.is_dir() {
        return Err(crate::Error::NotADirectory(path.display().to_string()));
    }
    Ok(())
}

/// Resolve symlinks and relative components, falling back to the path as given.
pub fn canonical_path(path: &Path) -> PathBuf {
    std::fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}

/// Move a file from one location to another.
///
/// On failure the source is left in place and nothing remains at `to`.
pub fn move_file(from: &Path, to: &Path) -> std::io::Result<()> {
    // Try atomic rename first (same filesystem, instant)
    match std::fs::rename(from, to) {
        Ok(()) => return Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::CrossesDevices => {
            tracing::debug!("Cross-filesystem move detected, using copy+delete");
        }
        Err(e) => return Err(e),
    }

    copy_then_remove(from, to)
}

/// Copy `from` to `to`, then delete `from`. Removes the copy on any failure.
fn copy_then_remove(from: &Path, to: &Path) -> std::io::Result<()> {
    let result = std::fs::copy(from, to).and_then(|_| std::fs::remove_file(from));
    if result.is_err() && to.exists() {
        // Remove incomplete copy
        if let Err(e) = std::fs::remove_file(to) {
            tracing::warn!("Could not remove partial copy {:?}: {}", to, e);
        }
    }
    result
}

/// Get file extension in lowercase.
pub fn get_extension(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
}

/// Check if a file has one of the given video extensions (case-insensitive).
pub fn has_video_extension(path: &Path, extensions: &[String]) -> bool {
    get_extension(path)
        .map(|ext| {
            extensions
                .iter()
                .any(|e| e.trim_start_matches('.').eq_ignore_ascii_case(&ext))
        })
        .unwrap_or(false)
}
