//! Directory scanner module.
//!
//! Recursively enumerates the source root for video files in a stable order.

use crate::models::media::MediaFile;
use crate::utils::fs::has_video_extension;
use crate::Result;
use std::path::Path;
use walkdir::WalkDir;

/// Result of scanning a directory.
#[derive(Debug, Default)]
pub struct ScanResult {
    /// Video files found, in discovery order.
    pub videos: Vec<MediaFile>,
    /// Total files scanned.
    pub total_files_scanned: usize,
    /// Total directories scanned.
    pub total_dirs_scanned: usize,
    /// Entries that could not be read.
    pub unreadable: usize,
    /// Symlinked directories, which are not descended into.
    pub skipped_links: usize,
}

/// Scan a directory for video files.
///
/// Entries are visited depth-first with siblings sorted by name, so the
/// order is deterministic across runs. Symlinks to files are resolved and
/// treated like the file itself; symlinked directories are not descended
/// into. Every entry that is left out is counted and logged.
///
/// # Arguments
/// * `path` - The directory path to scan
/// * `extensions` - Accepted extensions, without the leading dot
pub fn scan_directory(path: &Path, extensions: &[String]) -> Result<ScanResult> {
    crate::utils::fs::ensure_directory(path)?;

    let mut result = ScanResult::default();

    for entry in WalkDir::new(path)
        .follow_links(false)
        .sort_by_file_name()
    {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                tracing::warn!("Skipping unreadable entry: {}", e);
                result.unreadable += 1;
                continue;
            }
        };

        let file_type = entry.file_type();
        let is_file = if file_type.is_symlink() {
            // metadata() follows the link
            match entry.path().metadata() {
                Ok(meta) if meta.is_file() => true,
                Ok(_) => {
                    tracing::warn!("Not following symlinked directory: {:?}", entry.path());
                    result.skipped_links += 1;
                    false
                }
                Err(e) => {
                    tracing::warn!("Skipping broken symlink {:?}: {}", entry.path(), e);
                    result.unreadable += 1;
                    false
                }
            }
        } else {
            file_type.is_file()
        };

        if file_type.is_dir() {
            result.total_dirs_scanned += 1;
        } else if is_file {
            result.total_files_scanned += 1;
            if has_video_extension(entry.path(), extensions) {
                result.videos.push(MediaFile::from_path(entry.path()));
            }
        }
    }

    tracing::info!(
        "Scanned {} files in {} directories: {} videos",
        result.total_files_scanned,
        result.total_dirs_scanned,
        result.videos.len()
    );

    Ok(result)
}

// Integration tests for scan_directory() live in tests/scanner_tests.rs
