//! Show folder resolution.
//!
//! Episodes usually live in `<Show>/Season 02/`, sometimes directly in
//! `<Show>/`. The show folder is found by walking up past season folders,
//! never above the source root.

use crate::utils::fs::canonical_path;
use std::path::{Path, PathBuf};

/// Whether a folder name looks like `Season 2`, `season02` or `S2`.
pub fn is_season_folder(name: &str) -> bool {
    regex::Regex::new(r"(?i)^(season|s)\s*\d+$")
        .map(|re| re.is_match(name))
        .unwrap_or(false)
}

/// Find the folder naming the show that `file_path` belongs to.
///
/// Starts at the file's containing directory. Terminates in at most
/// path-depth steps: every step moves to a strictly shorter parent.
pub fn find_show_folder(file_path: &Path, source_root: &Path) -> PathBuf {
    let root = canonical_path(source_root);
    let mut current = match file_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => return source_root.to_path_buf(),
    };

    loop {
        if canonical_path(&current) == root {
            return current;
        }

        let is_season = current
            .file_name()
            .map(|n| is_season_folder(&n.to_string_lossy()))
            .unwrap_or(false);
        if !is_season {
            return current;
        }

        match current.parent() {
            Some(parent)
                if !parent.as_os_str().is_empty()
                    && canonical_path(parent) != canonical_path(&current) =>
            {
                current = parent.to_path_buf();
            }
            _ => return current,
        }
    }
}
