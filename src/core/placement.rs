//! File placement: create the destination folder and move or copy the file.

use crate::generators::destination::Destination;
use crate::utils::fs::move_file;
use crate::Result;
use std::path::{Path, PathBuf};

/// How a file reaches its destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlacementMode {
    Move,
    /// Keep the original in place.
    Copy,
}

impl PlacementMode {
    pub fn from_keep_originals(keep_originals: bool) -> Self {
        if keep_originals {
            PlacementMode::Copy
        } else {
            PlacementMode::Move
        }
    }

    /// Verb used in log lines.
    pub fn action(self) -> &'static str {
        match self {
            PlacementMode::Move => "Renaming and moving",
            PlacementMode::Copy => "Copying",
        }
    }
}

/// Place `source` at `destination`. Never overwrites an existing file.
pub fn place_file(source: &Path, destination: &Destination, mode: PlacementMode) -> Result<PathBuf> {
    let target = destination.path();
    let wrap = |source_err: std::io::Error| crate::Error::Placement {
        from: source.display().to_string(),
        to: target.display().to_string(),
        source: source_err,
    };

    std::fs::create_dir_all(&destination.directory).map_err(wrap)?;

    if target.exists() {
        return Err(crate::Error::FileAlreadyExists(target.display().to_string()));
    }

    match mode {
        PlacementMode::Move => move_file(source, &target).map_err(wrap)?,
        PlacementMode::Copy => {
            if let Err(e) = std::fs::copy(source, &target) {
                if target.exists() {
                    let _ = std::fs::remove_file(&target);
                }
                return Err(wrap(e));
            }
        }
    }

    tracing::debug!("{} {:?} -> {:?}", mode.action(), source, target);
    Ok(target)
}
