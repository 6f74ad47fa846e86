//! Run-scoped sort job.

use crate::models::media::MediaFile;
use crate::Result;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Which files a run processes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum SortMode {
    /// Skip files carrying an episode marker.
    Movies,
    /// Skip files without an episode marker.
    Tv,
    #[default]
    Both,
}

impl std::fmt::Display for SortMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SortMode::Movies => write!(f, "movies"),
            SortMode::Tv => write!(f, "tv"),
            SortMode::Both => write!(f, "both"),
        }
    }
}

impl SortMode {
    /// Reason to skip `file` under this mode, if any.
    pub fn rejects(self, file: &MediaFile) -> Option<&'static str> {
        match (self, file.is_episode()) {
            (SortMode::Movies, true) => Some("Sorting mode is 'Movies Only'. Skipping TV episode."),
            (SortMode::Tv, false) => Some("Sorting mode is 'TV Shows Only'. Skipping potential movie."),
            _ => None,
        }
    }
}

/// Configuration for one run. Immutable once the run starts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SortJob {
    /// Directory scanned for video files.
    pub source: PathBuf,
    /// Library root receiving the renamed files.
    pub destination: PathBuf,
    pub mode: SortMode,
    /// Copy instead of move.
    pub keep_originals: bool,
}

impl SortJob {
    /// Check the job before a run starts.
    pub fn validate(&self) -> Result<()> {
        crate::utils::fs::ensure_directory(&self.source)?;
        if self.destination.as_os_str().is_empty() {
            return Err(crate::Error::InvalidConfig(
                "destination directory is not set".to_string(),
            ));
        }
        if self.destination.exists() && !self.destination.is_dir() {
            return Err(crate::Error::NotADirectory(
                self.destination.display().to_string(),
            ));
        }
        Ok(())
    }
}
