//! Media-related data models.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Kind of a metadata record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Movie,
    Tv,
}

impl std::fmt::Display for MediaKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MediaKind::Movie => write!(f, "movie"),
            MediaKind::Tv => write!(f, "tv"),
        }
    }
}

/// Kind detected from a filename before any lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KindHint {
    Tv,
    Movie,
    /// The filename could not be read as text.
    Unknown,
}

impl KindHint {
    /// The record kind searched for with this hint.
    pub fn search_kind(self) -> Option<MediaKind> {
        match self {
            KindHint::Tv => Some(MediaKind::Tv),
            KindHint::Movie => Some(MediaKind::Movie),
            KindHint::Unknown => None,
        }
    }
}

impl std::fmt::Display for KindHint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            KindHint::Tv => write!(f, "tv"),
            KindHint::Movie => write!(f, "movie"),
            KindHint::Unknown => write!(f, "unknown"),
        }
    }
}

/// A discovered video file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaFile {
    /// Full path to the file.
    pub path: PathBuf,
    /// File name without path.
    pub filename: String,
    /// Kind detected from the episode pattern.
    pub kind_hint: KindHint,
    /// Extension including the leading dot, original case (e.g. ".mkv").
    pub extension: String,
}

impl MediaFile {
    /// Build a media file from a path, classifying it by its name.
    pub fn from_path(path: &Path) -> Self {
        let filename = path
            .file_name()
            .and_then(|n| n.to_str())
            .map(str::to_string);

        let kind_hint = match filename.as_deref() {
            Some(name) if crate::core::normalizer::has_episode_marker(name) => KindHint::Tv,
            Some(_) => KindHint::Movie,
            None => KindHint::Unknown,
        };

        let extension = path
            .extension()
            .map(|e| format!(".{}", e.to_string_lossy()))
            .unwrap_or_default();

        Self {
            path: path.to_path_buf(),
            filename: filename
                .unwrap_or_else(|| path.file_name().unwrap_or_default().to_string_lossy().to_string()),
            kind_hint,
            extension,
        }
    }

    /// Whether the filename carries an episode marker.
    pub fn is_episode(&self) -> bool {
        self.kind_hint == KindHint::Tv
    }
}

/// Summary of one season as listed in show details.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeasonSummary {
    pub season_number: u16,
    pub episode_count: Option<u16>,
}

/// A search or detail result from a metadata provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateRecord {
    /// Provider-assigned unique ID.
    pub id: String,
    pub kind: MediaKind,
    /// Display title.
    pub title: String,
    /// Release or first-air year.
    pub year: Option<u16>,
    /// Whether season/episode data has been fetched.
    pub detailed: bool,
    /// Seasons of a detailed show; empty otherwise.
    pub seasons: Vec<SeasonSummary>,
}

impl CandidateRecord {
    /// Create an undetailed record as returned by a search.
    pub fn new(id: impl Into<String>, kind: MediaKind, title: impl Into<String>, year: Option<u16>) -> Self {
        Self {
            id: id.into(),
            kind,
            title: title.into(),
            year,
            detailed: false,
            seasons: Vec::new(),
        }
    }

    /// Label shown to the user when choosing between candidates.
    pub fn display_label(&self) -> String {
        match self.year {
            Some(year) => format!("{} ({}) - [{}]", self.title, year, self.kind),
            None => format!("{} (N/A) - [{}]", self.title, self.kind),
        }
    }
}

/// One episode entry of a season.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EpisodeEntry {
    pub episode_number: u16,
    pub title: String,
}

/// Episode list for one show and season.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeasonDetail {
    pub season_number: u16,
    pub episodes: Vec<EpisodeEntry>,
}

impl SeasonDetail {
    /// Title of the given episode, if listed.
    pub fn episode_title(&self, episode_number: u16) -> Option<&str> {
        self.episodes
            .iter()
            .find(|e| e.episode_number == episode_number)
            .map(|e| e.title.as_str())
    }

    /// Number of episodes listed for the season.
    pub fn episode_count(&self) -> usize {
        self.episodes.len()
    }
}
