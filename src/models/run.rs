//! Run events, decisions and outcomes exchanged with the collaborator.

use crate::models::media::{CandidateRecord, MediaKind};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Decision supplied by the collaborator while a file awaits disambiguation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum UserDecision {
    Select(CandidateRecord),
    Skip,
}

/// Progress channel reported to the collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProgressChannel {
    /// Files processed out of files discovered.
    Overall,
    /// Milestones (0/25/50/75/100) within the current file.
    File,
    /// Provider calls within the current file.
    Fetch,
}

/// Why a run ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum FinishReason {
    Completed,
    StoppedByUser,
    ForceStopped,
    /// A run-level failure such as an unreadable source directory.
    Failed(String),
}

impl std::fmt::Display for FinishReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FinishReason::Completed => write!(f, "completed"),
            FinishReason::StoppedByUser => write!(f, "stopped by user"),
            FinishReason::ForceStopped => write!(f, "force stopped"),
            FinishReason::Failed(reason) => write!(f, "failed: {}", reason),
        }
    }
}

/// Why a file was left untouched without an error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SkipReason {
    /// Excluded by the run's mode filter.
    ModeFilter(String),
    /// The filename could not be read as text.
    UnreadableName,
    /// The cleaned title had no searchable tokens.
    EmptyQuery,
    NoMatch { query: String },
    MissingYear { title: String },
    /// The matched title cannot be used as a folder name.
    UnusableTitle { title: String },
    MissingEpisodePattern,
    UserSkipped,
    Cancelled,
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SkipReason::ModeFilter(msg) => write!(f, "{}", msg),
            SkipReason::UnreadableName => write!(f, "File name is not valid text. Skipping."),
            SkipReason::EmptyQuery => write!(f, "Nothing left to search for after cleaning the name. Skipping."),
            SkipReason::NoMatch { query } => {
                write!(f, "Could not find any matching media for '{}'. Skipping.", query)
            }
            SkipReason::MissingYear { title } => {
                write!(f, "Could not find year for '{}'. Skipping.", title)
            }
            SkipReason::UnusableTitle { title } => {
                write!(f, "Title '{}' cannot be used as a folder name. Skipping.", title)
            }
            SkipReason::MissingEpisodePattern => {
                write!(f, "Could not find episode pattern (SxxExx) in TV file. Skipping.")
            }
            SkipReason::UserSkipped => write!(f, "File skipped by user."),
            SkipReason::Cancelled => write!(f, "Selection cancelled. File left in place."),
        }
    }
}

/// Result of processing one file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum FileOutcome {
    Placed { destination: PathBuf },
    Skipped(SkipReason),
    Failed(String),
}

/// Event emitted by the run worker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunEvent {
    Log(String),
    Progress {
        channel: ProgressChannel,
        current: u64,
        total: u64,
    },
    /// The worker is blocked until a decision is supplied or the run stops.
    SelectionNeeded {
        candidates: Vec<CandidateRecord>,
        kind: MediaKind,
    },
    FileFinished {
        index: usize,
        path: PathBuf,
        outcome: FileOutcome,
    },
    RunFinished(FinishReason),
}

/// Summary returned when a run ends.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    pub run_id: String,
    pub started_at: chrono::DateTime<chrono::Utc>,
    pub finished_at: chrono::DateTime<chrono::Utc>,
    pub reason: FinishReason,
    /// Video files discovered under the source root.
    pub discovered: usize,
    /// Outcome per processed file, in discovery order.
    pub outcomes: Vec<(PathBuf, FileOutcome)>,
}

impl RunReport {
    /// Number of files moved or copied.
    pub fn placed(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|(_, o)| matches!(o, FileOutcome::Placed { .. }))
            .count()
    }

    /// Number of files skipped.
    pub fn skipped(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|(_, o)| matches!(o, FileOutcome::Skipped(_)))
            .count()
    }

    /// Number of files that failed.
    pub fn failed(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|(_, o)| matches!(o, FileOutcome::Failed(_)))
            .count()
    }
}
