//! Event sink connecting the run worker to its collaborator.

use crate::models::media::{CandidateRecord, MediaKind};
use crate::models::run::{FileOutcome, FinishReason, ProgressChannel, RunEvent};
use std::path::Path;
use tokio::sync::mpsc::UnboundedSender;

/// Sends run events to the collaborator and mirrors log lines to `tracing`.
///
/// A collaborator that stopped listening does not stop the run.
#[derive(Debug, Clone)]
pub struct Reporter {
    tx: UnboundedSender<RunEvent>,
}

impl Reporter {
    pub fn new(tx: UnboundedSender<RunEvent>) -> Self {
        Self { tx }
    }

    fn send(&self, event: RunEvent) {
        if self.tx.send(event).is_err() {
            tracing::debug!("Run event dropped: receiver closed");
        }
    }

    /// User-facing log line.
    pub fn log(&self, message: impl Into<String>) {
        let message = message.into();
        tracing::info!("{}", message.trim_start());
        self.send(RunEvent::Log(message));
    }

    /// User-facing warning.
    pub fn warn(&self, message: impl Into<String>) {
        let message = message.into();
        tracing::warn!("{}", message.trim_start());
        self.send(RunEvent::Log(message));
    }

    pub fn progress(&self, channel: ProgressChannel, current: u64, total: u64) {
        self.send(RunEvent::Progress {
            channel,
            current,
            total,
        });
    }

    /// Per-file milestone out of 100.
    pub fn file_milestone(&self, percent: u64) {
        self.progress(ProgressChannel::File, percent, 100);
    }

    pub fn selection_needed(&self, candidates: Vec<CandidateRecord>, kind: MediaKind) {
        self.send(RunEvent::SelectionNeeded { candidates, kind });
    }

    pub fn file_finished(&self, index: usize, path: &Path, outcome: FileOutcome) {
        self.send(RunEvent::FileFinished {
            index,
            path: path.to_path_buf(),
            outcome,
        });
    }

    pub fn finished(&self, reason: FinishReason) {
        self.send(RunEvent::RunFinished(reason));
    }
}
