//! Disambiguation gate.
//!
//! When a search leaves several candidates, the worker publishes them and
//! waits until the collaborator picks one, skips the file, or the run is
//! stopped. There is no timeout; only cancellation ends an unanswered wait.

use crate::core::reporter::Reporter;
use crate::models::media::{CandidateRecord, MediaKind};
use crate::models::run::UserDecision;
use std::sync::Mutex;
use tokio::sync::oneshot;
use tokio_util::sync::CancellationToken;

/// How a wait at the gate ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateOutcome {
    Selected(CandidateRecord),
    Skipped,
    Cancelled,
}

/// Slot holding the pending decision, shared by worker and collaborator.
///
/// Armed by the worker before each wait; filled at most once.
#[derive(Debug, Default)]
pub struct DecisionSlot {
    pending: Mutex<Option<oneshot::Sender<UserDecision>>>,
}

impl DecisionSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reset to pending and return the receiving side.
    fn arm(&self) -> oneshot::Receiver<UserDecision> {
        let (tx, rx) = oneshot::channel();
        *self.lock() = Some(tx);
        rx
    }

    fn disarm(&self) {
        self.lock().take();
    }

    /// Whether the worker is waiting for a decision.
    pub fn is_pending(&self) -> bool {
        self.lock().is_some()
    }

    /// Deliver a decision. Returns `false` when nothing is pending.
    pub fn supply(&self, decision: UserDecision) -> bool {
        match self.lock().take() {
            Some(tx) => tx.send(decision).is_ok(),
            None => false,
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Option<oneshot::Sender<UserDecision>>> {
        self.pending.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// Publish `candidates` and wait for a decision or cancellation.
pub async fn await_decision(
    slot: &DecisionSlot,
    reporter: &Reporter,
    candidates: Vec<CandidateRecord>,
    kind: MediaKind,
    cancel: &CancellationToken,
) -> GateOutcome {
    if cancel.is_cancelled() {
        return GateOutcome::Cancelled;
    }

    let rx = slot.arm();
    reporter.log(format!(
        "  Found {} possible matches. Waiting for a selection...",
        candidates.len()
    ));
    let ids: Vec<String> = candidates.iter().map(|c| c.id.clone()).collect();
    reporter.selection_needed(candidates, kind);

    let outcome = tokio::select! {
        biased;
        _ = cancel.cancelled() => GateOutcome::Cancelled,
        decision = rx => match decision {
            Ok(UserDecision::Select(record)) if ids.contains(&record.id) => GateOutcome::Selected(record),
            Ok(UserDecision::Select(record)) => {
                tracing::warn!("Selected '{}' was not among the candidates", record.id);
                GateOutcome::Skipped
            }
            Ok(UserDecision::Skip) => GateOutcome::Skipped,
            Err(_) => GateOutcome::Cancelled,
        },
    };

    slot.disarm();
    tracing::debug!("Gate resolved: {:?}", outcome);
    outcome
}
