//! Per-run cache of detailed show records keyed by show folder.

use crate::models::media::CandidateRecord;
use crate::utils::fs::canonical_path;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Show folder -> fully detailed show record.
///
/// Lives for one run. Keys are canonical paths, so `Show/` reached through a
/// symlink and directly share an entry.
#[derive(Debug, Default)]
pub struct ShowCache {
    entries: Mutex<HashMap<PathBuf, CandidateRecord>>,
}

impl ShowCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Detailed record cached for the folder, if any.
    pub fn get(&self, show_folder: &Path) -> Option<CandidateRecord> {
        let key = canonical_path(show_folder);
        self.lock().get(&key).cloned()
    }

    /// Cache a detailed record. Undetailed records are ignored.
    pub fn put(&self, show_folder: &Path, record: CandidateRecord) {
        if !record.detailed {
            tracing::debug!("Not caching undetailed record '{}'", record.title);
            return;
        }
        let key = canonical_path(show_folder);
        self.lock().entry(key).or_insert(record);
    }

    /// Drop every entry; called when a run starts.
    pub fn clear(&self) {
        self.lock().clear();
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<PathBuf, CandidateRecord>> {
        // Every critical section is a single map operation
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }
}
