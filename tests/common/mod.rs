//! Shared test fixtures: a scripted metadata provider.

#![allow(dead_code)]

use async_trait::async_trait;
use plex_sorter::error::ProviderError;
use plex_sorter::models::media::{CandidateRecord, EpisodeEntry, MediaKind, SeasonDetail, SeasonSummary};
use plex_sorter::services::{MetadataProvider, ProviderResult};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// In-memory provider with canned answers and call counters.
#[derive(Default)]
pub struct MockProvider {
    /// Search results by exact term.
    pub results: HashMap<String, Vec<CandidateRecord>>,
    /// Errors returned for a term instead of results.
    pub search_errors: HashMap<String, ProviderError>,
    /// Terms whose search panics.
    pub panic_terms: HashSet<String>,
    /// Detailed records by id.
    pub details: HashMap<String, CandidateRecord>,
    /// Seasons by (id, season number).
    pub seasons: HashMap<(String, u16), SeasonDetail>,
    pub searched: Mutex<Vec<String>>,
    pub detail_fetches: AtomicUsize,
    pub season_fetches: AtomicUsize,
}

impl MockProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_results(mut self, term: &str, records: Vec<CandidateRecord>) -> Self {
        self.results.insert(term.to_string(), records);
        self
    }

    pub fn with_search_error(mut self, term: &str, error: ProviderError) -> Self {
        self.search_errors.insert(term.to_string(), error);
        self
    }

    pub fn with_panic(mut self, term: &str) -> Self {
        self.panic_terms.insert(term.to_string());
        self
    }

    pub fn with_details(mut self, record: CandidateRecord) -> Self {
        self.details.insert(record.id.clone(), record);
        self
    }

    pub fn with_season(mut self, id: &str, season: SeasonDetail) -> Self {
        self.seasons.insert((id.to_string(), season.season_number), season);
        self
    }

    pub fn detail_fetches(&self) -> usize {
        self.detail_fetches.load(Ordering::SeqCst)
    }

    pub fn season_fetches(&self) -> usize {
        self.season_fetches.load(Ordering::SeqCst)
    }

    pub fn searched_terms(&self) -> Vec<String> {
        self.searched.lock().unwrap().clone()
    }

    fn detail(&self, id: &str) -> ProviderResult<CandidateRecord> {
        self.detail_fetches.fetch_add(1, Ordering::SeqCst);
        self.details
            .get(id)
            .cloned()
            .ok_or_else(|| ProviderError::Fatal(format!("no details for {}", id)))
    }
}

#[async_trait]
impl MetadataProvider for MockProvider {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn search(&self, term: &str, _kind: MediaKind) -> ProviderResult<Vec<CandidateRecord>> {
        self.searched.lock().unwrap().push(term.to_string());
        if self.panic_terms.contains(term) {
            panic!("provider blew up on '{}'", term);
        }
        if let Some(err) = self.search_errors.get(term) {
            return Err(err.clone());
        }
        Ok(self.results.get(term).cloned().unwrap_or_default())
    }

    async fn fetch_show_details(&self, id: &str) -> ProviderResult<CandidateRecord> {
        self.detail(id)
    }

    async fn fetch_movie_details(&self, id: &str) -> ProviderResult<CandidateRecord> {
        self.detail(id)
    }

    async fn fetch_season_details(&self, id: &str, season_number: u16) -> ProviderResult<SeasonDetail> {
        self.season_fetches.fetch_add(1, Ordering::SeqCst);
        self.seasons
            .get(&(id.to_string(), season_number))
            .cloned()
            .ok_or_else(|| ProviderError::Transient(format!("no season {} for {}", season_number, id)))
    }

    async fn verify_credentials(&self) -> ProviderResult<bool> {
        Ok(true)
    }
}

pub fn movie(id: &str, title: &str, year: Option<u16>) -> CandidateRecord {
    CandidateRecord::new(id, MediaKind::Movie, title, year)
}

pub fn show(id: &str, title: &str, year: Option<u16>) -> CandidateRecord {
    CandidateRecord::new(id, MediaKind::Tv, title, year)
}

/// Detailed show record with `seasons` seasons of ten episodes.
pub fn detailed_show(id: &str, title: &str, year: u16, seasons: u16) -> CandidateRecord {
    let mut record = show(id, title, Some(year));
    record.detailed = true;
    record.seasons = (1..=seasons)
        .map(|n| SeasonSummary {
            season_number: n,
            episode_count: Some(10),
        })
        .collect();
    record
}

pub fn season(number: u16, titles: &[&str]) -> SeasonDetail {
    SeasonDetail {
        season_number: number,
        episodes: titles
            .iter()
            .enumerate()
            .map(|(i, t)| EpisodeEntry {
                episode_number: i as u16 + 1,
                title: t.to_string(),
            })
            .collect(),
    }
}
