//! Integration tests for the run controller.
//!
//! Tests cover:
//! - Movie and TV placement end to end against a scripted provider
//! - Show cache reuse across episodes of one folder
//! - Disambiguation: selection, skip, stop and force stop while waiting
//! - Mode filters and per-file skip/failure reasons

mod common;

use common::{detailed_show, movie, season, show, MockProvider};
use plex_sorter::core::runner::{start_run, RunHandle, RunOptions};
use plex_sorter::error::ProviderError;
use plex_sorter::models::job::{SortJob, SortMode};
use plex_sorter::models::media::CandidateRecord;
use plex_sorter::models::run::{FileOutcome, FinishReason, RunEvent, RunReport, SkipReason, UserDecision};
use std::fs;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use tokio::sync::mpsc::UnboundedReceiver;

const TIMEOUT: Duration = Duration::from_secs(10);

struct Library {
    _temp: TempDir,
    source: std::path::PathBuf,
    dest: std::path::PathBuf,
}

impl Library {
    fn new() -> Self {
        let temp = TempDir::new().unwrap();
        let source = temp.path().join("incoming");
        let dest = temp.path().join("library");
        fs::create_dir_all(&source).unwrap();
        fs::create_dir_all(&dest).unwrap();
        Self {
            _temp: temp,
            source,
            dest,
        }
    }

    fn add(&self, relative: &str) -> std::path::PathBuf {
        let path = self.source.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "fake video").unwrap();
        path
    }

    fn job(&self, mode: SortMode, keep_originals: bool) -> SortJob {
        SortJob {
            source: self.source.clone(),
            destination: self.dest.clone(),
            mode,
            keep_originals,
        }
    }
}

fn start(
    library: &Library,
    provider: Arc<MockProvider>,
    mode: SortMode,
    keep: bool,
) -> (RunHandle, UnboundedReceiver<RunEvent>) {
    start_run(library.job(mode, keep), provider, RunOptions::default()).unwrap()
}

/// Drain events until the run ends; returns the report, the events and the
/// number of cached shows.
async fn finish(
    handle: RunHandle,
    mut events: UnboundedReceiver<RunEvent>,
) -> (RunReport, Vec<RunEvent>, usize) {
    let mut seen = Vec::new();
    tokio::time::timeout(TIMEOUT, async {
        while let Some(event) = events.recv().await {
            seen.push(event);
        }
    })
    .await
    .expect("run must finish");
    let cached_shows = handle.cached_shows();
    let report = tokio::time::timeout(TIMEOUT, handle.wait())
        .await
        .expect("worker must finish")
        .unwrap();
    (report, seen, cached_shows)
}

/// Wait for the next selection request.
async fn next_selection(events: &mut UnboundedReceiver<RunEvent>) -> Vec<CandidateRecord> {
    tokio::time::timeout(TIMEOUT, async {
        while let Some(event) = events.recv().await {
            if let RunEvent::SelectionNeeded { candidates, .. } = event {
                return candidates;
            }
        }
        panic!("run ended without asking for a selection");
    })
    .await
    .expect("selection must be requested")
}

fn log_lines(events: &[RunEvent]) -> Vec<&str> {
    events
        .iter()
        .filter_map(|e| match e {
            RunEvent::Log(line) => Some(line.as_str()),
            _ => None,
        })
        .collect()
}

fn ambiguous_heat() -> MockProvider {
    MockProvider::new().with_results(
        "heat",
        vec![movie("949", "Heat", Some(1995)), movie("11000", "Heat", Some(1986))],
    )
}

#[tokio::test]
async fn test_empty_source_completes() {
    let library = Library::new();
    let provider = Arc::new(MockProvider::new());
    let (handle, events) = start(&library, provider.clone(), SortMode::Both, false);

    let (report, events, _) = finish(handle, events).await;

    assert_eq!(report.reason, FinishReason::Completed);
    assert_eq!(report.discovered, 0);
    assert!(report.outcomes.is_empty());
    assert!(log_lines(&events).contains(&"No video files found in the source directory."));
    assert_eq!(events.last(), Some(&RunEvent::RunFinished(FinishReason::Completed)));
    assert!(provider.searched_terms().is_empty());
}

#[tokio::test]
async fn test_invalid_source_is_rejected() {
    let library = Library::new();
    let mut job = library.job(SortMode::Both, false);
    job.source = library.source.join("missing");

    let result = start_run(job, Arc::new(MockProvider::new()), RunOptions::default());
    assert!(result.is_err());
}

#[tokio::test]
async fn test_single_movie_is_moved() {
    let library = Library::new();
    let original = library.add("Inception.2010.1080p.BluRay.x264.mkv");
    let provider = Arc::new(
        MockProvider::new().with_results("inception", vec![movie("27205", "Inception", Some(2010))]),
    );
    let (handle, events) = start(&library, provider.clone(), SortMode::Both, false);

    let (report, _, cached_shows) = finish(handle, events).await;

    let expected = library.dest.join("Movies").join("2010").join("Inception (2010).mkv");
    assert_eq!(cached_shows, 0);
    assert_eq!(report.reason, FinishReason::Completed);
    assert_eq!(report.placed(), 1);
    assert!(expected.exists());
    assert!(!original.exists());
    assert_eq!(provider.searched_terms(), vec!["inception"]);
}

#[tokio::test]
async fn test_keep_originals_copies() {
    let library = Library::new();
    let original = library.add("Inception (2010).mp4");
    let provider = Arc::new(
        MockProvider::new().with_results("inception", vec![movie("27205", "Inception", Some(2010))]),
    );
    let (handle, events) = start(&library, provider, SortMode::Both, true);

    let (report, _, _) = finish(handle, events).await;

    assert_eq!(report.placed(), 1);
    assert!(original.exists());
    assert!(library
        .dest
        .join("Movies/2010/Inception (2010).mp4")
        .exists());
}

#[tokio::test]
async fn test_episodes_of_one_show_share_cached_details() {
    let library = Library::new();
    library.add("Breaking Bad/Season 1/Breaking.Bad.S01E01.720p.mkv");
    library.add("Breaking Bad/Season 1/Breaking.Bad.S01E02.720p.mkv");
    let provider = Arc::new(
        MockProvider::new()
            .with_results("breaking bad", vec![show("1396", "Breaking Bad", Some(2008))])
            .with_details(detailed_show("1396", "Breaking Bad", 2008, 5))
            .with_season("1396", season(1, &["Pilot", "Cats in the Bag"])),
    );
    let (handle, events) = start(&library, provider.clone(), SortMode::Both, false);

    let (report, events, cached_shows) = finish(handle, events).await;

    assert_eq!(cached_shows, 1);
    let season_dir = library.dest.join("TV Shows").join("Breaking Bad").join("Season 01");
    assert_eq!(report.reason, FinishReason::Completed);
    assert_eq!(report.placed(), 2);
    assert!(season_dir.join("S01E01 - Pilot.mkv").exists());
    assert!(season_dir.join("S01E02 - Cats in the Bag.mkv").exists());

    assert_eq!(provider.detail_fetches(), 1);
    assert_eq!(provider.season_fetches(), 2);
    assert_eq!(provider.searched_terms(), vec!["breaking bad", "breaking"]);
    assert!(log_lines(&events)
        .iter()
        .any(|l| l.contains("Using cached series for this folder: 'Breaking Bad'")));
}

#[tokio::test]
async fn test_unlisted_episode_gets_placeholder_title() {
    let library = Library::new();
    library.add("Breaking Bad/Breaking.Bad.S01E07.mkv");
    let provider = Arc::new(
        MockProvider::new()
            .with_results("breaking bad", vec![show("1396", "Breaking Bad", Some(2008))])
            .with_details(detailed_show("1396", "Breaking Bad", 2008, 5))
            .with_season("1396", season(1, &["Pilot"])),
    );
    let (handle, events) = start(&library, provider, SortMode::Both, false);

    let (report, _, _) = finish(handle, events).await;

    assert_eq!(report.placed(), 1);
    assert!(library
        .dest
        .join("TV Shows/Breaking Bad/Season 01/S01E07 - Unknown Episode.mkv")
        .exists());
}

#[tokio::test]
async fn test_selection_picks_candidate() {
    let library = Library::new();
    library.add("Heat.mkv");
    let provider = Arc::new(ambiguous_heat());
    let (handle, mut events) = start(&library, provider, SortMode::Both, false);

    let candidates = next_selection(&mut events).await;
    assert_eq!(candidates.len(), 2);
    assert!(handle.is_awaiting_choice());
    assert!(handle.supply_choice(UserDecision::Select(candidates[1].clone())));

    let (report, _, _) = finish(handle, events).await;

    assert_eq!(report.reason, FinishReason::Completed);
    assert!(library.dest.join("Movies/1986/Heat (1986).mkv").exists());
}

#[tokio::test]
async fn test_user_skip_leaves_file_and_continues() {
    let library = Library::new();
    let heat = library.add("Heat.mkv");
    library.add("Inception.mkv");
    let provider = Arc::new(
        ambiguous_heat().with_results("inception", vec![movie("27205", "Inception", Some(2010))]),
    );
    let (handle, mut events) = start(&library, provider, SortMode::Both, false);

    next_selection(&mut events).await;
    handle.supply_choice(UserDecision::Skip);

    let (report, _, _) = finish(handle, events).await;

    assert_eq!(report.reason, FinishReason::Completed);
    assert!(heat.exists());
    assert_eq!(report.outcomes[0].1, FileOutcome::Skipped(SkipReason::UserSkipped));
    assert_eq!(report.placed(), 1);
}

#[tokio::test]
async fn test_stop_while_waiting_for_selection() {
    let library = Library::new();
    let heat = library.add("Heat.mkv");
    library.add("Inception.mkv");
    let provider = Arc::new(ambiguous_heat());
    let (handle, mut events) = start(&library, provider.clone(), SortMode::Both, false);

    next_selection(&mut events).await;
    handle.request_stop();

    let (report, _, _) = finish(handle, events).await;

    assert_eq!(report.reason, FinishReason::StoppedByUser);
    assert!(heat.exists());
    assert_eq!(report.outcomes.len(), 1);
    assert_eq!(report.outcomes[0].1, FileOutcome::Skipped(SkipReason::Cancelled));
    assert!(!provider.searched_terms().contains(&"inception".to_string()));
}

#[tokio::test]
async fn test_force_stop_while_waiting_for_selection() {
    let library = Library::new();
    let heat = library.add("Heat.mkv");
    let provider = Arc::new(ambiguous_heat());
    let (handle, mut events) = start(&library, provider, SortMode::Both, false);

    next_selection(&mut events).await;
    handle.request_force_stop();

    let (report, events, _) = finish(handle, events).await;

    assert_eq!(report.reason, FinishReason::ForceStopped);
    assert!(heat.exists());
    assert_eq!(events.last(), Some(&RunEvent::RunFinished(FinishReason::ForceStopped)));
}

#[tokio::test]
async fn test_mode_filter_skips_other_kind() {
    let library = Library::new();
    let episode = library.add("Show/Show.S01E01.mkv");
    library.add("Inception.mkv");
    let provider = Arc::new(
        MockProvider::new().with_results("inception", vec![movie("27205", "Inception", Some(2010))]),
    );
    let (handle, events) = start(&library, provider, SortMode::Movies, false);

    let (report, _, _) = finish(handle, events).await;

    assert!(episode.exists());
    assert_eq!(report.placed(), 1);
    assert_eq!(
        report.outcomes[1].1,
        FileOutcome::Skipped(SkipReason::ModeFilter(
            "Sorting mode is 'Movies Only'. Skipping TV episode.".to_string()
        ))
    );
}

#[tokio::test]
async fn test_tv_mode_skips_movies() {
    let library = Library::new();
    let movie_file = library.add("Inception.mkv");
    library.add("Breaking Bad/Breaking.Bad.S01E01.mkv");
    let provider = Arc::new(
        MockProvider::new()
            .with_results("inception", vec![movie("27205", "Inception", Some(2010))])
            .with_results("breaking bad", vec![show("1396", "Breaking Bad", Some(2008))])
            .with_details(detailed_show("1396", "Breaking Bad", 2008, 5))
            .with_season("1396", season(1, &["Pilot"])),
    );
    let (handle, events) = start(&library, provider.clone(), SortMode::Tv, false);

    let (report, _, _) = finish(handle, events).await;

    assert!(movie_file.exists());
    assert_eq!(report.placed(), 1);
    assert!(library
        .dest
        .join("TV Shows/Breaking Bad/Season 01/S01E01 - Pilot.mkv")
        .exists());
    assert_eq!(
        report.outcomes[1].1,
        FileOutcome::Skipped(SkipReason::ModeFilter(
            "Sorting mode is 'TV Shows Only'. Skipping potential movie.".to_string()
        ))
    );
    assert!(!provider.searched_terms().contains(&"inception".to_string()));
}

#[tokio::test]
async fn test_internal_error_fails_only_that_file() {
    let library = Library::new();
    let boom = library.add("Boom.mkv");
    library.add("Inception.mkv");
    let provider = Arc::new(
        MockProvider::new()
            .with_panic("boom")
            .with_results("inception", vec![movie("27205", "Inception", Some(2010))]),
    );
    let (handle, events) = start(&library, provider, SortMode::Both, false);

    let (report, _, _) = finish(handle, events).await;

    assert_eq!(report.reason, FinishReason::Completed);
    assert_eq!(report.failed(), 1);
    assert_eq!(report.placed(), 1);
    assert!(boom.exists());
    assert!(matches!(&report.outcomes[0].1, FileOutcome::Failed(msg) if msg.contains("Internal error")));
    assert!(library.dest.join("Movies/2010/Inception (2010).mkv").exists());
}

#[tokio::test]
async fn test_missing_year_and_no_match_are_skipped() {
    let library = Library::new();
    library.add("Obscure Film.mkv");
    library.add("Untitled Thing.mkv");
    let provider = Arc::new(
        MockProvider::new().with_results("obscure film", vec![movie("1", "Obscure Film", None)]),
    );
    let (handle, events) = start(&library, provider, SortMode::Both, false);

    let (report, _, _) = finish(handle, events).await;

    assert_eq!(report.skipped(), 2);
    assert_eq!(
        report.outcomes[0].1,
        FileOutcome::Skipped(SkipReason::MissingYear {
            title: "Obscure Film".to_string()
        })
    );
    assert_eq!(
        report.outcomes[1].1,
        FileOutcome::Skipped(SkipReason::NoMatch {
            query: "Untitled Thing".to_string()
        })
    );
}

#[tokio::test]
async fn test_failures_do_not_stop_the_run() {
    let library = Library::new();
    let broken = library.add("Broken.mkv");
    library.add("Inception.mkv");
    fs::create_dir_all(library.dest.join("Movies/2010")).unwrap();
    fs::write(library.dest.join("Movies/2010/Inception (2010).mkv"), "existing").unwrap();

    let provider = Arc::new(
        MockProvider::new()
            .with_search_error("broken", ProviderError::Fatal("invalid API key".into()))
            .with_results("inception", vec![movie("27205", "Inception", Some(2010))]),
    );
    let (handle, events) = start(&library, provider, SortMode::Both, false);

    let (report, _, _) = finish(handle, events).await;

    assert_eq!(report.reason, FinishReason::Completed);
    assert_eq!(report.failed(), 2);
    assert!(broken.exists());
    assert!(library.source.join("Inception.mkv").exists());
    assert_eq!(
        fs::read_to_string(library.dest.join("Movies/2010/Inception (2010).mkv")).unwrap(),
        "existing"
    );
}

#[tokio::test]
async fn test_request_stop_before_any_file() {
    let library = Library::new();
    let heat = library.add("Heat.mkv");
    let provider = Arc::new(ambiguous_heat());
    let (handle, events) = start(&library, provider, SortMode::Both, false);
    handle.request_stop();

    let (report, _, _) = finish(handle, events).await;

    assert_eq!(report.reason, FinishReason::StoppedByUser);
    assert!(heat.exists());
    assert!(report.outcomes.len() <= 1);
}
