//! Run controller.
//!
//! Owns one sort run: discovers video files, then for each file in order
//! resolves the show folder (TV), consults the show cache, searches the
//! provider, asks the collaborator when the match is ambiguous, computes the
//! destination and places the file. Files are processed strictly one at a
//! time on a single worker task.
//!
//! Stop is cooperative: it is checked before each file and around the
//! disambiguation wait, and the file in flight is finished. Force stop also
//! abandons the file in flight at its next await point; file placement has no
//! await point, so a file is never left half-placed.

use crate::core::aggregator::{self, SearchOptions};
use crate::core::cache::ShowCache;
use crate::core::gate::{self, DecisionSlot, GateOutcome};
use crate::core::normalizer::{clean_filename, clean_folder_name, episode_numbers};
use crate::core::placement::{place_file, PlacementMode};
use crate::core::query::SearchQuery;
use crate::core::reporter::Reporter;
use crate::core::scanner::scan_directory;
use crate::core::show_folder::find_show_folder;
use crate::error::ProviderError;
use crate::generators::destination::{self, Destination, EpisodeSlot};
use crate::models::config::{Config, EpisodePadding, LibraryLayout};
use crate::models::job::SortJob;
use crate::models::media::{CandidateRecord, MediaFile, MediaKind};
use crate::models::run::{
    FileOutcome, FinishReason, ProgressChannel, RunEvent, RunReport, SkipReason, UserDecision,
};
use crate::services::MetadataProvider;
use crate::Result;
use chrono::Utc;
use futures::FutureExt;
use std::panic::AssertUnwindSafe;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::mpsc::{self, UnboundedReceiver};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::Instrument;
use uuid::Uuid;

/// Engine settings for a run.
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub search: SearchOptions,
    pub layout: LibraryLayout,
    pub padding: EpisodePadding,
    /// Accepted video extensions, without the leading dot.
    pub video_extensions: Vec<String>,
}

impl RunOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            search: SearchOptions {
                prefetch_details: config.search.prefetch_details,
            },
            layout: config.library.layout,
            padding: config.library.episode_padding,
            video_extensions: config.scan.video_extensions.clone(),
        }
    }
}

impl Default for RunOptions {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

/// Collaborator-side handle on a running sort.
#[derive(Debug)]
pub struct RunHandle {
    run_id: String,
    stop: CancellationToken,
    force: CancellationToken,
    decisions: Arc<DecisionSlot>,
    cache: Arc<ShowCache>,
    worker: JoinHandle<RunReport>,
}

impl RunHandle {
    pub fn run_id(&self) -> &str {
        &self.run_id
    }

    /// Finish the current file, then stop. Unblocks a pending selection.
    pub fn request_stop(&self) {
        tracing::info!("Stop signal received by worker.");
        self.stop.cancel();
    }

    /// Stop as soon as possible, abandoning the current file.
    pub fn request_force_stop(&self) {
        tracing::info!("Force stop signal received by worker.");
        self.force.cancel();
    }

    /// Answer a pending `SelectionNeeded`. Returns `false` if nothing waits.
    pub fn supply_choice(&self, decision: UserDecision) -> bool {
        self.decisions.supply(decision)
    }

    /// Whether the worker is blocked awaiting a choice.
    pub fn is_awaiting_choice(&self) -> bool {
        self.decisions.is_pending()
    }

    /// Number of show folders resolved so far in this run.
    pub fn cached_shows(&self) -> usize {
        self.cache.len()
    }

    /// Wait for the run to end.
    pub async fn wait(self) -> Result<RunReport> {
        self.worker
            .await
            .map_err(|e| crate::Error::Worker(e.to_string()))
    }
}

/// Validate `job` and start a run on a new worker task.
///
/// Must be called from within a tokio runtime.
pub fn start_run(
    job: SortJob,
    provider: Arc<dyn MetadataProvider>,
    options: RunOptions,
) -> Result<(RunHandle, UnboundedReceiver<RunEvent>)> {
    job.validate()?;
    if options.video_extensions.is_empty() {
        return Err(crate::Error::InvalidConfig(
            "no video extensions configured".to_string(),
        ));
    }

    let (tx, rx) = mpsc::unbounded_channel();
    let run_id = Uuid::new_v4().to_string();
    let force = CancellationToken::new();
    let stop = force.child_token();
    let decisions = Arc::new(DecisionSlot::new());
    let cache = Arc::new(ShowCache::new());

    let worker = Worker {
        job,
        provider,
        options,
        reporter: Reporter::new(tx),
        decisions: decisions.clone(),
        cache: cache.clone(),
        stop: stop.clone(),
        force: force.clone(),
    };

    let span = tracing::info_span!("run", id = %run_id);
    let worker = tokio::spawn(worker.run(run_id.clone()).instrument(span));

    Ok((
        RunHandle {
            run_id,
            stop,
            force,
            decisions,
            cache,
            worker,
        },
        rx,
    ))
}

/// Why a file was abandoned before placement.
enum Abandon {
    Skip(SkipReason),
    /// Cancelled at the gate; the run stops after this file.
    Halt,
    Fail(String),
}

impl From<SkipReason> for Abandon {
    fn from(reason: SkipReason) -> Self {
        Abandon::Skip(reason)
    }
}

impl From<ProviderError> for Abandon {
    fn from(err: ProviderError) -> Self {
        Abandon::Fail(format!("Metadata request failed: {}. Skipping.", err))
    }
}

impl From<crate::Error> for Abandon {
    fn from(err: crate::Error) -> Self {
        Abandon::Fail(format!("ERROR processing match: {}", err))
    }
}

/// Outcome of one file plus whether the run must halt afterwards.
struct FileStep {
    outcome: FileOutcome,
    halt: bool,
}

struct Worker {
    job: SortJob,
    provider: Arc<dyn MetadataProvider>,
    options: RunOptions,
    reporter: Reporter,
    decisions: Arc<DecisionSlot>,
    cache: Arc<ShowCache>,
    stop: CancellationToken,
    force: CancellationToken,
}

impl Worker {
    async fn run(self, run_id: String) -> RunReport {
        let started_at = Utc::now();
        self.cache.clear();
        self.reporter.log("--- Starting Sort ---");
        tracing::info!(
            "Sorting {:?} into {:?} (mode: {}, keep originals: {}, provider: {})",
            self.job.source,
            self.job.destination,
            self.job.mode,
            self.job.keep_originals,
            self.provider.name()
        );

        let mut outcomes = Vec::new();
        let (reason, discovered) = match scan_directory(&self.job.source, &self.options.video_extensions) {
            Ok(scan) if scan.videos.is_empty() => {
                self.reporter.log("No video files found in the source directory.");
                (FinishReason::Completed, 0)
            }
            Ok(scan) => {
                let discovered = scan.videos.len();
                (self.process_all(&scan.videos, &mut outcomes).await, discovered)
            }
            Err(e) => {
                let reason = format!("Cannot read source directory: {}", e);
                self.reporter.warn(reason.clone());
                (FinishReason::Failed(reason), 0)
            }
        };

        self.reporter.log(format!("--- Sort {} ---", reason));
        self.reporter.finished(reason.clone());

        RunReport {
            run_id,
            started_at,
            finished_at: Utc::now(),
            reason,
            discovered,
            outcomes,
        }
    }

    async fn process_all(
        &self,
        videos: &[MediaFile],
        outcomes: &mut Vec<(PathBuf, FileOutcome)>,
    ) -> FinishReason {
        let total = videos.len() as u64;
        self.reporter.progress(ProgressChannel::Overall, 0, total);

        for (index, file) in videos.iter().enumerate() {
            if self.force.is_cancelled() {
                self.reporter.log("--- Force stop received. Halting process. ---");
                return FinishReason::ForceStopped;
            }
            if self.stop.is_cancelled() {
                self.reporter.log("--- Stop signal received. Halting process. ---");
                return FinishReason::StoppedByUser;
            }

            self.reporter.log(format!("\nProcessing: {}", file.filename));
            tracing::debug!("Processing file: {:?}", file.path);
            self.reporter.file_milestone(0);

            let guarded = AssertUnwindSafe(self.process_file(file)).catch_unwind();
            let step = tokio::select! {
                biased;
                _ = self.force.cancelled() => None,
                step = guarded => Some(step.unwrap_or_else(|panic| internal_failure(file, panic))),
            };

            let Some(step) = step else {
                self.reporter
                    .log("--- Force stop received. Abandoning current file. ---");
                self.record(index, file, FileOutcome::Skipped(SkipReason::Cancelled), outcomes);
                return FinishReason::ForceStopped;
            };

            self.record(index, file, step.outcome, outcomes);
            self.reporter.file_milestone(100);
            self.reporter
                .progress(ProgressChannel::Overall, index as u64 + 1, total);

            if step.halt {
                if self.force.is_cancelled() {
                    return FinishReason::ForceStopped;
                }
                self.reporter.log("--- Stop signal received. Halting process. ---");
                return FinishReason::StoppedByUser;
            }
        }

        FinishReason::Completed
    }

    fn record(
        &self,
        index: usize,
        file: &MediaFile,
        outcome: FileOutcome,
        outcomes: &mut Vec<(PathBuf, FileOutcome)>,
    ) {
        match &outcome {
            FileOutcome::Placed { .. } => {}
            FileOutcome::Skipped(reason) => self.reporter.log(format!("  {}", reason)),
            FileOutcome::Failed(reason) => {
                tracing::error!("Failed to process {:?}: {}", file.path, reason);
                self.reporter.warn(format!("  {}", reason));
            }
        }
        self.reporter.file_finished(index, &file.path, outcome.clone());
        outcomes.push((file.path.clone(), outcome));
    }

    async fn process_file(&self, file: &MediaFile) -> FileStep {
        match self.handle_file(file).await {
            Ok(destination) => FileStep {
                outcome: FileOutcome::Placed { destination },
                halt: false,
            },
            Err(Abandon::Skip(reason)) => FileStep {
                outcome: FileOutcome::Skipped(reason),
                halt: false,
            },
            Err(Abandon::Halt) => FileStep {
                outcome: FileOutcome::Skipped(SkipReason::Cancelled),
                halt: true,
            },
            Err(Abandon::Fail(reason)) => FileStep {
                outcome: FileOutcome::Failed(reason),
                halt: false,
            },
        }
    }

    async fn handle_file(&self, file: &MediaFile) -> std::result::Result<PathBuf, Abandon> {
        if let Some(message) = self.job.mode.rejects(file) {
            return Err(SkipReason::ModeFilter(message.to_string()).into());
        }
        let kind = file.kind_hint.search_kind().ok_or(SkipReason::UnreadableName)?;

        let show_folder =
            (kind == MediaKind::Tv).then(|| find_show_folder(&file.path, &self.job.source));

        let record = match show_folder.as_deref().and_then(|f| self.cache.get(f)) {
            Some(cached) => {
                self.reporter.log(format!(
                    "  Using cached series for this folder: '{}'",
                    cached.title
                ));
                cached
            }
            None => self.identify(file, kind, show_folder.as_deref()).await?,
        };
        self.reporter.file_milestone(25);

        if record.year.is_none() {
            return Err(SkipReason::MissingYear {
                title: record.title,
            }
            .into());
        }
        self.reporter.log(format!("  Match: {}", record.display_label()));

        let destination = match kind {
            MediaKind::Movie => {
                destination::resolve_movie(&self.job.destination, &record, &file.extension)?
            }
            MediaKind::Tv => self.resolve_episode(file, record, show_folder.as_deref()).await?,
        };
        self.reporter.file_milestone(75);

        let mode = PlacementMode::from_keep_originals(self.job.keep_originals);
        self.reporter.log(format!(
            "  {} to: {}",
            mode.action(),
            destination.path().display()
        ));
        Ok(place_file(&file.path, &destination, mode)?)
    }

    /// Search the provider and settle on one record.
    async fn identify(
        &self,
        file: &MediaFile,
        kind: MediaKind,
        show_folder: Option<&Path>,
    ) -> std::result::Result<CandidateRecord, Abandon> {
        let search_title = match show_folder {
            Some(folder) => {
                let name = folder
                    .file_name()
                    .map(|n| n.to_string_lossy().to_string())
                    .unwrap_or_default();
                let title = clean_folder_name(&name);
                self.reporter.log(format!(
                    "  TV episode detected. Searching for series: '{}'",
                    title
                ));
                title
            }
            None => {
                let title = clean_filename(&file.filename);
                self.reporter.log(format!(
                    "  Movie file detected. Using filename for search: '{}'",
                    title
                ));
                title
            }
        };

        let query = SearchQuery::expand(&search_title);
        if query.is_empty() {
            return Err(SkipReason::EmptyQuery.into());
        }
        tracing::debug!("Generated search terms for '{}': {:?}", search_title, query.terms());

        let mut candidates = aggregator::aggregate(
            self.provider.as_ref(),
            &query,
            kind,
            self.options.search,
            &self.reporter,
        )
        .await?;

        match candidates.len() {
            0 => Err(SkipReason::NoMatch {
                query: search_title,
            }
            .into()),
            1 => Ok(candidates.remove(0)),
            _ => self.disambiguate(candidates, kind).await,
        }
    }

    async fn disambiguate(
        &self,
        candidates: Vec<CandidateRecord>,
        kind: MediaKind,
    ) -> std::result::Result<CandidateRecord, Abandon> {
        if self.stop.is_cancelled() {
            return Err(Abandon::Halt);
        }

        let outcome =
            gate::await_decision(&self.decisions, &self.reporter, candidates, kind, &self.stop)
                .await;

        if self.stop.is_cancelled() {
            return Err(Abandon::Halt);
        }
        match outcome {
            GateOutcome::Selected(record) => Ok(record),
            GateOutcome::Skipped => Err(SkipReason::UserSkipped.into()),
            GateOutcome::Cancelled => Err(Abandon::Halt),
        }
    }

    /// Fetch show and season details and compute the episode destination.
    async fn resolve_episode(
        &self,
        file: &MediaFile,
        record: CandidateRecord,
        show_folder: Option<&Path>,
    ) -> std::result::Result<Destination, Abandon> {
        let (season, episode) =
            episode_numbers(&file.filename).ok_or(SkipReason::MissingEpisodePattern)?;
        self.reporter
            .log(format!("  Detected Season {}, Episode {}", season, episode));

        let show = if record.detailed {
            record
        } else {
            self.reporter.progress(ProgressChannel::Fetch, 0, 1);
            let details = self.provider.fetch_show_details(&record.id).await?;
            tracing::debug!("Fetched full show details for '{}'", details.title);
            details
        };
        if let Some(folder) = show_folder {
            if self.cache.get(folder).is_none() {
                self.cache.put(folder, show.clone());
                tracing::debug!("Show details for '{}' saved to cache", show.title);
            }
        }
        self.reporter.file_milestone(50);

        let season_detail = self.provider.fetch_season_details(&show.id, season).await?;
        self.reporter.progress(ProgressChannel::Fetch, 1, 1);

        let title = season_detail.episode_title(episode);
        tracing::debug!("Episode title for S{}E{}: {:?}", season, episode, title);

        let slot = EpisodeSlot {
            season,
            episode,
            title,
            season_episode_count: season_detail.episode_count(),
        };
        Ok(destination::resolve_episode(
            &self.job.destination,
            &show,
            slot,
            &file.extension,
            self.options.layout,
            self.options.padding,
        )?)
    }
}

/// Turn a panic inside per-file processing into a failed outcome.
fn internal_failure(file: &MediaFile, panic: Box<dyn std::any::Any + Send>) -> FileStep {
    let message = panic
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| panic.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic".to_string());
    tracing::error!("Internal error while processing {:?}: {}", file.path, message);
    FileStep {
        outcome: FileOutcome::Failed(format!("Internal error: {}", message)),
        halt: false,
    }
}
