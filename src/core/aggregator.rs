//! Search aggregator.
//!
//! Runs every term of a query ladder against the provider, merges the
//! results by provider ID (first occurrence wins), optionally pre-fetches
//! details and keeps only records of the requested kind.

use crate::core::query::SearchQuery;
use crate::core::reporter::Reporter;
use crate::error::ProviderError;
use crate::models::media::{CandidateRecord, MediaKind};
use crate::models::run::ProgressChannel;
use crate::services::{MetadataProvider, ProviderResult};
use std::collections::HashSet;

/// Aggregation options.
#[derive(Debug, Clone, Copy, Default)]
pub struct SearchOptions {
    /// Fetch full details for every candidate before filtering by kind.
    pub prefetch_details: bool,
}

/// Search every term and return deduplicated candidates of `kind`.
///
/// Transient failures count as an empty result for that term. A fatal
/// failure aborts the search.
pub async fn aggregate(
    provider: &dyn MetadataProvider,
    query: &SearchQuery,
    kind: MediaKind,
    options: SearchOptions,
    reporter: &Reporter,
) -> ProviderResult<Vec<CandidateRecord>> {
    let mut seen: HashSet<String> = HashSet::new();
    let mut candidates: Vec<CandidateRecord> = Vec::new();
    let total = query.len() as u64;

    reporter.progress(ProgressChannel::Fetch, 0, total);
    for (idx, term) in query.terms().iter().enumerate() {
        reporter.log(format!("  Searching for term: '{}'", term));

        match provider.search(term, kind).await {
            Ok(results) => {
                tracing::debug!("'{}' returned {} results", term, results.len());
                for record in results {
                    if seen.insert(record.id.clone()) {
                        candidates.push(record);
                    }
                }
            }
            Err(ProviderError::Transient(reason)) => {
                reporter.warn(format!(
                    "  API request for '{}' timed out or failed. Continuing...",
                    term
                ));
                tracing::debug!("Transient failure for '{}': {}", term, reason);
            }
            Err(fatal) => return Err(fatal),
        }

        reporter.progress(ProgressChannel::Fetch, idx as u64 + 1, total);
    }

    tracing::info!("Aggregated search yielded {} unique results", candidates.len());

    if options.prefetch_details && !candidates.is_empty() {
        candidates = prefetch(provider, candidates, reporter).await?;
    }

    candidates.retain(|c| c.kind == kind);
    tracing::debug!("After filtering for {}, {} results remain", kind, candidates.len());

    Ok(candidates)
}

/// Replace each candidate by its detailed record.
async fn prefetch(
    provider: &dyn MetadataProvider,
    candidates: Vec<CandidateRecord>,
    reporter: &Reporter,
) -> ProviderResult<Vec<CandidateRecord>> {
    let total = candidates.len() as u64;
    reporter.log(format!("  Pre-fetching details for all {} results...", total));
    reporter.progress(ProgressChannel::Fetch, 0, total);

    let mut detailed = Vec::with_capacity(candidates.len());
    for (idx, candidate) in candidates.into_iter().enumerate() {
        let fetched = match candidate.kind {
            MediaKind::Tv => provider.fetch_show_details(&candidate.id).await,
            MediaKind::Movie => provider.fetch_movie_details(&candidate.id).await,
        };

        match fetched {
            // The search result keeps its identity; details only enrich it
            Ok(mut record) => {
                record.id = candidate.id;
                detailed.push(record);
            }
            Err(ProviderError::Transient(reason)) => {
                tracing::warn!("Could not pre-fetch '{}': {}", candidate.title, reason);
                detailed.push(candidate);
            }
            Err(fatal) => return Err(fatal),
        }
        reporter.progress(ProgressChannel::Fetch, idx as u64 + 1, total);
    }

    Ok(detailed)
}
