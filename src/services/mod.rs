//! Metadata provider bindings.
//!
//! The engine only talks to [`MetadataProvider`]; the TMDB and OMDb clients
//! are two interchangeable implementations chosen by configuration.

pub mod omdb;
pub mod tmdb;

use crate::error::ProviderError;
use crate::models::config::{Config, ProviderKind};
use crate::models::media::{CandidateRecord, MediaKind, SeasonDetail};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

/// Result of a provider call.
pub type ProviderResult<T> = std::result::Result<T, ProviderError>;

/// Capabilities required from a metadata service.
#[async_trait]
pub trait MetadataProvider: Send + Sync {
    /// Short provider name for logs.
    fn name(&self) -> &'static str;

    /// Search titles of the given kind. Results are never detailed.
    async fn search(&self, term: &str, kind: MediaKind) -> ProviderResult<Vec<CandidateRecord>>;

    /// Fetch a show with its season list.
    async fn fetch_show_details(&self, id: &str) -> ProviderResult<CandidateRecord>;

    /// Fetch full movie details.
    async fn fetch_movie_details(&self, id: &str) -> ProviderResult<CandidateRecord>;

    /// Fetch the episode list of one season.
    async fn fetch_season_details(&self, id: &str, season_number: u16) -> ProviderResult<SeasonDetail>;

    /// Check that the configured credentials are accepted.
    async fn verify_credentials(&self) -> ProviderResult<bool>;
}

/// Build the provider selected in `config`.
pub fn build_provider(config: &Config) -> crate::Result<Arc<dyn MetadataProvider>> {
    let timeout = Duration::from_secs(config.search.request_timeout_secs);
    let provider: Arc<dyn MetadataProvider> = match config.provider {
        ProviderKind::Tmdb => {
            let api_key = config.tmdb_api_key().ok_or(crate::Error::TmdbApiKeyMissing)?;
            let tmdb = tmdb::TmdbConfig::new(api_key, config.tmdb.language.clone());
            Arc::new(tmdb::TmdbClient::new(tmdb, timeout)?)
        }
        ProviderKind::Omdb => {
            let api_key = config.omdb_api_key().ok_or(crate::Error::OmdbApiKeyMissing)?;
            Arc::new(omdb::OmdbClient::new(api_key, timeout)?)
        }
    };
    tracing::debug!("Using metadata provider {}", provider.name());
    Ok(provider)
}

/// Year from a date-like string such as `2010-05-01` or `2008–2013`.
pub(crate) fn leading_year(value: &str) -> Option<u16> {
    let digits: String = value.trim().chars().take(4).collect();
    if digits.len() == 4 && digits.chars().all(|c| c.is_ascii_digit()) {
        digits.parse().ok()
    } else {
        None
    }
}
