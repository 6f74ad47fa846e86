//! TMDB API client.

use super::{leading_year, MetadataProvider, ProviderResult};
use crate::models::media::{CandidateRecord, EpisodeEntry, MediaKind, SeasonDetail, SeasonSummary};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;

const TMDB_BASE_URL: &str = "https://api.themoviedb.org/3";

/// TMDB client configuration.
#[derive(Debug, Clone)]
pub struct TmdbConfig {
    /// API key or Bearer token (JWT)
    pub api_key: String,
    pub language: String,
    /// Whether to use Bearer token authentication (API v4 style)
    pub use_bearer: bool,
}

impl TmdbConfig {
    /// Create config for a key, detecting v4 bearer tokens.
    pub fn new(api_key: String, language: String) -> Self {
        // Bearer tokens start with "eyJ" (base64 encoded JWT header)
        let use_bearer = api_key.starts_with("eyJ");
        Self {
            api_key,
            language,
            use_bearer,
        }
    }
}

/// TMDB API client.
pub struct TmdbClient {
    config: TmdbConfig,
    client: reqwest::Client,
}

/// Movie search result.
#[derive(Debug, Deserialize)]
pub struct MovieSearchResult {
    pub results: Vec<MovieSearchItem>,
}

/// Movie search item.
#[derive(Debug, Deserialize)]
pub struct MovieSearchItem {
    pub id: u64,
    pub title: String,
    pub release_date: Option<String>,
}

/// Movie details.
#[derive(Debug, Deserialize)]
pub struct MovieDetails {
    pub id: u64,
    pub title: String,
    pub release_date: Option<String>,
}

/// TV show search result.
#[derive(Debug, Deserialize)]
pub struct TvSearchResult {
    pub results: Vec<TvSearchItem>,
}

/// TV show search item.
#[derive(Debug, Deserialize)]
pub struct TvSearchItem {
    pub id: u64,
    pub name: String,
    pub first_air_date: Option<String>,
}

/// TV show details.
#[derive(Debug, Deserialize)]
pub struct TvDetails {
    pub id: u64,
    pub name: String,
    pub first_air_date: Option<String>,
    #[serde(default)]
    pub seasons: Vec<TvSeason>,
}

/// Season entry in TV show details.
#[derive(Debug, Deserialize)]
pub struct TvSeason {
    pub season_number: u16,
    pub episode_count: Option<u16>,
}

/// Season details.
#[derive(Debug, Deserialize)]
pub struct SeasonDetails {
    pub season_number: u16,
    #[serde(default)]
    pub episodes: Vec<EpisodeInfo>,
}

/// Episode info within a season.
#[derive(Debug, Deserialize)]
pub struct EpisodeInfo {
    pub episode_number: u16,
    pub name: String,
}

impl From<MovieSearchItem> for CandidateRecord {
    fn from(item: MovieSearchItem) -> Self {
        let year = item.release_date.as_deref().and_then(leading_year);
        CandidateRecord::new(item.id.to_string(), MediaKind::Movie, item.title, year)
    }
}

impl From<TvSearchItem> for CandidateRecord {
    fn from(item: TvSearchItem) -> Self {
        let year = item.first_air_date.as_deref().and_then(leading_year);
        CandidateRecord::new(item.id.to_string(), MediaKind::Tv, item.name, year)
    }
}

impl From<MovieDetails> for CandidateRecord {
    fn from(details: MovieDetails) -> Self {
        let year = details.release_date.as_deref().and_then(leading_year);
        let mut record =
            CandidateRecord::new(details.id.to_string(), MediaKind::Movie, details.title, year);
        record.detailed = true;
        record
    }
}

impl From<TvDetails> for CandidateRecord {
    fn from(details: TvDetails) -> Self {
        let year = details.first_air_date.as_deref().and_then(leading_year);
        let mut record =
            CandidateRecord::new(details.id.to_string(), MediaKind::Tv, details.name, year);
        record.detailed = true;
        record.seasons = details
            .seasons
            .into_iter()
            .map(|s| SeasonSummary {
                season_number: s.season_number,
                episode_count: s.episode_count,
            })
            .collect();
        record
    }
}

impl From<SeasonDetails> for SeasonDetail {
    fn from(details: SeasonDetails) -> Self {
        SeasonDetail {
            season_number: details.season_number,
            episodes: details
                .episodes
                .into_iter()
                .map(|e| EpisodeEntry {
                    episode_number: e.episode_number,
                    title: e.name,
                })
                .collect(),
        }
    }
}

impl TmdbClient {
    /// Create a new TMDB client with a per-request timeout.
    pub fn new(config: TmdbConfig, timeout: Duration) -> crate::Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { config, client })
    }

    /// Build a request with proper authentication.
    fn build_request(&self, url: &str) -> reqwest::RequestBuilder {
        let request = self.client.get(url);
        if self.config.use_bearer {
            request.header("Authorization", format!("Bearer {}", self.config.api_key))
        } else {
            request
        }
    }

    /// Build URL with optional api_key parameter (only for v3 style).
    fn build_url(&self, path: &str, extra_params: &str) -> String {
        if self.config.use_bearer {
            format!(
                "{}/{}?language={}{}",
                TMDB_BASE_URL, path, self.config.language, extra_params
            )
        } else {
            format!(
                "{}/{}?api_key={}&language={}{}",
                TMDB_BASE_URL, path, self.config.api_key, self.config.language, extra_params
            )
        }
    }

    /// Send a GET request and decode the JSON body.
    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> ProviderResult<T> {
        let resp = self.build_request(url).send().await?.error_for_status()?;
        Ok(resp.json().await?)
    }

    /// Search for movies.
    pub async fn search_movie(&self, query: &str) -> ProviderResult<Vec<MovieSearchItem>> {
        let url = self.build_url(
            "search/movie",
            &format!("&query={}", urlencoding::encode(query)),
        );
        let resp: MovieSearchResult = self.get_json(&url).await?;
        Ok(resp.results)
    }

    /// Search for TV shows.
    pub async fn search_tv(&self, query: &str) -> ProviderResult<Vec<TvSearchItem>> {
        let url = self.build_url("search/tv", &format!("&query={}", urlencoding::encode(query)));
        let resp: TvSearchResult = self.get_json(&url).await?;
        Ok(resp.results)
    }

    /// Get movie details.
    pub async fn get_movie_details(&self, movie_id: &str) -> ProviderResult<MovieDetails> {
        let url = self.build_url(&format!("movie/{}", movie_id), "");
        self.get_json(&url).await
    }

    /// Get TV show details.
    pub async fn get_tv_details(&self, tv_id: &str) -> ProviderResult<TvDetails> {
        let url = self.build_url(&format!("tv/{}", tv_id), "");
        self.get_json(&url).await
    }

    /// Get season details.
    pub async fn get_season_details(
        &self,
        tv_id: &str,
        season_number: u16,
    ) -> ProviderResult<SeasonDetails> {
        let url = self.build_url(&format!("tv/{}/season/{}", tv_id, season_number), "");
        self.get_json(&url).await
    }
}

#[async_trait]
impl MetadataProvider for TmdbClient {
    fn name(&self) -> &'static str {
        "tmdb"
    }

    async fn search(&self, term: &str, kind: MediaKind) -> ProviderResult<Vec<CandidateRecord>> {
        let records: Vec<CandidateRecord> = match kind {
            MediaKind::Movie => self.search_movie(term).await?.into_iter().map(Into::into).collect(),
            MediaKind::Tv => self.search_tv(term).await?.into_iter().map(Into::into).collect(),
        };
        Ok(records)
    }

    async fn fetch_show_details(&self, id: &str) -> ProviderResult<CandidateRecord> {
        Ok(self.get_tv_details(id).await?.into())
    }

    async fn fetch_movie_details(&self, id: &str) -> ProviderResult<CandidateRecord> {
        Ok(self.get_movie_details(id).await?.into())
    }

    async fn fetch_season_details(&self, id: &str, season_number: u16) -> ProviderResult<SeasonDetail> {
        Ok(self.get_season_details(id, season_number).await?.into())
    }

    async fn verify_credentials(&self) -> ProviderResult<bool> {
        let url = if self.config.use_bearer {
            format!("{}/authentication", TMDB_BASE_URL)
        } else {
            format!("{}/authentication?api_key={}", TMDB_BASE_URL, self.config.api_key)
        };

        let resp = self.build_request(&url).send().await?;
        Ok(resp.status().is_success())
    }
}
