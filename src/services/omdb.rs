//! OMDb API client (IMDb-keyed alternate provider).

use super::{leading_year, MetadataProvider, ProviderResult};
use crate::error::ProviderError;
use crate::models::media::{CandidateRecord, EpisodeEntry, MediaKind, SeasonDetail, SeasonSummary};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;

const OMDB_BASE_URL: &str = "https://www.omdbapi.com/";

/// OMDb API client.
pub struct OmdbClient {
    api_key: String,
    client: reqwest::Client,
}

/// Search response.
#[derive(Debug, Deserialize)]
pub struct SearchResponse {
    #[serde(rename = "Search", default)]
    pub search: Vec<SearchItem>,
    #[serde(rename = "Response")]
    pub response: String,
    #[serde(rename = "Error")]
    pub error: Option<String>,
}

/// Search item.
#[derive(Debug, Deserialize)]
pub struct SearchItem {
    #[serde(rename = "Title")]
    pub title: String,
    #[serde(rename = "Year")]
    pub year: String,
    #[serde(rename = "imdbID")]
    pub imdb_id: String,
    #[serde(rename = "Type")]
    pub kind: String,
}

/// Title details.
#[derive(Debug, Deserialize)]
pub struct TitleDetails {
    #[serde(rename = "Title", default)]
    pub title: String,
    #[serde(rename = "Year", default)]
    pub year: String,
    #[serde(rename = "imdbID", default)]
    pub imdb_id: String,
    #[serde(rename = "Type", default)]
    pub kind: String,
    #[serde(rename = "totalSeasons")]
    pub total_seasons: Option<String>,
    #[serde(rename = "Response")]
    pub response: String,
    #[serde(rename = "Error")]
    pub error: Option<String>,
}

/// Season listing.
#[derive(Debug, Deserialize)]
pub struct SeasonResponse {
    #[serde(rename = "Season", default)]
    pub season: String,
    #[serde(rename = "Episodes", default)]
    pub episodes: Vec<SeasonEpisode>,
    #[serde(rename = "Response")]
    pub response: String,
    #[serde(rename = "Error")]
    pub error: Option<String>,
}

/// Episode within a season listing.
#[derive(Debug, Deserialize)]
pub struct SeasonEpisode {
    #[serde(rename = "Title")]
    pub title: String,
    #[serde(rename = "Episode")]
    pub episode: String,
}

/// Map an OMDb `Type` to a record kind.
fn parse_kind(kind: &str) -> Option<MediaKind> {
    match kind.to_lowercase().as_str() {
        "movie" => Some(MediaKind::Movie),
        "series" => Some(MediaKind::Tv),
        _ => None,
    }
}

/// Interpret the `Response`/`Error` envelope.
///
/// Returns `Ok(false)` for an empty result, which OMDb reports as an error.
fn check_envelope(response: &str, error: Option<&str>) -> ProviderResult<bool> {
    if response.eq_ignore_ascii_case("true") {
        return Ok(true);
    }
    let message = error.unwrap_or("unknown error");
    let lower = message.to_lowercase();
    if lower.contains("not found") || lower.contains("too many results") {
        Ok(false)
    } else if lower.contains("limit") {
        Err(ProviderError::Transient(message.to_string()))
    } else {
        Err(ProviderError::Fatal(message.to_string()))
    }
}

impl SearchItem {
    fn into_record(self) -> Option<CandidateRecord> {
        let kind = parse_kind(&self.kind)?;
        Some(CandidateRecord::new(
            self.imdb_id,
            kind,
            self.title,
            leading_year(&self.year),
        ))
    }
}

impl TitleDetails {
    fn into_record(self) -> ProviderResult<CandidateRecord> {
        let kind = parse_kind(&self.kind).ok_or_else(|| {
            ProviderError::Fatal(format!("{} has unsupported type '{}'", self.imdb_id, self.kind))
        })?;
        let mut record = CandidateRecord::new(self.imdb_id, kind, self.title, leading_year(&self.year));
        record.detailed = true;
        if kind == MediaKind::Tv {
            let total: u16 = self
                .total_seasons
                .as_deref()
                .and_then(|s| s.parse().ok())
                .unwrap_or(0);
            record.seasons = (1..=total)
                .map(|n| SeasonSummary {
                    season_number: n,
                    episode_count: None,
                })
                .collect();
        }
        Ok(record)
    }
}

impl SeasonResponse {
    fn into_detail(self, requested: u16) -> SeasonDetail {
        SeasonDetail {
            season_number: self.season.parse().unwrap_or(requested),
            episodes: self
                .episodes
                .into_iter()
                .filter_map(|e| {
                    Some(EpisodeEntry {
                        episode_number: e.episode.parse().ok()?,
                        title: e.title,
                    })
                })
                .collect(),
        }
    }
}

impl OmdbClient {
    /// Create a new OMDb client with a per-request timeout.
    pub fn new(api_key: String, timeout: Duration) -> crate::Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { api_key, client })
    }

    fn build_url(&self, params: &str) -> String {
        format!("{}?apikey={}{}", OMDB_BASE_URL, self.api_key, params)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> ProviderResult<T> {
        let resp = self.client.get(url).send().await?;
        if resp.status() == reqwest::StatusCode::UNAUTHORIZED {
            return Err(ProviderError::Fatal("Invalid API key".to_string()));
        }
        Ok(resp.error_for_status()?.json().await?)
    }

    /// Search titles by type (`movie` or `series`).
    pub async fn search_titles(&self, query: &str, kind: MediaKind) -> ProviderResult<Vec<SearchItem>> {
        let kind_param = match kind {
            MediaKind::Movie => "movie",
            MediaKind::Tv => "series",
        };
        let url = self.build_url(&format!(
            "&s={}&type={}",
            urlencoding::encode(query),
            kind_param
        ));
        let resp: SearchResponse = self.get_json(&url).await?;
        if !check_envelope(&resp.response, resp.error.as_deref())? {
            return Ok(Vec::new());
        }
        Ok(resp.search)
    }

    /// Get details for an IMDb ID.
    pub async fn get_title(&self, imdb_id: &str) -> ProviderResult<TitleDetails> {
        let url = self.build_url(&format!("&i={}", urlencoding::encode(imdb_id)));
        let resp: TitleDetails = self.get_json(&url).await?;
        if !check_envelope(&resp.response, resp.error.as_deref())? {
            return Err(ProviderError::Fatal(format!("{} not found", imdb_id)));
        }
        Ok(resp)
    }

    /// Get the episode list of one season.
    pub async fn get_season(&self, imdb_id: &str, season_number: u16) -> ProviderResult<SeasonResponse> {
        let url = self.build_url(&format!(
            "&i={}&Season={}",
            urlencoding::encode(imdb_id),
            season_number
        ));
        let resp: SeasonResponse = self.get_json(&url).await?;
        if !check_envelope(&resp.response, resp.error.as_deref())? {
            return Err(ProviderError::Fatal(format!(
                "season {} of {} not found",
                season_number, imdb_id
            )));
        }
        Ok(resp)
    }
}

#[async_trait]
impl MetadataProvider for OmdbClient {
    fn name(&self) -> &'static str {
        "omdb"
    }

    async fn search(&self, term: &str, kind: MediaKind) -> ProviderResult<Vec<CandidateRecord>> {
        Ok(self
            .search_titles(term, kind)
            .await?
            .into_iter()
            .filter_map(SearchItem::into_record)
            .collect())
    }

    async fn fetch_show_details(&self, id: &str) -> ProviderResult<CandidateRecord> {
        self.get_title(id).await?.into_record()
    }

    async fn fetch_movie_details(&self, id: &str) -> ProviderResult<CandidateRecord> {
        self.get_title(id).await?.into_record()
    }

    async fn fetch_season_details(&self, id: &str, season_number: u16) -> ProviderResult<SeasonDetail> {
        Ok(self.get_season(id, season_number).await?.into_detail(season_number))
    }

    async fn verify_credentials(&self) -> ProviderResult<bool> {
        // Any known title works; a bad key answers 401
        match self.get_title("tt0111161").await {
            Ok(_) => Ok(true),
            Err(ProviderError::Fatal(_)) => Ok(false),
            Err(e) => Err(e),
        }
    }
}
