//! Destination resolver.
//!
//! Maps a matched record to the library folder and file name:
//!
//! - Movies: `Movies/<year>/<Title> (<year>).<ext>`
//! - TV (Plex layout): `TV Shows/<Title>/Season NN/SNNEMM - <Episode>.<ext>`
//! - TV (by-year layout): `TV/<year>/<Title>/Season N/SNNEMM - <Episode>.<ext>`

use crate::models::config::{EpisodePadding, LibraryLayout};
use crate::models::media::CandidateRecord;
use crate::models::run::SkipReason;
use std::path::{Path, PathBuf};

/// Characters removed from every generated path component.
const ILLEGAL_CHARS: &[char] = &['\\', '/', '*', '?', ':', '"', '<', '>', '|'];

/// Title used when the season listing lacks the episode.
pub const UNKNOWN_EPISODE_TITLE: &str = "Unknown Episode";

/// Computed destination for one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Destination {
    /// Directory the file goes into.
    pub directory: PathBuf,
    /// New file name including extension.
    pub filename: String,
}

impl Destination {
    /// Full target path.
    pub fn path(&self) -> PathBuf {
        self.directory.join(&self.filename)
    }
}

/// Episode placement inputs.
#[derive(Debug, Clone, Copy)]
pub struct EpisodeSlot<'a> {
    pub season: u16,
    pub episode: u16,
    /// Title from the season listing, if found.
    pub title: Option<&'a str>,
    /// Episodes listed for the season.
    pub season_episode_count: usize,
}

/// Remove characters illegal in file names. Total and idempotent.
pub fn sanitize_filename(s: &str) -> String {
    s.chars().filter(|c| !ILLEGAL_CHARS.contains(c)).collect()
}

/// Sanitized title usable as a single path component.
///
/// Titles that sanitize to nothing, `.` or `..` would place the file outside
/// its show or year folder.
fn path_title(title: &str) -> Result<String, SkipReason> {
    let sanitized = sanitize_filename(title);
    let trimmed = sanitized.trim();
    if trimmed.is_empty() || trimmed.chars().all(|c| c == '.') {
        return Err(SkipReason::UnusableTitle {
            title: title.to_string(),
        });
    }
    Ok(sanitized)
}

/// Width used for the episode number.
pub fn episode_width(padding: EpisodePadding, season_episode_count: usize) -> usize {
    match padding {
        EpisodePadding::Adaptive if season_episode_count > 99 => 3,
        _ => 2,
    }
}

/// Destination for a movie.
pub fn resolve_movie(
    dest_root: &Path,
    record: &CandidateRecord,
    extension: &str,
) -> Result<Destination, SkipReason> {
    let year = record.year.ok_or_else(|| SkipReason::MissingYear {
        title: record.title.clone(),
    })?;
    path_title(&record.title)?;

    Ok(Destination {
        directory: dest_root.join("Movies").join(year.to_string()),
        filename: format!(
            "{}{}",
            sanitize_filename(&format!("{} ({})", record.title, year)),
            extension
        ),
    })
}

/// Destination for a TV episode.
pub fn resolve_episode(
    dest_root: &Path,
    record: &CandidateRecord,
    slot: EpisodeSlot<'_>,
    extension: &str,
    layout: LibraryLayout,
    padding: EpisodePadding,
) -> Result<Destination, SkipReason> {
    let year = record.year.ok_or_else(|| SkipReason::MissingYear {
        title: record.title.clone(),
    })?;

    let show = path_title(&record.title)?;
    let directory = match layout {
        LibraryLayout::Plex => dest_root
            .join("TV Shows")
            .join(show)
            .join(format!("Season {:02}", slot.season)),
        LibraryLayout::ByYear => dest_root
            .join("TV")
            .join(year.to_string())
            .join(show)
            .join(format!("Season {}", slot.season)),
    };

    let width = episode_width(padding, slot.season_episode_count);
    let episode_title = slot.title.unwrap_or(UNKNOWN_EPISODE_TITLE);
    let filename = format!(
        "S{:02}E{:0width$} - {}{}",
        slot.season,
        slot.episode,
        sanitize_filename(episode_title),
        extension,
        width = width
    );

    Ok(Destination { directory, filename })
}
