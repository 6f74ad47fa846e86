//! Filename normalizer.
//!
//! Turns a noisy release name such as `Show.Name.S01E02.1080p.mkv` into a
//! plain title (`Show Name`) suitable as a search query. Each cleaning step
//! works on the output of the previous one; a pattern that does not match is
//! a no-op, so cleaning never fails.

use std::path::Path;

/// Release-quality tokens removed from titles.
const QUALITY_TOKENS: &[&str] = &[
    "1080p", "720p", "480p", "dvdrip", "x264", "bluray", "web-dl", "webrip",
];

/// Clean a file name (extension included) into a search title.
pub fn clean_filename(filename: &str) -> String {
    let stem = Path::new(filename)
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| filename.to_string());
    clean_stem(&stem)
}

/// Clean a folder name into a search title.
///
/// Folder names carry no extension, so `Mr. Robot` keeps both words.
pub fn clean_folder_name(name: &str) -> String {
    clean_stem(name)
}

fn clean_stem(stem: &str) -> String {
    let mut name = stem.to_string();

    // Episode markers never belong in a title query
    if let Ok(re) = regex::Regex::new(r"(?i)s\d{1,2}e\d{1,2}") {
        name = re.replace_all(&name, "").into_owned();
    }

    // Year, optionally parenthesized
    if let Ok(re) = regex::Regex::new(r"\(?(19\d{2}|20\d{2})\)?") {
        name = re.replace_all(&name, "").into_owned();
    }

    // Bracketed and parenthetical spans
    if let Ok(re) = regex::Regex::new(r"\[.*?\]") {
        name = re.replace_all(&name, "").into_owned();
    }
    if let Ok(re) = regex::Regex::new(r"\(.*?\)") {
        name = re.replace_all(&name, "").into_owned();
    }

    name = strip_quality_tokens(&name);

    name.replace(['.', '_'], " ").trim().to_string()
}

/// Remove quality tokens that stand alone between separators.
///
/// Underscores count as separators here, so `Film_DVDRip` loses the token
/// just like `Film.DVDRip` does.
fn strip_quality_tokens(name: &str) -> String {
    let pattern = format!("(?i)({})", QUALITY_TOKENS.join("|"));
    let Ok(re) = regex::Regex::new(&pattern) else {
        return name.to_string();
    };

    let bounded = |c: Option<char>| c.map_or(true, |c| !c.is_alphanumeric());
    let mut out = String::with_capacity(name.len());
    let mut last = 0;
    for m in re.find_iter(name) {
        let before = name[..m.start()].chars().next_back();
        let after = name[m.end()..].chars().next();
        if bounded(before) && bounded(after) {
            out.push_str(&name[last..m.start()]);
            last = m.end();
        }
    }
    out.push_str(&name[last..]);
    out
}

/// Whether a file name carries an `SxxEyy` episode marker.
pub fn has_episode_marker(filename: &str) -> bool {
    regex::Regex::new(r"(?i)s\d{1,2}e\d{1,2}")
        .map(|re| re.is_match(filename))
        .unwrap_or(false)
}

/// Season and episode numbers parsed from an `S<n>E<n>` marker.
pub fn episode_numbers(filename: &str) -> Option<(u16, u16)> {
    let re = regex::Regex::new(r"(?i)s(\d+)e(\d+)").ok()?;
    let caps = re.captures(filename)?;
    let season = caps.get(1)?.as_str().parse().ok()?;
    let episode = caps.get(2)?.as_str().parse().ok()?;
    Some((season, episode))
}
