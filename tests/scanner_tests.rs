//! Integration tests for the scanner module.
//!
//! Tests cover:
//! - Directory scanning with video files
//! - Extension filtering and episode classification
//! - Deterministic ordering
//! - Error handling for non-existent paths

use plex_sorter::core::scanner::scan_directory;
use plex_sorter::models::config::DEFAULT_VIDEO_EXTENSIONS;
use plex_sorter::models::media::KindHint;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn extensions() -> Vec<String> {
    DEFAULT_VIDEO_EXTENSIONS.iter().map(|e| e.to_string()).collect()
}

#[test]
fn test_scan_empty_directory() {
    let temp_dir = TempDir::new().unwrap();
    let result = scan_directory(temp_dir.path(), &extensions()).unwrap();

    assert_eq!(result.videos.len(), 0);
    assert_eq!(result.total_files_scanned, 0);
}

#[test]
fn test_scan_with_video_files() {
    let temp_dir = TempDir::new().unwrap();

    // Create a mock video file (just an empty file with video extension)
    let video_path = temp_dir.path().join("movie.mkv");
    fs::write(&video_path, "fake video content").unwrap();

    let result = scan_directory(temp_dir.path(), &extensions()).unwrap();

    assert_eq!(result.videos.len(), 1);
    assert_eq!(result.videos[0].filename, "movie.mkv");
    assert_eq!(result.videos[0].extension, ".mkv");
    assert_eq!(result.videos[0].kind_hint, KindHint::Movie);
}

#[test]
fn test_scan_nonexistent_path() {
    let result = scan_directory(Path::new("/nonexistent/path"), &extensions());
    assert!(result.is_err());
}

#[test]
fn test_scan_with_multiple_video_types() {
    let temp_dir = TempDir::new().unwrap();

    // Create videos with different extensions
    fs::write(temp_dir.path().join("movie1.mkv"), "fake").unwrap();
    fs::write(temp_dir.path().join("movie2.MP4"), "fake").unwrap();
    fs::write(temp_dir.path().join("movie3.avi"), "fake").unwrap();
    fs::write(temp_dir.path().join("document.txt"), "not video").unwrap();
    fs::write(temp_dir.path().join("cover.jpg"), "not video").unwrap();

    let result = scan_directory(temp_dir.path(), &extensions()).unwrap();

    assert_eq!(result.videos.len(), 3);
    assert_eq!(result.total_files_scanned, 5);
}

#[test]
fn test_scan_respects_configured_extensions() {
    let temp_dir = TempDir::new().unwrap();
    fs::write(temp_dir.path().join("a.mkv"), "fake").unwrap();
    fs::write(temp_dir.path().join("b.m4v"), "fake").unwrap();

    let result = scan_directory(temp_dir.path(), &["m4v".to_string()]).unwrap();

    assert_eq!(result.videos.len(), 1);
    assert_eq!(result.videos[0].filename, "b.m4v");
}

#[cfg(unix)]
#[test]
fn test_scan_lists_symlinked_video_files() {
    let temp_dir = TempDir::new().unwrap();
    let storage = temp_dir.path().join("storage");
    let source = temp_dir.path().join("source");
    fs::create_dir_all(&storage).unwrap();
    fs::create_dir_all(&source).unwrap();
    fs::write(storage.join("Movie.mkv"), "fake").unwrap();
    std::os::unix::fs::symlink(storage.join("Movie.mkv"), source.join("Movie.mkv")).unwrap();

    let result = scan_directory(&source, &extensions()).unwrap();

    assert_eq!(result.videos.len(), 1);
    assert_eq!(result.videos[0].filename, "Movie.mkv");
    assert_eq!(result.videos[0].path, source.join("Movie.mkv"));
    assert_eq!(result.unreadable, 0);
}

#[cfg(unix)]
#[test]
fn test_scan_counts_skipped_symlinks() {
    let temp_dir = TempDir::new().unwrap();
    let elsewhere = temp_dir.path().join("elsewhere");
    let source = temp_dir.path().join("source");
    fs::create_dir_all(&elsewhere).unwrap();
    fs::create_dir_all(&source).unwrap();
    fs::write(elsewhere.join("Hidden.mkv"), "fake").unwrap();
    std::os::unix::fs::symlink(&elsewhere, source.join("linked")).unwrap();
    std::os::unix::fs::symlink(source.join("gone.mkv"), source.join("Broken.mkv")).unwrap();

    let result = scan_directory(&source, &extensions()).unwrap();

    assert!(result.videos.is_empty());
    assert_eq!(result.skipped_links, 1);
    assert_eq!(result.unreadable, 1);
}

#[test]
fn test_scan_nested_directories_in_stable_order() {
    let temp_dir = TempDir::new().unwrap();
    let season = temp_dir.path().join("Show Name").join("Season 1");
    fs::create_dir_all(&season).unwrap();
    fs::write(season.join("Show.Name.S01E02.mkv"), "fake").unwrap();
    fs::write(season.join("Show.Name.S01E01.mkv"), "fake").unwrap();
    fs::write(temp_dir.path().join("Alpha (2001).mp4"), "fake").unwrap();

    let first = scan_directory(temp_dir.path(), &extensions()).unwrap();
    let second = scan_directory(temp_dir.path(), &extensions()).unwrap();

    let names: Vec<&str> = first.videos.iter().map(|v| v.filename.as_str()).collect();
    assert_eq!(
        names,
        vec!["Alpha (2001).mp4", "Show.Name.S01E01.mkv", "Show.Name.S01E02.mkv"]
    );
    assert_eq!(first.videos, second.videos);
    assert_eq!(first.videos[1].kind_hint, KindHint::Tv);
    assert_eq!(first.total_dirs_scanned, 3);
}
