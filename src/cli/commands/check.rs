//! Check command implementation.

use crate::models::config::Config;
use crate::preflight;
use crate::Result;
use colored::Colorize;
use std::path::Path;

/// Print the effective configuration and run the preflight checks.
///
/// Returns whether every check passed.
pub async fn check(config: &Config, config_path: &Path) -> Result<bool> {
    println!("{}", "🔎 Checking configuration...".bold().cyan());
    println!();
    println!("  {} {}", "Config file:".bold(), config_path.display());
    println!("  {} {}", "Provider:".bold(), config.provider);
    println!("  {} {:?}", "Layout:".bold(), config.library.layout);
    println!("  {} {:?}", "Episode padding:".bold(), config.library.episode_padding);
    println!(
        "  {} {}",
        "Video extensions:".bold(),
        config.scan.video_extensions.join(", ")
    );
    println!(
        "  {} {}s",
        "Request timeout:".bold(),
        config.search.request_timeout_secs
    );
    println!();

    let results = preflight::run_preflight_checks(config).await;
    preflight::print_results(&results);
    println!();

    Ok(preflight::all_passed(&results))
}
