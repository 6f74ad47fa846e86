//! Plex Sorter CLI
//!
//! A command-line tool that sorts movie and TV episode files into a Plex library.

use clap::Parser;
use plex_sorter::cli::{
    args::{Cli, Commands},
    commands::{check, sort},
};
use plex_sorter::models::config::{default_config_path, load_config_from, Config};
use plex_sorter::models::run::FinishReason;
use plex_sorter::preflight;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse command line arguments
    let cli = Cli::parse();

    // Initialize logging
    init_logging(cli.verbose);

    let config_path = cli.config.clone().unwrap_or_else(default_config_path);
    let mut config = load_config_from(&config_path)?;

    match cli.command {
        Commands::Sort(args) => {
            sort::apply_overrides(&mut config, &args);

            // Run preflight checks unless skipped
            if !cli.skip_preflight {
                run_preflight_checks(&config).await?;
            }

            let report = sort::sort(args, config).await?;
            if let FinishReason::Failed(reason) = report.reason {
                anyhow::bail!("Sort failed: {}", reason);
            }
        }

        Commands::Check { provider } => {
            if let Some(provider) = provider {
                config.provider = provider;
            }
            if !check::check(&config, &config_path).await? {
                anyhow::bail!("Some checks failed. Fix the issues above and try again.");
            }
        }
    }

    Ok(())
}

/// Initialize the logging system.
///
/// Run progress is printed by the sort command itself, so diagnostics stay
/// at warn level unless verbose output is requested.
fn init_logging(verbose: bool) {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = if verbose {
        EnvFilter::new("plex_sorter=debug")
    } else {
        EnvFilter::new("plex_sorter=warn")
    };

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(false)
                .without_time()
                .with_writer(std::io::stderr),
        )
        .with(filter)
        .init();
}

/// Run preflight checks and exit if any fail.
async fn run_preflight_checks(config: &Config) -> anyhow::Result<()> {
    use colored::Colorize;

    println!("{}", "Running preflight checks...".bold());
    println!();

    let results = preflight::run_preflight_checks(config).await;
    preflight::print_results(&results);

    println!();

    if !preflight::all_passed(&results) {
        anyhow::bail!("Preflight checks failed. Fix the issues above and try again.");
    }

    Ok(())
}
