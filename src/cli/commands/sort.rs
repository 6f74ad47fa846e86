//! Sort command implementation.
//!
//! Starts a run, renders its events as progress bars and log lines, answers
//! disambiguation prompts from stdin and turns Ctrl-C into stop requests.

use crate::cli::args::SortArgs;
use crate::core::runner::{start_run, RunOptions};
use crate::models::config::Config;
use crate::models::job::SortJob;
use crate::models::media::{CandidateRecord, MediaKind};
use crate::models::run::{FileOutcome, FinishReason, ProgressChannel, RunEvent, RunReport, UserDecision};
use crate::services::build_provider;
use crate::Result;
use colored::Colorize;
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use std::io::BufRead;
use tokio::sync::mpsc;

/// Apply command line overrides on top of the loaded config.
pub fn apply_overrides(config: &mut Config, args: &SortArgs) {
    if let Some(provider) = args.provider {
        config.provider = provider;
    }
    if let Some(layout) = args.layout {
        config.library.layout = layout;
    }
    if let Some(padding) = args.padding {
        config.library.episode_padding = padding;
    }
    if args.prefetch {
        config.search.prefetch_details = true;
    }
}

/// Execute the sort command.
pub async fn sort(args: SortArgs, config: Config) -> Result<RunReport> {
    println!("{}", "🎬 Sorting media into library...".bold().cyan());
    println!();
    println!("  {} {}", "Source:".bold(), args.source.display());
    println!("  {} {}", "Destination:".bold(), args.destination.display());
    println!("  {} {}", "Mode:".bold(), args.mode);
    println!("  {} {}", "Provider:".bold(), config.provider);
    println!(
        "  {} {}",
        "Action:".bold(),
        if args.keep { "copy" } else { "move" }
    );
    println!();

    let job = SortJob {
        source: args.source.clone(),
        destination: args.destination.clone(),
        mode: args.mode,
        keep_originals: args.keep,
    };
    let provider = build_provider(&config)?;
    let (handle, mut events) = start_run(job, provider, RunOptions::from_config(&config))?;
    tracing::debug!("Run {} started", handle.run_id());

    let bars = MultiProgress::new();
    let overall = bars.add(ProgressBar::new(0));
    overall.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("█▓░"),
    );
    let file_bar = bars.add(ProgressBar::new(100));
    file_bar.set_style(
        ProgressStyle::default_bar()
            .template("  [{bar:40.green/white}] {percent:>3}% {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("█▓░"),
    );

    let mut lines = spawn_stdin_reader();
    let mut interrupts = spawn_interrupt_listener();
    let mut interrupt_count = 0;
    let mut pending: Option<Vec<CandidateRecord>> = None;

    loop {
        tokio::select! {
            event = events.recv() => {
                let Some(event) = event else { break };
                match event {
                    RunEvent::Log(line) => {
                        let _ = bars.println(line);
                    }
                    RunEvent::Progress { channel: ProgressChannel::Overall, current, total } => {
                        overall.set_length(total);
                        overall.set_position(current);
                    }
                    RunEvent::Progress { channel: ProgressChannel::File, current, .. } => {
                        file_bar.set_position(current);
                    }
                    RunEvent::Progress { channel: ProgressChannel::Fetch, current, total } => {
                        file_bar.set_message(format!("fetching {}/{}", current, total));
                    }
                    RunEvent::SelectionNeeded { candidates, kind } => {
                        if args.auto_skip {
                            let _ = bars.println("  Ambiguous match, skipping (--auto-skip)");
                            handle.supply_choice(UserDecision::Skip);
                        } else {
                            bars.suspend(|| print_prompt(&candidates, kind));
                            pending = Some(candidates);
                        }
                    }
                    RunEvent::FileFinished { index, path, outcome } => {
                        tracing::debug!("File {} finished: {:?} -> {:?}", index, path, outcome);
                        file_bar.set_message(String::new());
                        if let FileOutcome::Placed { destination } = outcome {
                            overall.set_message(
                                destination
                                    .file_name()
                                    .map(|n| n.to_string_lossy().to_string())
                                    .unwrap_or_default(),
                            );
                        }
                    }
                    RunEvent::RunFinished(reason) => {
                        tracing::debug!("Run finished: {}", reason);
                    }
                }
            }
            line = lines.recv(), if pending.is_some() => {
                let Some(candidates) = pending.take() else { continue };
                match line {
                    None => {
                        handle.supply_choice(UserDecision::Skip);
                    }
                    Some(line) => match parse_choice(&line, &candidates) {
                        Some(decision) => {
                            handle.supply_choice(decision);
                        }
                        None => {
                            let _ = bars.println(format!(
                                "  Invalid choice '{}'. Enter 1-{} or 's' to skip.",
                                line.trim(),
                                candidates.len()
                            ));
                            pending = Some(candidates);
                        }
                    },
                }
            }
            Some(()) = interrupts.recv() => {
                interrupt_count += 1;
                if interrupt_count == 1 {
                    let _ = bars.println(format!(
                        "{}",
                        "Stopping after the current file (Ctrl-C again to force)...".yellow()
                    ));
                    handle.request_stop();
                } else {
                    let _ = bars.println(format!("{}", "Force stopping...".red()));
                    handle.request_force_stop();
                }
                pending = None;
            }
        }
    }

    overall.finish_and_clear();
    file_bar.finish_and_clear();

    let report = handle.wait().await?;
    print_summary(&report);
    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    }
    Ok(report)
}

/// Read stdin lines on a plain thread; the runtime must not wait for it.
fn spawn_stdin_reader() -> mpsc::UnboundedReceiver<String> {
    let (tx, rx) = mpsc::unbounded_channel();
    std::thread::spawn(move || {
        let stdin = std::io::stdin();
        for line in stdin.lock().lines() {
            match line {
                Ok(line) => {
                    if tx.send(line).is_err() {
                        break;
                    }
                }
                Err(e) => {
                    tracing::debug!("stdin closed: {}", e);
                    break;
                }
            }
        }
    });
    rx
}

fn spawn_interrupt_listener() -> mpsc::UnboundedReceiver<()> {
    let (tx, rx) = mpsc::unbounded_channel();
    tokio::spawn(async move {
        while tokio::signal::ctrl_c().await.is_ok() {
            if tx.send(()).is_err() {
                break;
            }
        }
    });
    rx
}

fn print_prompt(candidates: &[CandidateRecord], kind: MediaKind) {
    println!();
    println!(
        "{}",
        format!("Multiple {} matches found:", kind).bold().yellow()
    );
    for (i, candidate) in candidates.iter().enumerate() {
        println!("  {:>2}) {}", i + 1, candidate.display_label());
    }
    println!("  {}", "Enter a number, or 's' to skip:".bold());
}

/// Parse a prompt answer: a 1-based index or `s` to skip.
pub fn parse_choice(input: &str, candidates: &[CandidateRecord]) -> Option<UserDecision> {
    let input = input.trim();
    if input.eq_ignore_ascii_case("s") || input.eq_ignore_ascii_case("skip") {
        return Some(UserDecision::Skip);
    }
    let index: usize = input.parse().ok()?;
    candidates
        .get(index.checked_sub(1)?)
        .cloned()
        .map(UserDecision::Select)
}

fn print_summary(report: &RunReport) {
    println!();
    println!("{}", "📊 Sort Summary".bold().green());
    println!("  {} {}", "Files found:".bold(), report.discovered);
    println!("  {} {}", "Placed:".bold(), report.placed());
    println!("  {} {}", "Skipped:".bold(), report.skipped());
    println!("  {} {}", "Failed:".bold(), report.failed());

    let elapsed = report.finished_at - report.started_at;
    println!("  {} {}s", "Elapsed:".bold(), elapsed.num_seconds());

    let reason = report.reason.to_string();
    let reason = match report.reason {
        FinishReason::Completed => reason.green(),
        FinishReason::StoppedByUser | FinishReason::ForceStopped => reason.yellow(),
        FinishReason::Failed(_) => reason.red(),
    };
    println!("  {} {}", "Result:".bold(), reason);

    for (path, outcome) in &report.outcomes {
        if let FileOutcome::Failed(message) = outcome {
            println!("  {} {}: {}", "✗".red(), path.display(), message);
        }
    }
    println!();
}
