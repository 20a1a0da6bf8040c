// Copyright 2025 Sushanth (https://github.com/sushanthpy)
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

//! Trackline CLI
//!
//! Replay and validate recorded analytics events, and inspect the predefined
//! event catalog.

mod config;
mod events;

use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use config::AppConfig;
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use trackline_core::{
    check_event, format_event_name, predefined, Beacon, Event, EventTracker, HeadlessHost,
    HttpBeacon, MiddlewareChain, StdoutBeacon, TrackerStatus,
};
use trackline_telemetry::{init_logging, LogFormat};

#[derive(Parser)]
#[command(name = "trackline")]
#[command(about = "Trackline - product analytics event pipeline", long_about = None)]
struct Cli {
    /// Config file with [tracker], [middleware] and [logging] tables
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Verbose mode
    #[arg(short, long)]
    verbose: bool,

    /// Output as JSON (machine-readable)
    #[arg(long)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Send a JSON Lines event file through the middleware chain and tracker
    Replay {
        /// Event file, one JSON event per line
        file: PathBuf,

        /// Hostname reported by the simulated page (defaults to the tracked domain)
        #[arg(long)]
        hostname: Option<String>,

        /// Print events to stdout instead of posting them
        #[arg(long)]
        dry_run: bool,
    },

    /// Check every event in a JSON Lines file
    Validate {
        /// Event file, one JSON event per line
        file: PathBuf,
    },

    /// List the predefined event templates
    Catalog,

    /// Print the delivery name of an event
    Format {
        #[arg(long)]
        category: String,

        #[arg(long)]
        action: String,

        #[arg(long)]
        label: Option<String>,
    },
}

#[derive(Debug, Serialize)]
struct ReplaySummary {
    read: usize,
    invalid_lines: usize,
    dropped_by_middleware: usize,
    rejected: usize,
    tracked: usize,
    status: TrackerStatus,
}

/// What happened to one replayed event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ReplayOutcome {
    Dropped,
    Rejected,
    Tracked,
}

impl ReplaySummary {
    fn record(&mut self, outcome: ReplayOutcome) {
        match outcome {
            ReplayOutcome::Dropped => self.dropped_by_middleware += 1,
            ReplayOutcome::Rejected => self.rejected += 1,
            ReplayOutcome::Tracked => self.tracked += 1,
        }
    }
}

/// Chain first, then the tracker's own validation.
fn replay_event(tracker: &EventTracker, chain: &MiddlewareChain, event: Event) -> ReplayOutcome {
    match chain.execute(event) {
        None => ReplayOutcome::Dropped,
        Some(event) => {
            if tracker.track(event) {
                ReplayOutcome::Tracked
            } else {
                ReplayOutcome::Rejected
            }
        }
    }
}

#[derive(Debug, Serialize)]
struct ValidationSummary {
    read: usize,
    valid: usize,
    invalid: usize,
}

#[derive(Debug, Serialize)]
struct CatalogEntry {
    template: &'static str,
    event: String,
    category: String,
    action: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let app_config = match &cli.config {
        Some(path) => AppConfig::load(path)?,
        None => AppConfig::default(),
    };

    let mut logging = app_config.logging.clone();
    if cli.verbose {
        logging.level = "debug".to_string();
    }
    if cli.json {
        logging.format = LogFormat::Json;
    }
    init_logging(&logging)?;

    match cli.command {
        Commands::Replay {
            file,
            hostname,
            dry_run,
        } => replay(&app_config, file, hostname, dry_run, cli.json).await,
        Commands::Validate { file } => validate(file, cli.json),
        Commands::Catalog => catalog(cli.json),
        Commands::Format {
            category,
            action,
            label,
        } => {
            let mut event = Event::new(category, action);
            event.label = label;
            println!("{}", format_event_name(&event));
            Ok(())
        }
    }
}

async fn replay(
    app_config: &AppConfig,
    file: PathBuf,
    hostname: Option<String>,
    dry_run: bool,
    json: bool,
) -> Result<()> {
    let tracker_config = app_config.tracker()?.clone();
    let lines = events::read_events(&file)?;
    let chain = app_config.middleware.build_chain();

    let http = if dry_run {
        None
    } else {
        Some(Arc::new(HttpBeacon::new(
            &tracker_config,
            tokio::runtime::Handle::current(),
        )?))
    };
    let beacon: Arc<dyn Beacon> = match &http {
        Some(http) => http.clone(),
        None => Arc::new(StdoutBeacon),
    };

    let hostname = hostname.unwrap_or_else(|| tracker_config.domain.clone());
    let host = Arc::new(HeadlessHost::new(hostname).with_beacon(beacon));
    let tracker = EventTracker::new(tracker_config, host);
    if tracker.is_suppressed() {
        tracing::warn!("Tracking is suppressed on this host; events will stay queued");
    }

    let mut summary = ReplaySummary {
        read: lines.len(),
        invalid_lines: 0,
        dropped_by_middleware: 0,
        rejected: 0,
        tracked: 0,
        status: tracker.status(),
    };

    for line in lines {
        match line.event {
            Ok(event) => summary.record(replay_event(&tracker, &chain, event)),
            Err(e) => {
                tracing::warn!(line = line.line, error = %e, "Skipping unparseable event");
                summary.invalid_lines += 1;
            }
        }
    }

    if let Some(http) = &http {
        http.flush().await;
    }
    summary.status = tracker.status();

    if json {
        eprintln!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        eprintln!("✓ Replayed {}", file.display());
        eprintln!(
            "  Read: {}, Invalid: {}, Dropped: {}, Rejected: {}, Tracked: {}",
            summary.read,
            summary.invalid_lines,
            summary.dropped_by_middleware,
            summary.rejected,
            summary.tracked
        );
        eprintln!(
            "  Initialized: {}, Queued: {}",
            summary.status.initialized, summary.status.queue_size
        );
    }
    Ok(())
}

fn validate(file: PathBuf, json: bool) -> Result<()> {
    let lines = events::read_events(&file)?;
    let mut summary = ValidationSummary {
        read: lines.len(),
        valid: 0,
        invalid: 0,
    };

    for line in &lines {
        let problem = match &line.event {
            Ok(event) => check_event(event).err().map(|e| e.to_string()),
            Err(e) => Some(e.clone()),
        };
        match problem {
            None => summary.valid += 1,
            Some(problem) => {
                summary.invalid += 1;
                if !json {
                    println!("✗ line {}: {}", line.line, problem);
                }
            }
        }
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        println!(
            "{} events, {} valid, {} invalid",
            summary.read, summary.valid, summary.invalid
        );
    }

    if summary.invalid > 0 {
        bail!("{} invalid events in {}", summary.invalid, file.display());
    }
    Ok(())
}

fn catalog(json: bool) -> Result<()> {
    let entries: Vec<CatalogEntry> = predefined::CATALOG
        .iter()
        .map(|(name, template)| {
            let event = template.to_event(None);
            CatalogEntry {
                template: *name,
                event: event.name(),
                category: event.category.to_string(),
                action: event.action.to_string(),
            }
        })
        .collect();

    if json {
        println!("{}", serde_json::to_string_pretty(&entries)?);
    } else {
        for entry in &entries {
            println!("{:<28} {}", entry.template, entry.event);
        }
    }
    Ok(())
}
