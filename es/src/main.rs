//! EventStream - Agent Telemetry Bus
//!
//! CLI entry point: replays recorded agent activity through the bus and
//! prints the normalized events as JSON lines.

use std::path::Path;
use std::sync::Arc;

use clap::Parser;
use colored::Colorize;
use eyre::{Context, Result};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use eventstream::cli::{Cli, Command};
use eventstream::config::Config;
use eventstream::events::{EventBus, EventEmitter, EventStream};
use eventstream::feed::{self, FeedRecord, read_feed};

fn parse_level(level_str: Option<&str>) -> tracing::Level {
    match level_str.map(str::to_uppercase).as_deref() {
        Some("TRACE") => tracing::Level::TRACE,
        Some("DEBUG") => tracing::Level::DEBUG,
        Some("INFO") | None => tracing::Level::INFO,
        Some("WARN") | Some("WARNING") => tracing::Level::WARN,
        Some("ERROR") => tracing::Level::ERROR,
        Some(other) => {
            eprintln!("Warning: Unknown log-level '{}', defaulting to INFO", other);
            tracing::Level::INFO
        }
    }
}

fn setup_logging(cli_log_level: Option<&str>, config_log_level: Option<&str>) -> Result<()> {
    // Priority: CLI --log-level > config file > default (INFO)
    let level = parse_level(cli_log_level.or(config_log_level));

    // stdout carries event lines only
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .try_init()
        .map_err(|e| eyre::eyre!("Failed to install tracing subscriber: {}", e))?;

    debug!("Logging initialized (level: {:?})", level);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load log level from config file early (before full config load)
    let config_log_level = Config::load_log_level(cli.config.as_ref());

    setup_logging(cli.log_level.as_deref(), config_log_level.as_deref()).context("Failed to setup logging")?;

    let config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;
    info!(
        history_capacity = config.history_capacity,
        replay = config.replay,
        "EventStream loaded config"
    );

    debug!(command = ?cli.command, "main: dispatching command");
    match cli.command {
        Command::Feed {
            file,
            capacity,
            snapshot,
            no_replay,
            join_after,
        } => cmd_feed(&config, &file, capacity, snapshot, no_replay, join_after).await,
    }
}

/// Applied/rejected counts for a run of feed records
#[derive(Debug, Default)]
struct FeedTally {
    applied: usize,
    rejected: usize,
}

fn apply_records(records: &[FeedRecord], first_index: usize, emitter: &EventEmitter, tally: &mut FeedTally) {
    for (offset, record) in records.iter().enumerate() {
        let index = first_index + offset;
        match feed::apply(record, emitter) {
            Ok(event) => {
                debug!(index, event_id = %event.id, "apply_records: record applied");
                tally.applied += 1;
            }
            Err(e) => {
                warn!(index, kind = record.kind(), error = %e, "apply_records: record rejected");
                eprintln!("{} record {} ({}): {}", "rejected".red(), index + 1, record.kind(), e);
                tally.rejected += 1;
            }
        }
    }
}

/// Stream session printing each event as one JSON line; resolves to the number printed
fn spawn_printer(bus: &Arc<EventBus>, replay: bool) -> JoinHandle<usize> {
    let mut stream = EventStream::open(Arc::clone(bus), replay);
    tokio::spawn(async move {
        let mut printed = 0usize;
        while let Some(line) = stream.next_json().await {
            match line {
                Ok(json) => {
                    println!("{}", json);
                    printed += 1;
                }
                Err(e) => warn!(error = %e, "spawn_printer: dropping unserializable event"),
            }
        }
        printed
    })
}

async fn cmd_feed(
    config: &Config,
    file: &Path,
    capacity: Option<usize>,
    snapshot: bool,
    no_replay: bool,
    join_after: Option<usize>,
) -> Result<()> {
    debug!(?file, ?capacity, snapshot, no_replay, ?join_after, "cmd_feed: called");
    let records = read_feed(file)?;

    let bus = EventBus::new(capacity.unwrap_or(config.history_capacity)).shared();
    let emitter = bus.emitter();
    let replay = config.replay && !no_replay;
    let mut tally = FeedTally::default();

    let printed = if snapshot {
        apply_records(&records, 0, &emitter, &mut tally);
        let lines = bus.snapshot().context("Failed to serialize history")?;
        for line in &lines {
            println!("{}", line);
        }
        lines.len()
    } else {
        // The session joins late: earlier records reach it only through replay
        let split = join_after.unwrap_or(records.len()).min(records.len());
        let (before, after) = records.split_at(split);

        apply_records(before, 0, &emitter, &mut tally);
        let printer = spawn_printer(&bus, replay);
        apply_records(after, split, &emitter, &mut tally);

        bus.disconnect_all();
        printer.await.context("Event printer task failed")?
    };

    eprintln!(
        "{} {} applied, {} rejected, {} events printed",
        "done".green(),
        tally.applied,
        tally.rejected,
        printed
    );
    Ok(())
}
