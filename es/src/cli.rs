//! CLI command definitions and subcommands

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// EventStream - agent telemetry bus
#[derive(Parser)]
#[command(
    name = "es",
    about = "Normalize agent tool calls into events and stream them",
    version
)]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true, help = "Path to config file")]
    pub config: Option<PathBuf>,

    /// Log level (TRACE, DEBUG, INFO, WARN, ERROR)
    #[arg(
        short = 'l',
        long = "log-level",
        global = true,
        help = "Log level (TRACE, DEBUG, INFO, WARN, ERROR)"
    )]
    pub log_level: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Replay a JSONL feed of tool calls through the bus and print the events
    Feed {
        /// JSONL file, one record per line
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// History capacity (overrides config)
        #[arg(long)]
        capacity: Option<usize>,

        /// Print the retained history after the feed instead of streaming
        #[arg(long)]
        snapshot: bool,

        /// Start the stream session without replaying history
        #[arg(long)]
        no_replay: bool,

        /// Open the stream session after this many records (default: after all of them)
        #[arg(long, value_name = "N", conflicts_with = "snapshot")]
        join_after: Option<usize>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_feed() {
        let cli = Cli::try_parse_from([
            "es",
            "-l",
            "debug",
            "feed",
            "run.jsonl",
            "--capacity",
            "5",
            "--no-replay",
            "--join-after",
            "2",
        ])
        .unwrap();
        assert_eq!(cli.log_level.as_deref(), Some("debug"));
        match cli.command {
            Command::Feed {
                file,
                capacity,
                snapshot,
                no_replay,
                join_after,
            } => {
                assert_eq!(file, PathBuf::from("run.jsonl"));
                assert_eq!(capacity, Some(5));
                assert!(!snapshot);
                assert!(no_replay);
                assert_eq!(join_after, Some(2));
            }
        }
    }

    #[test]
    fn test_join_after_conflicts_with_snapshot() {
        assert!(Cli::try_parse_from(["es", "feed", "run.jsonl", "--snapshot", "--join-after", "1"]).is_err());
    }

    #[test]
    fn test_feed_requires_file() {
        assert!(Cli::try_parse_from(["es", "feed"]).is_err());
    }
}
