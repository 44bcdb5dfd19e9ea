//! Clap derive structures for the `roomrec` CLI.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// roomrec -- record live rooms as they go live
#[derive(Debug, Parser)]
#[command(
    name = "roomrec",
    version,
    about = "Watch live rooms and record their streams",
    long_about = "Watches one or more live rooms, records each stream to disk while\n\
        the room is broadcasting, and retries automatically when a stream drops.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Config file (defaults to the platform config directory)
    #[arg(long, env = "ROOMREC_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Directory recordings are written to (overrides config)
    #[arg(long, short = 'o', global = true)]
    pub output_dir: Option<PathBuf>,

    /// Live API base URL (overrides config)
    #[arg(long, global = true)]
    pub api_base: Option<String>,

    /// Log line format
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    Text,
    Json,
}

// ── Commands ─────────────────────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Monitor rooms and record them until interrupted
    Record(RecordArgs),

    /// Show a room's resolved metadata as JSON
    Info(InfoArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(Debug, Args)]
pub struct RecordArgs {
    /// Room ids to record (defaults to the configured list)
    pub rooms: Vec<u64>,

    /// Start recording right away instead of waiting for the first poll
    #[arg(long)]
    pub now: bool,
}

#[derive(Debug, Args)]
pub struct InfoArgs {
    /// Public room id
    pub room_id: u64,
}

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn global_flags_parse_after_subcommand() {
        let cli = Cli::try_parse_from([
            "roomrec",
            "record",
            "1017",
            "5",
            "-vv",
            "--output-dir",
            "/srv/rec",
        ])
        .unwrap();

        assert_eq!(cli.global.verbose, 2);
        assert_eq!(cli.global.output_dir, Some(PathBuf::from("/srv/rec")));
        match cli.command {
            Command::Record(args) => assert_eq!(args.rooms, vec![1017, 5]),
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
