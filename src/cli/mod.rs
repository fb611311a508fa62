//! Command-line interface for par-mux.
//!
//! This module handles CLI argument parsing and the offline subcommands.
//! Subcommand implementations live in the [`commands`] submodule.

pub mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// par-mux - split-pane terminal multiplexer for remote shells
#[derive(Parser)]
#[command(name = "par-mux")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Remote host (IP or name) the bridge should SSH into
    #[arg(long, value_name = "HOST")]
    pub host: Option<String>,

    /// Remote login user
    #[arg(long, short = 'u', value_name = "USER")]
    pub user: Option<String>,

    /// File holding the authentication secret (private key)
    #[arg(long, value_name = "PATH")]
    pub key_file: Option<PathBuf>,

    /// WebSocket bridge URL (overrides config)
    #[arg(long, value_name = "URL")]
    pub bridge_url: Option<String>,

    /// Layout store scope; each name keeps its own saved layout
    #[arg(long, value_name = "NAME", default_value = "default")]
    pub session: String,

    /// Alternate config file
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Set debug log level (overrides config and RUST_LOG)
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevelArg>,

    /// Ignore any stored layout and start with a single pane
    #[arg(long)]
    pub fresh: bool,
}

/// Log level argument for CLI
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum LogLevelArg {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevelArg {
    /// Convert to `log::LevelFilter`
    pub fn to_level_filter(self) -> log::LevelFilter {
        match self {
            LogLevelArg::Off => log::LevelFilter::Off,
            LogLevelArg::Error => log::LevelFilter::Error,
            LogLevelArg::Warn => log::LevelFilter::Warn,
            LogLevelArg::Info => log::LevelFilter::Info,
            LogLevelArg::Debug => log::LevelFilter::Debug,
            LogLevelArg::Trace => log::LevelFilter::Trace,
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Parse a captured `history` buffer and print the commands, most recent first
    ParseHistory {
        /// File containing raw terminal output
        file: PathBuf,

        /// Maximum number of commands to print
        #[arg(long, default_value_t = par_mux_config::defaults::history_max_entries())]
        max: usize,
    },

    /// Remove the stored layout for the selected session
    ClearLayout,
}

/// Runtime options passed from CLI to the application
#[derive(Clone, Debug, Default)]
pub struct RuntimeOptions {
    pub host: Option<String>,
    pub user: Option<String>,
    pub key_file: Option<PathBuf>,
    /// Bridge URL override
    pub bridge_url: Option<String>,
    /// Layout store scope
    pub session: String,
    /// Alternate config path
    pub config_path: Option<PathBuf>,
    /// Log level override from CLI
    pub log_level: Option<log::LevelFilter>,
    /// Skip layout restore
    pub fresh: bool,
}

/// Result of CLI processing
pub enum CliResult {
    /// Continue with normal application startup, with optional runtime options
    Continue(RuntimeOptions),
    /// Exit with the given code (subcommand completed)
    Exit(i32),
}

/// Process CLI arguments and handle subcommands
pub fn process_cli() -> CliResult {
    use commands::{clear_layout_cli, exit_code, parse_history_cli};

    let cli = Cli::parse();

    match cli.command {
        Some(Commands::ParseHistory { ref file, max }) => {
            CliResult::Exit(exit_code(parse_history_cli(file, max)))
        }
        Some(Commands::ClearLayout) => CliResult::Exit(exit_code(clear_layout_cli(&cli.session))),
        None => CliResult::Continue(RuntimeOptions {
            host: cli.host,
            user: cli.user,
            key_file: cli.key_file,
            bridge_url: cli.bridge_url,
            session: cli.session,
            config_path: cli.config,
            log_level: cli.log_level.map(LogLevelArg::to_level_filter),
            fresh: cli.fresh,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_connection_flags() {
        let cli = Cli::try_parse_from([
            "par-mux",
            "--host",
            "10.0.0.5",
            "--user",
            "ubuntu",
            "--key-file",
            "/tmp/id",
            "--log-level",
            "debug",
            "--fresh",
        ])
        .unwrap();
        assert_eq!(cli.host.as_deref(), Some("10.0.0.5"));
        assert_eq!(cli.session, "default");
        assert!(cli.fresh);
        assert_eq!(
            cli.log_level.map(LogLevelArg::to_level_filter),
            Some(log::LevelFilter::Debug)
        );
    }

    #[test]
    fn parses_subcommands() {
        let cli = Cli::try_parse_from(["par-mux", "parse-history", "buf.txt", "--max", "5"]).unwrap();
        assert!(matches!(
            cli.command,
            Some(Commands::ParseHistory { max: 5, .. })
        ));
        let cli = Cli::try_parse_from(["par-mux", "--session", "work", "clear-layout"]).unwrap();
        assert!(matches!(cli.command, Some(Commands::ClearLayout)));
        assert_eq!(cli.session, "work");
    }
}
