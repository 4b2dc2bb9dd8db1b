// src/cli.rs

//! CLI argument parsing using `clap`.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use crate::config::default_config_path;

/// Command-line arguments for `cmdgate`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "cmdgate",
    version,
    about = "Drive synthetic async-command scenarios and report how they end.",
    long_about = None
)]
pub struct CliArgs {
    /// Path to the config file (TOML).
    ///
    /// Default: `Cmdgate.toml` in the current working directory.
    #[arg(long, value_name = "PATH", default_value_os_t = default_config_path())]
    pub config: PathBuf,

    /// Run only the scenario with this name. Without it, every scenario runs
    /// in name order.
    #[arg(long, value_name = "NAME")]
    pub scenario: Option<String>,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `CMDGATE_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Parse + validate, print the scenarios, but don't run any of them.
    #[arg(long)]
    pub dry_run: bool,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_cmdgate_toml_and_all_scenarios() {
        let args = CliArgs::try_parse_from(["cmdgate"]).unwrap();
        assert_eq!(args.config, default_config_path());
        assert_eq!(args.config, PathBuf::from("Cmdgate.toml"));
        assert!(args.scenario.is_none());
        assert!(args.log_level.is_none());
        assert!(!args.dry_run);
    }

    #[test]
    fn parses_scenario_and_level() {
        let args = CliArgs::try_parse_from([
            "cmdgate",
            "--config",
            "demo.toml",
            "--scenario",
            "download",
            "--log-level",
            "debug",
            "--dry-run",
        ])
        .unwrap();
        assert_eq!(args.config, PathBuf::from("demo.toml"));
        assert_eq!(args.scenario.as_deref(), Some("download"));
        assert!(matches!(args.log_level, Some(LogLevel::Debug)));
        assert!(args.dry_run);
    }
}
