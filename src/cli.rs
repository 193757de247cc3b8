// src/cli.rs

//! CLI argument parsing using `clap`.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

/// Command-line arguments for `wad`.
#[derive(Debug, Clone, Default, Parser)]
#[command(
    name = "wad",
    version,
    about = "Watch a source tree, rebuild on change and deploy the artifact.",
    long_about = None
)]
pub struct CliArgs {
    /// Path to the config file (TOML).
    ///
    /// Default: `wad.toml` in the current working directory, if present.
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Directory to watch for changes (overrides `[watch].dir`).
    #[arg(long, value_name = "DIR")]
    pub watch_dir: Option<PathBuf>,

    /// Built artifact to deploy (overrides `[build].artifact`).
    #[arg(long, value_name = "PATH")]
    pub artifact: Option<PathBuf>,

    /// Deployment target; repeat for several (overrides `[deploy].targets`).
    #[arg(long = "target", value_name = "PATH")]
    pub targets: Vec<PathBuf>,

    /// Poll interval such as `500ms` or `2s` (overrides `[watch].poll_interval`).
    #[arg(long, value_name = "DURATION")]
    pub poll_interval: Option<String>,

    /// Shell command that builds the artifact (overrides `[build].cmd`).
    #[arg(long, value_name = "CMD")]
    pub build_cmd: Option<String>,

    /// Run a single build/deploy cycle and exit.
    #[arg(long)]
    pub once: bool,

    /// Do not listen on stdin for manual rebuild requests.
    #[arg(long)]
    pub no_input: bool,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `WAD_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Resolve and print the effective configuration, but don't build.
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
