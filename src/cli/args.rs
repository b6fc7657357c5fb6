//! CLI argument definitions
//!
//! Global CLI options and configuration merging logic.

use std::io::IsTerminal;
use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use crate::config::Config;

use super::commands::Commands;

#[derive(Debug, Clone, Copy, Default, ValueEnum, PartialEq)]
pub(crate) enum ColorMode {
    /// Auto-detect based on terminal (default)
    #[default]
    Auto,
    /// Always use colors
    Always,
    /// Never use colors
    Never,
}

#[derive(Parser)]
#[command(name = "plant-diary")]
#[command(about = "Turn timestamped plant photos into an AI-written growth diary", version)]
pub(crate) struct Cli {
    #[command(subcommand)]
    pub(crate) command: Option<Commands>,

    /// Directory scanned for *.jpg photos
    #[arg(long, global = true, value_name = "DIR")]
    pub(crate) photos_dir: Option<PathBuf>,

    /// SQLite database file
    #[arg(long, global = true, value_name = "FILE")]
    pub(crate) database: Option<PathBuf>,

    /// Seconds between scans when running continuously
    #[arg(long, global = true, value_name = "SECS")]
    pub(crate) interval: Option<u64>,

    /// Timezone for diary dates (e.g., "Asia/Tokyo", "UTC", "+09:00")
    #[arg(long, global = true, value_name = "TZ")]
    pub(crate) timezone: Option<String>,

    /// Use the offline mock generator even if an API key is set
    #[arg(long, global = true)]
    pub(crate) mock: bool,

    /// Output as JSON
    #[arg(short, long, global = true)]
    pub(crate) json: bool,

    /// Color output mode
    #[arg(long, global = true, value_enum, default_value = "auto")]
    pub(crate) color: ColorMode,

    /// Disable colored output (shorthand for --color=never)
    #[arg(long, global = true)]
    pub(crate) no_color: bool,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub(crate) debug: bool,
}

impl Cli {
    /// Merge config file values into CLI (CLI args take precedence)
    pub(crate) fn with_config(mut self, config: &Config) -> Self {
        // For boolean flags, config only applies if CLI is false (default)
        if !self.mock && config.mock {
            self.mock = true;
        }
        if !self.no_color && config.no_color {
            self.no_color = true;
        }
        if !self.debug && config.debug {
            self.debug = true;
        }

        // Value options: only apply if CLI didn't set them
        if self.photos_dir.is_none() {
            self.photos_dir = config.photos_dir.clone();
        }
        if self.database.is_none() {
            self.database = config.database.clone();
        }
        if self.interval.is_none() {
            self.interval = config.interval_secs;
        }
        if self.timezone.is_none() {
            self.timezone = config.timezone.clone();
        }

        self
    }

    pub(crate) fn use_color(&self) -> bool {
        if self.no_color {
            return false;
        }
        match self.color {
            ColorMode::Always => true,
            ColorMode::Never => false,
            ColorMode::Auto => std::io::stdout().is_terminal(),
        }
    }
}
