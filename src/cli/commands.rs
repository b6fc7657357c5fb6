//! CLI subcommand definitions

use clap::Subcommand;

/// Main CLI commands
#[derive(Debug, Subcommand)]
pub(crate) enum Commands {
    /// Watch the photos directory until Ctrl-C (default)
    Run,
    /// Run a single ingestion pass and exit
    Once,
    /// List diary entries, newest first
    List {
        /// Only entries from this month (YYYY-MM)
        #[arg(long, value_name = "YYYY-MM")]
        month: Option<String>,
    },
    /// Show one diary entry in full
    Show {
        /// Entry id
        id: i64,
    },
    /// Find entries whose text contains a keyword
    Search {
        keyword: String,
    },
    /// List months that have entries
    Months,
}
