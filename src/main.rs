mod app;
mod cli;
mod config;
mod consts;
mod core;
mod error;
mod events;
mod generator;
mod ingest;
mod output;
mod store;
mod utils;

use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use cli::Cli;
use config::Config;

fn init_logging(debug: bool) {
    let default_level = if debug { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

fn main() {
    // Load config file and merge with CLI args (CLI takes precedence)
    let config = Config::load();
    let cli = Cli::parse().with_config(&config);

    init_logging(cli.debug);

    if let Err(e) = app::run(&cli, &config) {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
