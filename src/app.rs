use std::path::PathBuf;
use std::sync::{Arc, mpsc};
use std::time::Duration;

use tracing::{info, warn};

use crate::cli::{Cli, Commands};
use crate::config::Config;
use crate::consts::{API_KEY_ENV, DEFAULT_DATABASE, DEFAULT_PHOTOS_DIR};
use crate::core::{Backoff, RetryPolicy};
use crate::error::AppError;
use crate::events::{EventSink, TracingSink};
use crate::generator::{DiaryGenerator, FixedGenerator, GeminiConfig, GeminiGenerator};
use crate::ingest::{CancellationToken, DEFAULT_INTERVAL, Worker, WorkerSettings};
use crate::output::{
    output_entries_json, output_entry_json, output_months_json, print_entries_table, print_entry,
    print_months, print_summary,
};
use crate::store::{EntryStore, SqliteStore};
use crate::utils::{Timezone, parse_year_month};

pub(crate) struct CommandContext<'a> {
    pub(crate) cli: &'a Cli,
    pub(crate) config: &'a Config,
    pub(crate) timezone: Timezone,
}

impl CommandContext<'_> {
    fn database_path(&self) -> PathBuf {
        self.cli
            .database
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DATABASE))
    }

    fn photos_dir(&self) -> PathBuf {
        self.cli
            .photos_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_PHOTOS_DIR))
    }

    fn open_store(&self) -> Result<SqliteStore, AppError> {
        let path = self.database_path();
        SqliteStore::open(&path).map_err(|source| AppError::StoreOpen { path, source })
    }

    fn interval(&self) -> Result<Duration, AppError> {
        match self.cli.interval {
            Some(0) => Err(AppError::InvalidInterval),
            Some(secs) => Ok(Duration::from_secs(secs)),
            None => Ok(DEFAULT_INTERVAL),
        }
    }
}

pub(crate) fn retry_policy(config: &Config) -> Result<RetryPolicy, AppError> {
    let mut policy = RetryPolicy::default();
    if let Some(max_retries) = config.retry.max_retries {
        policy.max_retries = max_retries;
    }
    if let Some(ref intervals) = config.retry.intervals_ms {
        policy.intervals = intervals.iter().copied().map(Duration::from_millis).collect();
    }
    policy.validate().map_err(AppError::InvalidRetryPolicy)?;
    Ok(policy)
}

fn gemini_config(config: &Config) -> GeminiConfig {
    let mut gemini = GeminiConfig::default();
    if let Some(ref model) = config.gemini.model {
        gemini.model = model.clone();
    }
    if let Some(ref endpoint) = config.gemini.endpoint {
        gemini.endpoint = endpoint.clone();
    }
    if let Some(secs) = config.gemini.timeout_secs {
        gemini.timeout = Duration::from_secs(secs);
    }
    gemini
}

/// Gemini when an API key is available, otherwise the fixed-text mock.
pub(crate) fn build_generator(
    ctx: &CommandContext<'_>,
    api_key: Option<String>,
) -> Result<Arc<dyn DiaryGenerator>, AppError> {
    if ctx.cli.mock {
        return Ok(Arc::new(FixedGenerator::default()));
    }
    match api_key.filter(|k| !k.trim().is_empty()) {
        Some(key) => Ok(Arc::new(GeminiGenerator::new(&key, gemini_config(ctx.config))?)),
        None => {
            warn!("{API_KEY_ENV} is not set, using mock generator");
            Ok(Arc::new(FixedGenerator::default()))
        }
    }
}

fn build_worker(ctx: &CommandContext<'_>, store: Arc<SqliteStore>) -> Result<Worker, AppError> {
    let sink: Arc<dyn EventSink> = Arc::new(TracingSink);
    let generator = build_generator(ctx, std::env::var(API_KEY_ENV).ok())?;
    let backoff = Backoff::new(retry_policy(ctx.config)?, sink.clone());
    let settings = WorkerSettings {
        photos_dir: ctx.photos_dir(),
        interval: ctx.interval()?,
        timezone: ctx.timezone,
    };

    info!(
        photos_dir = %settings.photos_dir.display(),
        database = %ctx.database_path().display(),
        generator = generator.name(),
        "worker configured"
    );

    Ok(Worker::new(store, generator, backoff, sink, settings))
}

fn print_json(json: &str) {
    println!("{json}");
}

fn handle_run(ctx: &CommandContext<'_>) -> Result<(), AppError> {
    let store = Arc::new(ctx.open_store()?);
    let worker = build_worker(ctx, store)?;
    let interval = ctx.interval()?;

    // SIGINT, SIGTERM and SIGHUP all land here
    let (stop_tx, stop_rx) = mpsc::channel();
    ctrlc::set_handler(move || {
        let _ = stop_tx.send(());
    })?;

    info!(
        interval_secs = interval.as_secs(),
        "watching for new photos, press Ctrl-C to stop"
    );
    let handle = worker.start(CancellationToken::new());
    let _ = stop_rx.recv();
    info!("stop requested, finishing current pass");
    handle.cancel();
    handle.wait();
    Ok(())
}

fn handle_once(ctx: &CommandContext<'_>) -> Result<(), AppError> {
    let store = Arc::new(ctx.open_store()?);
    let summary = build_worker(ctx, store)?.run_pass();

    if ctx.cli.json {
        print_json(&serde_json::to_string_pretty(&summary)?);
    } else {
        print_summary(&summary, ctx.cli.use_color());
    }
    Ok(())
}

fn handle_list(ctx: &CommandContext<'_>, month: Option<&str>) -> Result<(), AppError> {
    let store = ctx.open_store()?;
    let entries = match month {
        Some(raw) => {
            let ym = parse_year_month(raw)?;
            let (start, end) = ctx.timezone.month_range(ym.year, ym.month).ok_or_else(|| {
                AppError::InvalidMonth {
                    input: raw.to_string(),
                }
            })?;
            let mut entries = store.entries_in_range(start, end)?;
            entries.reverse();
            entries
        }
        None => store.all_entries()?,
    };

    if ctx.cli.json {
        print_json(&output_entries_json(&entries, ctx.timezone)?);
    } else if entries.is_empty() {
        println!("No diary entries found.");
    } else {
        print_entries_table(&entries, ctx.timezone, ctx.cli.use_color());
    }
    Ok(())
}

fn handle_show(ctx: &CommandContext<'_>, id: i64) -> Result<(), AppError> {
    let store = ctx.open_store()?;
    let entry = store.entry_by_id(id)?.ok_or(AppError::EntryNotFound { id })?;

    if ctx.cli.json {
        print_json(&output_entry_json(&entry, ctx.timezone)?);
    } else {
        print_entry(&entry, ctx.timezone, ctx.cli.use_color());
    }
    Ok(())
}

fn handle_search(ctx: &CommandContext<'_>, keyword: &str) -> Result<(), AppError> {
    let store = ctx.open_store()?;
    let entries = store.search(keyword)?;

    if ctx.cli.json {
        print_json(&output_entries_json(&entries, ctx.timezone)?);
    } else if entries.is_empty() {
        println!("No diary entries mention \"{keyword}\".");
    } else {
        print_entries_table(&entries, ctx.timezone, ctx.cli.use_color());
    }
    Ok(())
}

fn handle_months(ctx: &CommandContext<'_>) -> Result<(), AppError> {
    let store = ctx.open_store()?;
    let months = store.year_months(ctx.timezone)?;

    if ctx.cli.json {
        print_json(&output_months_json(&months)?);
    } else if months.is_empty() {
        println!("No diary entries found.");
    } else {
        print_months(&months);
    }
    Ok(())
}

/// Dispatch the parsed command. `run` is the default.
pub(crate) fn run(cli: &Cli, config: &Config) -> Result<(), AppError> {
    let ctx = CommandContext {
        cli,
        config,
        timezone: Timezone::parse(cli.timezone.as_deref())?,
    };

    match &cli.command {
        None | Some(Commands::Run) => handle_run(&ctx),
        Some(Commands::Once) => handle_once(&ctx),
        Some(Commands::List { month }) => handle_list(&ctx, month.as_deref()),
        Some(Commands::Show { id }) => handle_show(&ctx, *id),
        Some(Commands::Search { keyword }) => handle_search(&ctx, keyword),
        Some(Commands::Months) => handle_months(&ctx),
    }
}
