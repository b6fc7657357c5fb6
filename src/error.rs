use std::path::PathBuf;

use thiserror::Error;

use crate::core::RetryError;

/// Fatal errors raised while wiring the application together.
#[derive(Debug, Error)]
pub(crate) enum AppError {
    #[error("Invalid timezone: {input}")]
    InvalidTimezone { input: String },

    #[error("Invalid month \"{input}\" (expected YYYY-MM)")]
    InvalidMonth { input: String },

    #[error("Invalid retry policy: {0}")]
    InvalidRetryPolicy(String),

    #[error("Scan interval must be at least one second")]
    InvalidInterval,

    #[error("No diary entry with id {id}")]
    EntryNotFound { id: i64 },

    #[error("Failed to open diary database {path}: {source}")]
    StoreOpen {
        path: PathBuf,
        #[source]
        source: StoreError,
    },

    #[error("Failed to initialize generator: {0}")]
    GeneratorInit(String),

    #[error("Failed to install Ctrl-C handler: {0}")]
    Signal(#[from] ctrlc::Error),

    #[error("{0}")]
    Store(#[from] StoreError),

    #[error("Failed to render JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// The image file could not be used as generation input.
#[derive(Debug, Error)]
pub(crate) enum ImageError {
    #[error("failed to access image file {path}: {source}")]
    Access {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("path is a directory, not an image file: {path}")]
    IsDirectory { path: PathBuf },

    #[error("image file is empty: {path}")]
    Empty { path: PathBuf },

    #[error("failed to read image file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// The filename does not follow either capture-time grammar.
#[derive(Debug, Error)]
#[error("failed to parse filename {basename}: expected YYYYMMDD_HHMM_UTC or YYYYMMDD_HHMM")]
pub(crate) struct FilenameError {
    pub(crate) basename: String,
}

#[derive(Debug, Error)]
pub(crate) enum GenerationError {
    #[error(transparent)]
    Image(#[from] ImageError),

    #[error("generation request timed out")]
    Timeout,

    #[error("generation request failed: {0}")]
    Transport(String),

    #[error("generation API returned HTTP {status}")]
    Status { status: u16 },

    #[error("generation API returned a malformed body: {0}")]
    MalformedResponse(String),

    #[error("generation API returned an empty response")]
    EmptyResponse,
}

#[derive(Debug, Error)]
pub(crate) enum StoreError {
    #[error("image already recorded: {image_path}")]
    DuplicatePath { image_path: String },

    #[error("stored timestamp {value} is out of range")]
    InvalidTimestamp { value: i64 },

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Failed to create database directory: {0}")]
    CreateDir(std::io::Error),
}

/// Why a single image was dropped from the current pass.
#[derive(Debug, Error)]
pub(crate) enum ItemError {
    #[error("skipping image: {0}")]
    Image(#[from] ImageError),

    #[error("failed to load past entries: {0}")]
    History(#[source] StoreError),

    #[error("skipping image: {0}")]
    Generation(#[from] RetryError<GenerationError>),

    #[error("failed to save diary: {0}")]
    Persist(#[source] StoreError),
}
