/// Used for config file locations
pub(crate) const APP_NAME: &str = "plant-diary";

pub(crate) const DEFAULT_PHOTOS_DIR: &str = "data/photos";
pub(crate) const DEFAULT_DATABASE: &str = "data/plant_log.db";

/// Holds the generation API key; without it the mock generator is used
pub(crate) const API_KEY_ENV: &str = "GEMINI_API_KEY";

/// Date format for table output: "2026-02-15 09:00"
pub(crate) const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M";
