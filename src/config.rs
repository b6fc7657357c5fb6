use serde::Deserialize;
use std::fs;
use std::path::PathBuf;

use crate::consts::APP_NAME;

#[derive(Debug, Default, Deserialize)]
pub(crate) struct GeminiSection {
    #[serde(default)]
    pub(crate) model: Option<String>,
    #[serde(default)]
    pub(crate) timeout_secs: Option<u64>,
    #[serde(default)]
    pub(crate) endpoint: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct RetrySection {
    /// Unsigned, so a negative value fails to parse
    #[serde(default)]
    pub(crate) max_retries: Option<usize>,
    #[serde(default)]
    pub(crate) intervals_ms: Option<Vec<u64>>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct Config {
    #[serde(default)]
    pub(crate) photos_dir: Option<PathBuf>,
    #[serde(default)]
    pub(crate) database: Option<PathBuf>,
    #[serde(default)]
    pub(crate) interval_secs: Option<u64>,
    #[serde(default)]
    pub(crate) timezone: Option<String>,
    #[serde(default)]
    pub(crate) debug: bool,
    #[serde(default)]
    pub(crate) mock: bool,
    #[serde(default)]
    pub(crate) no_color: bool,
    #[serde(default)]
    pub(crate) gemini: GeminiSection,
    #[serde(default)]
    pub(crate) retry: RetrySection,
}

impl Config {
    pub(crate) fn load() -> Self {
        // Try config locations in order of priority
        for path in Self::get_config_paths() {
            if path.exists()
                && let Ok(content) = fs::read_to_string(&path)
            {
                match toml::from_str::<Config>(&content) {
                    Ok(config) => return config,
                    Err(e) => {
                        eprintln!("Warning: Failed to parse {}: {}", path.display(), e);
                    }
                }
            }
        }

        Self::default()
    }

    fn get_config_paths() -> Vec<PathBuf> {
        let mut paths = Vec::new();

        // 1. XDG config: ~/.config/plant-diary/config.toml
        if let Some(home) = dirs::home_dir() {
            paths.push(home.join(".config").join(APP_NAME).join("config.toml"));
        }

        // 2. Platform config dir (Application Support on macOS)
        if let Some(config_dir) = dirs::config_dir() {
            let platform_path = config_dir.join(APP_NAME).join("config.toml");
            if !paths.contains(&platform_path) {
                paths.push(platform_path);
            }
        }

        // 3. Home directory: ~/.plant-diary.toml
        if let Some(home) = dirs::home_dir() {
            paths.push(home.join(format!(".{APP_NAME}.toml")));
        }

        paths
    }
}
