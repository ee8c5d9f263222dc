//! Process-wide settings loaded once at startup.
//!
//! Every component that needs a key or endpoint receives a `&Settings`
//! instead of reading the environment on its own. Missing keys are logged and
//! left as `None`; calls that need them fail later at the call site.

use std::env;
use std::path::PathBuf;

/// Default chat-completion model.
pub const DEFAULT_MODEL: &str = "gpt-4";

/// Default on-disk location of the sample database.
pub const DEFAULT_DB_PATH: &str = "data/Chinook.db";

/// Public sample database fetched when the local copy is absent.
pub const DEFAULT_DB_URL: &str =
    "https://github.com/lerocha/chinook-database/raw/master/ChinookDatabase/DataSources/Chinook_Sqlite.sqlite";

/// Keys and endpoints consumed by the bot and its service clients.
#[derive(Debug, Clone, Default)]
pub struct Settings {
    pub openai_api_key: Option<String>,
    pub azure_openai_api_key: Option<String>,
    pub azure_openai_endpoint: Option<String>,
    pub weather_api_key: Option<String>,
    pub news_api_key: Option<String>,
    pub alpha_vantage_api_key: Option<String>,
    pub translation_api_key: Option<String>,
    /// Chat-completion model identifier.
    pub model: String,
    /// Local SQLite file.
    pub db_path: PathBuf,
    /// Where to download the database from when `db_path` is missing.
    pub db_url: String,
}

impl Settings {
    /// Load `.env` (if present) and read settings from the environment.
    pub fn load() -> Self {
        match dotenvy::dotenv() {
            Ok(path) => log::debug!("Loaded environment from {}", path.display()),
            Err(e) if e.not_found() => {}
            Err(e) => log::warn!("Failed to read .env file: {}", e),
        }
        let settings = Self::from_env();
        settings.report_missing();
        settings
    }

    /// Read settings from the current process environment only.
    pub fn from_env() -> Self {
        Self {
            openai_api_key: non_empty_var("OPENAI_API_KEY"),
            azure_openai_api_key: non_empty_var("AZURE_OPENAI_API_KEY"),
            azure_openai_endpoint: non_empty_var("AZURE_OPENAI_ENDPOINT"),
            weather_api_key: non_empty_var("WEATHER_API_KEY"),
            news_api_key: non_empty_var("NEWS_API_KEY"),
            alpha_vantage_api_key: non_empty_var("ALPHA_VANTAGE_API_KEY"),
            translation_api_key: non_empty_var("TRANSLATION_API_KEY"),
            model: non_empty_var("PIBRAIN_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            db_path: non_empty_var("PIBRAIN_DB_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_DB_PATH)),
            db_url: DEFAULT_DB_URL.to_string(),
        }
    }

    /// Human-readable descriptions of every missing required setting.
    pub fn missing(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.openai_api_key.is_none() {
            missing.push("OpenAI API key not found in environment variables.");
        }
        if self.azure_openai_api_key.is_none() || self.azure_openai_endpoint.is_none() {
            missing.push("Azure OpenAI API key or endpoint not found in environment variables.");
        }
        if self.weather_api_key.is_none() {
            missing.push("Weather API key not found in environment variables.");
        }
        if self.news_api_key.is_none() {
            missing.push("News API key not found in environment variables.");
        }
        if self.alpha_vantage_api_key.is_none() {
            missing.push("Alpha Vantage API key not found in environment variables.");
        }
        missing
    }

    /// Log each missing setting at error level. Never fails.
    pub fn report_missing(&self) -> usize {
        let missing = self.missing();
        for message in &missing {
            log::error!("{}", message);
        }
        missing.len()
    }

    /// Whether Azure OpenAI is fully configured.
    pub fn has_azure(&self) -> bool {
        self.azure_openai_api_key.is_some() && self.azure_openai_endpoint.is_some()
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}
