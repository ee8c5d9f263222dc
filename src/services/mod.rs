//! Thin clients for third-party information APIs.
//!
//! Weather (OpenWeatherMap), headlines (NewsAPI), intraday quotes (Alpha
//! Vantage) and translation (Google Translate v2). Each call is a single GET
//! or POST with no retry; the answer is flattened into a sentence for the bot.

mod news;
mod stocks;
mod translate;
mod weather;

use std::time::Duration;

use serde_json::Value;
use thiserror::Error;

use crate::config::Settings;

pub const OPENWEATHERMAP_URL: &str = "http://api.openweathermap.org";
pub const NEWSAPI_URL: &str = "https://newsapi.org";
pub const ALPHA_VANTAGE_URL: &str = "https://www.alphavantage.co";
pub const GOOGLE_TRANSLATE_URL: &str = "https://translation.googleapis.com";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Errors from the information services.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("{0} is not configured")]
    MissingKey(&'static str),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Unexpected response: {0}")]
    Malformed(String),
}

/// Base URLs of the upstream APIs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceEndpoints {
    pub weather: String,
    pub news: String,
    pub stocks: String,
    pub translate: String,
}

impl Default for ServiceEndpoints {
    fn default() -> Self {
        Self {
            weather: OPENWEATHERMAP_URL.to_string(),
            news: NEWSAPI_URL.to_string(),
            stocks: ALPHA_VANTAGE_URL.to_string(),
            translate: GOOGLE_TRANSLATE_URL.to_string(),
        }
    }
}

impl ServiceEndpoints {
    /// Point every service at the same host (used against a local mock).
    pub fn all(base: impl Into<String>) -> Self {
        let base = base.into();
        Self {
            weather: base.clone(),
            news: base.clone(),
            stocks: base.clone(),
            translate: base,
        }
    }
}

/// API keys, one per service.
#[derive(Debug, Clone, Default)]
pub struct ServiceKeys {
    pub weather: Option<String>,
    pub news: Option<String>,
    pub alpha_vantage: Option<String>,
    pub translation: Option<String>,
}

impl ServiceKeys {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            weather: settings.weather_api_key.clone(),
            news: settings.news_api_key.clone(),
            alpha_vantage: settings.alpha_vantage_api_key.clone(),
            translation: settings.translation_api_key.clone(),
        }
    }
}

/// Shared HTTP client plus keys and endpoints for every service.
#[derive(Debug, Clone)]
pub struct InfoServices {
    client: reqwest::Client,
    keys: ServiceKeys,
    endpoints: ServiceEndpoints,
}

impl InfoServices {
    pub fn new(keys: ServiceKeys, endpoints: ServiceEndpoints) -> Result<Self, ServiceError> {
        let client = reqwest::Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            client,
            keys,
            endpoints,
        })
    }

    pub fn from_settings(settings: &Settings) -> Result<Self, ServiceError> {
        Self::new(ServiceKeys::from_settings(settings), ServiceEndpoints::default())
    }

    pub fn endpoints(&self) -> &ServiceEndpoints {
        &self.endpoints
    }

    /// GET `url` with `query` and decode the body as JSON regardless of status.
    ///
    /// The upstream APIs report failures inside the JSON body (`cod`,
    /// `status`), so the status code alone is only logged.
    async fn get_json(&self, url: &str, query: &[(&str, &str)]) -> Result<Value, ServiceError> {
        let response = self.client.get(url).query(query).send().await?;
        log::debug!("GET {} -> {}", url, response.status());
        let text = response.text().await?;
        serde_json::from_str(&text).map_err(|e| ServiceError::Malformed(e.to_string()))
    }
}

fn require<'a>(key: &'a Option<String>, name: &'static str) -> Result<&'a str, ServiceError> {
    key.as_deref().ok_or(ServiceError::MissingKey(name))
}

/// Join a base URL and a path without doubling the slash.
fn join(base: &str, path: &str) -> String {
    format!("{}/{}", base.trim_end_matches('/'), path.trim_start_matches('/'))
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join() {
        assert_eq!(join("http://h/", "/a/b"), "http://h/a/b");
        assert_eq!(join("http://h", "a"), "http://h/a");
    }

    #[tokio::test]
    async fn test_missing_key_fails_before_any_request() {
        let services =
            InfoServices::new(ServiceKeys::default(), ServiceEndpoints::all("http://127.0.0.1:9"))
                .unwrap();
        let err = services.get_weather("Paris").await.unwrap_err();
        assert!(matches!(err, ServiceError::MissingKey("WEATHER_API_KEY")));
        let err = services.get_latest_news().await.unwrap_err();
        assert!(matches!(err, ServiceError::MissingKey("NEWS_API_KEY")));
    }

    #[test]
    fn test_keys_from_settings() {
        let settings = Settings {
            weather_api_key: Some("w".into()),
            ..Settings::default()
        };
        let keys = ServiceKeys::from_settings(&settings);
        assert_eq!(keys.weather.as_deref(), Some("w"));
        assert!(keys.news.is_none());
    }
}
