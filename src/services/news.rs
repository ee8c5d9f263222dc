use serde_json::Value;

use super::{join, require, InfoServices, ServiceError};

pub const NEWS_FAILED: &str = "Failed to fetch news.";

const MAX_HEADLINES: usize = 5;

impl InfoServices {
    /// Up to five US top headlines.
    pub async fn get_latest_news(&self) -> Result<String, ServiceError> {
        let key = require(&self.keys.news, "NEWS_API_KEY")?;
        let url = join(&self.endpoints.news, "v2/top-headlines");
        let data = self.get_json(&url, &[("country", "us"), ("apiKey", key)]).await?;
        Ok(describe_headlines(&data))
    }
}

fn describe_headlines(data: &Value) -> String {
    if data["status"] != "ok" {
        log::warn!("News API returned status {}", data["status"]);
        return NEWS_FAILED.to_string();
    }
    let headlines: Vec<&str> = data["articles"]
        .as_array()
        .map(|articles| {
            articles
                .iter()
                .take(MAX_HEADLINES)
                .filter_map(|a| a["title"].as_str())
                .collect()
        })
        .unwrap_or_default();
    format!("Here are the latest news headlines:\n{}", headlines.join("\n"))
}
