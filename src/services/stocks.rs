use serde_json::Value;

use super::{join, require, InfoServices, ServiceError};

pub const STOCK_FAILED: &str = "Failed to fetch stock price.";

const SERIES_KEY: &str = "Time Series (5min)";

impl InfoServices {
    /// Closing price of the most recent 5-minute bar for `symbol`.
    pub async fn get_stock_price(&self, symbol: &str) -> Result<String, ServiceError> {
        let key = require(&self.keys.alpha_vantage, "ALPHA_VANTAGE_API_KEY")?;
        let url = join(&self.endpoints.stocks, "query");
        let data = self
            .get_json(
                &url,
                &[
                    ("function", "TIME_SERIES_INTRADAY"),
                    ("symbol", symbol),
                    ("interval", "5min"),
                    ("apikey", key),
                ],
            )
            .await?;
        Ok(describe_close(symbol, &data))
    }
}

/// Timestamps are `YYYY-MM-DD HH:MM:SS`, so the greatest key is the latest bar.
fn describe_close(symbol: &str, data: &Value) -> String {
    let latest = data[SERIES_KEY]
        .as_object()
        .and_then(|series| series.iter().max_by(|a, b| a.0.cmp(b.0)))
        .and_then(|(_, bar)| match &bar["4. close"] {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        });
    match latest {
        Some(close) => format!("The latest closing price of {} is ${}.", symbol, close),
        None => STOCK_FAILED.to_string(),
    }
}
