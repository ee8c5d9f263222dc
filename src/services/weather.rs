use serde_json::Value;

use super::{join, require, InfoServices, ServiceError};

pub const LOCATION_NOT_FOUND: &str = "Location not found.";

impl InfoServices {
    /// Current conditions for `location`, temperature in Kelvin.
    pub async fn get_weather(&self, location: &str) -> Result<String, ServiceError> {
        let key = require(&self.keys.weather, "WEATHER_API_KEY")?;
        let url = join(&self.endpoints.weather, "data/2.5/weather");
        let data = self.get_json(&url, &[("q", location), ("appid", key)]).await?;
        describe_weather(location, &data)
    }
}

/// `cod` comes back as a number on success and as a string on failure.
fn is_not_found(data: &Value) -> bool {
    match &data["cod"] {
        Value::String(s) => s == "404",
        Value::Number(n) => n.as_u64() == Some(404),
        _ => false,
    }
}

fn describe_weather(location: &str, data: &Value) -> Result<String, ServiceError> {
    if is_not_found(data) {
        return Ok(LOCATION_NOT_FOUND.to_string());
    }
    let temperature = data["main"]["temp"]
        .as_f64()
        .ok_or_else(|| ServiceError::Malformed("missing main.temp".into()))?;
    let description = data["weather"][0]["description"]
        .as_str()
        .ok_or_else(|| ServiceError::Malformed("missing weather[0].description".into()))?;
    Ok(format!(
        "The weather in {} is currently {} with a temperature of {}°K.",
        location, description, temperature
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::test_support;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_weather_sentence() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/data/2.5/weather"))
            .and(query_param("q", "London"))
            .and(query_param("appid", "w-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "cod": 200,
                "main": {"temp": 280.32},
                "weather": [{"description": "light rain"}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let answer = test_support::services(&server.uri())
            .get_weather("London")
            .await
            .unwrap();
        assert_eq!(
            answer,
            "The weather in London is currently light rain with a temperature of 280.32°K."
        );
    }

    #[tokio::test]
    async fn test_unknown_location() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(404)
                    .set_body_json(json!({"cod": "404", "message": "city not found"})),
            )
            .mount(&server)
            .await;

        let answer = test_support::services(&server.uri())
            .get_weather("Atlantis")
            .await
            .unwrap();
        assert_eq!(answer, LOCATION_NOT_FOUND);
    }

    #[test]
    fn test_missing_fields_are_malformed() {
        let err = describe_weather("X", &json!({"cod": 200})).unwrap_err();
        assert!(matches!(err, ServiceError::Malformed(_)));
    }
}
