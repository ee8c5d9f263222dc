use serde_json::{json, Value};

use super::{join, require, InfoServices, ServiceError};

impl InfoServices {
    /// Translate `text` into `target_language` (an ISO-639 code such as `fr`).
    pub async fn translate_text(
        &self,
        text: &str,
        target_language: &str,
    ) -> Result<String, ServiceError> {
        let key = require(&self.keys.translation, "TRANSLATION_API_KEY")?;
        let url = join(&self.endpoints.translate, "language/translate/v2");
        let response = self
            .client
            .post(&url)
            .query(&[("key", key)])
            .json(&json!({"q": text, "target": target_language, "format": "text"}))
            .send()
            .await?
            .error_for_status()?;
        let data: Value = response.json().await?;
        data["data"]["translations"][0]["translatedText"]
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| ServiceError::Malformed("missing translatedText".into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::test_support;
    use wiremock::matchers::{body_partial_json, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_translation() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/language/translate/v2"))
            .and(query_param("key", "t-key"))
            .and(body_partial_json(json!({"q": "Hello", "target": "fr"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": {"translations": [{"translatedText": "Bonjour"}]}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let answer = test_support::services(&server.uri())
            .translate_text("Hello", "fr")
            .await
            .unwrap();
        assert_eq!(answer, "Bonjour");
    }

    #[tokio::test]
    async fn test_rejected_request_is_http_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(403))
            .mount(&server)
            .await;

        let err = test_support::services(&server.uri())
            .translate_text("Hello", "fr")
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Http(_)));
    }
}
