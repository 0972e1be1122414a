//! HTTP machine-translation client

use async_trait::async_trait;
use serde_json::json;
use std::sync::Arc;
use tracing::debug;

use crate::domain::{DomainError, Translator};
use crate::infrastructure::http_client::HttpClientTrait;

const PROVIDER: &str = "translation";

/// Translator backed by a LibreTranslate-compatible `/translate` endpoint
#[derive(Debug, Clone)]
pub struct HttpTranslator {
    http: Arc<dyn HttpClientTrait>,
    endpoint: String,
    api_key: Option<String>,
}

impl HttpTranslator {
    pub fn new(http: Arc<dyn HttpClientTrait>, endpoint: impl Into<String>) -> Self {
        Self {
            http,
            endpoint: endpoint.into(),
            api_key: None,
        }
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }
}

#[async_trait]
impl Translator for HttpTranslator {
    async fn translate(
        &self,
        text: &str,
        source_lang: Option<String>,
        target_lang: &str,
    ) -> Result<String, DomainError> {
        let mut body = json!({
            "q": text,
            "source": source_lang.as_deref().unwrap_or("auto"),
            "target": target_lang,
            "format": "text",
        });
        if let Some(api_key) = &self.api_key {
            body["api_key"] = json!(api_key);
        }

        debug!(
            endpoint = %self.endpoint,
            target = target_lang,
            chars = text.len(),
            "Translating text"
        );

        let response = self.http.post_json(&self.endpoint, vec![], &body).await?;

        response
            .get("translatedText")
            .and_then(|value| value.as_str())
            .map(str::to_string)
            .ok_or_else(|| {
                DomainError::provider(PROVIDER, "Response did not contain 'translatedText'")
            })
    }
}
