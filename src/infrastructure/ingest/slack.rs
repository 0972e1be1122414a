//! Slack channel connector

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate};
use serde::Deserialize;
use std::sync::Arc;
use tracing::debug;
use url::Url;

use crate::domain::{BackendKind, DomainError, RemoteItem, SourceConnector};
use crate::infrastructure::http_client::HttpClientTrait;

pub const DEFAULT_SLACK_API: &str = "https://slack.com/api";

const PAGE_SIZE: &str = "200";

#[derive(Debug, Deserialize)]
struct HistoryResponse {
    ok: bool,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    messages: Vec<SlackMessage>,
    #[serde(default)]
    response_metadata: Option<ResponseMetadata>,
}

#[derive(Debug, Deserialize)]
struct SlackMessage {
    #[serde(default)]
    text: String,
}

#[derive(Debug, Deserialize)]
struct ResponseMetadata {
    #[serde(default)]
    next_cursor: String,
}

/// Parse `YYYY-MM-DD` (midnight UTC) or an RFC 3339 timestamp into the
/// seconds-since-epoch string Slack expects
pub fn slack_timestamp(value: &str) -> Result<String, DomainError> {
    let value = value.trim();

    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        if let Some(midnight) = date.and_hms_opt(0, 0, 0) {
            return Ok(midnight.and_utc().timestamp().to_string());
        }
    }

    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.timestamp().to_string())
        .map_err(|_| {
            DomainError::validation(format!(
                "Invalid date '{}': expected YYYY-MM-DD or an RFC 3339 timestamp",
                value
            ))
        })
}

/// Reads channel history; each channel becomes one text document
#[derive(Debug, Clone)]
pub struct SlackConnector {
    http: Arc<dyn HttpClientTrait>,
    api_base: String,
    channels: Vec<String>,
    token: String,
    oldest: Option<String>,
    latest: Option<String>,
}

impl SlackConnector {
    pub fn new(
        http: Arc<dyn HttpClientTrait>,
        api_base: impl Into<String>,
        channels: Vec<String>,
        token: impl Into<String>,
        start_date: Option<&str>,
        end_date: Option<&str>,
    ) -> Result<Self, DomainError> {
        let oldest = start_date.map(slack_timestamp).transpose()?;
        let latest = end_date.map(slack_timestamp).transpose()?;

        Ok(Self {
            http,
            api_base: api_base.into().trim_end_matches('/').to_string(),
            channels,
            token: token.into(),
            oldest,
            latest,
        })
    }

    fn history_url(&self, channel: &str, cursor: Option<&str>) -> Result<String, DomainError> {
        let mut params = vec![("channel", channel), ("limit", PAGE_SIZE)];
        if let Some(oldest) = &self.oldest {
            params.push(("oldest", oldest.as_str()));
        }
        if let Some(latest) = &self.latest {
            params.push(("latest", latest.as_str()));
        }
        if let Some(cursor) = cursor {
            params.push(("cursor", cursor));
        }

        Url::parse_with_params(&format!("{}/conversations.history", self.api_base), &params)
            .map(String::from)
            .map_err(|e| DomainError::configuration(format!("Invalid Slack API URL: {}", e)))
    }
}

#[async_trait]
impl SourceConnector for SlackConnector {
    fn backend(&self) -> BackendKind {
        BackendKind::Slack
    }

    async fn list(&self) -> Result<Vec<RemoteItem>, DomainError> {
        Ok(self
            .channels
            .iter()
            .map(|channel| {
                RemoteItem::new(format!("{}.txt", channel.replace('/', "_")), channel)
                    .with_source_url(format!("slack://channel/{}", channel))
            })
            .collect())
    }

    async fn fetch(&self, item: &RemoteItem) -> Result<Vec<u8>, DomainError> {
        let authorization = format!("Bearer {}", self.token);
        let mut messages = Vec::new();
        let mut cursor: Option<String> = None;

        loop {
            let url = self.history_url(&item.locator, cursor.as_deref())?;
            let value = self
                .http
                .get_json(&url, vec![("authorization", authorization.as_str())])
                .await?;

            let page: HistoryResponse = serde_json::from_value(value).map_err(|e| {
                DomainError::provider(
                    BackendKind::Slack.as_str(),
                    format!("Unexpected response: {}", e),
                )
            })?;

            if !page.ok {
                return Err(DomainError::provider(
                    BackendKind::Slack.as_str(),
                    format!(
                        "conversations.history failed for {}: {}",
                        item.locator,
                        page.error.unwrap_or_else(|| "unknown error".to_string())
                    ),
                ));
            }

            messages.extend(page.messages.into_iter().map(|m| m.text));

            match page.response_metadata.map(|m| m.next_cursor) {
                Some(next) if !next.is_empty() => cursor = Some(next),
                _ => break,
            }
        }

        debug!(channel = %item.locator, messages = messages.len(), "Fetched Slack history");

        // newest first from the API
        messages.reverse();
        Ok(messages.join("\n").into_bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::http_client::HttpClient;
    use serde_json::json;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_slack_timestamp() {
        assert_eq!(slack_timestamp("2023-01-01").unwrap(), "1672531200");
        assert_eq!(slack_timestamp("2023-01-01T00:00:10Z").unwrap(), "1672531210");
        assert!(slack_timestamp("January 1st").is_err());
    }

    #[tokio::test]
    async fn test_list_one_item_per_channel() {
        let connector = SlackConnector::new(
            Arc::new(HttpClient::new()),
            DEFAULT_SLACK_API,
            vec!["C01".to_string(), "C02".to_string()],
            "xoxb-token",
            None,
            None,
        )
        .unwrap();

        let items = connector.list().await.unwrap();

        assert_eq!(items.len(), 2);
        assert_eq!(items[0].path, "C01.txt");
        assert_eq!(items[1].locator, "C02");
    }

    #[tokio::test]
    async fn test_fetch_paginates_in_chronological_order() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/conversations.history"))
            .and(query_param("channel", "C01"))
            .and(query_param("cursor", "page2"))
            .and(header("authorization", "Bearer xoxb-token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "ok": true,
                "messages": [{"text": "first"}],
                "response_metadata": {"next_cursor": ""}
            })))
            .with_priority(1)
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/conversations.history"))
            .and(query_param("channel", "C01"))
            .and(query_param("oldest", "1672531200"))
            .and(header("authorization", "Bearer xoxb-token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "ok": true,
                "messages": [{"text": "third"}, {"text": "second"}],
                "response_metadata": {"next_cursor": "page2"}
            })))
            .mount(&server)
            .await;

        let connector = SlackConnector::new(
            Arc::new(HttpClient::new()),
            server.uri(),
            vec!["C01".to_string()],
            "xoxb-token",
            Some("2023-01-01"),
            None,
        )
        .unwrap();

        let bytes = connector.fetch(&RemoteItem::new("C01.txt", "C01")).await.unwrap();

        assert_eq!(String::from_utf8(bytes).unwrap(), "first\nsecond\nthird");
    }

    #[tokio::test]
    async fn test_fetch_api_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"ok": false, "error": "not_in_channel"})),
            )
            .mount(&server)
            .await;

        let connector = SlackConnector::new(
            Arc::new(HttpClient::new()),
            server.uri(),
            vec!["C01".to_string()],
            "xoxb-token",
            None,
            None,
        )
        .unwrap();

        let err = connector.fetch(&RemoteItem::new("C01.txt", "C01")).await.unwrap_err();
        assert!(err.to_string().contains("not_in_channel"));
    }
}
