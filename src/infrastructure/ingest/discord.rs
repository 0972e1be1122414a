//! Discord channel connector

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use serde::Deserialize;
use std::sync::Arc;
use tracing::debug;

use crate::domain::{BackendKind, DomainError, RemoteItem, SourceConnector};
use crate::infrastructure::http_client::HttpClientTrait;

pub const DEFAULT_DISCORD_API: &str = "https://discord.com/api/v10";

const PAGE_SIZE: usize = 100;

#[derive(Debug, Deserialize)]
struct DiscordMessage {
    id: String,
    #[serde(default)]
    content: String,
    timestamp: DateTime<Utc>,
}

/// Reads channel messages with a bot token; each channel becomes one text
/// document
#[derive(Debug, Clone)]
pub struct DiscordConnector {
    http: Arc<dyn HttpClientTrait>,
    api_base: String,
    channels: Vec<String>,
    token: String,
    period_days: Option<u32>,
}

impl DiscordConnector {
    pub fn new(
        http: Arc<dyn HttpClientTrait>,
        api_base: impl Into<String>,
        channels: Vec<String>,
        token: impl Into<String>,
        period_days: Option<u32>,
    ) -> Self {
        Self {
            http,
            api_base: api_base.into().trim_end_matches('/').to_string(),
            channels,
            token: token.into(),
            period_days,
        }
    }

    fn cutoff(&self) -> Option<DateTime<Utc>> {
        self.period_days
            .map(|days| Utc::now() - Duration::days(i64::from(days)))
    }

    fn messages_url(&self, channel: &str, before: Option<&str>) -> String {
        let mut url = format!(
            "{}/channels/{}/messages?limit={}",
            self.api_base, channel, PAGE_SIZE
        );
        if let Some(before) = before {
            url.push_str(&format!("&before={}", before));
        }
        url
    }
}

#[async_trait]
impl SourceConnector for DiscordConnector {
    fn backend(&self) -> BackendKind {
        BackendKind::Discord
    }

    async fn list(&self) -> Result<Vec<RemoteItem>, DomainError> {
        Ok(self
            .channels
            .iter()
            .map(|channel| {
                RemoteItem::new(format!("{}.txt", channel.replace('/', "_")), channel)
                    .with_source_url(format!("https://discord.com/channels/@me/{}", channel))
            })
            .collect())
    }

    async fn fetch(&self, item: &RemoteItem) -> Result<Vec<u8>, DomainError> {
        let authorization = format!("Bot {}", self.token);
        let cutoff = self.cutoff();
        let mut messages: Vec<String> = Vec::new();
        let mut before: Option<String> = None;

        'pages: loop {
            let url = self.messages_url(&item.locator, before.as_deref());
            let value = self
                .http
                .get_json(&url, vec![("authorization", authorization.as_str())])
                .await?;

            let page: Vec<DiscordMessage> = serde_json::from_value(value).map_err(|e| {
                DomainError::provider(
                    BackendKind::Discord.as_str(),
                    format!("Unexpected response: {}", e),
                )
            })?;
            let page_len = page.len();

            for message in page {
                if cutoff.is_some_and(|cutoff| message.timestamp < cutoff) {
                    break 'pages;
                }
                before = Some(message.id);
                messages.push(message.content);
            }

            if page_len < PAGE_SIZE {
                break;
            }
        }

        debug!(channel = %item.locator, messages = messages.len(), "Fetched Discord messages");

        // newest first from the API
        messages.reverse();
        Ok(messages.join("\n").into_bytes())
    }
}
