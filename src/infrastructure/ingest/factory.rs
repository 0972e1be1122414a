use serde::Deserialize;
use std::sync::Arc;

use super::discord::{DiscordConnector, DEFAULT_DISCORD_API};
use super::github::{GitHubConnector, DEFAULT_GITHUB_API};
use super::object_storage::ObjectStoreConnector;
use super::slack::{SlackConnector, DEFAULT_SLACK_API};
use crate::domain::{BackendConfig, DomainError, SourceConnector};
use crate::infrastructure::http_client::HttpClientTrait;

/// Base URLs of the HTTP backends
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ApiEndpoints {
    #[serde(default = "default_github")]
    pub github: String,
    #[serde(default = "default_slack")]
    pub slack: String,
    #[serde(default = "default_discord")]
    pub discord: String,
}

fn default_github() -> String {
    DEFAULT_GITHUB_API.to_string()
}

fn default_slack() -> String {
    DEFAULT_SLACK_API.to_string()
}

fn default_discord() -> String {
    DEFAULT_DISCORD_API.to_string()
}

impl Default for ApiEndpoints {
    fn default() -> Self {
        Self {
            github: default_github(),
            slack: default_slack(),
            discord: default_discord(),
        }
    }
}

/// Factory for creating source connectors
#[derive(Debug, Clone)]
pub struct ConnectorFactory {
    http: Arc<dyn HttpClientTrait>,
    endpoints: ApiEndpoints,
}

impl ConnectorFactory {
    pub fn new(http: Arc<dyn HttpClientTrait>) -> Self {
        Self {
            http,
            endpoints: ApiEndpoints::default(),
        }
    }

    /// Point the HTTP backends at other base URLs
    pub fn with_endpoints(mut self, endpoints: ApiEndpoints) -> Self {
        self.endpoints = endpoints;
        self
    }

    /// Create a connector from a backend configuration
    pub fn create(&self, backend: &BackendConfig) -> Result<Arc<dyn SourceConnector>, DomainError> {
        match backend {
            BackendConfig::S3 {
                remote_url,
                anonymous,
            } => Ok(Arc::new(ObjectStoreConnector::s3(remote_url, *anonymous)?)),

            BackendConfig::Azure {
                remote_url,
                account_name,
            } => Ok(Arc::new(ObjectStoreConnector::azure(remote_url, account_name)?)),

            BackendConfig::GitHub {
                url,
                branch,
                access_token,
            } => Ok(Arc::new(GitHubConnector::new(
                self.http.clone(),
                &self.endpoints.github,
                url,
                branch.clone(),
                access_token.clone(),
            )?)),

            BackendConfig::Slack {
                channels,
                token,
                start_date,
                end_date,
            } => Ok(Arc::new(SlackConnector::new(
                self.http.clone(),
                &self.endpoints.slack,
                channels.clone(),
                token,
                start_date.as_deref(),
                end_date.as_deref(),
            )?)),

            BackendConfig::Discord {
                channels,
                token,
                period_days,
            } => Ok(Arc::new(DiscordConnector::new(
                self.http.clone(),
                &self.endpoints.discord,
                channels.clone(),
                token,
                *period_days,
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::BackendKind;
    use crate::infrastructure::http_client::mock::MockHttpClient;

    fn factory() -> ConnectorFactory {
        ConnectorFactory::new(Arc::new(MockHttpClient::new()))
    }

    #[test]
    fn test_creates_each_backend() {
        let cases = vec![
            (
                BackendConfig::S3 {
                    remote_url: "s3://bucket/prefix".to_string(),
                    anonymous: true,
                },
                BackendKind::S3,
            ),
            (
                BackendConfig::Azure {
                    remote_url: "az://container".to_string(),
                    account_name: "acct".to_string(),
                },
                BackendKind::Azure,
            ),
            (
                BackendConfig::GitHub {
                    url: "acme/handbook".to_string(),
                    branch: None,
                    access_token: None,
                },
                BackendKind::GitHub,
            ),
            (
                BackendConfig::Slack {
                    channels: vec!["C1".to_string()],
                    token: "t".to_string(),
                    start_date: Some("2024-01-01".to_string()),
                    end_date: None,
                },
                BackendKind::Slack,
            ),
            (
                BackendConfig::Discord {
                    channels: vec!["1".to_string()],
                    token: "t".to_string(),
                    period_days: Some(3),
                },
                BackendKind::Discord,
            ),
        ];

        for (config, kind) in cases {
            let connector = factory().create(&config).unwrap();
            assert_eq!(connector.backend(), kind);
        }
    }

    #[test]
    fn test_invalid_backend_settings() {
        let slack = BackendConfig::Slack {
            channels: vec!["C1".to_string()],
            token: "t".to_string(),
            start_date: Some("yesterday".to_string()),
            end_date: None,
        };
        assert!(matches!(
            factory().create(&slack),
            Err(DomainError::Validation { .. })
        ));

        let github = BackendConfig::GitHub {
            url: "not-a-repo".to_string(),
            branch: None,
            access_token: None,
        };
        assert!(factory().create(&github).is_err());
    }
}
