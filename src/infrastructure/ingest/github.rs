//! Source-control repository connector (GitHub REST API)

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::Deserialize;
use std::sync::Arc;
use tracing::{debug, warn};
use url::Url;

use crate::domain::{BackendKind, DomainError, RemoteItem, SourceConnector};
use crate::infrastructure::http_client::HttpClientTrait;

pub const DEFAULT_GITHUB_API: &str = "https://api.github.com";

#[derive(Debug, Deserialize)]
struct RepositoryResponse {
    default_branch: String,
}

#[derive(Debug, Deserialize)]
struct TreeResponse {
    tree: Vec<TreeEntry>,
    #[serde(default)]
    truncated: bool,
}

#[derive(Debug, Deserialize)]
struct TreeEntry {
    path: String,
    #[serde(rename = "type")]
    kind: String,
    sha: String,
    #[serde(default)]
    size: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct BlobResponse {
    content: String,
    encoding: String,
}

/// Split `https://github.com/owner/repo(.git)` or `owner/repo` into its parts
pub fn parse_repository(url: &str) -> Result<(String, String), DomainError> {
    let trimmed = url.trim().trim_end_matches('/').trim_end_matches(".git");

    let path = match Url::parse(trimmed) {
        Ok(parsed) if parsed.has_host() => parsed.path().to_string(),
        _ => trimmed.trim_start_matches("github.com/").to_string(),
    };

    let parts: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
    match parts.as_slice() {
        [owner, repo] => Ok((owner.to_string(), repo.to_string())),
        _ => Err(DomainError::validation(format!(
            "'{}' is not a repository URL of the form owner/repo",
            url
        ))),
    }
}

/// Lists every file of a repository branch and downloads blobs by sha
#[derive(Debug, Clone)]
pub struct GitHubConnector {
    http: Arc<dyn HttpClientTrait>,
    api_base: String,
    owner: String,
    repo: String,
    branch: Option<String>,
    access_token: Option<String>,
}

impl GitHubConnector {
    pub fn new(
        http: Arc<dyn HttpClientTrait>,
        api_base: impl Into<String>,
        url: &str,
        branch: Option<String>,
        access_token: Option<String>,
    ) -> Result<Self, DomainError> {
        let (owner, repo) = parse_repository(url)?;

        Ok(Self {
            http,
            api_base: api_base.into().trim_end_matches('/').to_string(),
            owner,
            repo,
            branch: branch.filter(|b| !b.trim().is_empty()),
            access_token,
        })
    }

    fn repo_url(&self, suffix: &str) -> String {
        format!("{}/repos/{}/{}{}", self.api_base, self.owner, self.repo, suffix)
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, url: &str) -> Result<T, DomainError> {
        let authorization = self.access_token.as_ref().map(|t| format!("Bearer {}", t));

        let mut headers = vec![
            ("accept", "application/vnd.github+json"),
            ("user-agent", "docflow"),
        ];
        if let Some(authorization) = &authorization {
            headers.push(("authorization", authorization.as_str()));
        }

        let value = self.http.get_json(url, headers).await?;
        serde_json::from_value(value).map_err(|e| {
            DomainError::provider(
                BackendKind::GitHub.as_str(),
                format!("Unexpected response: {}", e),
            )
        })
    }

    async fn resolve_branch(&self) -> Result<String, DomainError> {
        if let Some(branch) = &self.branch {
            return Ok(branch.clone());
        }

        let repository: RepositoryResponse = self.get_json(&self.repo_url("")).await?;
        Ok(repository.default_branch)
    }
}

#[async_trait]
impl SourceConnector for GitHubConnector {
    fn backend(&self) -> BackendKind {
        BackendKind::GitHub
    }

    async fn list(&self) -> Result<Vec<RemoteItem>, DomainError> {
        let branch = self.resolve_branch().await?;
        let tree: TreeResponse = self
            .get_json(&self.repo_url(&format!("/git/trees/{}?recursive=1", branch)))
            .await?;

        if tree.truncated {
            warn!(
                repository = %format!("{}/{}", self.owner, self.repo),
                "Repository tree listing was truncated"
            );
        }

        let items: Vec<RemoteItem> = tree
            .tree
            .into_iter()
            .filter(|entry| entry.kind == "blob")
            .map(|entry| {
                let source_url = format!(
                    "https://github.com/{}/{}/blob/{}/{}",
                    self.owner, self.repo, branch, entry.path
                );
                let item = RemoteItem::new(entry.path, entry.sha).with_source_url(source_url);
                match entry.size {
                    Some(size) => item.with_size(size),
                    None => item,
                }
            })
            .collect();

        debug!(
            owner = %self.owner,
            repo = %self.repo,
            branch = %branch,
            count = items.len(),
            "Listed repository files"
        );

        Ok(items)
    }

    async fn fetch(&self, item: &RemoteItem) -> Result<Vec<u8>, DomainError> {
        let blob: BlobResponse = self
            .get_json(&self.repo_url(&format!("/git/blobs/{}", item.locator)))
            .await?;

        if blob.encoding != "base64" {
            return Ok(blob.content.into_bytes());
        }

        let encoded: String = blob.content.chars().filter(|c| !c.is_whitespace()).collect();
        STANDARD.decode(encoded).map_err(|e| {
            DomainError::provider(
                BackendKind::GitHub.as_str(),
                format!("Invalid blob content for '{}': {}", item.path, e),
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::http_client::mock::MockHttpClient;
    use serde_json::json;

    const API: &str = "http://api.test";

    fn connector(http: MockHttpClient, branch: Option<&str>) -> GitHubConnector {
        GitHubConnector::new(
            Arc::new(http),
            API,
            "https://github.com/acme/handbook.git",
            branch.map(str::to_string),
            None,
        )
        .unwrap()
    }

    #[test]
    fn test_parse_repository() {
        assert_eq!(
            parse_repository("https://github.com/acme/handbook").unwrap(),
            ("acme".to_string(), "handbook".to_string())
        );
        assert_eq!(
            parse_repository("acme/handbook.git").unwrap(),
            ("acme".to_string(), "handbook".to_string())
        );
        assert_eq!(
            parse_repository("github.com/acme/handbook/").unwrap(),
            ("acme".to_string(), "handbook".to_string())
        );
        assert!(parse_repository("https://github.com/acme").is_err());
    }

    #[tokio::test]
    async fn test_list_uses_default_branch() {
        let http = MockHttpClient::new()
            .with_json_response(
                format!("{}/repos/acme/handbook", API),
                json!({"default_branch": "main"}),
            )
            .with_json_response(
                format!("{}/repos/acme/handbook/git/trees/main?recursive=1", API),
                json!({
                    "tree": [
                        {"path": "docs", "type": "tree", "sha": "t1"},
                        {"path": "docs/intro.md", "type": "blob", "sha": "b1", "size": 12},
                        {"path": "README.md", "type": "blob", "sha": "b2", "size": 5}
                    ],
                    "truncated": false
                }),
            );

        let items = connector(http, None).list().await.unwrap();

        assert_eq!(items.len(), 2);
        assert_eq!(items[0].path, "docs/intro.md");
        assert_eq!(items[0].locator, "b1");
        assert_eq!(items[0].size, Some(12));
        assert_eq!(
            items[0].source_url.as_deref(),
            Some("https://github.com/acme/handbook/blob/main/docs/intro.md")
        );
    }

    #[tokio::test]
    async fn test_list_with_explicit_branch() {
        let http = MockHttpClient::new().with_json_response(
            format!("{}/repos/acme/handbook/git/trees/v2?recursive=1", API),
            json!({"tree": []}),
        );
        let connector = connector(http, Some("v2"));

        assert!(connector.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_fetch_decodes_base64() {
        let http = MockHttpClient::new().with_json_response(
            format!("{}/repos/acme/handbook/git/blobs/b2", API),
            json!({"content": "SGVs\nbG8=\n", "encoding": "base64"}),
        );

        let bytes = connector(http, Some("main"))
            .fetch(&RemoteItem::new("README.md", "b2"))
            .await
            .unwrap();

        assert_eq!(bytes, b"Hello");
    }

    #[tokio::test]
    async fn test_list_propagates_errors() {
        let http = MockHttpClient::new()
            .with_error(format!("{}/repos/acme/handbook", API), "HTTP 404 Not Found");

        let err = connector(http, None).list().await.unwrap_err();
        assert!(matches!(err, DomainError::Provider { .. }));
    }
}
