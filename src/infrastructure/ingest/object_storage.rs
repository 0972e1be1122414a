//! S3 and Azure blob connectors over `object_store`

use async_trait::async_trait;
use futures::TryStreamExt;
use object_store::path::Path as ObjPath;
use object_store::{ObjectMeta, ObjectStore};
use std::sync::Arc;
use tracing::debug;
use url::Url;

use crate::domain::{BackendKind, DomainError, RemoteItem, SourceConnector};

/// Connector listing every object below a bucket or container prefix
#[derive(Debug, Clone)]
pub struct ObjectStoreConnector {
    backend: BackendKind,
    store: Arc<dyn ObjectStore>,
    prefix: ObjPath,
    base_url: String,
}

fn parse_remote_url(remote_url: &str) -> Result<Url, DomainError> {
    Url::parse(remote_url)
        .map_err(|e| DomainError::validation(format!("Invalid remote URL '{}': {}", remote_url, e)))
}

impl ObjectStoreConnector {
    /// Wrap an existing store; `base_url` prefixes the recorded source URLs
    pub fn from_store(
        backend: BackendKind,
        store: Arc<dyn ObjectStore>,
        prefix: impl Into<ObjPath>,
        base_url: impl Into<String>,
    ) -> Self {
        Self {
            backend,
            store,
            prefix: prefix.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn from_url<I, K, V>(
        backend: BackendKind,
        remote_url: &str,
        options: I,
    ) -> Result<Self, DomainError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let url = parse_remote_url(remote_url)?;
        let (store, prefix) = object_store::parse_url_opts(&url, options).map_err(|e| {
            DomainError::configuration(format!(
                "Cannot open {} store '{}': {}",
                backend, remote_url, e
            ))
        })?;

        let base_url = format!("{}://{}", url.scheme(), url.host_str().unwrap_or_default());

        Ok(Self::from_store(backend, Arc::from(store), prefix, base_url))
    }

    /// `s3://bucket/prefix`; anonymous access skips request signing
    pub fn s3(remote_url: &str, anonymous: bool) -> Result<Self, DomainError> {
        let mut options = Vec::new();
        if anonymous {
            options.push(("aws_skip_signature", "true".to_string()));
        }

        Self::from_url(BackendKind::S3, remote_url, options)
    }

    /// `az://container/prefix` in the given storage account
    pub fn azure(remote_url: &str, account_name: &str) -> Result<Self, DomainError> {
        Self::from_url(
            BackendKind::Azure,
            remote_url,
            [("azure_storage_account_name", account_name.to_string())],
        )
    }

    fn provider_error(&self, error: object_store::Error) -> DomainError {
        DomainError::provider(self.backend.as_str(), error.to_string())
    }

    fn to_item(&self, meta: ObjectMeta) -> RemoteItem {
        let location = meta.location.as_ref();
        let relative = location
            .strip_prefix(self.prefix.as_ref())
            .unwrap_or(location)
            .trim_start_matches('/');

        RemoteItem::new(relative, location)
            .with_source_url(format!("{}/{}", self.base_url, location))
            .with_size(meta.size as u64)
            .with_last_modified(meta.last_modified)
    }
}

#[async_trait]
impl SourceConnector for ObjectStoreConnector {
    fn backend(&self) -> BackendKind {
        self.backend
    }

    async fn list(&self) -> Result<Vec<RemoteItem>, DomainError> {
        let prefix = Some(&self.prefix).filter(|p| !p.as_ref().is_empty());

        let objects: Vec<ObjectMeta> = self
            .store
            .list(prefix)
            .try_collect()
            .await
            .map_err(|e| self.provider_error(e))?;

        debug!(
            backend = %self.backend,
            prefix = %self.prefix,
            count = objects.len(),
            "Listed objects"
        );

        Ok(objects.into_iter().map(|meta| self.to_item(meta)).collect())
    }

    async fn fetch(&self, item: &RemoteItem) -> Result<Vec<u8>, DomainError> {
        let location = ObjPath::from(item.locator.as_str());
        let result = self
            .store
            .get(&location)
            .await
            .map_err(|e| self.provider_error(e))?;
        let bytes = result.bytes().await.map_err(|e| self.provider_error(e))?;

        Ok(bytes.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use object_store::memory::InMemory;
    use object_store::PutPayload;

    async fn store_with(files: &[(&str, &str)]) -> Arc<dyn ObjectStore> {
        let store = InMemory::new();
        for (path, body) in files {
            store
                .put(&ObjPath::from(*path), PutPayload::from(body.to_string()))
                .await
                .unwrap();
        }
        Arc::new(store)
    }

    #[tokio::test]
    async fn test_list_below_prefix() {
        let store = store_with(&[
            ("docs/a.txt", "alpha"),
            ("docs/nested/b.md", "# beta"),
            ("other/c.txt", "gamma"),
        ])
        .await;
        let connector =
            ObjectStoreConnector::from_store(BackendKind::S3, store, "docs", "s3://bucket");

        let mut items = connector.list().await.unwrap();
        items.sort_by(|a, b| a.path.cmp(&b.path));

        assert_eq!(items.len(), 2);
        assert_eq!(items[0].path, "a.txt");
        assert_eq!(items[0].locator, "docs/a.txt");
        assert_eq!(items[0].source_url.as_deref(), Some("s3://bucket/docs/a.txt"));
        assert_eq!(items[0].size, Some(5));
        assert_eq!(items[1].path, "nested/b.md");
    }

    #[tokio::test]
    async fn test_fetch() {
        let store = store_with(&[("a.txt", "alpha")]).await;
        let connector = ObjectStoreConnector::from_store(BackendKind::Azure, store, "", "az://box");

        let items = connector.list().await.unwrap();
        let bytes = connector.fetch(&items[0]).await.unwrap();

        assert_eq!(bytes, b"alpha");
        assert_eq!(connector.backend(), BackendKind::Azure);
    }

    #[tokio::test]
    async fn test_fetch_missing_object() {
        let store = store_with(&[]).await;
        let connector = ObjectStoreConnector::from_store(BackendKind::S3, store, "", "s3://bucket");

        let err = connector
            .fetch(&RemoteItem::new("gone.txt", "gone.txt"))
            .await
            .unwrap_err();

        assert!(matches!(err, DomainError::Provider { .. }));
    }

    #[test]
    fn test_s3_from_url() {
        let connector = ObjectStoreConnector::s3("s3://public-bucket/reports", true).unwrap();

        assert_eq!(connector.prefix.as_ref(), "reports");
        assert_eq!(connector.base_url, "s3://public-bucket");
    }

    #[test]
    fn test_azure_from_url() {
        let connector = ObjectStoreConnector::azure("az://container/docs", "myaccount").unwrap();

        assert_eq!(connector.backend(), BackendKind::Azure);
        assert_eq!(connector.prefix.as_ref(), "docs");
    }
}
