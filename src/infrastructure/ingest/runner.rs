//! Shared download-and-partition loop for every backend

use futures::stream::{self, StreamExt};
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, warn};

use crate::domain::{
    DomainError, Element, ElementPartitioner, IngestJobConfig, PartitionConfig, PartitionInput,
    RemoteItem, SourceConnector,
};

/// What happened to one listed item
#[derive(Debug, Clone, PartialEq)]
pub enum ItemOutcome {
    /// Elements written to the given file
    Processed { output: PathBuf, downloaded: bool },
    /// Raw file downloaded, partitioning disabled
    Downloaded,
    /// Output already present
    Skipped,
}

/// Counters accumulated over one run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunStats {
    pub listed: usize,
    pub downloaded: usize,
    pub processed: usize,
    pub skipped: usize,
    pub failed: usize,
    pub outputs: Vec<PathBuf>,
}

impl RunStats {
    fn record(&mut self, outcome: ItemOutcome) {
        match outcome {
            ItemOutcome::Processed { output, downloaded } => {
                if downloaded {
                    self.downloaded += 1;
                }
                self.processed += 1;
                self.outputs.push(output);
            }
            ItemOutcome::Downloaded => self.downloaded += 1,
            ItemOutcome::Skipped => self.skipped += 1,
        }
    }
}

/// Serialize elements the way ingest outputs store them
pub fn elements_to_output(elements: &[Element], partition: &PartitionConfig) -> Value {
    let records: Vec<Value> = elements
        .iter()
        .map(|element| {
            let metadata = if partition.flatten_metadata {
                let mut flat = element.metadata.to_flat_map();
                flat.retain(|key, _| {
                    !partition.metadata_exclude.iter().any(|excluded| {
                        key == excluded || key.starts_with(&format!("{}.", excluded))
                    })
                });
                flat
            } else {
                element.metadata.without_keys(&partition.metadata_exclude)
            };

            let mut record = Map::new();
            record.insert("type".to_string(), Value::String(element.category.as_str().to_string()));
            record.insert("element_id".to_string(), Value::String(element.element_id.clone()));
            record.insert("text".to_string(), Value::String(element.text.clone()));
            record.insert("metadata".to_string(), Value::Object(metadata));
            Value::Object(record)
        })
        .collect();

    Value::Array(records)
}

async fn write_file(path: &Path, contents: &[u8]) -> Result<(), DomainError> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(path, contents).await?;
    Ok(())
}

/// Downloads listed items and partitions them into element files
#[derive(Debug, Clone)]
pub struct IngestRunner {
    partitioner: Arc<dyn ElementPartitioner>,
}

impl IngestRunner {
    pub fn new(partitioner: Arc<dyn ElementPartitioner>) -> Self {
        Self { partitioner }
    }

    /// List, download and partition every item of the connector.
    ///
    /// At most `num_processes` items are in flight at once. Item failures
    /// are counted unless `raise_on_error` is set; listing failures always
    /// propagate.
    pub async fn run(
        &self,
        config: &IngestJobConfig,
        connector: Arc<dyn SourceConnector>,
    ) -> Result<RunStats, DomainError> {
        let mut items = connector.list().await?;
        if let Some(max_docs) = config.read.max_docs {
            items.truncate(max_docs);
        }

        let mut stats = RunStats {
            listed: items.len(),
            ..RunStats::default()
        };

        let download_dir = config.download_dir();
        let mut results = stream::iter(items)
            .map(|item| {
                let connector = connector.clone();
                let download_dir = download_dir.clone();
                async move {
                    let result = self
                        .process_item(config, connector.as_ref(), &download_dir, &item)
                        .await;
                    (item, result)
                }
            })
            .buffer_unordered(config.processor.num_processes.max(1));

        while let Some((item, result)) = results.next().await {
            match result {
                Ok(outcome) => stats.record(outcome),
                Err(e) if config.processor.raise_on_error => return Err(e),
                Err(e) => {
                    warn!(path = %item.path, error = %e, "Failed to ingest item");
                    stats.failed += 1;
                }
            }
        }

        Ok(stats)
    }

    async fn process_item(
        &self,
        config: &IngestJobConfig,
        connector: &dyn SourceConnector,
        download_dir: &Path,
        item: &RemoteItem,
    ) -> Result<ItemOutcome, DomainError> {
        let relative = item.relative_path();
        if relative.is_empty() {
            return Err(DomainError::validation(format!(
                "Item '{}' has no usable file name",
                item.path
            )));
        }

        let output = config.processor.output_dir.join(format!("{}.json", relative));
        if !config.read.download_only && !config.processor.reprocess && output.exists() {
            debug!(path = %relative, "Output exists, skipping");
            return Ok(ItemOutcome::Skipped);
        }

        let download = download_dir.join(&relative);
        let (content, downloaded) = if download.exists() && !config.read.re_download {
            (tokio::fs::read(&download).await?, false)
        } else {
            let content = connector.fetch(item).await?;
            write_file(&download, &content).await?;
            (content, true)
        };

        if config.read.download_only {
            return Ok(if downloaded {
                ItemOutcome::Downloaded
            } else {
                ItemOutcome::Skipped
            });
        }

        let mut input = PartitionInput::from_bytes(content).with_path(&relative);
        if let Some(url) = &item.source_url {
            input = input.with_url(url.clone());
        }

        let mut elements = self
            .partitioner
            .partition(input, &config.partition.options)
            .await?;

        if let Some(last_modified) = item.last_modified {
            for element in &mut elements {
                element.metadata.last_modified.get_or_insert(last_modified);
            }
        }

        let document = elements_to_output(&elements, &config.partition);
        let body = serde_json::to_vec_pretty(&document)
            .map_err(|e| DomainError::internal(format!("Failed to serialize elements: {}", e)))?;
        write_file(&output, &body).await?;

        if !config.read.preserve_downloads {
            tokio::fs::remove_file(&download).await?;
        }

        debug!(path = %relative, elements = elements.len(), "Item ingested");

        Ok(ItemOutcome::Processed { output, downloaded })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{
        BackendKind, ElementCategory, ElementMetadata, MockSourceConnector, ReadConfig,
    };
    use crate::domain::partition::mock::MockPartitioner;
    use crate::infrastructure::partitioners::AutoPartitioner;
    use tempfile::TempDir;

    fn config(dir: &TempDir) -> IngestJobConfig {
        IngestJobConfig::s3("s3://bucket/docs", dir.path().join("out"), 2, true).with_read(
            ReadConfig::new().with_download_dir(dir.path().join("downloads")),
        )
    }

    fn connector(files: Vec<(&'static str, &'static str)>) -> MockSourceConnector {
        let mut connector = MockSourceConnector::new();
        let items: Vec<RemoteItem> = files
            .iter()
            .map(|(path, _)| {
                RemoteItem::new(*path, *path).with_source_url(format!("s3://bucket/{}", path))
            })
            .collect();

        connector.expect_backend().return_const(BackendKind::S3);
        connector.expect_list().returning(move || Ok(items.clone()));
        connector.expect_fetch().returning(move |item| {
            files
                .iter()
                .find(|(path, _)| *path == item.path)
                .map(|(_, body)| body.as_bytes().to_vec())
                .ok_or_else(|| DomainError::provider("s3", "missing"))
        });
        connector
    }

    fn runner() -> IngestRunner {
        IngestRunner::new(Arc::new(AutoPartitioner::new()))
    }

    #[tokio::test]
    async fn test_run_writes_element_files() {
        let dir = TempDir::new().unwrap();
        let config = config(&dir);
        let connector = connector(vec![
            ("a.txt", "Quarterly Report\n\nRevenue grew by ten percent this quarter."),
            ("nested/b.md", "# Heading\n\nSome markdown body text here."),
        ]);

        let stats = runner().run(&config, Arc::new(connector)).await.unwrap();

        assert_eq!(stats.listed, 2);
        assert_eq!(stats.processed, 2);
        assert_eq!(stats.downloaded, 2);
        assert_eq!(stats.failed, 0);

        let output = dir.path().join("out/nested/b.md.json");
        let written: Value = serde_json::from_slice(&std::fs::read(&output).unwrap()).unwrap();
        assert_eq!(written[0]["type"], "Title");
        assert_eq!(written[0]["metadata"]["url"], "s3://bucket/nested/b.md");

        assert!(!dir.path().join("downloads/a.txt").exists());
    }

    #[tokio::test]
    async fn test_skips_existing_outputs() {
        let dir = TempDir::new().unwrap();
        let config = config(&dir);
        std::fs::create_dir_all(dir.path().join("out")).unwrap();
        std::fs::write(dir.path().join("out/a.txt.json"), "[]").unwrap();

        let stats = runner()
            .run(&config, Arc::new(connector(vec![("a.txt", "Hello there")])))
            .await
            .unwrap();

        assert_eq!(stats.skipped, 1);
        assert_eq!(stats.processed, 0);

        let config = config.with_processor(
            crate::domain::ProcessorConfig::new(dir.path().join("out")).with_reprocess(true),
        );
        let stats = runner()
            .run(&config, Arc::new(connector(vec![("a.txt", "Hello there")])))
            .await
            .unwrap();
        assert_eq!(stats.processed, 1);
    }

    #[tokio::test]
    async fn test_download_only_and_preserve() {
        let dir = TempDir::new().unwrap();
        let config = config(&dir).with_read(
            ReadConfig::new()
                .with_download_dir(dir.path().join("downloads"))
                .with_download_only(true),
        );

        let stats = runner()
            .run(&config, Arc::new(connector(vec![("a.txt", "Hello there")])))
            .await
            .unwrap();

        assert_eq!(stats.downloaded, 1);
        assert_eq!(stats.processed, 0);
        assert!(dir.path().join("downloads/a.txt").exists());
        assert!(!dir.path().join("out/a.txt.json").exists());
    }

    #[tokio::test]
    async fn test_max_docs() {
        let dir = TempDir::new().unwrap();
        let config = config(&dir).with_read(
            ReadConfig::new()
                .with_download_dir(dir.path().join("downloads"))
                .with_max_docs(1),
        );

        let stats = runner()
            .run(
                &config,
                Arc::new(connector(vec![("a.txt", "One"), ("b.txt", "Two")])),
            )
            .await
            .unwrap();

        assert_eq!(stats.listed, 1);
        assert_eq!(stats.processed, 1);
    }

    #[tokio::test]
    async fn test_item_failures_are_counted() {
        let dir = TempDir::new().unwrap();
        let config = config(&dir);
        let mut connector = MockSourceConnector::new();
        connector
            .expect_list()
            .returning(|| Ok(vec![RemoteItem::new("a.txt", "a"), RemoteItem::new("b.txt", "b")]));
        connector.expect_fetch().returning(|item| {
            if item.locator == "a" {
                Ok(b"Fine text".to_vec())
            } else {
                Err(DomainError::provider("s3", "access denied"))
            }
        });

        let stats = runner().run(&config, Arc::new(connector)).await.unwrap();

        assert_eq!(stats.processed, 1);
        assert_eq!(stats.failed, 1);
    }

    #[tokio::test]
    async fn test_raise_on_error() {
        let dir = TempDir::new().unwrap();
        let config = config(&dir).with_processor(
            crate::domain::ProcessorConfig::new(dir.path().join("out")).with_raise_on_error(true),
        );
        let mut connector = MockSourceConnector::new();
        connector
            .expect_list()
            .returning(|| Ok(vec![RemoteItem::new("a.txt", "a")]));
        connector
            .expect_fetch()
            .returning(|_| Err(DomainError::provider("s3", "access denied")));

        let err = runner().run(&config, Arc::new(connector)).await.unwrap_err();
        assert!(matches!(err, DomainError::Provider { .. }));
    }

    #[tokio::test]
    async fn test_listing_failure_propagates() {
        let dir = TempDir::new().unwrap();
        let mut connector = MockSourceConnector::new();
        connector
            .expect_list()
            .returning(|| Err(DomainError::provider("s3", "no such bucket")));

        assert!(runner().run(&config(&dir), Arc::new(connector)).await.is_err());
    }

    #[tokio::test]
    async fn test_partitioner_receives_item_path() {
        let dir = TempDir::new().unwrap();
        let partitioner = Arc::new(MockPartitioner::new().with_result(vec![Element::new(
            ElementCategory::Text,
            "x",
            ElementMetadata::new(),
        )]));

        let stats = IngestRunner::new(partitioner.clone())
            .run(&config(&dir), Arc::new(connector(vec![("dir/c.html", "<p>x</p>")])))
            .await
            .unwrap();

        assert_eq!(stats.processed, 1);
        let calls = partitioner.calls();
        assert_eq!(calls[0].path.as_deref(), Some(Path::new("dir/c.html")));
        assert_eq!(calls[0].url.as_deref(), Some("s3://bucket/dir/c.html"));
    }

    #[test]
    fn test_elements_to_output_filters_metadata() {
        let elements = vec![Element::new(
            ElementCategory::Title,
            "T",
            ElementMetadata::new()
                .with_filename("a.txt")
                .with_page_number(1)
                .with_extra("source", serde_json::json!({"bucket": "b"})),
        )];

        let partition = PartitionConfig::new().with_metadata_exclude(vec!["filename".to_string()]);
        let output = elements_to_output(&elements, &partition);
        assert!(output[0]["metadata"].get("filename").is_none());
        assert_eq!(output[0]["metadata"]["source"]["bucket"], "b");

        let partition = PartitionConfig {
            flatten_metadata: true,
            metadata_exclude: vec!["page_number".to_string()],
            ..PartitionConfig::default()
        };
        let output = elements_to_output(&elements, &partition);
        assert_eq!(output[0]["metadata"]["source.bucket"], "b");
        assert!(output[0]["metadata"].get("page_number").is_none());
    }
}
