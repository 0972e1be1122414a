//! Format-detecting partitioner

use async_trait::async_trait;
use encoding_rs::{Encoding, UTF_8, WINDOWS_1252};
use std::path::Path;
use tracing::debug;

use super::{ElementCollector, PartitionerFactory};
use crate::domain::{
    DomainError, ElementMetadata, ElementPartitioner, ElementSequence, FileType, PartitionInput,
    PartitionOptions,
};

const SNIFF_BYTES: usize = 1024;

/// Partitioner that detects the document format and delegates to the
/// matching format partitioner.
///
/// Detection order: the `content_type` option, the declared content type of
/// the input, the path or URL extension, then content sniffing.
#[derive(Debug, Clone, Default)]
pub struct AutoPartitioner;

impl AutoPartitioner {
    pub fn new() -> Self {
        Self
    }

    /// Determine the format of an input
    pub fn detect(
        input: &PartitionInput,
        options: &PartitionOptions,
    ) -> Result<FileType, DomainError> {
        if let Some(hint) = options.get_str("content_type") {
            return FileType::from_mime(hint).ok_or_else(|| {
                DomainError::validation(format!("Unsupported content type '{}'", hint))
            });
        }

        if let Some(file_type) = input.content_type.as_deref().and_then(FileType::from_mime) {
            return Ok(file_type);
        }

        let by_path = input
            .path
            .as_deref()
            .and_then(Self::detect_from_path)
            .or_else(|| {
                input
                    .url
                    .as_deref()
                    .and_then(|url| url::Url::parse(url).ok())
                    .and_then(|url| Self::detect_from_path(Path::new(url.path())))
            });

        if let Some(file_type) = by_path {
            return Ok(file_type);
        }

        Self::sniff(&input.content)
            .ok_or_else(|| DomainError::validation("Unsupported document format"))
    }

    fn detect_from_path(path: &Path) -> Option<FileType> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(FileType::from_extension)
            .or_else(|| {
                mime_guess::from_path(path)
                    .first()
                    .and_then(|mime| FileType::from_mime(mime.essence_str()))
            })
    }

    fn sniff(content: &[u8]) -> Option<FileType> {
        let head = &content[..content.len().min(SNIFF_BYTES)];

        if head.contains(&0) {
            return None;
        }

        let head = String::from_utf8_lossy(head).trim_start().to_lowercase();

        if head.starts_with("<!doctype html")
            || head.starts_with("<html")
            || head.contains("<body")
        {
            return Some(FileType::Html);
        }

        if (head.starts_with('{') || head.starts_with('['))
            && serde_json::from_slice::<serde_json::Value>(content).is_ok()
        {
            return Some(FileType::Json);
        }

        Some(FileType::PlainText)
    }

    /// Decode bytes using the `encoding` option, or UTF-8 (with BOM
    /// sniffing) falling back to Windows-1252
    fn decode(content: &[u8], options: &PartitionOptions) -> Result<String, DomainError> {
        if let Some(label) = options.get_str("encoding") {
            let encoding = Encoding::for_label(label.as_bytes())
                .ok_or_else(|| DomainError::validation(format!("Unknown encoding '{}'", label)))?;
            let (text, _, had_errors) = encoding.decode(content);

            if had_errors {
                return Err(DomainError::validation(format!(
                    "Content is not valid {}",
                    encoding.name()
                )));
            }

            return Ok(text.into_owned());
        }

        let (text, _, had_errors) = UTF_8.decode(content);
        if !had_errors {
            return Ok(text.into_owned());
        }

        let (text, _, _) = WINDOWS_1252.decode(content);
        Ok(text.into_owned())
    }

    fn languages(options: &PartitionOptions) -> Vec<String> {
        match options.get("languages") {
            Some(serde_json::Value::String(lang)) => vec![lang.clone()],
            Some(serde_json::Value::Array(langs)) => langs
                .iter()
                .filter_map(|lang| lang.as_str().map(str::to_string))
                .collect(),
            _ => Vec::new(),
        }
    }

    fn base_metadata(
        input: &PartitionInput,
        options: &PartitionOptions,
        file_type: FileType,
    ) -> ElementMetadata {
        let mut metadata = ElementMetadata::new().with_filetype(file_type.mime_type());

        if let Some(path) = &input.path {
            metadata = metadata.with_path(path);
        }

        if let Some(url) = &input.url {
            metadata = metadata.with_url(url.clone());
        }

        let languages = Self::languages(options);
        if !languages.is_empty() {
            metadata = metadata.with_languages(languages);
        }

        metadata
    }
}

#[async_trait]
impl ElementPartitioner for AutoPartitioner {
    fn name(&self) -> &str {
        "auto"
    }

    fn version(&self) -> &str {
        env!("CARGO_PKG_VERSION")
    }

    async fn partition(
        &self,
        input: PartitionInput,
        options: &PartitionOptions,
    ) -> Result<ElementSequence, DomainError> {
        let file_type = Self::detect(&input, options)?;
        let text = Self::decode(&input.content, options)?;

        debug!(
            file_type = ?file_type,
            bytes = input.content.len(),
            "Partitioning document"
        );

        let include_page_breaks = options.get_bool("include_page_breaks").unwrap_or(false);
        let mut collector = ElementCollector::new(
            Self::base_metadata(&input, options, file_type),
            include_page_breaks,
        );

        PartitionerFactory::create(file_type).partition_text(&text, &mut collector)?;

        Ok(collector.finish())
    }
}
