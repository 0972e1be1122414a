//! Label Box export

use serde_json::{json, Map, Value};
use std::path::Path;
use tracing::debug;

use super::check_len;
use crate::domain::transform::{LabelBoxAttachment, LabelBoxParams};
use crate::domain::{DomainError, Element};

const ATTACHMENT_TYPES: [&str; 5] = ["IMAGE", "VIDEO", "RAW_TEXT", "TEXT_URL", "HTML"];

fn validate_attachment(attachment: &LabelBoxAttachment) -> Result<(), DomainError> {
    if !ATTACHMENT_TYPES.contains(&attachment.kind.as_str()) {
        return Err(DomainError::validation(format!(
            "Attachment type '{}' is not supported, expected one of {}",
            attachment.kind,
            ATTACHMENT_TYPES.join(", ")
        )));
    }

    if attachment.value.is_empty() {
        return Err(DomainError::validation("Attachment value must not be empty"));
    }

    Ok(())
}

fn validate_external_id(id: &str) -> Result<(), DomainError> {
    if id.is_empty() || id.contains(['/', '\\']) || id == "." || id == ".." {
        return Err(DomainError::validation(format!(
            "External id '{}' cannot be used as a file name",
            id
        )));
    }
    Ok(())
}

async fn ensure_directory(dir: &Path, create: bool) -> Result<(), DomainError> {
    if tokio::fs::metadata(dir).await.map(|m| m.is_dir()).unwrap_or(false) {
        return Ok(());
    }

    if !create {
        return Err(DomainError::validation(format!(
            "Output directory {} does not exist",
            dir.display()
        )));
    }

    tokio::fs::create_dir_all(dir).await?;
    Ok(())
}

/// Write each element's text to `<output_directory>/<id>.txt` and return
/// one import row per element pointing at `<url_prefix>/<id>.txt`
pub async fn stage_for_label_box(
    elements: &[Element],
    params: &LabelBoxParams,
) -> Result<Vec<Map<String, Value>>, DomainError> {
    let ids: Vec<String> = match &params.external_ids {
        Some(ids) => {
            check_len("external_ids", elements.len(), ids.len())?;
            ids.clone()
        }
        None => elements.iter().map(|e| e.element_id.clone()).collect(),
    };

    if let Some(attachments) = &params.attachments {
        check_len("attachments", elements.len(), attachments.len())?;
        attachments.iter().flatten().try_for_each(validate_attachment)?;
    }

    ids.iter().try_for_each(|id| validate_external_id(id))?;

    ensure_directory(&params.output_directory, params.create_directory).await?;

    let prefix = params.url_prefix.trim_end_matches('/');
    let mut rows = Vec::with_capacity(elements.len());

    for (idx, (element, id)) in elements.iter().zip(&ids).enumerate() {
        let file_name = format!("{}.txt", id);
        tokio::fs::write(params.output_directory.join(&file_name), element.text.as_bytes()).await?;

        let attachments = params
            .attachments
            .as_ref()
            .and_then(|all| all.get(idx))
            .map(|a| json!(a))
            .unwrap_or_else(|| json!([]));

        let mut row = Map::new();
        row.insert("data".to_string(), Value::String(format!("{}/{}", prefix, file_name)));
        row.insert("attachments".to_string(), attachments);
        row.insert("externalId".to_string(), Value::String(id.clone()));
        rows.push(row);
    }

    debug!(
        count = rows.len(),
        directory = %params.output_directory.display(),
        "Staged elements for Label Box"
    );

    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ElementCategory, ElementMetadata};

    fn elements() -> Vec<Element> {
        vec![
            Element::new(ElementCategory::Title, "Title text", ElementMetadata::new()).with_id("a"),
            Element::new(ElementCategory::NarrativeText, "Body text", ElementMetadata::new())
                .with_id("b"),
        ]
    }

    fn params(dir: &Path) -> LabelBoxParams {
        LabelBoxParams {
            output_directory: dir.to_path_buf(),
            url_prefix: "https://storage.example.com/docs/".to_string(),
            external_ids: None,
            attachments: None,
            create_directory: false,
        }
    }

    #[tokio::test]
    async fn test_writes_files_and_rows() {
        let dir = tempfile::tempdir().unwrap();

        let rows = stage_for_label_box(&elements(), &params(dir.path())).await.unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0]["data"], "https://storage.example.com/docs/a.txt");
        assert_eq!(rows[0]["externalId"], "a");
        assert_eq!(rows[0]["attachments"], json!([]));

        let written = std::fs::read_to_string(dir.path().join("b.txt")).unwrap();
        assert_eq!(written, "Body text");
    }

    #[tokio::test]
    async fn test_external_ids_and_attachments() {
        let dir = tempfile::tempdir().unwrap();
        let mut params = params(dir.path());
        params.external_ids = Some(vec!["x1".to_string(), "x2".to_string()]);
        params.attachments = Some(vec![
            vec![LabelBoxAttachment {
                kind: "RAW_TEXT".to_string(),
                value: "note".to_string(),
            }],
            vec![],
        ]);

        let rows = stage_for_label_box(&elements(), &params).await.unwrap();

        assert_eq!(rows[1]["externalId"], "x2");
        assert_eq!(rows[0]["attachments"], json!([{"type": "RAW_TEXT", "value": "note"}]));
        assert!(dir.path().join("x1.txt").exists());
    }

    #[tokio::test]
    async fn test_rejects_invalid_input() {
        let dir = tempfile::tempdir().unwrap();

        let mut bad_type = params(dir.path());
        bad_type.attachments = Some(vec![
            vec![LabelBoxAttachment {
                kind: "AUDIO".to_string(),
                value: "x".to_string(),
            }],
            vec![],
        ]);
        assert!(stage_for_label_box(&elements(), &bad_type).await.is_err());

        let mut bad_len = params(dir.path());
        bad_len.external_ids = Some(vec!["only-one".to_string()]);
        assert!(stage_for_label_box(&elements(), &bad_len).await.is_err());
    }

    #[tokio::test]
    async fn test_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("nested");

        let err = stage_for_label_box(&elements(), &params(&target)).await.unwrap_err();
        assert!(matches!(err, DomainError::Validation { .. }));

        let mut create = params(&target);
        create.create_directory = true;
        stage_for_label_box(&elements(), &create).await.unwrap();
        assert!(target.join("a.txt").exists());
    }
}
