//! Dispatch of transformation operations to their implementations

use std::sync::Arc;

use tracing::debug;

use super::{chunking, cleaners, extractors, staging};
use crate::domain::{
    ChunkingOp, CleaningOp, CleaningPipeline, DomainError, Element, ElementSequence,
    ExtractedValue, ExtractionOp, StagedOutput, StagingOp, TransformationSpec, Translator,
};

/// Applies cleaning, extraction, staging and chunking operations.
///
/// Only `translate_text` needs an external service; every other
/// operation is local and synchronous in nature.
#[derive(Debug, Clone, Default)]
pub struct TransformationRegistry {
    translator: Option<Arc<dyn Translator>>,
}

impl TransformationRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry able to run `translate_text`
    pub fn with_translator(translator: Arc<dyn Translator>) -> Self {
        Self {
            translator: Some(translator),
        }
    }

    pub fn has_translator(&self) -> bool {
        self.translator.is_some()
    }

    fn translator(&self) -> Result<&Arc<dyn Translator>, DomainError> {
        self.translator.as_ref().ok_or_else(|| {
            DomainError::configuration("translate_text requires a configured translation service")
        })
    }

    /// Apply one cleaning operation
    pub async fn clean(&self, text: &str, op: &CleaningOp) -> Result<String, DomainError> {
        let cleaned = match op {
            CleaningOp::CleanExtraWhitespace => cleaners::clean_extra_whitespace(text),
            CleaningOp::CleanBullets => cleaners::clean_bullets(text),
            CleaningOp::CleanOrderedBullets => cleaners::clean_ordered_bullets(text),
            CleaningOp::CleanPostfix(params) => cleaners::clean_postfix(text, params)?,
            CleaningOp::CleanPrefix(params) => cleaners::clean_prefix(text, params)?,
            CleaningOp::CleanDashes => cleaners::clean_dashes(text),
            CleaningOp::CleanTrailingPunctuation => cleaners::clean_trailing_punctuation(text),
            CleaningOp::CleanNonAsciiChars => cleaners::clean_non_ascii_chars(text),
            CleaningOp::GroupBrokenParagraphs => cleaners::group_broken_paragraphs(text),
            CleaningOp::RemovePunctuation => cleaners::remove_punctuation(text),
            CleaningOp::ReplaceUnicodeQuotes => cleaners::replace_unicode_quotes(text),
            CleaningOp::BytesStringToString { encoding } => {
                cleaners::bytes_string_to_string(text, encoding)?
            }
            CleaningOp::TranslateText {
                source_lang,
                target_lang,
            } => {
                let translator = self.translator()?;

                if text.trim().is_empty() || source_lang.as_deref() == Some(target_lang.as_str()) {
                    text.to_string()
                } else {
                    translator
                        .translate(text, source_lang.clone(), target_lang)
                        .await?
                }
            }
        };

        Ok(cleaned)
    }

    /// Apply a named cleaning step
    pub async fn apply_cleaning(
        &self,
        text: &str,
        spec: &TransformationSpec,
    ) -> Result<String, DomainError> {
        let op = CleaningOp::from_spec(spec)?;
        self.clean(text, &op).await
    }

    /// Apply every step of a pipeline in order.
    ///
    /// A missing translator is reported before any step runs.
    pub async fn clean_pipeline(
        &self,
        text: &str,
        pipeline: &CleaningPipeline,
    ) -> Result<String, DomainError> {
        if pipeline.steps().iter().any(CleaningOp::requires_translator) {
            self.translator()?;
        }

        let mut current = text.to_string();
        for op in pipeline.steps() {
            current = self.clean(&current, op).await?;
        }

        debug!(steps = pipeline.steps().len(), "Cleaning pipeline applied");
        Ok(current)
    }

    /// Apply one extraction operation
    pub fn extract(&self, text: &str, op: &ExtractionOp) -> Result<ExtractedValue, DomainError> {
        let value = match op {
            ExtractionOp::DatetimeTz => {
                ExtractedValue::DateTime(extractors::extract_datetimetz(text)?)
            }
            ExtractionOp::EmailAddress => {
                ExtractedValue::List(extractors::extract_email_address(text))
            }
            ExtractionOp::IpAddress => ExtractedValue::List(extractors::extract_ip_address(text)),
            ExtractionOp::IpAddressName => {
                ExtractedValue::List(extractors::extract_ip_address_name(text))
            }
            ExtractionOp::MapiId => ExtractedValue::List(extractors::extract_mapi_id(text)),
            ExtractionOp::OrderedBullets => {
                ExtractedValue::OrderedBullets(extractors::extract_ordered_bullets(text))
            }
            ExtractionOp::TextAfter(params) => {
                ExtractedValue::Text(extractors::extract_text_after(text, params)?)
            }
            ExtractionOp::TextBefore(params) => {
                ExtractedValue::Text(extractors::extract_text_before(text, params)?)
            }
            ExtractionOp::UsPhoneNumber => {
                ExtractedValue::Text(extractors::extract_us_phone_number(text))
            }
        };

        Ok(value)
    }

    /// Apply a named extraction
    pub fn apply_extraction(
        &self,
        text: &str,
        spec: &TransformationSpec,
    ) -> Result<ExtractedValue, DomainError> {
        let op = ExtractionOp::from_spec(spec)?;
        self.extract(text, &op)
    }

    /// Convert elements to an export format
    pub async fn stage(
        &self,
        elements: &[Element],
        op: &StagingOp,
    ) -> Result<StagedOutput, DomainError> {
        let output = match op {
            StagingOp::ConvertToCsv => StagedOutput::Csv(staging::convert_to_csv(elements)?),
            StagingOp::ConvertToDataframe => {
                StagedOutput::Table(staging::convert_to_dataframe(elements))
            }
            StagingOp::ConvertToDict => StagedOutput::Records(staging::convert_to_dict(elements)),
            StagingOp::DictToElements { records } => {
                StagedOutput::Elements(staging::dict_to_elements(records)?)
            }
            StagingOp::CsvForProdigy { metadata } => {
                StagedOutput::Csv(staging::stage_csv_for_prodigy(elements, metadata)?)
            }
            StagingOp::ForProdigy { metadata } => {
                StagedOutput::Records(staging::stage_for_prodigy(elements, metadata)?)
            }
            StagingOp::ForBaseplate => {
                StagedOutput::Document(staging::stage_for_baseplate(elements))
            }
            StagingOp::ForDatasaur { entities } => {
                StagedOutput::Records(staging::stage_for_datasaur(elements, entities)?)
            }
            StagingOp::ForLabelBox(params) => {
                StagedOutput::Records(staging::stage_for_label_box(elements, params).await?)
            }
            StagingOp::ForLabelStudio(params) => {
                StagedOutput::Records(staging::stage_for_label_studio(elements, params)?)
            }
            StagingOp::ForWeaviate => StagedOutput::Records(staging::stage_for_weaviate(elements)),
        };

        debug!(op = op.name(), elements = elements.len(), "Elements staged");
        Ok(output)
    }

    /// Apply a named staging step
    pub async fn apply_staging(
        &self,
        elements: &[Element],
        spec: &TransformationSpec,
    ) -> Result<StagedOutput, DomainError> {
        let op = StagingOp::from_spec(spec)?;
        self.stage(elements, &op).await
    }

    /// Group elements into chunks
    pub fn chunk(
        &self,
        elements: &[Element],
        op: &ChunkingOp,
    ) -> Result<ElementSequence, DomainError> {
        match op {
            ChunkingOp::ByTitle(params) => chunking::chunk_by_title(elements, params),
        }
    }

    /// Apply a named chunking strategy
    pub fn apply_chunking(
        &self,
        elements: &[Element],
        spec: &TransformationSpec,
    ) -> Result<ElementSequence, DomainError> {
        let op = ChunkingOp::from_spec(spec)?;
        self.chunk(elements, &op)
    }
}
