//! Text translation capability used by the `translate_text` cleaner

use async_trait::async_trait;
use std::fmt::Debug;

use super::DomainError;

#[cfg(test)]
use mockall::automock;

/// A machine-translation service
#[cfg_attr(test, automock)]
#[async_trait]
pub trait Translator: Send + Sync + Debug {
    /// Translate `text` into `target_lang`. A `None` source language asks
    /// the service to detect it.
    async fn translate(
        &self,
        text: &str,
        source_lang: Option<String>,
        target_lang: &str,
    ) -> Result<String, DomainError>;
}
