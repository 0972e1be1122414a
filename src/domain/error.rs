use thiserror::Error;

/// Boxed underlying cause carried by fetch and parse failures
pub type BoxedCause = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Core domain errors
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("The file {path} was not found")]
    SourceNotFound { path: String },

    #[error("Failed to parse the URL: {url}")]
    SourceFetch {
        url: String,
        #[source]
        source: BoxedCause,
    },

    #[error("Failed to parse the unstructured file: {path}")]
    SourceParse {
        path: String,
        #[source]
        source: BoxedCause,
    },

    #[error("'{name}' is not a valid function")]
    UnsupportedOperation { kind: OperationKind, name: String },

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Provider error: {provider} - {message}")]
    Provider { provider: String, message: String },

    #[error("I/O error: {message}")]
    Io { message: String },

    #[error("Internal error: {message}")]
    Internal { message: String },
}

/// Registry an operation name was looked up in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationKind {
    Cleaning,
    Extraction,
    Staging,
    Chunking,
}

impl std::fmt::Display for OperationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Cleaning => write!(f, "cleaning"),
            Self::Extraction => write!(f, "extraction"),
            Self::Staging => write!(f, "staging"),
            Self::Chunking => write!(f, "chunking"),
        }
    }
}

impl DomainError {
    pub fn source_not_found(path: impl Into<String>) -> Self {
        Self::SourceNotFound { path: path.into() }
    }

    pub fn source_fetch(url: impl Into<String>, source: impl Into<BoxedCause>) -> Self {
        Self::SourceFetch {
            url: url.into(),
            source: source.into(),
        }
    }

    pub fn source_parse(path: impl Into<String>, source: impl Into<BoxedCause>) -> Self {
        Self::SourceParse {
            path: path.into(),
            source: source.into(),
        }
    }

    pub fn unsupported(kind: OperationKind, name: impl Into<String>) -> Self {
        Self::UnsupportedOperation {
            kind,
            name: name.into(),
        }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn provider(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Provider {
            provider: provider.into(),
            message: message.into(),
        }
    }

    pub fn io(message: impl Into<String>) -> Self {
        Self::Io {
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Whether this error is the unknown-operation kind
    pub fn is_unsupported_operation(&self) -> bool {
        matches!(self, Self::UnsupportedOperation { .. })
    }
}

impl From<std::io::Error> for DomainError {
    fn from(err: std::io::Error) -> Self {
        Self::io(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_unsupported_operation_message() {
        let error = DomainError::unsupported(OperationKind::Cleaning, "clean_everything");
        assert_eq!(error.to_string(), "'clean_everything' is not a valid function");
        assert!(error.is_unsupported_operation());
    }

    #[test]
    fn test_source_not_found_message() {
        let error = DomainError::source_not_found("/tmp/missing.txt");
        assert_eq!(error.to_string(), "The file /tmp/missing.txt was not found");
    }

    #[test]
    fn test_source_parse_preserves_cause() {
        let cause = DomainError::validation("bad bytes");
        let error = DomainError::source_parse("doc.txt", cause);

        assert!(error.to_string().starts_with("Failed to parse the unstructured file"));
        let source = error.source().unwrap();
        assert_eq!(source.to_string(), "Validation error: bad bytes");
    }

    #[test]
    fn test_source_fetch_message() {
        let error = DomainError::source_fetch("https://example.com", "connection refused");
        assert_eq!(error.to_string(), "Failed to parse the URL: https://example.com");
        assert_eq!(error.source().unwrap().to_string(), "connection refused");
    }

    #[test]
    fn test_operation_kind_display() {
        assert_eq!(OperationKind::Staging.to_string(), "staging");
        assert_eq!(OperationKind::Chunking.to_string(), "chunking");
    }
}
