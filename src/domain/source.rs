//! Source reference classification

use std::path::PathBuf;

use url::Url;

/// Where a document should be read from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceReference {
    /// Fully qualified URL with both a scheme and a network location
    Url(Url),
    /// Filesystem path
    Path(PathBuf),
}

impl SourceReference {
    /// Classify an input reference string.
    ///
    /// Only strings carrying both a scheme and a host are URLs; anything else
    /// (relative or absolute paths, `file:` URLs, Windows drive paths) is
    /// treated as a filesystem path and left untouched.
    pub fn classify(reference: &str) -> Self {
        match Url::parse(reference) {
            Ok(url)
                if !url.scheme().is_empty() && url.host_str().is_some_and(|h| !h.is_empty()) =>
            {
                Self::Url(url)
            }
            _ => Self::Path(PathBuf::from(reference)),
        }
    }

    /// Check if this reference points to a remote URL
    pub fn is_url(&self) -> bool {
        matches!(self, Self::Url(_))
    }

    /// Display form of the reference
    pub fn display(&self) -> String {
        match self {
            Self::Url(url) => url.to_string(),
            Self::Path(path) => path.display().to_string(),
        }
    }
}
