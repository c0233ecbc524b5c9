//! Parsing story documents and loading them from a source.

use std::path::Path;

use branchreel_core::error::StoryError;
use sha2::{Digest, Sha256};

use super::sources::DocumentSource;
use crate::domain::document::StoryDocument;

/// Text encoding of a story document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DocumentFormat {
    /// JSON, the authoring tool's native output.
    #[default]
    Json,
    /// YAML with the same shape as the JSON format.
    Yaml,
}

impl DocumentFormat {
    /// Picks a format from a file name or URL path: `.yaml` and `.yml` are
    /// YAML, anything else is JSON.
    #[must_use]
    pub fn from_path(path: &str) -> Self {
        let extension = Path::new(path)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase);
        match extension.as_deref() {
            Some("yaml" | "yml") => Self::Yaml,
            _ => Self::Json,
        }
    }
}

/// A parsed document together with a fingerprint of its source text.
#[derive(Debug, Clone)]
pub struct LoadedDocument {
    /// The parsed story.
    pub document: StoryDocument,
    /// Hex SHA-256 digest of the source text.
    pub version_hash: String,
}

/// Parses `text` as a story document.
///
/// # Errors
///
/// Returns `StoryError::Configuration` describing the parse failure.
pub fn parse_document(text: &str, format: DocumentFormat) -> Result<StoryDocument, StoryError> {
    let parsed = match format {
        DocumentFormat::Json => serde_json::from_str(text).map_err(|e| e.to_string()),
        DocumentFormat::Yaml => serde_yaml::from_str(text).map_err(|e| e.to_string()),
    };
    parsed.map_err(|e| StoryError::Configuration(format!("failed to parse story document: {e}")))
}

/// Returns the hex SHA-256 digest of `text`.
#[must_use]
pub fn version_hash(text: &str) -> String {
    format!("{:x}", Sha256::digest(text.as_bytes()))
}

/// Fetches and parses a document from `source`.
///
/// # Errors
///
/// Returns `StoryError::Transport` if the fetch fails and
/// `StoryError::Configuration` if the text does not parse.
pub async fn load_document(source: &dyn DocumentSource) -> Result<LoadedDocument, StoryError> {
    let text = source.fetch().await.inspect_err(|e| {
        tracing::error!(source = %source.describe(), error = %e, "story document fetch failed");
    })?;
    let document = parse_document(&text, source.format()).inspect_err(|e| {
        tracing::error!(source = %source.describe(), error = %e, "story document rejected");
    })?;
    let version_hash = version_hash(&text);

    tracing::info!(
        title = %document.meta.title,
        nodes = document.nodes.len(),
        version_hash = %version_hash,
        "loaded story document"
    );

    Ok(LoadedDocument {
        document,
        version_hash,
    })
}
