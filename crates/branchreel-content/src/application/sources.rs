//! Where story documents come from.

use std::path::PathBuf;

use async_trait::async_trait;
use branchreel_core::error::StoryError;

use super::loader::DocumentFormat;

/// A place a story document can be fetched from.
#[async_trait]
pub trait DocumentSource: Send + Sync {
    /// Fetches the raw document text.
    async fn fetch(&self) -> Result<String, StoryError>;

    /// The encoding of the fetched text.
    fn format(&self) -> DocumentFormat;

    /// A short description for logs.
    fn describe(&self) -> String;
}

/// Document text bundled with the host application.
#[derive(Debug, Clone)]
pub struct InlineSource {
    text: String,
    format: DocumentFormat,
}

impl InlineSource {
    /// Wraps `text` in the given format.
    #[must_use]
    pub fn new(text: impl Into<String>, format: DocumentFormat) -> Self {
        Self {
            text: text.into(),
            format,
        }
    }

    /// Wraps JSON text.
    #[must_use]
    pub fn json(text: impl Into<String>) -> Self {
        Self::new(text, DocumentFormat::Json)
    }
}

#[async_trait]
impl DocumentSource for InlineSource {
    async fn fetch(&self) -> Result<String, StoryError> {
        Ok(self.text.clone())
    }

    fn format(&self) -> DocumentFormat {
        self.format
    }

    fn describe(&self) -> String {
        "inline document".to_owned()
    }
}

/// A document on the local file system. The format follows the extension.
#[derive(Debug, Clone)]
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    /// Creates a source reading `path`.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl DocumentSource for FileSource {
    async fn fetch(&self) -> Result<String, StoryError> {
        tokio::fs::read_to_string(&self.path).await.map_err(|e| {
            StoryError::Transport(format!("failed to read {}: {e}", self.path.display()))
        })
    }

    fn format(&self) -> DocumentFormat {
        DocumentFormat::from_path(&self.path.to_string_lossy())
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

/// A document served over HTTP(S). The format follows the URL's extension.
#[derive(Debug, Clone)]
pub struct HttpSource {
    url: String,
    client: reqwest::Client,
}

impl HttpSource {
    /// Creates a source fetching `url` with a default client.
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        Self::with_client(url, reqwest::Client::new())
    }

    /// Creates a source fetching `url` with a caller-configured client.
    #[must_use]
    pub fn with_client(url: impl Into<String>, client: reqwest::Client) -> Self {
        Self {
            url: url.into(),
            client,
        }
    }
}

#[async_trait]
impl DocumentSource for HttpSource {
    async fn fetch(&self) -> Result<String, StoryError> {
        let transport = |e: reqwest::Error| {
            StoryError::Transport(format!("failed to load from URL {}: {e}", self.url))
        };
        self.client
            .get(&self.url)
            .send()
            .await
            .map_err(transport)?
            .error_for_status()
            .map_err(transport)?
            .text()
            .await
            .map_err(transport)
    }

    fn format(&self) -> DocumentFormat {
        let path = self.url.split(['?', '#']).next().unwrap_or_default();
        DocumentFormat::from_path(path)
    }

    fn describe(&self) -> String {
        self.url.clone()
    }
}
