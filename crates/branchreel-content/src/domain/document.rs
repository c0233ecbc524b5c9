//! The authored story document.
//!
//! Field names follow the document wire format (`startNodeId`, `mediaRef`,
//! `successNext`, ...). Documents written for the earlier player format
//! (`cdnBase`, `video`, `question`, QTE `type`) are accepted through serde
//! aliases.

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

/// A complete story: metadata plus every node in authoring order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoryDocument {
    /// Story-wide settings.
    pub meta: StoryMeta,
    /// Nodes in the order they were authored.
    #[serde(default)]
    pub nodes: Vec<StoryNode>,
}

/// Story-wide settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoryMeta {
    /// Display title.
    #[serde(default)]
    pub title: String,
    /// Remote base URL for media. When absent, media is resolved against the
    /// local media directory.
    #[serde(default, alias = "cdnBase", skip_serializing_if = "Option::is_none")]
    pub media_base: Option<String>,
    /// The node every run starts from.
    #[serde(default)]
    pub start_node_id: String,
}

impl StoryMeta {
    /// Resolves a node's media reference to a playable location.
    ///
    /// With a non-empty `media_base` the result is `media_base/file`;
    /// otherwise `file` is joined onto `local_dir`.
    #[must_use]
    pub fn media_url(&self, file: &str, local_dir: &Path) -> String {
        match self.media_base.as_deref() {
            Some(base) if !base.is_empty() => format!("{base}/{file}"),
            _ => local_dir.join(file).to_string_lossy().into_owned(),
        }
    }
}

/// One narrative beat: a media segment and the interaction that follows it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoryNode {
    /// Unique node key.
    pub id: String,
    /// Media file to play before the interaction, if any.
    #[serde(default, alias = "video", skip_serializing_if = "Option::is_none")]
    pub media_ref: Option<String>,
    /// Text shown above the choices.
    #[serde(default, alias = "question")]
    pub prompt: String,
    /// Choices offered after the media, in display order.
    #[serde(default)]
    pub choices: Vec<Choice>,
    /// Timed check offered after the media when there are no choices.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub qte: Option<QteSpec>,
}

impl StoryNode {
    /// Returns the node's media reference when it names a file.
    #[must_use]
    pub fn media(&self) -> Option<&str> {
        self.media_ref.as_deref().filter(|m| !m.is_empty())
    }

    /// Returns `true` if the node offers no interaction at all.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        self.choices.is_empty() && self.qte.is_none()
    }
}

/// A labelled branch to another node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Choice {
    /// Button text.
    pub label: String,
    /// Target node id; empty ends the run.
    #[serde(default, rename = "next")]
    pub next_node_id: String,
}

impl Choice {
    /// Creates a choice.
    #[must_use]
    pub fn new(label: impl Into<String>, next_node_id: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            next_node_id: next_node_id.into(),
        }
    }

    /// Returns the target node id, or `None` for a terminal choice.
    #[must_use]
    pub fn target(&self) -> Option<&str> {
        non_empty(&self.next_node_id)
    }
}

/// The flavour of a quick-reaction check.
///
/// Kind names are matched case-insensitively. Unknown names are preserved
/// so the document still loads; the evaluator fails such checks.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum QteKind {
    /// Press once inside the final fifth of the window.
    Button,
    /// Press each listed key in order, each within its own slice.
    Sequence,
    /// Press once in the middle of the window.
    Timing,
    /// A kind this runtime does not know.
    Unrecognized(String),
}

impl QteKind {
    /// Returns the canonical lower-case name.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Button => "button",
            Self::Sequence => "sequence",
            Self::Timing => "timing",
            Self::Unrecognized(name) => name,
        }
    }
}

impl From<String> for QteKind {
    fn from(name: String) -> Self {
        match name.to_ascii_lowercase().as_str() {
            "button" => Self::Button,
            "sequence" => Self::Sequence,
            "timing" => Self::Timing,
            _ => Self::Unrecognized(name),
        }
    }
}

impl From<QteKind> for String {
    fn from(kind: QteKind) -> Self {
        kind.as_str().to_owned()
    }
}

impl fmt::Display for QteKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A timed skill check and its two outcomes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QteSpec {
    /// Check flavour.
    #[serde(alias = "type")]
    pub kind: QteKind,
    /// Length of the whole check, in seconds. Missing means zero, which the
    /// evaluator fails at once.
    #[serde(default, rename = "duration")]
    pub duration_seconds: f64,
    /// Keys to press, in order (sequence checks only).
    #[serde(default, rename = "sequence")]
    pub key_sequence: Vec<String>,
    /// Node to play on success; empty ends the run.
    #[serde(default, rename = "successNext")]
    pub success_next_node_id: String,
    /// Node to play on failure; empty ends the run.
    #[serde(default, rename = "failNext")]
    pub fail_next_node_id: String,
}

impl QteSpec {
    /// Returns the branch target for an outcome, or `None` when that branch
    /// ends the run.
    #[must_use]
    pub fn next_for(&self, success: bool) -> Option<&str> {
        if success {
            non_empty(&self.success_next_node_id)
        } else {
            non_empty(&self.fail_next_node_id)
        }
    }
}

fn non_empty(id: &str) -> Option<&str> {
    if id.is_empty() { None } else { Some(id) }
}
