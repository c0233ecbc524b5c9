//! Events recorded while a story runs.
//!
//! The engine appends one event per observable step. Hosts drain them with
//! `StoryEngine::take_events` for analytics, replay checks or debugging.

use std::time::Duration;

use branchreel_content::domain::document::QteKind;
use branchreel_core::ticket::Ticket;
use serde::Serialize;
use uuid::Uuid;

/// Something that happened during a run.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StoryEventKind {
    /// A run began at the start node.
    RunStarted {
        /// The configured start node.
        start_node_id: String,
    },
    /// A node became current.
    NodeEntered {
        /// The node entered.
        node_id: String,
        /// Resolved media location, if the node has media.
        media_url: Option<String>,
    },
    /// The node's media finished (or the node had none).
    MediaFinished {
        /// The node whose media finished.
        node_id: String,
    },
    /// Choices were put on screen.
    ChoicesPresented {
        /// The node offering the choices.
        node_id: String,
        /// Choice labels, in display order.
        labels: Vec<String>,
    },
    /// A QTE was put on screen.
    QtePresented {
        /// The node holding the QTE.
        node_id: String,
        /// The QTE kind.
        kind: QteKind,
    },
    /// The player picked a choice.
    ChoiceSelected {
        /// The node offering the choice.
        node_id: String,
        /// The chosen target; empty ends the run.
        next_node_id: String,
    },
    /// A QTE was decided.
    QteResolved {
        /// The node holding the QTE.
        node_id: String,
        /// Whether the player passed.
        success: bool,
        /// The branch taken, or `None` if the branch ends the run.
        next_node_id: Option<String>,
    },
    /// A branch pointed at a node that does not exist.
    ReferenceMissing {
        /// The missing node id.
        node_id: String,
    },
    /// Media for a node could not be played.
    PlaybackFailed {
        /// The node whose media failed.
        node_id: String,
        /// The playback error message.
        message: String,
    },
    /// The run reached an end.
    RunFinished {
        /// The last node played.
        node_id: Option<String>,
    },
    /// The synthetic restart choice was presented.
    RestartOffered,
    /// The host stopped the run.
    RunStopped,
}

/// A recorded event with its run context.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StoryEvent {
    /// Correlation id of the run the event belongs to.
    pub run_id: Uuid,
    /// Ticket current when the event was recorded.
    pub ticket: Ticket,
    /// Logical clock reading when the event was recorded.
    pub at: Duration,
    /// Event payload.
    #[serde(flatten)]
    pub kind: StoryEventKind,
}

impl StoryEvent {
    /// Returns the event type name.
    #[must_use]
    pub fn event_type(&self) -> &'static str {
        match &self.kind {
            StoryEventKind::RunStarted { .. } => "story.run_started",
            StoryEventKind::NodeEntered { .. } => "story.node_entered",
            StoryEventKind::MediaFinished { .. } => "story.media_finished",
            StoryEventKind::ChoicesPresented { .. } => "story.choices_presented",
            StoryEventKind::QtePresented { .. } => "story.qte_presented",
            StoryEventKind::ChoiceSelected { .. } => "story.choice_selected",
            StoryEventKind::QteResolved { .. } => "story.qte_resolved",
            StoryEventKind::ReferenceMissing { .. } => "story.reference_missing",
            StoryEventKind::PlaybackFailed { .. } => "story.playback_failed",
            StoryEventKind::RunFinished { .. } => "story.run_finished",
            StoryEventKind::RestartOffered => "story.restart_offered",
            StoryEventKind::RunStopped => "story.run_stopped",
        }
    }

    /// Serializes the event to JSON.
    ///
    /// # Errors
    ///
    /// Returns the serializer error, which derived implementations do not
    /// produce in practice.
    pub fn to_payload(&self) -> Result<serde_json::Value, serde_json::Error> {
        serde_json::to_value(self)
    }
}
