//! Read-only views of a running story.

use branchreel_content::domain::document::QteKind;
use branchreel_core::ticket::Ticket;
use serde::Serialize;
use uuid::Uuid;

use crate::application::engine::{Pending, StoryEngine};
use crate::domain::run_state::RunPhase;
use crate::ports::{InteractionPort, PlaybackPort};

/// What the player is currently being asked to do.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InteractionView {
    /// Nothing is on screen.
    None,
    /// The node's choices are on screen.
    Choices {
        /// Choice labels, in display order.
        labels: Vec<String>,
    },
    /// A QTE is on screen.
    Qte {
        /// The QTE kind.
        kind: QteKind,
    },
    /// The restart choice is on screen.
    RestartOffer,
}

/// Snapshot of a story engine.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunView {
    /// Correlation id of the current run.
    pub run_id: Uuid,
    /// Story title.
    pub title: String,
    /// Current phase.
    pub phase: RunPhase,
    /// Whether the run accepts progress.
    pub active: bool,
    /// The node being played.
    pub current_node_id: Option<String>,
    /// The ticket callbacks must carry.
    pub ticket: Ticket,
    /// The interaction on screen.
    pub interaction: InteractionView,
}

impl<P: PlaybackPort, U: InteractionPort> StoryEngine<P, U> {
    /// Returns a serializable snapshot of the engine.
    #[must_use]
    pub fn view(&self) -> RunView {
        let interaction = match self.pending() {
            None => InteractionView::None,
            Some(Pending::Choices) => InteractionView::Choices {
                labels: self
                    .current_node()
                    .map(|node| node.choices.iter().map(|c| c.label.clone()).collect())
                    .unwrap_or_default(),
            },
            Some(Pending::Qte { evaluator, .. }) => InteractionView::Qte {
                kind: evaluator.kind().clone(),
            },
            Some(Pending::RestartOffer) => InteractionView::RestartOffer,
        };
        RunView {
            run_id: self.run_id(),
            title: self.document().meta.title.clone(),
            phase: self.state().phase(),
            active: self.state().is_active(),
            current_node_id: self.state().current_node_id().map(str::to_owned),
            ticket: self.current_ticket(),
            interaction,
        }
    }
}
