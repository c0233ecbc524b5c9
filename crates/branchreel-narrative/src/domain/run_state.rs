//! Run state owned by the story engine.

use branchreel_core::error::StoryError;
use serde::{Deserialize, Serialize};

/// Where a run is in the node lifecycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RunPhase {
    /// No run has started, or the last start attempt failed.
    #[default]
    Idle,
    /// The start node is being resolved.
    Loading,
    /// A node's media is playing, or the engine is waiting to show its
    /// interaction. Also the inert phase after a missing node reference.
    PlayingMedia,
    /// Choices or a QTE are on screen.
    AwaitingInteraction,
    /// The run ended; only a restart leaves this phase.
    Finished,
}

/// Mutable state of the current run.
///
/// Transitions are checked: each method only accepts the phases it can
/// legally follow.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunState {
    /// The node being played, or `None` before the first node and after a
    /// missing reference.
    pub(crate) current_node_id: Option<String>,
    /// Current phase.
    pub(crate) phase: RunPhase,
    /// Whether the run accepts progress.
    pub(crate) active: bool,
}

impl RunState {
    /// Returns the current phase.
    #[must_use]
    pub fn phase(&self) -> RunPhase {
        self.phase
    }

    /// Returns `true` while the run accepts progress.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Returns the id of the node being played.
    #[must_use]
    pub fn current_node_id(&self) -> Option<&str> {
        self.current_node_id.as_deref()
    }

    /// Enters `Loading` ahead of resolving the start node.
    ///
    /// # Errors
    ///
    /// Returns `StoryError::Validation` if a run is already active.
    pub fn begin_loading(&mut self) -> Result<(), StoryError> {
        if self.active {
            return Err(StoryError::Validation("a run is already active".to_owned()));
        }
        self.phase = RunPhase::Loading;
        Ok(())
    }

    /// Abandons a failed start and returns to `Idle`.
    pub fn abort_loading(&mut self) {
        *self = Self::default();
    }

    /// Marks the run active once the start node is known to exist.
    ///
    /// # Errors
    ///
    /// Returns `StoryError::Validation` unless the state is `Loading`.
    pub fn activate(&mut self) -> Result<(), StoryError> {
        if self.phase != RunPhase::Loading {
            return Err(StoryError::Validation(
                "run must be in Loading phase to start".to_owned(),
            ));
        }
        self.active = true;
        Ok(())
    }

    /// Makes `node_id` the current node and enters `PlayingMedia`.
    ///
    /// # Errors
    ///
    /// Returns `StoryError::Validation` if the run is not active.
    pub fn enter_node(&mut self, node_id: &str) -> Result<(), StoryError> {
        if !self.active {
            return Err(StoryError::Validation("no run is active".to_owned()));
        }
        self.current_node_id = Some(node_id.to_owned());
        self.phase = RunPhase::PlayingMedia;
        Ok(())
    }

    /// Leaves the run inert after a missing node reference: `PlayingMedia`
    /// with no current node.
    pub fn enter_inert(&mut self) {
        self.current_node_id = None;
        self.phase = RunPhase::PlayingMedia;
    }

    /// Enters `AwaitingInteraction` once the node's media is done.
    ///
    /// # Errors
    ///
    /// Returns `StoryError::Validation` unless a node is playing.
    pub fn await_interaction(&mut self) -> Result<(), StoryError> {
        if self.phase != RunPhase::PlayingMedia || self.current_node_id.is_none() {
            return Err(StoryError::Validation(
                "run must be playing a node to await interaction".to_owned(),
            ));
        }
        self.phase = RunPhase::AwaitingInteraction;
        Ok(())
    }

    /// Ends the run. The current node is kept for inspection.
    pub fn finish(&mut self) {
        self.phase = RunPhase::Finished;
        self.active = false;
    }

    /// Stops accepting progress without changing the phase.
    pub fn deactivate(&mut self) {
        self.active = false;
    }
}
