//! Inputs fed to the evaluator and the instructions it hands back.

use serde::{Deserialize, Serialize};

/// A discrete player input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum QteInput {
    /// The designated action press used by button and timing checks.
    Trigger,
    /// Text typed during a frame, used by sequence checks.
    Key(String),
}

impl QteInput {
    /// Creates a key input.
    #[must_use]
    pub fn key(text: impl Into<String>) -> Self {
        Self::Key(text.into())
    }

    /// Returns `true` for the action press.
    #[must_use]
    pub fn is_trigger(&self) -> bool {
        matches!(self, Self::Trigger)
    }

    /// Returns `true` if this is key input containing `expected`, ignoring
    /// case.
    #[must_use]
    pub fn matches_key(&self, expected: &str) -> bool {
        match self {
            Self::Key(text) => text.to_uppercase().contains(&expected.to_uppercase()),
            Self::Trigger => false,
        }
    }
}

/// What the presentation layer should tell the player.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QtePrompt {
    /// Instruction line.
    pub instruction: String,
    /// The key currently expected, for sequence checks.
    pub key: Option<String>,
}

impl QtePrompt {
    pub(crate) fn text(instruction: &str) -> Self {
        Self {
            instruction: instruction.to_owned(),
            key: None,
        }
    }

    pub(crate) fn press(key: &str) -> Self {
        Self {
            instruction: format!("Press: {key}"),
            key: Some(key.to_owned()),
        }
    }
}
