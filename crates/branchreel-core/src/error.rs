//! Story error types.

use thiserror::Error;

use crate::ticket::Ticket;

/// Top-level error type for loading and running a story.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoryError {
    /// The story document is unusable: unparsable, or its start node is
    /// missing. Fatal to starting a run.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// A choice or QTE branch points at a node id that does not exist. The
    /// run is left inert at the current node until restarted.
    #[error("node not found: {0}")]
    MissingNode(String),

    /// A document fetch or media load failed.
    #[error("transport error: {0}")]
    Transport(String),

    /// The operation is not valid in the current run phase.
    #[error("validation error: {0}")]
    Validation(String),

    /// A callback arrived for a run generation or step that is no longer
    /// current.
    #[error("stale callback for {0}")]
    StaleTicket(Ticket),
}
