//! Run generations and callback tickets.
//!
//! Every suspended piece of work (a timer, a presented interaction, a media
//! request) is stamped with the [`Ticket`] that was current when it was
//! issued. Restarting or stopping a run opens a new [`RunGeneration`], and
//! entering a node advances the step, so a callback holding an older ticket
//! can be recognised and dropped.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Monotonically increasing run counter.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct RunGeneration(pub u64);

impl RunGeneration {
    /// Returns the generation following this one.
    #[must_use]
    pub fn next(self) -> Self {
        Self(self.0.wrapping_add(1))
    }
}

impl fmt::Display for RunGeneration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "gen-{}", self.0)
    }
}

/// Identifies one node visit within one run generation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Ticket {
    /// The run generation the ticket was issued in.
    pub generation: RunGeneration,
    /// The node visit within that generation.
    pub step: u32,
}

impl Ticket {
    /// Creates a ticket for the first step of `generation`.
    #[must_use]
    pub fn first(generation: RunGeneration) -> Self {
        Self {
            generation,
            step: 0,
        }
    }

    /// Returns the ticket for the next node visit in the same generation.
    #[must_use]
    pub fn next_step(self) -> Self {
        Self {
            generation: self.generation,
            step: self.step.wrapping_add(1),
        }
    }
}

impl fmt::Display for Ticket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/step-{}", self.generation, self.step)
    }
}
