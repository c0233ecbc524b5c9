//! Branchreel — quick-reaction checks.
//!
//! A pure evaluator that decides a timed skill check from elapsed time and a
//! stream of discrete inputs. It owns no clock and no rendering: callers
//! pass the elapsed time on every tick and input, and read back progress,
//! the instruction to display, and a one-shot outcome.

pub mod domain;

pub use domain::evaluator::{QteEvaluator, QteOutcome};
pub use domain::input::{QteInput, QtePrompt};
