//! QTE domain types.

pub mod evaluator;
pub mod input;
