//! The story engine and its read-only views.

pub mod engine;
pub mod query_handlers;
