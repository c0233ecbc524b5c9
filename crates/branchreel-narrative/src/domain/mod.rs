//! Run state and the events a run records.

pub mod events;
pub mod run_state;
