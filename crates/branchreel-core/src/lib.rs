//! Branchreel Core — shared abstractions.
//!
//! This crate defines the logical clock, the run-generation tickets that
//! guard every suspended callback, the timer queue used for cooperative
//! suspension, and the error taxonomy shared by all other crates. It
//! contains no I/O.

pub mod clock;
pub mod error;
pub mod ticket;
pub mod timer;
