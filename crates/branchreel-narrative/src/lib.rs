//! Branchreel — story traversal.
//!
//! Responsible for walking a story graph: playing each node's media through
//! the playback port, presenting the node's choices or QTE through the
//! interaction port, resolving the next node, and offering a restart when a
//! run ends.

pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
