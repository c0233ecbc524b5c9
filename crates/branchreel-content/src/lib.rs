//! Branchreel — story content.
//!
//! Responsible for the authored story graph: the document model, the id
//! lookup index the engine traverses, advisory validation, and fetching and
//! parsing documents from bundled text, local files or remote URLs.

pub mod application;
pub mod domain;
