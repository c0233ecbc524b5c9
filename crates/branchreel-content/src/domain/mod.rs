//! Story document domain types.

pub mod document;
pub mod node_index;
pub mod validation;
