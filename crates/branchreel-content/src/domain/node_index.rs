//! Id-to-node lookup built once per loaded document.

use std::collections::HashMap;

use branchreel_core::error::StoryError;

use super::document::{StoryDocument, StoryNode};

/// Constant-time node lookup by id.
///
/// Built in a single pass over the document's nodes. When two nodes share an
/// id, the later one replaces the earlier one; authoring tools rely on this
/// to override a node by appending a new definition.
#[derive(Debug, Clone, Default)]
pub struct NodeIndex {
    nodes: HashMap<String, StoryNode>,
}

impl NodeIndex {
    /// Builds the index for `document`.
    #[must_use]
    pub fn build(document: &StoryDocument) -> Self {
        let mut nodes = HashMap::with_capacity(document.nodes.len());
        for node in &document.nodes {
            if nodes.insert(node.id.clone(), node.clone()).is_some() {
                tracing::debug!(node_id = %node.id, "duplicate node id, later definition wins");
            }
        }
        Self { nodes }
    }

    /// Returns the node with `id`, if present.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&StoryNode> {
        self.nodes.get(id)
    }

    /// Returns the node with `id`.
    ///
    /// # Errors
    ///
    /// Returns `StoryError::MissingNode` if no node has that id.
    pub fn lookup(&self, id: &str) -> Result<&StoryNode, StoryError> {
        self.get(id)
            .ok_or_else(|| StoryError::MissingNode(id.to_owned()))
    }

    /// Returns `true` if a node with `id` exists.
    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.nodes.contains_key(id)
    }

    /// Returns the number of distinct ids.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns `true` if the index holds no nodes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}
