//! Advisory checks over a story document.
//!
//! None of these block loading or running a story: the engine copes with
//! every one of them at runtime. The report exists so authoring tools can
//! surface mistakes before a player hits them.

use std::collections::HashSet;
use std::fmt;

use super::document::{QteKind, StoryDocument};
use super::node_index::NodeIndex;

/// One finding from [`validate_document`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentIssue {
    /// `meta.startNodeId` names no node.
    MissingStartNode(String),
    /// More than one node uses this id; the last one is used.
    DuplicateNodeId(String),
    /// A choice targets a node that does not exist.
    DanglingChoice {
        /// Node holding the choice.
        node_id: String,
        /// The choice's label.
        label: String,
        /// The missing target.
        target: String,
    },
    /// A QTE outcome targets a node that does not exist.
    DanglingQteBranch {
        /// Node holding the QTE.
        node_id: String,
        /// The missing target.
        target: String,
    },
    /// The node has both choices and a QTE; the QTE is never offered.
    ChoicesShadowQte(String),
    /// The QTE duration is zero or negative, so it always fails.
    NonPositiveDuration(String),
    /// A sequence QTE lists no keys, so it always fails.
    EmptySequence(String),
    /// The QTE kind is unknown, so it always fails.
    UnrecognizedQteKind {
        /// Node holding the QTE.
        node_id: String,
        /// The kind as authored.
        kind: String,
    },
}

impl fmt::Display for DocumentIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingStartNode(id) => write!(f, "start node '{id}' does not exist"),
            Self::DuplicateNodeId(id) => write!(f, "node id '{id}' is defined more than once"),
            Self::DanglingChoice {
                node_id,
                label,
                target,
            } => write!(
                f,
                "choice '{label}' on node '{node_id}' targets missing node '{target}'"
            ),
            Self::DanglingQteBranch { node_id, target } => {
                write!(f, "QTE on node '{node_id}' targets missing node '{target}'")
            }
            Self::ChoicesShadowQte(id) => {
                write!(f, "node '{id}' has choices and a QTE; the QTE is ignored")
            }
            Self::NonPositiveDuration(id) => {
                write!(f, "QTE on node '{id}' has a non-positive duration")
            }
            Self::EmptySequence(id) => write!(f, "sequence QTE on node '{id}' has no keys"),
            Self::UnrecognizedQteKind { node_id, kind } => {
                write!(f, "QTE on node '{node_id}' has unknown kind '{kind}'")
            }
        }
    }
}

/// Checks `document` for authoring mistakes.
///
/// Issues are reported in node order, with the start-node check first.
#[must_use]
pub fn validate_document(document: &StoryDocument) -> Vec<DocumentIssue> {
    let index = NodeIndex::build(document);
    let mut issues = Vec::new();

    if !index.contains(&document.meta.start_node_id) {
        issues.push(DocumentIssue::MissingStartNode(
            document.meta.start_node_id.clone(),
        ));
    }

    let mut seen = HashSet::new();
    for node in &document.nodes {
        if !seen.insert(node.id.as_str()) {
            issues.push(DocumentIssue::DuplicateNodeId(node.id.clone()));
        }

        for choice in &node.choices {
            if let Some(target) = choice.target() {
                if !index.contains(target) {
                    issues.push(DocumentIssue::DanglingChoice {
                        node_id: node.id.clone(),
                        label: choice.label.clone(),
                        target: target.to_owned(),
                    });
                }
            }
        }

        let Some(qte) = &node.qte else {
            continue;
        };
        if !node.choices.is_empty() {
            issues.push(DocumentIssue::ChoicesShadowQte(node.id.clone()));
        }
        for target in [qte.next_for(true), qte.next_for(false)].into_iter().flatten() {
            if !index.contains(target) {
                issues.push(DocumentIssue::DanglingQteBranch {
                    node_id: node.id.clone(),
                    target: target.to_owned(),
                });
            }
        }
        if qte.duration_seconds <= 0.0 || qte.duration_seconds.is_nan() {
            issues.push(DocumentIssue::NonPositiveDuration(node.id.clone()));
        }
        match &qte.kind {
            QteKind::Sequence if qte.key_sequence.is_empty() => {
                issues.push(DocumentIssue::EmptySequence(node.id.clone()));
            }
            QteKind::Unrecognized(kind) => issues.push(DocumentIssue::UnrecognizedQteKind {
                node_id: node.id.clone(),
                kind: kind.clone(),
            }),
            _ => {}
        }
    }

    issues
}
