// SPDX-License-Identifier: MIT

//! Typed error handling for branchflow
//!
//! Edits that cannot be applied are reported as `EditError`. None of them
//! are fatal: the tree or history the caller holds is left exactly as it was.

use thiserror::Error;

use super::node::{NodeId, NodeKind};

/// Top-level error type for branchflow
#[derive(Debug, Error)]
pub enum FlowError {
    /// An edit or history move was refused
    #[error("Edit refused: {0}")]
    Edit(#[from] EditError),

    /// A workflow document could not be turned into a tree
    #[error("Invalid workflow document: {0}")]
    Document(#[from] DocumentError),

    /// Configuration errors (bad env vars, unreadable settings)
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O errors
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// YAML parsing errors
    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),
}

/// Reasons an edit intent or history move left everything unchanged
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EditError {
    /// No node with the given id exists in the tree
    #[error("Node '{0}' not found")]
    TargetNotFound(NodeId),

    /// The root node can never be deleted
    #[error("The root node cannot be deleted")]
    RootDeletionRefused,

    /// Explicit slot index the parent's kind does not have
    #[error("Slot {slot} does not exist on a {kind} node")]
    SlotOutOfRange { kind: NodeKind, slot: usize },

    /// End nodes never have children
    #[error("Node '{0}' has no child slots")]
    NoChildSlots(NodeId),

    /// Unindexed add on a branch whose false slot is already occupied
    #[error("Branch '{0}' has no free slot to append to")]
    BranchFull(NodeId),

    /// The new node would sit deeper than documents can carry
    #[error("Node '{parent}' is at the depth limit of {limit}")]
    TooDeep { parent: NodeId, limit: usize },

    /// Undo at the earliest entry or redo at the latest one
    #[error("Nothing to {0}")]
    HistoryBoundary(HistoryMove),
}

/// Direction of a history cursor move
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryMove {
    Undo,
    Redo,
}

impl std::fmt::Display for HistoryMove {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HistoryMove::Undo => write!(f, "undo"),
            HistoryMove::Redo => write!(f, "redo"),
        }
    }
}

/// Structural problems found while reading a workflow document
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DocumentError {
    #[error("Root node must have id 'root', found '{0}'")]
    BadRootId(String),

    #[error("Duplicate node id '{0}'")]
    DuplicateId(String),

    #[error("Node '{id}' of kind {kind} has {found} children, at most {allowed} allowed")]
    TooManyChildren {
        id: String,
        kind: NodeKind,
        found: usize,
        allowed: usize,
    },

    #[error("Workflow is {depth} levels deep, at most {limit} allowed")]
    TooDeep { depth: usize, limit: usize },
}

impl FlowError {
    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }
}
