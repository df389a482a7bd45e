// SPDX-License-Identifier: MIT

//! Workflow tree model
//!
//! A workflow is a tree of typed nodes. The number of child slots is fixed by
//! the node's kind and encoded in [`NodeBody`]:
//! - `start` / `action` - one slot (`0`), the next step
//! - `branch` - two slots, `0` = true path, `1` = false path
//! - `end` - no slots
//!
//! Nodes are shared through [`NodeRef`] so that snapshots produced by edits
//! reuse every subtree the edit did not touch.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;
use uuid::Uuid;

use super::document::NodeDocument;
use super::error::{DocumentError, EditError};

/// Shared handle on an immutable node
pub type NodeRef = Arc<Node>;

/// Label given to the root of a fresh workflow
pub const INITIAL_ROOT_LABEL: &str = "Start Workflow";

/// Deepest slot path a workflow may have.
///
/// Documents nest two levels per node and the JSON and YAML parsers stop at
/// 128 levels, so deeper trees could be exported but never loaded again.
pub const MAX_DEPTH: usize = 60;

/// Opaque node identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(String);

impl NodeId {
    /// Id reserved for the root node
    pub const ROOT: &'static str = "root";

    /// Generate a fresh unique id
    pub fn generate() -> Self {
        Self(Uuid::new_v4().simple().to_string())
    }

    pub fn root() -> Self {
        Self(Self::ROOT.to_string())
    }

    pub fn is_root(&self) -> bool {
        self.0 == Self::ROOT
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NodeId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for NodeId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl PartialEq<str> for NodeId {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for NodeId {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

/// Node kind as exposed to callers and documents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    Start,
    Action,
    Branch,
    End,
}

impl NodeKind {
    /// Number of child slots a node of this kind has
    pub fn slot_count(self) -> usize {
        match self {
            NodeKind::Start | NodeKind::Action => 1,
            NodeKind::Branch => 2,
            NodeKind::End => 0,
        }
    }

    /// Label a freshly added node of this kind starts with
    pub fn default_label(self) -> &'static str {
        match self {
            NodeKind::Branch => "New Condition",
            _ => "New Step",
        }
    }
}

impl std::fmt::Display for NodeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NodeKind::Start => write!(f, "start"),
            NodeKind::Action => write!(f, "action"),
            NodeKind::Branch => write!(f, "branch"),
            NodeKind::End => write!(f, "end"),
        }
    }
}

/// Kind-specific child slots
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeBody {
    Start {
        next: Option<NodeRef>,
    },
    Action {
        next: Option<NodeRef>,
    },
    Branch {
        on_true: Option<NodeRef>,
        on_false: Option<NodeRef>,
    },
    End,
}

impl NodeBody {
    /// Body of the given kind with every slot empty
    pub fn empty(kind: NodeKind) -> Self {
        match kind {
            NodeKind::Start => NodeBody::Start { next: None },
            NodeKind::Action => NodeBody::Action { next: None },
            NodeKind::Branch => NodeBody::Branch {
                on_true: None,
                on_false: None,
            },
            NodeKind::End => NodeBody::End,
        }
    }

    /// `true` when no slot holds a child
    pub fn is_leaf(&self) -> bool {
        match self {
            NodeBody::Start { next } | NodeBody::Action { next } => next.is_none(),
            NodeBody::Branch { on_true, on_false } => on_true.is_none() && on_false.is_none(),
            NodeBody::End => true,
        }
    }

    /// Empty every slot, returning the children that were in them
    fn take_children(&mut self) -> Vec<NodeRef> {
        match self {
            NodeBody::Start { next } | NodeBody::Action { next } => {
                next.take().into_iter().collect()
            }
            NodeBody::Branch { on_true, on_false } => {
                on_true.take().into_iter().chain(on_false.take()).collect()
            }
            NodeBody::End => Vec::new(),
        }
    }
}

/// A single workflow node
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    pub id: NodeId,
    pub label: String,
    pub body: NodeBody,
}

impl Node {
    /// Create a node with a fresh id, the kind's default label and empty slots
    pub fn new(kind: NodeKind) -> Self {
        Self::with_id(NodeId::generate(), kind, kind.default_label())
    }

    pub fn with_id(id: impl Into<NodeId>, kind: NodeKind, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            body: NodeBody::empty(kind),
        }
    }

    pub fn kind(&self) -> NodeKind {
        match self.body {
            NodeBody::Start { .. } => NodeKind::Start,
            NodeBody::Action { .. } => NodeKind::Action,
            NodeBody::Branch { .. } => NodeKind::Branch,
            NodeBody::End => NodeKind::End,
        }
    }

    /// Child in the given slot, `None` for empty or nonexistent slots
    pub fn slot(&self, slot: usize) -> Option<&NodeRef> {
        match (&self.body, slot) {
            (NodeBody::Start { next }, 0) | (NodeBody::Action { next }, 0) => next.as_ref(),
            (NodeBody::Branch { on_true, .. }, 0) => on_true.as_ref(),
            (NodeBody::Branch { on_false, .. }, 1) => on_false.as_ref(),
            _ => None,
        }
    }

    /// All slots in order, empty ones included
    pub fn slots(&self) -> Vec<Option<&NodeRef>> {
        match &self.body {
            NodeBody::Start { next } | NodeBody::Action { next } => vec![next.as_ref()],
            NodeBody::Branch { on_true, on_false } => vec![on_true.as_ref(), on_false.as_ref()],
            NodeBody::End => vec![],
        }
    }

    /// Copy of this node with `slot` set to `child`
    pub fn with_slot(&self, slot: usize, child: Option<NodeRef>) -> Result<Node, EditError> {
        let mut node = self.clone();
        match (&mut node.body, slot) {
            (NodeBody::Start { next }, 0) | (NodeBody::Action { next }, 0) => *next = child,
            (NodeBody::Branch { on_true, .. }, 0) => *on_true = child,
            (NodeBody::Branch { on_false, .. }, 1) => *on_false = child,
            (NodeBody::End, _) => return Err(EditError::NoChildSlots(self.id.clone())),
            (_, slot) => {
                return Err(EditError::SlotOutOfRange {
                    kind: self.kind(),
                    slot,
                })
            }
        }
        Ok(node)
    }

    /// Copy of this node carrying a new label
    pub fn with_label(&self, label: impl Into<String>) -> Node {
        let mut node = self.clone();
        node.label = label.into();
        node
    }

    /// Child that takes this node's place when it is deleted.
    ///
    /// Branches hand over the true path if present, otherwise the false
    /// path. When both are occupied the false subtree is lost.
    pub fn heir(&self) -> Option<NodeRef> {
        match &self.body {
            NodeBody::Start { next } | NodeBody::Action { next } => next.clone(),
            NodeBody::Branch { on_true, on_false } => on_true.clone().or_else(|| on_false.clone()),
            NodeBody::End => None,
        }
    }
}

// Long chains would otherwise be freed one stack frame per level. Children
// still shared with another snapshot are only released, not walked.
impl Drop for Node {
    fn drop(&mut self) {
        let mut orphans = self.body.take_children();
        while let Some(child) = orphans.pop() {
            if let Ok(mut node) = Arc::try_unwrap(child) {
                orphans.extend(node.body.take_children());
            }
        }
    }
}

/// Immutable snapshot of a whole workflow
///
/// Serializes as a [`NodeDocument`], refusing trees deeper than [`MAX_DEPTH`].
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(try_from = "NodeDocument")]
pub struct Tree {
    root: NodeRef,
}

impl Tree {
    pub fn new(root: impl Into<NodeRef>) -> Self {
        Self { root: root.into() }
    }

    /// The workflow every editor session starts from
    pub fn initial() -> Self {
        Self::new(Node::with_id(
            NodeId::root(),
            NodeKind::Action,
            INITIAL_ROOT_LABEL,
        ))
    }

    pub fn root(&self) -> &NodeRef {
        &self.root
    }

    /// Pre-order walk over every node
    pub fn walk(&self) -> Walk<'_> {
        Walk {
            stack: vec![&self.root],
        }
    }

    /// First node with the given id in pre-order
    pub fn find(&self, id: &str) -> Option<&NodeRef> {
        self.walk().find(|node| node.id == id)
    }

    /// Slot path from the root to the first node with the given id
    pub fn path_to(&self, id: &str) -> Option<Vec<usize>> {
        let mut path = Vec::new();
        let mut stack = vec![(0usize, 0usize, &self.root)];
        while let Some((depth, slot, node)) = stack.pop() {
            if depth > 0 {
                path.truncate(depth - 1);
                path.push(slot);
            }
            if node.id == id {
                return Some(path);
            }
            for (child_slot, child) in node.slots().into_iter().enumerate().rev() {
                if let Some(child) = child {
                    stack.push((depth + 1, child_slot, child));
                }
            }
        }
        None
    }

    /// Node reached by following `path` from the root
    pub fn node_at(&self, path: &[usize]) -> Option<&NodeRef> {
        path.iter()
            .try_fold(&self.root, |node, &slot| node.slot(slot))
    }

    pub fn contains(&self, id: &str) -> bool {
        self.find(id).is_some()
    }

    /// Ids of all nodes in pre-order
    pub fn ids(&self) -> Vec<NodeId> {
        self.walk().map(|node| node.id.clone()).collect()
    }

    /// Number of nodes. A tree always holds at least its root.
    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> usize {
        self.walk().count()
    }

    /// Length of the longest slot path from the root
    pub fn depth(&self) -> usize {
        let mut deepest = 0;
        let mut stack = vec![(0usize, &self.root)];
        while let Some((depth, node)) = stack.pop() {
            deepest = deepest.max(depth);
            stack.extend(
                node.slots()
                    .into_iter()
                    .flatten()
                    .map(|child| (depth + 1, child)),
            );
        }
        deepest
    }

    /// Check the invariants the type system does not cover: the root id,
    /// id uniqueness across the tree and the depth limit.
    pub fn validate(&self) -> Result<(), DocumentError> {
        if !self.root.id.is_root() {
            return Err(DocumentError::BadRootId(self.root.id.to_string()));
        }
        let depth = self.depth();
        if depth > MAX_DEPTH {
            return Err(DocumentError::TooDeep {
                depth,
                limit: MAX_DEPTH,
            });
        }
        let mut seen = HashSet::new();
        for node in self.walk() {
            if !seen.insert(node.id.as_str()) {
                return Err(DocumentError::DuplicateId(node.id.to_string()));
            }
        }
        Ok(())
    }
}

impl Default for Tree {
    fn default() -> Self {
        Self::initial()
    }
}

/// Explicit-stack pre-order traversal, slots visited in order, empty slots skipped
pub struct Walk<'a> {
    stack: Vec<&'a NodeRef>,
}

impl<'a> Iterator for Walk<'a> {
    type Item = &'a NodeRef;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.stack
            .extend(node.slots().into_iter().rev().flatten());
        Some(node)
    }
}
