// SPDX-License-Identifier: MIT

//! Serializable workflow shape
//!
//! Documents use the flat `{id, type, label, children}` layout, where
//! `children` may contain `null` holes for empty slots. A branch with only a
//! false path serializes as `[null, {...}]`.
//!
//! Conversions in both directions and dropping a document use explicit
//! stacks, so their cost in stack space does not grow with depth.

use serde::{Deserialize, Serialize, Serializer};
use std::sync::Arc;

use super::error::DocumentError;
use super::node::{Node, NodeBody, NodeKind, NodeRef, Tree, MAX_DEPTH};

/// One node of a workflow document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeDocument {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: NodeKind,
    pub label: String,
    #[serde(default)]
    pub children: Vec<Option<NodeDocument>>,
}

impl NodeDocument {
    /// Document for `node` alone, its children popped off `built`.
    ///
    /// `built` holds finished child documents with the first slot on top.
    fn assemble(node: &Node, built: &mut Vec<NodeDocument>) -> Self {
        let mut children: Vec<Option<NodeDocument>> = node
            .slots()
            .into_iter()
            .map(|slot| slot.and_then(|_| built.pop()))
            .collect();
        while matches!(children.last(), Some(None)) {
            children.pop();
        }
        Self {
            id: node.id.to_string(),
            kind: node.kind(),
            label: node.label.clone(),
            children,
        }
    }

    fn into_node(self) -> Result<NodeRef, DocumentError> {
        let mut pending = Vec::new();
        let root = Shell::open(self, &mut pending)?;
        let mut shells = Vec::new();
        while let Some(doc) = pending.pop() {
            shells.push(Shell::open(doc, &mut pending)?);
        }

        // Reverse pre-order finishes every child before its parent.
        let mut built = Vec::new();
        for shell in shells.into_iter().rev() {
            let node = shell.close(&mut built);
            built.push(Arc::new(node));
        }
        Ok(Arc::new(root.close(&mut built)))
    }
}

impl Drop for NodeDocument {
    fn drop(&mut self) {
        let mut orphans: Vec<NodeDocument> = std::mem::take(&mut self.children)
            .into_iter()
            .flatten()
            .collect();
        while let Some(mut doc) = orphans.pop() {
            orphans.extend(std::mem::take(&mut doc.children).into_iter().flatten());
        }
    }
}

/// A document node whose children are still being converted
struct Shell {
    id: String,
    kind: NodeKind,
    label: String,
    /// Which slots hold a child, in slot order
    occupied: Vec<bool>,
}

impl Shell {
    /// Check `doc`'s children and queue them on `pending`, first slot on top
    fn open(
        mut doc: NodeDocument,
        pending: &mut Vec<NodeDocument>,
    ) -> Result<Self, DocumentError> {
        let mut children = std::mem::take(&mut doc.children);
        // Trailing holes carry no information.
        while matches!(children.last(), Some(None)) {
            children.pop();
        }
        let allowed = doc.kind.slot_count();
        if children.len() > allowed {
            return Err(DocumentError::TooManyChildren {
                id: std::mem::take(&mut doc.id),
                kind: doc.kind,
                found: children.len(),
                allowed,
            });
        }

        let occupied = children.iter().map(Option::is_some).collect();
        pending.extend(children.into_iter().rev().flatten());
        Ok(Self {
            id: std::mem::take(&mut doc.id),
            kind: doc.kind,
            label: std::mem::take(&mut doc.label),
            occupied,
        })
    }

    /// Build the node, popping finished children off `built` first slot first
    fn close(self, built: &mut Vec<NodeRef>) -> Node {
        let mut slots = self
            .occupied
            .into_iter()
            .map(|occupied| if occupied { built.pop() } else { None });
        let mut take = || slots.next().flatten();
        let body = match self.kind {
            NodeKind::Start => NodeBody::Start { next: take() },
            NodeKind::Action => NodeBody::Action { next: take() },
            NodeKind::Branch => {
                let on_true = take();
                let on_false = take();
                NodeBody::Branch { on_true, on_false }
            }
            NodeKind::End => NodeBody::End,
        };

        Node {
            id: self.id.into(),
            label: self.label,
            body,
        }
    }
}

impl From<&Tree> for NodeDocument {
    fn from(tree: &Tree) -> Self {
        let descendants: Vec<&NodeRef> = tree.walk().skip(1).collect();
        let mut built = Vec::new();
        for node in descendants.into_iter().rev() {
            let doc = NodeDocument::assemble(node, &mut built);
            built.push(doc);
        }
        NodeDocument::assemble(tree.root(), &mut built)
    }
}

impl From<Tree> for NodeDocument {
    fn from(tree: Tree) -> Self {
        NodeDocument::from(&tree)
    }
}

impl TryFrom<NodeDocument> for Tree {
    type Error = DocumentError;

    fn try_from(doc: NodeDocument) -> Result<Self, Self::Error> {
        let tree = Tree::new(doc.into_node()?);
        tree.validate()?;
        Ok(tree)
    }
}

// Serializers recurse once per nesting level, so depth is checked first.
impl Serialize for Tree {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let depth = self.depth();
        if depth > MAX_DEPTH {
            return Err(serde::ser::Error::custom(DocumentError::TooDeep {
                depth,
                limit: MAX_DEPTH,
            }));
        }
        NodeDocument::from(self).serialize(serializer)
    }
}
