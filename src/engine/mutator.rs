// SPDX-License-Identifier: MIT

//! Tree edits
//!
//! Every edit takes a snapshot and returns a new one; the input is never
//! touched. Only the nodes on the path from the root to the edited node are
//! copied, all other subtrees are shared with the input snapshot.
//!
//! Targets are found with a pre-order search (slots in order, empty slots
//! skipped) and the first match wins.

use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::error::EditError;
use super::node::{Node, NodeBody, NodeId, NodeKind, NodeRef, Tree, MAX_DEPTH};

/// An edit requested by the presentation layer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum EditIntent {
    Add {
        parent_id: NodeId,
        kind: NodeKind,
        #[serde(default)]
        slot: Option<usize>,
    },
    Delete {
        node_id: NodeId,
    },
    Relabel {
        node_id: NodeId,
        label: String,
    },
}

/// Result of a successful add
#[derive(Debug, Clone)]
pub struct Added {
    pub tree: Tree,
    /// Id of the freshly created node
    pub id: NodeId,
}

/// Result of applying an [`EditIntent`]
#[derive(Debug, Clone)]
pub struct Applied {
    pub tree: Tree,
    /// Set when the edit created a node
    pub created: Option<NodeId>,
}

/// Apply any edit intent to `tree`
pub fn apply(tree: &Tree, intent: &EditIntent) -> Result<Applied, EditError> {
    match intent {
        EditIntent::Add {
            parent_id,
            kind,
            slot,
        } => add(tree, parent_id.as_str(), *kind, *slot).map(|added| Applied {
            tree: added.tree,
            created: Some(added.id),
        }),
        EditIntent::Delete { node_id } => delete(tree, node_id.as_str()).map(|tree| Applied {
            tree,
            created: None,
        }),
        EditIntent::Relabel { node_id, label } => {
            relabel(tree, node_id.as_str(), label.clone()).map(|tree| Applied {
                tree,
                created: None,
            })
        }
    }
}

/// Add a new node of `kind` under `parent_id`.
///
/// With an explicit `slot` the new node overwrites whatever occupied it.
/// Without one, a linear parent gets its only slot replaced (the previous
/// subtree is dropped) and a branch parent gets the slot after its last
/// occupied one.
///
/// Parents already at [`MAX_DEPTH`] accept no children.
pub fn add(
    tree: &Tree,
    parent_id: &str,
    kind: NodeKind,
    slot: Option<usize>,
) -> Result<Added, EditError> {
    let (path, parent) = locate(tree, parent_id)?;
    if path.len() >= MAX_DEPTH {
        return Err(EditError::TooDeep {
            parent: parent.id.clone(),
            limit: MAX_DEPTH,
        });
    }
    let slot = match slot {
        Some(slot) => slot,
        None => append_slot(parent)?,
    };

    let child = Node::new(kind);
    let id = child.id.clone();
    let updated = parent.with_slot(slot, Some(Arc::new(child)))?;
    log::debug!(
        "Added {} node '{}' to slot {} of '{}'",
        kind,
        id,
        slot,
        parent_id
    );

    Ok(Added {
        tree: splice(tree, &path, updated)?,
        id,
    })
}

/// Remove `node_id` from its parent slot.
///
/// The vacated slot is handed to the deleted node's heir: its next step, or
/// for a branch the true path if present, otherwise the false path. A
/// branch with both paths occupied loses its false path.
pub fn delete(tree: &Tree, node_id: &str) -> Result<Tree, EditError> {
    if node_id == NodeId::ROOT {
        return Err(EditError::RootDeletionRefused);
    }

    let (path, node) = locate(tree, node_id)?;
    let Some((&slot, parent_path)) = path.split_last() else {
        return Err(EditError::RootDeletionRefused);
    };
    let parent = tree
        .node_at(parent_path)
        .ok_or_else(|| EditError::TargetNotFound(NodeId::from(node_id)))?;

    if let NodeBody::Branch {
        on_true: Some(_),
        on_false: Some(lost),
    } = &node.body
    {
        log::debug!(
            "Deleting branch '{}' drops its false path starting at '{}'",
            node_id,
            lost.id
        );
    }

    let updated = parent.with_slot(slot, node.heir())?;
    splice(tree, parent_path, updated)
}

/// Replace the label of `node_id`, verbatim
pub fn relabel(tree: &Tree, node_id: &str, label: impl Into<String>) -> Result<Tree, EditError> {
    let (path, node) = locate(tree, node_id)?;
    splice(tree, &path, node.with_label(label))
}

/// First node in pre-order with the given id, along with its slot path
fn locate<'a>(tree: &'a Tree, id: &str) -> Result<(Vec<usize>, &'a NodeRef), EditError> {
    tree.path_to(id)
        .and_then(|path| tree.node_at(&path).map(|node| (path, node)))
        .ok_or_else(|| {
            log::debug!("No node with id '{}'", id);
            EditError::TargetNotFound(NodeId::from(id))
        })
}

fn append_slot(parent: &Node) -> Result<usize, EditError> {
    match &parent.body {
        NodeBody::Start { .. } | NodeBody::Action { .. } => Ok(0),
        NodeBody::Branch {
            on_false: Some(_), ..
        } => Err(EditError::BranchFull(parent.id.clone())),
        NodeBody::Branch {
            on_true: Some(_), ..
        } => Ok(1),
        NodeBody::Branch { .. } => Ok(0),
        NodeBody::End => Err(EditError::NoChildSlots(parent.id.clone())),
    }
}

/// Put `replacement` at `path` and copy every ancestor on the way back up
fn splice(tree: &Tree, path: &[usize], replacement: Node) -> Result<Tree, EditError> {
    let mut spine = Vec::with_capacity(path.len());
    let mut cursor = tree.root();
    for &slot in path {
        spine.push(cursor);
        cursor = cursor
            .slot(slot)
            .ok_or_else(|| EditError::TargetNotFound(replacement.id.clone()))?;
    }

    let mut current = replacement;
    for (ancestor, &slot) in spine.into_iter().zip(path).rev() {
        current = ancestor.with_slot(slot, Some(Arc::new(current)))?;
    }
    Ok(Tree::new(current))
}
