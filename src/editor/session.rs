// SPDX-License-Identifier: MIT

//! Editor session - the command interface driven by the presentation layer
//!
//! Every mutating call computes a new snapshot and commits it in one step.
//! A refused edit commits nothing, so history only ever holds snapshots that
//! some edit actually produced.

use serde::Serialize;
use std::sync::Arc;
use tokio::sync::{Mutex, MutexGuard};

use crate::engine::mutator::{self, EditIntent};
use crate::engine::{EditError, History, NodeId, NodeKind, Tree};

/// Read-only view of the editor state handed to renderers
#[derive(Debug, Clone, Serialize)]
pub struct EditorSnapshot {
    pub workflow: Tree,
    pub can_undo: bool,
    pub can_redo: bool,
    pub position: usize,
    pub entries: usize,
}

/// Single-owner editor over a linear history of workflow trees
#[derive(Debug, Clone)]
pub struct Editor {
    history: History<Tree>,
}

impl Editor {
    /// Editor seeded with the default one-node workflow
    pub fn new() -> Self {
        Self::with_tree(Tree::initial())
    }

    /// Editor seeded with an existing workflow
    pub fn with_tree(tree: Tree) -> Self {
        Self {
            history: History::new(tree),
        }
    }

    /// Apply an edit intent and commit the result.
    ///
    /// Returns the id of the created node for adds.
    pub fn apply(&mut self, intent: &EditIntent) -> Result<Option<NodeId>, EditError> {
        match mutator::apply(self.history.current(), intent) {
            Ok(applied) => {
                self.history.commit(applied.tree);
                log::info!(
                    "Committed {:?} as history entry {}",
                    intent,
                    self.history.position()
                );
                Ok(applied.created)
            }
            Err(e) => {
                log::debug!("Edit {:?} left the workflow unchanged: {}", intent, e);
                Err(e)
            }
        }
    }

    pub fn add_node(
        &mut self,
        parent_id: &str,
        kind: NodeKind,
        slot: Option<usize>,
    ) -> Result<NodeId, EditError> {
        let created = self.apply(&EditIntent::Add {
            parent_id: NodeId::from(parent_id),
            kind,
            slot,
        })?;
        created.ok_or_else(|| EditError::TargetNotFound(NodeId::from(parent_id)))
    }

    pub fn delete_node(&mut self, node_id: &str) -> Result<(), EditError> {
        self.apply(&EditIntent::Delete {
            node_id: NodeId::from(node_id),
        })
        .map(|_| ())
    }

    pub fn update_label(
        &mut self,
        node_id: &str,
        label: impl Into<String>,
    ) -> Result<(), EditError> {
        self.apply(&EditIntent::Relabel {
            node_id: NodeId::from(node_id),
            label: label.into(),
        })
        .map(|_| ())
    }

    pub fn undo(&mut self) -> Result<&Tree, EditError> {
        self.history.undo()?;
        log::debug!("Undo to entry {}", self.history.position());
        Ok(self.history.current())
    }

    pub fn redo(&mut self) -> Result<&Tree, EditError> {
        self.history.redo()?;
        log::debug!("Redo to entry {}", self.history.position());
        Ok(self.history.current())
    }

    /// The snapshot to render
    pub fn current(&self) -> &Tree {
        self.history.current()
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    pub fn history(&self) -> &History<Tree> {
        &self.history
    }

    pub fn snapshot(&self) -> EditorSnapshot {
        EditorSnapshot {
            workflow: self.current().clone(),
            can_undo: self.can_undo(),
            can_redo: self.can_redo(),
            position: self.history.position(),
            entries: self.history.len(),
        }
    }
}

impl Default for Editor {
    fn default() -> Self {
        Self::new()
    }
}

/// Editor shared between concurrent callers.
///
/// Commits read and then write the history, so every call holds the lock
/// for its whole duration.
#[derive(Clone)]
pub struct SharedEditor {
    inner: Arc<Mutex<Editor>>,
}

impl SharedEditor {
    pub fn new(editor: Editor) -> Self {
        Self {
            inner: Arc::new(Mutex::new(editor)),
        }
    }

    /// Exclusive access for callers that need several steps under one lock
    pub async fn lock(&self) -> MutexGuard<'_, Editor> {
        self.inner.lock().await
    }

    pub async fn apply(&self, intent: &EditIntent) -> Result<Option<NodeId>, EditError> {
        self.inner.lock().await.apply(intent)
    }

    pub async fn undo(&self) -> Result<(), EditError> {
        self.inner.lock().await.undo().map(|_| ())
    }

    pub async fn redo(&self) -> Result<(), EditError> {
        self.inner.lock().await.redo().map(|_| ())
    }

    pub async fn snapshot(&self) -> EditorSnapshot {
        self.inner.lock().await.snapshot()
    }
}

impl Default for SharedEditor {
    fn default() -> Self {
        Self::new(Editor::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fresh_editor() {
        let editor = Editor::new();
        assert_eq!(editor.current(), &Tree::initial());
        assert!(!editor.can_undo());
        assert!(!editor.can_redo());
    }

    #[test]
    fn test_one_commit_enables_undo() {
        let mut editor = Editor::new();
        editor.add_node("root", NodeKind::Action, None).unwrap();
        assert!(editor.can_undo());
        assert!(!editor.can_redo());
    }

    #[test]
    fn test_refused_edit_commits_nothing() {
        let mut editor = Editor::new();
        let before = editor.current().clone();

        assert_eq!(
            editor.delete_node("root"),
            Err(EditError::RootDeletionRefused)
        );
        assert!(editor.update_label("ghost", "x").is_err());
        assert!(editor.add_node("ghost", NodeKind::End, None).is_err());

        assert_eq!(editor.history().len(), 1);
        assert_eq!(editor.current(), &before);
        assert!(!editor.can_undo());
    }

    #[test]
    fn test_undo_redo_move_between_snapshots() {
        let mut editor = Editor::new();
        let id = editor.add_node("root", NodeKind::Action, None).unwrap();
        editor.update_label(id.as_str(), "Send email").unwrap();

        let previous = editor.undo().unwrap();
        assert_eq!(previous.find(id.as_str()).unwrap().label, "New Step");
        let next = editor.redo().unwrap();
        assert_eq!(next.find(id.as_str()).unwrap().label, "Send email");
        assert!(editor.redo().is_err());
    }

    #[test]
    fn test_edit_after_undo_drops_redo_tail() {
        let mut editor = Editor::new();
        let a = editor.add_node("root", NodeKind::Action, None).unwrap();
        editor.undo().unwrap();
        let b = editor.add_node("root", NodeKind::End, None).unwrap();

        assert!(!editor.can_redo());
        assert_eq!(editor.history().len(), 2);
        assert!(editor.current().contains(b.as_str()));
        assert!(!editor
            .history()
            .entries()
            .iter()
            .any(|tree| tree.contains(a.as_str())));
    }

    #[test]
    fn test_snapshot_serializes() {
        let mut editor = Editor::new();
        editor.add_node("root", NodeKind::Branch, None).unwrap();
        let value = serde_json::to_value(editor.snapshot()).unwrap();
        assert_eq!(value["can_undo"], true);
        assert_eq!(value["can_redo"], false);
        assert_eq!(value["position"], 1);
        assert_eq!(value["entries"], 2);
        assert_eq!(value["workflow"]["children"][0]["type"], "branch");
    }

    #[tokio::test]
    async fn test_shared_editor_serializes_callers() {
        let shared = SharedEditor::default();
        let mut handles = Vec::new();
        for i in 0..16 {
            let shared = shared.clone();
            handles.push(tokio::spawn(async move {
                shared
                    .apply(&EditIntent::Relabel {
                        node_id: NodeId::root(),
                        label: format!("label {}", i),
                    })
                    .await
            }));
        }
        for handle in handles {
            assert!(handle.await.unwrap().is_ok());
        }

        let snapshot = shared.snapshot().await;
        assert_eq!(snapshot.entries, 17);
        assert_eq!(snapshot.position, 16);
    }

    #[tokio::test]
    async fn test_shared_editor_undo_redo() {
        let shared = SharedEditor::default();
        assert!(shared.undo().await.is_err());
        shared
            .apply(&EditIntent::Add {
                parent_id: NodeId::root(),
                kind: NodeKind::End,
                slot: None,
            })
            .await
            .unwrap();
        shared.undo().await.unwrap();
        assert!(shared.snapshot().await.can_redo);
        shared.redo().await.unwrap();
        assert!(!shared.lock().await.can_redo());
    }
}
