// SPDX-License-Identifier: MIT

//! Workflow tree engine
//!
//! This module provides:
//! - `Tree` / `Node` - immutable, structurally shared workflow snapshots
//! - `mutator` - add, delete and relabel edits producing new snapshots
//! - `History` - linear undo/redo log of snapshots

pub mod document;
pub mod error;
pub mod history;
pub mod mutator;
pub mod node;

pub use document::NodeDocument;
pub use error::{DocumentError, EditError, FlowError, HistoryMove};
pub use history::History;
pub use mutator::{Added, Applied, EditIntent};
pub use node::{Node, NodeBody, NodeId, NodeKind, NodeRef, Tree, MAX_DEPTH};
