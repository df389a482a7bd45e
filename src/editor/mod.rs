// SPDX-License-Identifier: MIT

pub mod config;
pub mod loader;
pub mod server;
pub mod session;

pub use session::{Editor, EditorSnapshot, SharedEditor};
