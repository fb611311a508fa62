//! Core types for the pane system.
//!
//! This module defines the fundamental data structures for split panes:
//! - Persistent binary tree structure for arbitrary nesting
//! - Per-leaf pane payload (id + credentials)
//!
//! Sub-modules:
//! - [`common`]: `SplitDirection`, `PaneId` re-export
//! - [`pane`]: `Pane` leaf payload
//! - [`pane_node`]: `PaneNode` tree and its structural-sharing operations

mod common;
mod pane;
mod pane_node;

#[cfg(test)]
mod tests;

pub use common::{PaneId, SplitDirection};
pub use pane::Pane;
pub use pane_node::{PaneNode, PaneTree};
