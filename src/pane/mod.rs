//! Pane management for split terminal support
//!
//! This module provides the pane infrastructure for split layouts:
//! - `Pane`: A leaf's payload (id + credentials)
//! - `PaneNode`: Persistent tree structure for nested pane splits
//! - `PaneManager`: Owns the tree, allocates ids and tracks focus
//! - `PaneId`: Unique identifier for each pane and container

mod manager;
mod types;

pub use manager::PaneManager;
pub use types::{Pane, PaneId, PaneNode, PaneTree, SplitDirection};
