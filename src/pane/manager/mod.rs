//! Pane manager owning the pane tree of one multiplexer
//!
//! The PaneManager owns the pane tree and provides operations for:
//! - Splitting panes horizontally and vertically
//! - Closing panes
//! - Navigating between panes
//! - Restoring a tree rebuilt from a stored layout
//!
//! Sub-modules:
//! - [`creation`]: Pane creation and tree manipulation (initial pane, split).
//! - [`focus`]: Focus management, navigation and close with focus transfer.
//! - [`restore`]: Adopting a rehydrated tree.

mod creation;
mod focus;
mod restore;

use std::sync::Arc;

use crate::credentials::Credentials;
use crate::pane::types::{Pane, PaneId, PaneNode, PaneTree};

/// Manages the pane tree
///
/// The tree is replaced wholesale on every mutation; callers holding an old
/// root keep a complete, consistent snapshot.
#[derive(Debug)]
pub struct PaneManager {
    /// Root of the pane tree (always at least one leaf)
    pub(super) root: PaneTree,
    /// ID of the currently focused pane
    pub(super) focused_pane_id: PaneId,
    /// Counter for generating unique pane IDs
    pub(super) next_pane_id: PaneId,
}

impl PaneManager {
    /// Create a pane manager with a single pane using `credentials`
    pub fn new(credentials: Arc<Credentials>) -> Self {
        let id = 1;
        Self {
            root: Arc::new(PaneNode::leaf(Pane::new(id, credentials))),
            focused_pane_id: id,
            next_pane_id: id + 1,
        }
    }

    /// Get the next pane ID that will be assigned
    pub fn next_pane_id(&self) -> PaneId {
        self.next_pane_id
    }

    pub(super) fn allocate_id(&mut self) -> PaneId {
        let id = self.next_pane_id;
        self.next_pane_id += 1;
        id
    }

    /// Get a pane by ID
    pub fn get_pane(&self, id: PaneId) -> Option<&Pane> {
        self.root.find_pane(id)
    }

    /// Get all panes, first child before second
    pub fn all_panes(&self) -> Vec<&Pane> {
        self.root.all_panes()
    }

    /// Ids of every leaf in tree order
    pub fn pane_ids(&self) -> Vec<PaneId> {
        self.root.all_pane_ids()
    }

    /// Get the number of panes
    pub fn pane_count(&self) -> usize {
        self.root.count_leaves()
    }

    /// Check if there are multiple panes
    pub fn has_multiple_panes(&self) -> bool {
        self.pane_count() > 1
    }

    /// Current root of the tree
    pub fn root(&self) -> &PaneTree {
        &self.root
    }
}
