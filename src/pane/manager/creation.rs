//! Pane creation operations for PaneManager
//!
//! Handles splitting an existing leaf into a container holding the original
//! leaf and a new pane with the same credentials.

use super::PaneManager;
use crate::pane::types::{PaneId, PaneNode, SplitDirection};

impl PaneManager {
    /// Split the leaf `target` in the given direction
    ///
    /// Returns the new pane's id, which also receives focus. Unknown or
    /// non-leaf targets are stale callers: logged and ignored, tree untouched.
    pub fn split(&mut self, target: PaneId, direction: SplitDirection) -> Option<PaneId> {
        crate::debug_info!(
            "PANE_SPLIT",
            "split called for pane {} direction={:?}",
            target,
            direction
        );

        if self.get_pane(target).is_none() {
            log::debug!("split ignored: pane {} is not a leaf in the tree", target);
            return None;
        }

        let container_id = self.allocate_id();
        let new_id = self.allocate_id();
        let new_root =
            PaneNode::split_leaf(&self.root, target, direction, container_id, new_id)?;
        self.root = new_root;
        self.focused_pane_id = new_id;

        crate::debug_info!(
            "PANE_SPLIT",
            "Split pane {} -> container {} with new pane {} ({} panes)",
            target,
            container_id,
            new_id,
            self.pane_count()
        );
        Some(new_id)
    }

    /// Split the focused pane
    pub fn split_focused(&mut self, direction: SplitDirection) -> Option<PaneId> {
        self.split(self.focused_pane_id, direction)
    }
}
