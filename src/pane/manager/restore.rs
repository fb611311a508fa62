//! Restore operations for PaneManager
//!
//! Adopts a tree rebuilt from a stored layout and moves the id counter past
//! every id it contains so new splits never collide with restored panes.

use super::PaneManager;
use crate::pane::types::PaneTree;

impl PaneManager {
    /// Build a manager around an existing tree, focusing its first leaf
    ///
    /// Returns `None` when the tree's largest id leaves no room for new ones.
    pub fn from_tree(root: PaneTree) -> Option<Self> {
        let focused_pane_id = root.first_leaf_id();
        let Some(next_pane_id) = root.max_id().checked_add(1) else {
            log::warn!("restored tree exhausts the pane id range");
            return None;
        };
        crate::debug_info!(
            "PANE_RESTORE",
            "Restored {} panes, next id {}",
            root.count_leaves(),
            next_pane_id
        );
        Some(Self {
            root,
            focused_pane_id,
            next_pane_id,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::credentials::Credentials;
    use crate::pane::types::{Pane, PaneId, PaneNode, SplitDirection};

    #[test]
    fn counter_advances_past_restored_ids() {
        let c = Arc::new(Credentials::new("h", "u", "k"));
        let root = Arc::new(PaneNode::split(
            4,
            SplitDirection::Vertical,
            Arc::new(PaneNode::leaf(Pane::new(9, Arc::clone(&c)))),
            Arc::new(PaneNode::leaf(Pane::new(5, c))),
        ));
        let mut pm = PaneManager::from_tree(root).unwrap();
        assert_eq!(pm.focused_pane_id(), 9);
        assert_eq!(pm.next_pane_id(), 10);
        let new_id = pm.split(5, SplitDirection::Horizontal).unwrap();
        assert_eq!(new_id, 11);
    }

    #[test]
    fn tree_at_id_ceiling_is_rejected() {
        let c = Arc::new(Credentials::new("h", "u", "k"));
        let root = Arc::new(PaneNode::leaf(Pane::new(PaneId::MAX, c)));
        assert!(PaneManager::from_tree(root).is_none());
    }
}
