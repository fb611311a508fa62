//! Focus and navigation operations for PaneManager
//!
//! Handles pane focus state, cycling through panes in tree order,
//! and closing panes with automatic focus transfer.

use super::PaneManager;
use crate::pane::types::{PaneId, PaneNode};

impl PaneManager {
    /// Close a pane by ID
    ///
    /// Returns the focused pane after the close, or `None` when nothing was
    /// closed (last remaining pane, unknown id, or a container id).
    pub fn close_pane(&mut self, id: PaneId) -> Option<PaneId> {
        crate::debug_info!("PANE_CLOSE", "close_pane called for pane {}", id);

        if !self.has_multiple_panes() {
            log::debug!("close ignored: pane {} is the last pane", id);
            return None;
        }

        let Some(new_root) = PaneNode::close_leaf(&self.root, id) else {
            crate::debug_info!("PANE_CLOSE", "Pane {} not found in tree", id);
            return None;
        };
        self.root = new_root;

        // If we closed the focused pane, focus the top-left one
        if self.focused_pane_id == id {
            let new_focus = self.root.first_leaf_id();
            crate::debug_info!(
                "PANE_CLOSE",
                "Closed focused pane {}, new focus: {}",
                id,
                new_focus
            );
            self.focused_pane_id = new_focus;
        }

        crate::debug_info!(
            "PANE_CLOSE",
            "Successfully closed pane {} ({} remaining)",
            id,
            self.pane_count()
        );
        Some(self.focused_pane_id)
    }

    /// Close the focused pane
    pub fn close_focused(&mut self) -> Option<PaneId> {
        self.close_pane(self.focused_pane_id)
    }

    /// Set focus to a specific pane
    pub fn focus_pane(&mut self, id: PaneId) -> bool {
        if self.get_pane(id).is_some() {
            self.focused_pane_id = id;
            true
        } else {
            log::debug!("focus ignored: pane {} not in tree", id);
            false
        }
    }

    /// Focus the next pane in tree order, wrapping around
    pub fn focus_next(&mut self) -> PaneId {
        self.cycle_focus(1)
    }

    /// Focus the previous pane in tree order, wrapping around
    pub fn focus_prev(&mut self) -> PaneId {
        let len = self.pane_count();
        self.cycle_focus(len.saturating_sub(1))
    }

    fn cycle_focus(&mut self, step: usize) -> PaneId {
        let ids = self.pane_ids();
        if let Some(pos) = ids.iter().position(|&id| id == self.focused_pane_id) {
            self.focused_pane_id = ids[(pos + step) % ids.len()];
        }
        self.focused_pane_id
    }

    /// Get the ID of the focused pane
    pub fn focused_pane_id(&self) -> PaneId {
        self.focused_pane_id
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::credentials::Credentials;
    use crate::pane::types::SplitDirection;

    fn manager() -> PaneManager {
        PaneManager::new(Arc::new(Credentials::new("h", "u", "k")))
    }

    #[test]
    fn close_last_pane_is_noop() {
        let mut pm = manager();
        let before = Arc::clone(pm.root());
        assert_eq!(pm.close_pane(1), None);
        assert!(Arc::ptr_eq(&before, pm.root()));
    }

    #[test]
    fn close_unfocused_keeps_focus() {
        let mut pm = manager();
        let b = pm.split(1, SplitDirection::Vertical).unwrap();
        let c = pm.split(b, SplitDirection::Horizontal).unwrap();
        assert_eq!(pm.focused_pane_id(), c);
        assert_eq!(pm.close_pane(1), Some(c));
        assert_eq!(pm.pane_ids(), vec![b, c]);
    }

    #[test]
    fn close_focused_moves_to_first_leaf() {
        let mut pm = manager();
        let b = pm.split(1, SplitDirection::Vertical).unwrap();
        assert_eq!(pm.close_focused(), Some(1));
        assert_eq!(pm.pane_ids(), vec![1]);
        assert!(pm.get_pane(b).is_none());
    }

    #[test]
    fn focus_cycles_in_tree_order() {
        let mut pm = manager();
        let b = pm.split(1, SplitDirection::Vertical).unwrap();
        let c = pm.split(1, SplitDirection::Horizontal).unwrap();
        // tree order: 1, c, b
        assert!(pm.focus_pane(1));
        assert_eq!(pm.focus_next(), c);
        assert_eq!(pm.focus_next(), b);
        assert_eq!(pm.focus_next(), 1);
        assert_eq!(pm.focus_prev(), b);
        assert!(!pm.focus_pane(999));
    }
}
