//! Layout persistence
//!
//! The pane tree is stored with credentials stripped: only ids, split
//! directions and shape survive. On startup the stored shape is rehydrated
//! with the *current* credentials on every leaf, or discarded once it is
//! older than the expiry window.
//!
//! Two keys are written on every tree mutation:
//! - [`LAYOUT_KEY`]: the stripped tree as JSON
//! - [`SAVED_AT_KEY`]: write time in milliseconds since the Unix epoch

mod storage;

pub use storage::{FileStore, LayoutError, LayoutStore, MemoryStore};

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::credentials::Credentials;
use crate::pane::{Pane, PaneId, PaneNode, PaneTree, SplitDirection};

pub const LAYOUT_KEY: &str = "par-mux.layout";
pub const SAVED_AT_KEY: &str = "par-mux.layout.saved_at";

/// Largest id a stored layout may carry.
///
/// The id counter resumes past the restored maximum and must not wrap.
pub const MAX_STORED_ID: PaneId = u32::MAX as PaneId;

/// Credential-free pane tree node
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum LayoutNode {
    Leaf {
        id: PaneId,
    },
    Split {
        id: PaneId,
        direction: SplitDirection,
        first: Box<LayoutNode>,
        second: Box<LayoutNode>,
    },
}

impl LayoutNode {
    /// Capture the shape of `node`, dropping credentials
    pub fn strip(node: &PaneNode) -> Self {
        match node {
            PaneNode::Leaf(pane) => LayoutNode::Leaf { id: pane.id },
            PaneNode::Split {
                id,
                direction,
                first,
                second,
            } => LayoutNode::Split {
                id: *id,
                direction: *direction,
                first: Box::new(Self::strip(first)),
                second: Box::new(Self::strip(second)),
            },
        }
    }

    /// Rebuild a live tree, attaching `credentials` to every leaf.
    ///
    /// Fails when two nodes share an id or an id exceeds [`MAX_STORED_ID`].
    pub fn rehydrate(&self, credentials: &Arc<Credentials>) -> Result<PaneTree, LayoutError> {
        let mut seen = HashSet::new();
        self.rehydrate_inner(credentials, &mut seen)
    }

    fn rehydrate_inner(
        &self,
        credentials: &Arc<Credentials>,
        seen: &mut HashSet<PaneId>,
    ) -> Result<PaneTree, LayoutError> {
        if self.id() > MAX_STORED_ID {
            return Err(LayoutError::Malformed(format!("id {} out of range", self.id())));
        }
        if !seen.insert(self.id()) {
            return Err(LayoutError::Malformed(format!("duplicate id {}", self.id())));
        }
        Ok(match self {
            LayoutNode::Leaf { id } => {
                Arc::new(PaneNode::leaf(Pane::new(*id, Arc::clone(credentials))))
            }
            LayoutNode::Split {
                id,
                direction,
                first,
                second,
            } => Arc::new(PaneNode::split(
                *id,
                *direction,
                first.rehydrate_inner(credentials, seen)?,
                second.rehydrate_inner(credentials, seen)?,
            )),
        })
    }

    pub fn id(&self) -> PaneId {
        match self {
            LayoutNode::Leaf { id } | LayoutNode::Split { id, .. } => *id,
        }
    }
}

/// Saves and restores the pane layout through a [`LayoutStore`]
pub struct LayoutPersistence {
    store: Box<dyn LayoutStore>,
    expiry: Duration,
}

impl LayoutPersistence {
    pub fn new(store: Box<dyn LayoutStore>, expiry: Duration) -> Self {
        Self { store, expiry }
    }

    /// Write the stripped tree and the current time
    pub fn save(&mut self, tree: &PaneNode) -> Result<(), LayoutError> {
        self.save_at(tree, chrono::Utc::now().timestamp_millis())
    }

    pub fn save_at(&mut self, tree: &PaneNode, now_ms: i64) -> Result<(), LayoutError> {
        let json = serde_json::to_string(&LayoutNode::strip(tree))?;
        self.store.set(LAYOUT_KEY, &json)?;
        self.store.set(SAVED_AT_KEY, &now_ms.to_string())?;
        crate::debug_log!("LAYOUT", "saved layout ({} bytes)", json.len());
        Ok(())
    }

    /// Read the stored layout if present and fresh
    pub fn load(&mut self) -> Option<LayoutNode> {
        self.load_at(chrono::Utc::now().timestamp_millis())
    }

    /// Like [`load`](Self::load) with an explicit clock.
    ///
    /// Expired, malformed or unreadable layouts are removed and treated as absent.
    pub fn load_at(&mut self, now_ms: i64) -> Option<LayoutNode> {
        match self.read(now_ms) {
            Ok(Some(layout)) => Some(layout),
            Ok(None) => None,
            Err(err) => {
                log::warn!("Discarding stored layout: {}", err);
                self.clear_quietly();
                None
            }
        }
    }

    fn read(&mut self, now_ms: i64) -> Result<Option<LayoutNode>, LayoutError> {
        let Some(json) = self.store.get(LAYOUT_KEY)? else {
            return Ok(None);
        };
        let saved_at: i64 = self
            .store
            .get(SAVED_AT_KEY)?
            .ok_or_else(|| LayoutError::Malformed("missing timestamp".to_string()))?
            .trim()
            .parse()
            .map_err(|e| LayoutError::Malformed(format!("bad timestamp: {e}")))?;

        if saved_at > now_ms {
            return Err(LayoutError::Malformed(format!(
                "timestamp {saved_at} is in the future"
            )));
        }
        let age_ms = now_ms - saved_at;
        if age_ms > self.expiry.as_millis() as i64 {
            log::info!("Stored layout expired ({} s old)", age_ms / 1000);
            self.clear_quietly();
            return Ok(None);
        }

        let layout: LayoutNode = serde_json::from_str(&json)?;
        Ok(Some(layout))
    }

    /// Remove both keys
    pub fn clear(&mut self) -> Result<(), LayoutError> {
        self.store.remove(LAYOUT_KEY)?;
        self.store.remove(SAVED_AT_KEY)?;
        Ok(())
    }

    fn clear_quietly(&mut self) {
        if let Err(err) = self.clear() {
            log::warn!("Failed to clear stored layout: {}", err);
        }
    }

    /// Stored tree rehydrated with `credentials`, if any is usable
    pub fn restore(&mut self, credentials: &Arc<Credentials>) -> Option<PaneTree> {
        let layout = self.load()?;
        self.rehydrate_or_discard(&layout, credentials)
    }

    pub fn restore_at(&mut self, credentials: &Arc<Credentials>, now_ms: i64) -> Option<PaneTree> {
        let layout = self.load_at(now_ms)?;
        self.rehydrate_or_discard(&layout, credentials)
    }

    fn rehydrate_or_discard(
        &mut self,
        layout: &LayoutNode,
        credentials: &Arc<Credentials>,
    ) -> Option<PaneTree> {
        match layout.rehydrate(credentials) {
            Ok(tree) => {
                log::info!("Restored layout with {} panes", tree.count_leaves());
                Some(tree)
            }
            Err(err) => {
                log::warn!("Discarding stored layout: {}", err);
                self.clear_quietly();
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn creds(user: &str) -> Arc<Credentials> {
        Arc::new(Credentials::new("10.0.0.9", user, "k"))
    }

    fn persistence() -> LayoutPersistence {
        LayoutPersistence::new(Box::new(MemoryStore::new()), Duration::from_secs(60))
    }

    fn two_pane_tree() -> PaneTree {
        let c = creds("old");
        Arc::new(PaneNode::split(
            2,
            SplitDirection::Horizontal,
            Arc::new(PaneNode::leaf(Pane::new(1, Arc::clone(&c)))),
            Arc::new(PaneNode::leaf(Pane::new(3, c))),
        ))
    }

    #[test]
    fn stored_json_has_no_credentials() {
        let json = serde_json::to_string(&LayoutNode::strip(&two_pane_tree())).unwrap();
        assert!(!json.contains("old"));
        assert!(!json.contains("10.0.0.9"));
        assert!(json.contains("\"horizontal\""));
    }

    #[test]
    fn fresh_layout_is_restored_with_current_credentials() {
        let mut p = persistence();
        p.save_at(&two_pane_tree(), 1_000).unwrap();

        let current = creds("new");
        let tree = p.restore_at(&current, 30_000).unwrap();
        assert_eq!(tree.all_pane_ids(), vec![1, 3]);
        for pane in tree.all_panes() {
            assert!(Arc::ptr_eq(&pane.credentials, &current));
        }
    }

    #[test]
    fn expired_layout_is_discarded_and_removed() {
        let mut p = persistence();
        p.save_at(&two_pane_tree(), 0).unwrap();
        assert!(p.load_at(61_000).is_none());
        // Removed, so even a "younger" clock finds nothing
        assert!(p.load_at(1_000).is_none());
    }

    #[test]
    fn duplicate_ids_are_malformed() {
        let layout = LayoutNode::Split {
            id: 1,
            direction: SplitDirection::Vertical,
            first: Box::new(LayoutNode::Leaf { id: 1 }),
            second: Box::new(LayoutNode::Leaf { id: 2 }),
        };
        assert!(matches!(
            layout.rehydrate(&creds("u")),
            Err(LayoutError::Malformed(_))
        ));
    }

    #[test]
    fn out_of_range_id_is_malformed() {
        let layout = LayoutNode::Split {
            id: 2,
            direction: SplitDirection::Horizontal,
            first: Box::new(LayoutNode::Leaf { id: 1 }),
            second: Box::new(LayoutNode::Leaf { id: PaneId::MAX }),
        };
        assert!(matches!(
            layout.rehydrate(&creds("u")),
            Err(LayoutError::Malformed(_))
        ));
        assert!(LayoutNode::Leaf { id: MAX_STORED_ID }.rehydrate(&creds("u")).is_ok());
    }

    #[test]
    fn future_timestamp_is_discarded() {
        let mut p = persistence();
        p.save_at(&two_pane_tree(), 9_999_999_999_999).unwrap();
        assert!(p.load_at(1_000_000).is_none());
        // Removed rather than left for a later clock
        assert!(p.load_at(9_999_999_999_999).is_none());
    }

    #[test]
    fn garbage_blob_is_absent() {
        let mut store = MemoryStore::new();
        store.set(LAYOUT_KEY, "not json").unwrap();
        store.set(SAVED_AT_KEY, "0").unwrap();
        let mut p = LayoutPersistence::new(Box::new(store), Duration::from_secs(60));
        assert!(p.load_at(0).is_none());
    }
}
