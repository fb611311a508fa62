//! `PaneNode`: persistent binary tree for arbitrary pane nesting.
//!
//! Nodes are immutable and shared through `Arc`. Every mutation goes through
//! [`PaneNode::with_replaced`], which rebuilds only the root-to-target path
//! and hands back every other subtree by the same `Arc`.

use std::sync::Arc;

use super::common::{PaneId, SplitDirection};
use super::pane::Pane;

/// Shared handle to the root of a pane tree.
pub type PaneTree = Arc<PaneNode>;

/// Tree node for pane layout
///
/// The pane tree is a binary tree where:
/// - Leaf nodes carry a pane (id + credentials)
/// - Split nodes carry an id, a split direction and exactly two children
#[derive(Debug)]
pub enum PaneNode {
    /// A leaf node containing a pane
    Leaf(Pane),
    /// A split containing two child nodes, laid out 50/50
    Split {
        /// Container identifier, allocated from the same counter as panes
        id: PaneId,
        /// Direction of the split
        direction: SplitDirection,
        /// First child (top for horizontal, left for vertical); the original content
        first: Arc<PaneNode>,
        /// Second child (bottom for horizontal, right for vertical); the new content
        second: Arc<PaneNode>,
    },
}

impl PaneNode {
    /// Create a new leaf node with a pane
    pub fn leaf(pane: Pane) -> Self {
        PaneNode::Leaf(pane)
    }

    /// Create a new split node
    pub fn split(
        id: PaneId,
        direction: SplitDirection,
        first: Arc<PaneNode>,
        second: Arc<PaneNode>,
    ) -> Self {
        PaneNode::Split {
            id,
            direction,
            first,
            second,
        }
    }

    /// Id of this node, leaf or container.
    pub fn id(&self) -> PaneId {
        match self {
            PaneNode::Leaf(pane) => pane.id,
            PaneNode::Split { id, .. } => *id,
        }
    }

    /// Check if this is a leaf node
    pub fn is_leaf(&self) -> bool {
        matches!(self, PaneNode::Leaf(_))
    }

    /// Get the pane if this is a leaf node
    pub fn as_pane(&self) -> Option<&Pane> {
        match self {
            PaneNode::Leaf(pane) => Some(pane),
            PaneNode::Split { .. } => None,
        }
    }

    /// Find a pane by ID (recursive)
    pub fn find_pane(&self, id: PaneId) -> Option<&Pane> {
        match self {
            PaneNode::Leaf(pane) => (pane.id == id).then_some(pane),
            PaneNode::Split { first, second, .. } => {
                first.find_pane(id).or_else(|| second.find_pane(id))
            }
        }
    }

    /// Find the shared handle of the node with `id`, leaf or container.
    pub fn find_node(node: &Arc<PaneNode>, id: PaneId) -> Option<&Arc<PaneNode>> {
        if node.id() == id {
            return Some(node);
        }
        match node.as_ref() {
            PaneNode::Leaf(_) => None,
            PaneNode::Split { first, second, .. } => {
                Self::find_node(first, id).or_else(|| Self::find_node(second, id))
            }
        }
    }

    /// Find the container whose direct child is `id`, together with the other child.
    ///
    /// Returns `(parent, sibling)`.
    pub fn find_parent(
        node: &Arc<PaneNode>,
        id: PaneId,
    ) -> Option<(&Arc<PaneNode>, &Arc<PaneNode>)> {
        match node.as_ref() {
            PaneNode::Leaf(_) => None,
            PaneNode::Split { first, second, .. } => {
                if first.id() == id {
                    Some((node, second))
                } else if second.id() == id {
                    Some((node, first))
                } else {
                    Self::find_parent(first, id).or_else(|| Self::find_parent(second, id))
                }
            }
        }
    }

    /// Replace the node with id `target` by `replacement`.
    ///
    /// Only the ancestors of `target` are reallocated; all other subtrees are
    /// shared with `node`. Returns `None` when `target` is not in the tree.
    pub fn with_replaced(
        node: &Arc<PaneNode>,
        target: PaneId,
        replacement: Arc<PaneNode>,
    ) -> Option<Arc<PaneNode>> {
        if node.id() == target {
            return Some(replacement);
        }
        match node.as_ref() {
            PaneNode::Leaf(_) => None,
            PaneNode::Split {
                id,
                direction,
                first,
                second,
            } => {
                if let Some(new_first) = Self::with_replaced(first, target, replacement.clone()) {
                    return Some(Arc::new(PaneNode::split(
                        *id,
                        *direction,
                        new_first,
                        Arc::clone(second),
                    )));
                }
                let new_second = Self::with_replaced(second, target, replacement)?;
                Some(Arc::new(PaneNode::split(
                    *id,
                    *direction,
                    Arc::clone(first),
                    new_second,
                )))
            }
        }
    }

    /// Split the leaf `target` along `direction`.
    ///
    /// The leaf itself becomes the first child (same `Arc`), a new leaf with
    /// id `new_leaf_id` and the same credentials becomes the second, and the
    /// container takes `container_id`. `None` if `target` is not a leaf.
    pub fn split_leaf(
        root: &Arc<PaneNode>,
        target: PaneId,
        direction: SplitDirection,
        container_id: PaneId,
        new_leaf_id: PaneId,
    ) -> Option<Arc<PaneNode>> {
        let leaf = Self::find_node(root, target)?;
        let pane = leaf.as_pane()?;
        let new_leaf = Arc::new(PaneNode::leaf(Pane::new(
            new_leaf_id,
            Arc::clone(&pane.credentials),
        )));
        let container = Arc::new(PaneNode::split(
            container_id,
            direction,
            Arc::clone(leaf),
            new_leaf,
        ));
        Self::with_replaced(root, target, container)
    }

    /// Remove the leaf `target`, splicing its sibling into the parent's place.
    ///
    /// When the parent is the root, the sibling becomes the new root.
    /// `None` if `target` is not a leaf or the tree has a single leaf.
    pub fn close_leaf(root: &Arc<PaneNode>, target: PaneId) -> Option<Arc<PaneNode>> {
        if !Self::find_node(root, target)?.is_leaf() {
            return None;
        }
        let (parent, sibling) = Self::find_parent(root, target)?;
        Self::with_replaced(root, parent.id(), Arc::clone(sibling))
    }

    /// Number of leaves in this subtree
    pub fn count_leaves(&self) -> usize {
        match self {
            PaneNode::Leaf(_) => 1,
            PaneNode::Split { first, second, .. } => first.count_leaves() + second.count_leaves(),
        }
    }

    /// Get all pane IDs in this subtree, first child before second
    pub fn all_pane_ids(&self) -> Vec<PaneId> {
        match self {
            PaneNode::Leaf(pane) => vec![pane.id],
            PaneNode::Split { first, second, .. } => {
                let mut ids = first.all_pane_ids();
                ids.extend(second.all_pane_ids());
                ids
            }
        }
    }

    /// Get all panes in this subtree
    pub fn all_panes(&self) -> Vec<&Pane> {
        match self {
            PaneNode::Leaf(pane) => vec![pane],
            PaneNode::Split { first, second, .. } => {
                let mut panes = first.all_panes();
                panes.extend(second.all_panes());
                panes
            }
        }
    }

    /// The leaf reached by always descending into the first child.
    pub fn first_leaf_id(&self) -> PaneId {
        match self {
            PaneNode::Leaf(pane) => pane.id,
            PaneNode::Split { first, .. } => first.first_leaf_id(),
        }
    }

    /// Largest id used by any node in this subtree
    pub fn max_id(&self) -> PaneId {
        match self {
            PaneNode::Leaf(pane) => pane.id,
            PaneNode::Split {
                id, first, second, ..
            } => (*id).max(first.max_id()).max(second.max_id()),
        }
    }
}
