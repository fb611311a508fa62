//! Tests for PaneNode tree operations and SplitDirection.

use std::sync::Arc;

use super::common::SplitDirection;
use super::pane::Pane;
use super::pane_node::PaneNode;
use crate::credentials::Credentials;

fn creds() -> Arc<Credentials> {
    Arc::new(Credentials::new("10.0.0.1", "ubuntu", "secret"))
}

fn leaf(id: u64, creds: &Arc<Credentials>) -> Arc<PaneNode> {
    Arc::new(PaneNode::leaf(Pane::new(id, Arc::clone(creds))))
}

/// (1 | (2 / 3)) with container ids 10 and 11
fn sample_tree() -> Arc<PaneNode> {
    let c = creds();
    let inner = Arc::new(PaneNode::split(
        11,
        SplitDirection::Horizontal,
        leaf(2, &c),
        leaf(3, &c),
    ));
    Arc::new(PaneNode::split(10, SplitDirection::Vertical, leaf(1, &c), inner))
}

#[test]
fn test_split_direction_serializes_lowercase() {
    let json = serde_json::to_string(&SplitDirection::Horizontal).unwrap();
    assert_eq!(json, "\"horizontal\"");
    let dir: SplitDirection = serde_json::from_str("\"vertical\"").unwrap();
    assert_eq!(dir, SplitDirection::Vertical);
}

#[test]
fn test_count_and_order() {
    let tree = sample_tree();
    assert_eq!(tree.count_leaves(), 3);
    assert_eq!(tree.all_pane_ids(), vec![1, 2, 3]);
    assert_eq!(tree.first_leaf_id(), 1);
    assert_eq!(tree.max_id(), 11);
}

#[test]
fn test_find_parent_returns_sibling() {
    let tree = sample_tree();
    let (parent, sibling) = PaneNode::find_parent(&tree, 3).unwrap();
    assert_eq!(parent.id(), 11);
    assert_eq!(sibling.id(), 2);
    assert!(PaneNode::find_parent(&tree, 10).is_none());
}

#[test]
fn test_with_replaced_shares_untouched_subtrees() {
    let tree = sample_tree();
    let c = creds();
    let replaced = PaneNode::with_replaced(&tree, 3, leaf(42, &c)).unwrap();

    let PaneNode::Split { first: old_first, second: old_second, .. } = tree.as_ref() else {
        panic!("root should be a split");
    };
    let PaneNode::Split { first: new_first, second: new_second, .. } = replaced.as_ref() else {
        panic!("root should be a split");
    };
    assert!(Arc::ptr_eq(old_first, new_first));
    assert!(!Arc::ptr_eq(old_second, new_second));
    assert_eq!(replaced.all_pane_ids(), vec![1, 2, 42]);
    // Original is untouched
    assert_eq!(tree.all_pane_ids(), vec![1, 2, 3]);
}

#[test]
fn test_with_replaced_unknown_target() {
    let tree = sample_tree();
    assert!(PaneNode::with_replaced(&tree, 99, leaf(5, &creds())).is_none());
}

#[test]
fn test_split_leaf_keeps_original_leaf_reference() {
    let tree = sample_tree();
    let original = Arc::clone(PaneNode::find_node(&tree, 2).unwrap());

    let split = PaneNode::split_leaf(&tree, 2, SplitDirection::Vertical, 12, 13).unwrap();
    let container = PaneNode::find_node(&split, 12).unwrap();
    let PaneNode::Split { direction, first, second, .. } = container.as_ref() else {
        panic!("expected container");
    };
    assert_eq!(*direction, SplitDirection::Vertical);
    assert!(Arc::ptr_eq(first, &original));
    assert_eq!(second.id(), 13);

    let new_creds = &split.find_pane(13).unwrap().credentials;
    let old_creds = &split.find_pane(2).unwrap().credentials;
    assert!(Arc::ptr_eq(new_creds, old_creds));
}

#[test]
fn test_split_leaf_rejects_container_target() {
    let tree = sample_tree();
    assert!(PaneNode::split_leaf(&tree, 11, SplitDirection::Vertical, 12, 13).is_none());
}

#[test]
fn test_close_leaf_promotes_sibling_subtree_at_root() {
    let tree = sample_tree();
    let inner = Arc::clone(PaneNode::find_node(&tree, 11).unwrap());

    let closed = PaneNode::close_leaf(&tree, 1).unwrap();
    assert!(Arc::ptr_eq(&closed, &inner));
    assert_eq!(closed.count_leaves(), 2);
}

#[test]
fn test_close_leaf_collapses_nested_parent() {
    let tree = sample_tree();
    let kept_left = Arc::clone(PaneNode::find_node(&tree, 1).unwrap());

    let closed = PaneNode::close_leaf(&tree, 3).unwrap();
    assert_eq!(closed.all_pane_ids(), vec![1, 2]);
    assert!(closed.find_pane(3).is_none());
    assert!(PaneNode::find_node(&closed, 11).is_none());
    let (_, sibling) = PaneNode::find_parent(&closed, 2).unwrap();
    assert!(Arc::ptr_eq(sibling, &kept_left));
}

#[test]
fn test_close_leaf_single_leaf_rejected() {
    let single = leaf(1, &creds());
    assert!(PaneNode::close_leaf(&single, 1).is_none());
}

#[test]
fn test_close_leaf_rejects_container() {
    let tree = sample_tree();
    assert!(PaneNode::close_leaf(&tree, 11).is_none());
}
