//! Binary-search-tree primitives shared by the pool-backed trees.
//!
//! The trees in this crate are leaf-oriented: every stored entry lives in
//! a leaf, and internal nodes are pure routing structure carrying a
//! separator key. This module owns the node representation, the descent
//! that locates a key's leaf, the bounded ancestor stack recorded along
//! the way, and the in-place rotations. Balancing policy lives with the
//! tree itself.

use smallvec::SmallVec;

use crate::pool::{Pool, PoolIndex};

/// Index of a node cell inside the tree's pool.
pub(crate) type NodeId = PoolIndex;

/// Maximum supported tree height.
///
/// Bounds the ancestor stack recorded during descent. An AVL tree would
/// need on the order of 2^92 entries to reach this height, so exceeding
/// it means the balance invariant was already broken.
pub const MAX_HEIGHT: usize = 128;

/// A node of a leaf-oriented tree.
///
/// Entries live only in leaves. An internal node routes lookups with a
/// separator key: every key in its left subtree is strictly less than the
/// separator, every key in its right subtree is greater than or equal to
/// it. The cached height is 0 for a leaf (implicit in the variant) and
/// `1 + max(left, right)` for an internal node.
pub(crate) enum Node<K, V> {
    Leaf {
        key: K,
        value: V,
    },
    Internal {
        key: K,
        left: NodeId,
        right: NodeId,
        height: u8,
    },
}

impl<K, V> Node<K, V> {
    pub(crate) fn is_leaf(&self) -> bool {
        matches!(self, Node::Leaf { .. })
    }

    pub(crate) fn key(&self) -> &K {
        match self {
            Node::Leaf { key, .. } => key,
            Node::Internal { key, .. } => key,
        }
    }

    pub(crate) fn height(&self) -> u8 {
        match self {
            Node::Leaf { .. } => 0,
            Node::Internal { height, .. } => *height,
        }
    }
}

/// Returns the cached height of a node, 0 for a leaf.
pub(crate) fn height<K, V>(pool: &Pool<Node<K, V>>, id: NodeId) -> u8 {
    pool.get(id).height()
}

/// Returns the left child of an internal node.
///
/// # Panics
///
/// Panics if `id` refers to a leaf.
pub(crate) fn left<K, V>(pool: &Pool<Node<K, V>>, id: NodeId) -> NodeId {
    match pool.get(id) {
        Node::Internal { left, .. } => *left,
        Node::Leaf { .. } => panic!("leaf node has no children"),
    }
}

/// Returns the right child of an internal node.
///
/// # Panics
///
/// Panics if `id` refers to a leaf.
pub(crate) fn right<K, V>(pool: &Pool<Node<K, V>>, id: NodeId) -> NodeId {
    match pool.get(id) {
        Node::Internal { right, .. } => *right,
        Node::Leaf { .. } => panic!("leaf node has no children"),
    }
}

/// Overwrites the cached height of an internal node.
///
/// # Panics
///
/// Panics if `id` refers to a leaf.
pub(crate) fn set_height<K, V>(pool: &mut Pool<Node<K, V>>, id: NodeId, new_height: u8) {
    match pool.get_mut(id) {
        Node::Internal { height, .. } => *height = new_height,
        Node::Leaf { .. } => panic!("leaf node has no cached height"),
    }
}

/// The record of internal nodes visited during a descent, consumed
/// bottom-up while rebalancing.
///
/// Capacity is bounded by [`MAX_HEIGHT`]; the backing storage is inline,
/// so a descent never touches the heap.
pub(crate) struct AncestorStack {
    entries: SmallVec<[NodeId; MAX_HEIGHT]>,
}

impl AncestorStack {
    pub(crate) fn new() -> Self {
        Self {
            entries: SmallVec::new(),
        }
    }

    /// # Panics
    ///
    /// Panics when the stack already holds [`MAX_HEIGHT`] entries; a
    /// descent that deep means the height invariant no longer holds.
    pub(crate) fn push(&mut self, id: NodeId) {
        assert!(
            self.entries.len() < MAX_HEIGHT,
            "tree height exceeds MAX_HEIGHT; height invariant violated"
        );
        self.entries.push(id);
    }

    pub(crate) fn pop(&mut self) -> Option<NodeId> {
        self.entries.pop()
    }
}

/// Walks from `root` to the leaf where `key` resides or would reside,
/// pushing every internal node passed through onto `stack`.
pub(crate) fn candidate_leaf<K: Ord, V>(
    pool: &Pool<Node<K, V>>,
    root: NodeId,
    key: &K,
    stack: &mut AncestorStack,
) -> NodeId {
    let mut current = root;
    loop {
        match pool.get(current) {
            Node::Internal {
                key: separator,
                left,
                right,
                ..
            } => {
                stack.push(current);
                current = if key < separator { *left } else { *right };
            }
            Node::Leaf { .. } => return current,
        }
    }
}

/// Point lookup: returns the leaf holding `key`, if present.
pub(crate) fn find<K: Ord, V>(pool: &Pool<Node<K, V>>, root: NodeId, key: &K) -> Option<NodeId> {
    let mut current = root;
    loop {
        match pool.get(current) {
            Node::Internal {
                key: separator,
                left,
                right,
                ..
            } => {
                current = if key < separator { *left } else { *right };
            }
            Node::Leaf { key: leaf_key, .. } => {
                return (leaf_key == key).then_some(current);
            }
        }
    }
}

/// Rotates the subtree rooted at `id` to the left.
///
/// The subtree root stays in cell `id` (so the parent's child link never
/// needs patching) and the vacated right-child cell is reused as the new
/// left child, by swapping the two cells' contents and restitching two
/// links. In-order key order is preserved. Cached heights are left to the
/// caller, which knows the closed-form values for the rotation it just
/// performed.
///
/// # Panics
///
/// Panics unless `id` and its right child are both internal.
pub(crate) fn rotate_left<K, V>(pool: &mut Pool<Node<K, V>>, id: NodeId) {
    let old_right = right(pool, id);
    let right_left = left(pool, old_right);

    pool.swap(id, old_right);
    match pool.get_mut(id) {
        Node::Internal { left, .. } => *left = old_right,
        Node::Leaf { .. } => panic!("rotated a leaf node"),
    }
    match pool.get_mut(old_right) {
        Node::Internal { right, .. } => *right = right_left,
        Node::Leaf { .. } => panic!("rotated around a leaf child"),
    }
}

/// Rotates the subtree rooted at `id` to the right.
///
/// Mirror image of [`rotate_left`]: the root stays in cell `id` and the
/// vacated left-child cell becomes the new right child.
///
/// # Panics
///
/// Panics unless `id` and its left child are both internal.
pub(crate) fn rotate_right<K, V>(pool: &mut Pool<Node<K, V>>, id: NodeId) {
    let old_left = left(pool, id);
    let left_right = right(pool, old_left);

    pool.swap(id, old_left);
    match pool.get_mut(id) {
        Node::Internal { right, .. } => *right = old_left,
        Node::Leaf { .. } => panic!("rotated a leaf node"),
    }
    match pool.get_mut(old_left) {
        Node::Internal { left, .. } => *left = left_right,
        Node::Leaf { .. } => panic!("rotated around a leaf child"),
    }
}
