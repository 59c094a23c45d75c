use std::mem;

use crate::collections::bst::{self, AncestorStack, Node, NodeId};
use crate::error::Error;
use crate::pool::Pool;

/// An ordered key/value map with all nodes drawn from a fixed-capacity
/// pool.
///
/// The tree is leaf-oriented: every entry lives in a leaf, and internal
/// nodes carry only a separator key and a cached subtree height. Insert
/// and remove descend once, mutate a constant-size region around the
/// affected leaf, then restore the AVL balance invariant (sibling
/// subtree heights differ by one at most) walking back up the recorded
/// ancestor path, performing at most one single or double rotation per
/// ancestor.
///
/// No operation allocates from the heap after construction: nodes come
/// from the pool, and the ancestor path is recorded in inline storage
/// bounded by [`MAX_HEIGHT`](crate::collections::MAX_HEIGHT).
///
/// A tree instance requires exclusive access; there is no internal
/// synchronization.
pub struct AvlTree<K, V> {
    /// Node cells, leaves and internal routing nodes alike.
    pool: Pool<Node<K, V>>,
    /// Root cell; `None` when the tree holds no entries.
    root: Option<NodeId>,
    /// Number of entries (leaves).
    len: usize,
    /// Maximum number of entries.
    capacity: usize,
}

impl<K, V> AvlTree<K, V> {
    /// Creates a tree that can hold up to `capacity` entries.
    ///
    /// The node pool is sized at construction: a leaf-oriented tree with
    /// `n` entries uses `n` leaves plus `n - 1` routing nodes, so the
    /// pool reserves `2 * capacity - 1` cells up front and never touches
    /// the heap again.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            pool: Pool::with_capacity(capacity.saturating_mul(2).saturating_sub(1)),
            root: None,
            len: 0,
            capacity,
        }
    }

    /// Returns the number of entries in the tree.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Indicates whether the tree is empty or not.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns the maximum number of entries the tree can hold.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Indicates whether the tree is full or not.
    pub fn is_full(&self) -> bool {
        self.len >= self.capacity
    }

    /// Removes every entry, returning all node cells to the pool in one
    /// step.
    pub fn clear(&mut self) {
        self.pool.clear();
        self.root = None;
        self.len = 0;
    }
}

impl<K: Ord + Clone, V> AvlTree<K, V> {
    /// Return the value under the specified key, if one is found.
    ///
    /// # Arguments
    ///
    /// * `key` - key to look up the value.
    pub fn get(&self, key: &K) -> Option<&V> {
        let id = bst::find(&self.pool, self.root?, key)?;
        match self.pool.get(id) {
            Node::Leaf { value, .. } => Some(value),
            Node::Internal { .. } => panic!("lookup ended on an internal node"),
        }
    }

    /// Return a mutable reference to the value under the specified key,
    /// if one is found.
    ///
    /// # Arguments
    ///
    /// * `key` - key to look up the value.
    pub fn get_mut(&mut self, key: &K) -> Option<&mut V> {
        let id = bst::find(&self.pool, self.root?, key)?;
        match self.pool.get_mut(id) {
            Node::Leaf { value, .. } => Some(value),
            Node::Internal { .. } => panic!("lookup ended on an internal node"),
        }
    }

    /// Checks whether a key is present in the tree or not.
    ///
    /// # Arguments
    ///
    /// * `key` - the key of the entry.
    pub fn contains_key(&self, key: &K) -> bool {
        match self.root {
            Some(root) => bst::find(&self.pool, root, key).is_some(),
            None => false,
        }
    }

    /// Inserts a value at the specified key.
    ///
    /// The candidate leaf found by the descent is split in place: two
    /// fresh cells carry the previous entry and the new one, and the
    /// candidate cell itself becomes their internal parent. When the new
    /// key is the larger of the two it also becomes the parent's
    /// separator; otherwise the previous key already satisfies the
    /// separator rule and stays.
    ///
    /// Fails with [`Error::DuplicateKey`] if the key is already present
    /// and with [`Error::PoolExhausted`] if the pool cannot supply the
    /// two cells; either way the tree is left untouched (the incoming
    /// `value` is dropped).
    pub fn insert(&mut self, key: K, value: V) -> Result<(), Error> {
        let root = match self.root {
            Some(root) => root,
            None => {
                let id = self.pool.acquire(Node::Leaf { key, value })?;
                self.root = Some(id);
                self.len = 1;
                return Ok(());
            }
        };

        let mut stack = AncestorStack::new();
        let candidate = bst::candidate_leaf(&self.pool, root, &key, &mut stack);

        // `Some(key)` carries the separator when the previous entry keeps
        // the larger key and the new leaf goes left.
        let demoted_separator = match self.pool.get(candidate) {
            Node::Leaf { key: existing, .. } => {
                if *existing == key {
                    return Err(Error::DuplicateKey);
                }
                if *existing < key {
                    None
                } else {
                    Some(existing.clone())
                }
            }
            Node::Internal { .. } => panic!("descent ended on an internal node"),
        };

        // both cells must be available before the candidate is touched,
        // so a failed acquisition leaves no partial mutation behind
        if self.pool.remaining() < 2 {
            return Err(Error::PoolExhausted);
        }

        let placeholder = Node::Internal {
            key: key.clone(),
            left: candidate,
            right: candidate,
            height: 1,
        };
        let (old_key, old_value) = match mem::replace(self.pool.get_mut(candidate), placeholder) {
            Node::Leaf { key, value } => (key, value),
            Node::Internal { .. } => panic!("descent ended on an internal node"),
        };

        let old_leaf = self.pool.acquire(Node::Leaf {
            key: old_key,
            value: old_value,
        })?;
        let new_leaf = self.pool.acquire(Node::Leaf { key, value })?;

        match self.pool.get_mut(candidate) {
            Node::Internal {
                key: separator,
                left,
                right,
                ..
            } => match demoted_separator {
                // separator is already the new (larger) key
                None => {
                    *left = old_leaf;
                    *right = new_leaf;
                }
                Some(previous_key) => {
                    *separator = previous_key;
                    *left = new_leaf;
                    *right = old_leaf;
                }
            },
            Node::Leaf { .. } => panic!("split candidate is not internal"),
        }

        self.rebalance(&mut stack);
        self.len += 1;
        Ok(())
    }

    /// Removes the entry under the specified key, returning its value.
    ///
    /// The matched leaf's parent absorbs the sibling subtree wholesale:
    /// the sibling's node moves into the parent cell (so the grandparent
    /// link stays valid) and both the matched leaf and the vacated
    /// sibling cell go back to the pool. Returns `None`, with no cells
    /// acquired or released, when the key is not present.
    pub fn remove(&mut self, key: &K) -> Option<V> {
        let root = self.root?;

        if self.pool.get(root).is_leaf() {
            if self.pool.get(root).key() != key {
                return None;
            }
            self.root = None;
            self.len = 0;
            return match self.pool.release(root) {
                Node::Leaf { value, .. } => Some(value),
                Node::Internal { .. } => panic!("single-entry root is not a leaf"),
            };
        }

        let mut stack = AncestorStack::new();
        let mut current = root;
        // both are overwritten on the first iteration: the root is
        // internal here
        let mut upper = root;
        let mut other = root;
        loop {
            let (go_left, left, right) = match self.pool.get(current) {
                Node::Internal {
                    key: separator,
                    left,
                    right,
                    ..
                } => (key < separator, *left, *right),
                Node::Leaf { .. } => break,
            };
            stack.push(current);
            upper = current;
            if go_left {
                current = left;
                other = right;
            } else {
                current = right;
                other = left;
            }
        }

        if self.pool.get(current).key() != key {
            return None;
        }

        let removed = match self.pool.release(current) {
            Node::Leaf { value, .. } => value,
            Node::Internal { .. } => panic!("matched node is not a leaf"),
        };

        // the parent becomes its surviving child wholesale; its height is
        // already correct, so it drops off the rebalance path
        stack.pop();
        let sibling = self.pool.release(other);
        *self.pool.get_mut(upper) = sibling;

        self.rebalance(&mut stack);
        self.len -= 1;
        Some(removed)
    }

    /// Restores the AVL invariant along a recorded ancestor path.
    ///
    /// Pops ancestors deepest-first. A balanced ancestor only has its
    /// cached height refreshed; an ancestor out of balance by two gets a
    /// single rotation when the outer grandchild subtree is the taller
    /// one, and a double rotation otherwise. Post-rotation heights follow
    /// the closed-form values for the rotation just performed rather than
    /// a generic recomputation. The walk stops as soon as an ancestor's
    /// height comes out unchanged, since nothing above it can have
    /// changed balance.
    fn rebalance(&mut self, stack: &mut AncestorStack) {
        while let Some(id) = stack.pop() {
            if self.pool.get(id).is_leaf() {
                // a collapsed parent can transiently sit on the path as a
                // leaf; its height is already exact
                continue;
            }
            let old_height = bst::height(&self.pool, id);
            let left = bst::left(&self.pool, id);
            let right = bst::right(&self.pool, id);
            let left_height = bst::height(&self.pool, left);
            let right_height = bst::height(&self.pool, right);

            if left_height == right_height + 2 {
                // left subtree is heavier
                let left_left = bst::left(&self.pool, left);
                if bst::height(&self.pool, left_left) == right_height + 1 {
                    // outer (left-left) grandchild is taller, rotate right
                    bst::rotate_right(&mut self.pool, id);
                    let new_right = bst::right(&self.pool, id);
                    let inner = bst::height(&self.pool, bst::left(&self.pool, new_right));
                    bst::set_height(&mut self.pool, new_right, inner + 1);
                    bst::set_height(&mut self.pool, id, inner + 2);
                } else {
                    // inner (left-right) grandchild is taller, rotate
                    // left below then right here
                    bst::rotate_left(&mut self.pool, left);
                    bst::rotate_right(&mut self.pool, id);
                    let new_left = bst::left(&self.pool, id);
                    let new_right = bst::right(&self.pool, id);
                    let base = bst::height(&self.pool, bst::left(&self.pool, new_left));
                    bst::set_height(&mut self.pool, new_left, base + 1);
                    bst::set_height(&mut self.pool, new_right, base + 1);
                    bst::set_height(&mut self.pool, id, base + 2);
                }
            } else if right_height == left_height + 2 {
                // right subtree is heavier
                let right_right = bst::right(&self.pool, right);
                if bst::height(&self.pool, right_right) == left_height + 1 {
                    // outer (right-right) grandchild is taller, rotate left
                    bst::rotate_left(&mut self.pool, id);
                    let new_left = bst::left(&self.pool, id);
                    let inner = bst::height(&self.pool, bst::right(&self.pool, new_left));
                    bst::set_height(&mut self.pool, new_left, inner + 1);
                    bst::set_height(&mut self.pool, id, inner + 2);
                } else {
                    // inner (right-left) grandchild is taller, rotate
                    // right below then left here
                    bst::rotate_right(&mut self.pool, right);
                    bst::rotate_left(&mut self.pool, id);
                    let new_left = bst::left(&self.pool, id);
                    let new_right = bst::right(&self.pool, id);
                    let base = bst::height(&self.pool, bst::right(&self.pool, new_right));
                    bst::set_height(&mut self.pool, new_left, base + 1);
                    bst::set_height(&mut self.pool, new_right, base + 1);
                    bst::set_height(&mut self.pool, id, base + 2);
                }
            } else {
                // within tolerance, refresh the cached height
                bst::set_height(&mut self.pool, id, 1 + left_height.max(right_height));
            }

            if bst::height(&self.pool, id) == old_height {
                // subtree height unchanged, every ancestor above is
                // already balanced
                break;
            }
        }
    }
}

#[cfg(test)]
impl<K: Ord + Clone, V> AvlTree<K, V> {
    /// Height of the whole tree (0 for empty or single-entry trees).
    pub(crate) fn tree_height(&self) -> u8 {
        match self.root {
            Some(root) => self.pool.get(root).height(),
            None => 0,
        }
    }

    /// Number of occupied node cells backing the tree.
    pub(crate) fn cells_in_use(&self) -> usize {
        self.pool.len()
    }

    /// Walks the whole tree, checking cached heights, the balance
    /// invariant, and separator ordering against a full recomputation.
    pub(crate) fn validate(&self) {
        match self.root {
            None => {
                assert_eq!(self.len, 0, "entry count out of sync");
                assert_eq!(self.pool.len(), 0, "cells leaked after emptying");
            }
            Some(root) => {
                let (cells, _, _, _) = self.validate_subtree(root);
                assert_eq!(cells, self.pool.len(), "unreachable cells leaked");
                // external-node shape: n entries, n - 1 routing nodes
                assert_eq!(cells + 1, self.len * 2, "entry count out of sync");
            }
        }
    }

    /// Returns `(cells, height, min key, max key)` for the subtree.
    fn validate_subtree(&self, id: NodeId) -> (usize, u8, &K, &K) {
        match self.pool.get(id) {
            Node::Leaf { key, .. } => (1, 0, key, key),
            Node::Internal {
                key,
                left,
                right,
                height,
            } => {
                let (left_cells, left_height, min, left_max) = self.validate_subtree(*left);
                let (right_cells, right_height, right_min, max) = self.validate_subtree(*right);
                assert!(left_max < key, "left subtree reaches the separator");
                assert!(right_min >= key, "right subtree falls below the separator");
                assert_eq!(
                    *height,
                    1 + left_height.max(right_height),
                    "stale cached height"
                );
                assert!(
                    left_height.abs_diff(right_height) <= 1,
                    "balance invariant violated"
                );
                (left_cells + right_cells + 1, *height, min, max)
            }
        }
    }
}
