use std::collections::BTreeMap;

use proptest::prelude::*;

use crate::collections::AvlTree;
use crate::error::Error;

/// Entry capacity used by the model tests; small enough that random
/// workloads regularly hit the pool-exhaustion path.
const CAPACITY: usize = 64;

/// AVL height bound: `ceil(1.44 * log2(n + 1))` plus slack for the
/// leaf-oriented layout (entries live one level below the routing nodes).
fn height_bound(entries: usize) -> u8 {
    (1.44 * ((entries + 1) as f64).log2()).ceil() as u8 + 2
}

#[derive(Clone, Debug)]
enum Op {
    Insert(u16, u32),
    Remove(u16),
    Get(u16),
}

fn ops_strategy() -> impl Strategy<Value = Vec<Op>> {
    // a narrow key space makes duplicate inserts and hits on removed
    // keys common
    let key = 0u16..256;
    let op = prop_oneof![
        5 => (key.clone(), any::<u32>()).prop_map(|(k, v)| Op::Insert(k, v)),
        3 => key.clone().prop_map(Op::Remove),
        2 => key.prop_map(Op::Get),
    ];
    prop::collection::vec(op, 0..=500)
}

proptest! {
    #[test]
    fn prop_matches_btreemap_model(ops in ops_strategy()) {
        let mut tree: AvlTree<u16, u32> = AvlTree::with_capacity(CAPACITY);
        let mut model: BTreeMap<u16, u32> = BTreeMap::new();

        for op in ops {
            match op {
                Op::Insert(key, value) => {
                    let result = tree.insert(key, value);
                    if model.contains_key(&key) {
                        prop_assert_eq!(result, Err(Error::DuplicateKey));
                    } else if model.len() == CAPACITY {
                        prop_assert_eq!(result, Err(Error::PoolExhausted));
                    } else {
                        prop_assert_eq!(result, Ok(()));
                        model.insert(key, value);
                    }
                }
                Op::Remove(key) => {
                    prop_assert_eq!(tree.remove(&key), model.remove(&key));
                }
                Op::Get(key) => {
                    prop_assert_eq!(tree.get(&key), model.get(&key));
                }
            }

            tree.validate();
            prop_assert_eq!(tree.len(), model.len());
            prop_assert!(tree.tree_height() <= height_bound(model.len()));
        }

        // every surviving entry is reachable, nothing else is
        for (key, value) in &model {
            prop_assert_eq!(tree.get(key), Some(value));
        }
        for key in 0u16..256 {
            prop_assert_eq!(tree.contains_key(&key), model.contains_key(&key));
        }
    }

    #[test]
    fn prop_sorted_fill_stays_within_height_bound(
        keys in prop::collection::btree_set(any::<u32>(), 1..512usize)
    ) {
        let mut tree: AvlTree<u32, usize> = AvlTree::with_capacity(keys.len());

        // sorted insertion order is the classic degenerate case for an
        // unbalanced tree
        for (position, key) in keys.iter().enumerate() {
            tree.insert(*key, position).unwrap();
        }

        tree.validate();
        prop_assert_eq!(tree.len(), keys.len());
        prop_assert!(tree.tree_height() <= height_bound(keys.len()));
    }

    #[test]
    fn prop_drain_refill_reuses_cells(
        keys in prop::collection::btree_set(any::<u16>(), 1..=CAPACITY)
    ) {
        let mut tree: AvlTree<u16, u16> = AvlTree::with_capacity(keys.len());

        for &key in &keys {
            tree.insert(key, key).unwrap();
        }
        for &key in &keys {
            prop_assert_eq!(tree.remove(&key), Some(key));
        }
        prop_assert!(tree.is_empty());
        tree.validate();

        // the pool must serve the same workload again from released cells
        for &key in &keys {
            tree.insert(key, key).unwrap();
        }
        prop_assert_eq!(tree.len(), keys.len());
        tree.validate();
    }
}
