//! Pool-allocated ordered collections for allocation-constrained
//! environments.
//!
//! Every node of the containers in this crate is drawn from a
//! fixed-capacity [`pool`](crate::pool) reserved at construction time,
//! so no operation touches the general heap afterwards. The flagship
//! container is [`AvlTree`](crate::collections::AvlTree), an ordered map
//! with logarithmic insert, lookup, and removal that rebalances
//! iteratively over a bounded ancestor stack instead of recursing.
//!
//! # Example
//!
//! ```
//! use rooted::collections::AvlTree;
//!
//! let mut tree: AvlTree<u32, &str> = AvlTree::with_capacity(8);
//!
//! tree.insert(1, "one").unwrap();
//! tree.insert(2, "two").unwrap();
//!
//! assert_eq!(tree.get(&1), Some(&"one"));
//! assert_eq!(tree.remove(&2), Some("two"));
//! assert_eq!(tree.get(&2), None);
//! ```

pub mod collections;
pub mod error;
pub mod pool;

pub use error::Error;

#[cfg(test)]
mod proptests;
