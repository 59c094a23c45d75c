pub mod avl_tree;
pub(crate) mod bst;

pub use avl_tree::AvlTree;
pub use bst::MAX_HEIGHT;
