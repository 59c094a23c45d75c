use thiserror::Error;

/// Recoverable failures reported by the tree's mutating operations.
///
/// Structural invariant violations (a vacant pool slot reached through a
/// live node, an ancestor stack deeper than [`MAX_HEIGHT`]) are not part
/// of this taxonomy: continuing past them would corrupt the tree, so they
/// panic instead.
///
/// [`MAX_HEIGHT`]: crate::collections::MAX_HEIGHT
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Error {
    /// The key is already present in the tree; nothing was modified.
    #[error("key is already present")]
    DuplicateKey,

    /// The node pool has no free cells left; nothing was modified.
    #[error("node pool exhausted")]
    PoolExhausted,
}
