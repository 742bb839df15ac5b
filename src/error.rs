use thiserror::Error;

/// Errors reported by [`LLRBTreeMap`](crate::LLRBTreeMap) operations.
///
/// Every failing operation is rejected before the map is touched, so an `Err`
/// always leaves the map exactly as it was.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Error)]
pub enum MapError {
    /// The operation needs at least one entry (`min_key`, `max_key`, `delete_min`, `delete_max`).
    #[error("operation requires a non-empty map")]
    EmptyMap,

    /// A rank passed to `select` was not in `0..len`.
    #[error("rank {index} is out of range for a map of length {len}")]
    IndexOutOfRange {
        /// The requested rank.
        index: usize,
        /// The number of entries in the map.
        len: usize,
    },

    /// [`validate`](crate::LLRBTreeMap::validate) found a broken tree invariant.
    #[error("tree invariant violated: {0}")]
    InvariantViolation(#[from] Violation),
}

/// A red-black tree invariant that does not hold.
///
/// These never occur through the public API; they exist so that
/// [`validate`](crate::LLRBTreeMap::validate) can say what went wrong.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Error)]
pub enum Violation {
    /// The root link is red.
    #[error("root link is red")]
    RedRoot,

    /// A node has a red right link.
    #[error("red link leans right")]
    RightLeaningRed,

    /// A red node has a red left child.
    #[error("two red links in a row")]
    ConsecutiveReds,

    /// Two root-to-leaf paths cross a different number of black links.
    #[error("black height differs: left {left}, right {right}")]
    UnbalancedBlackHeight {
        /// Black height of the left subtree.
        left: usize,
        /// Black height of the right subtree.
        right: usize,
    },

    /// A key is outside the interval its ancestors allow.
    #[error("keys are not in symmetric order")]
    KeysOutOfOrder,

    /// A stored subtree size disagrees with the number of nodes in the subtree.
    #[error("subtree size mismatch: stored {stored}, actual {actual}")]
    SizeMismatch {
        /// The size recorded on the node.
        stored: usize,
        /// The size obtained by counting.
        actual: usize,
    },
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use alloc::string::ToString;

    #[test]
    fn messages() {
        assert_eq!(MapError::EmptyMap.to_string(), "operation requires a non-empty map");
        assert_eq!(
            MapError::IndexOutOfRange { index: 7, len: 3 }.to_string(),
            "rank 7 is out of range for a map of length 3"
        );
        assert_eq!(
            MapError::from(Violation::UnbalancedBlackHeight { left: 2, right: 3 }).to_string(),
            "tree invariant violated: black height differs: left 2, right 3"
        );
    }

    #[test]
    fn violation_converts_into_map_error() {
        let err: MapError = Violation::RedRoot.into();
        assert_eq!(err, MapError::InvariantViolation(Violation::RedRoot));
    }
}
