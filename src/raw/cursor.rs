use core::borrow::Borrow;
use core::ops::Bound;

use smallvec::SmallVec;

use super::handle::{Handle, Link};
use super::raw_llrb_tree_map::RawLLRBTreeMap;

// A balanced tree over `u32` handles is never deeper than this, so the stacks
// stay inline.
type Stack = SmallVec<[Handle; 64]>;

/// In-order traversal state over a borrowed tree.
///
/// The front stack holds the ancestors still to be visited from the left, the
/// back stack those still to be visited from the right. `remaining` counts the
/// entries between the two ends, so the ends never cross.
#[derive(Clone, Debug)]
pub(crate) struct Cursor {
    front: Stack,
    back: Stack,
    remaining: usize,
}

impl Cursor {
    pub(crate) fn empty() -> Self {
        Self {
            front: Stack::new(),
            back: Stack::new(),
            remaining: 0,
        }
    }

    /// A cursor over every entry of `tree`.
    pub(crate) fn full<K, V>(tree: &RawLLRBTreeMap<K, V>) -> Self {
        let mut cursor = Self {
            front: Stack::new(),
            back: Stack::new(),
            remaining: tree.len(),
        };
        cursor.descend_left(tree, tree.root());
        cursor.descend_right(tree, tree.root());
        cursor
    }

    /// A cursor over the entries whose keys fall between `start` and `end`.
    ///
    /// The bounds must already be known to describe a non-inverted range.
    pub(crate) fn range<K, V, Q>(tree: &RawLLRBTreeMap<K, V>, start: Bound<&Q>, end: Bound<&Q>) -> Self
    where
        K: Borrow<Q> + Ord,
        Q: ?Sized + Ord,
    {
        let remaining = tree.rank_of_end(end).saturating_sub(tree.rank_of_start(start));
        if remaining == 0 {
            return Self::empty();
        }

        let mut front = Stack::new();
        let mut link = tree.root();
        while let Some(handle) = link {
            let node = tree.node(handle);
            let key: &Q = node.key().borrow();
            let at_or_after_start = match start {
                Bound::Included(bound) => key >= bound,
                Bound::Excluded(bound) => key > bound,
                Bound::Unbounded => true,
            };
            link = if at_or_after_start {
                front.push(handle);
                node.left()
            } else {
                node.right()
            };
        }

        let mut back = Stack::new();
        let mut link = tree.root();
        while let Some(handle) = link {
            let node = tree.node(handle);
            let key: &Q = node.key().borrow();
            let at_or_before_end = match end {
                Bound::Included(bound) => key <= bound,
                Bound::Excluded(bound) => key < bound,
                Bound::Unbounded => true,
            };
            link = if at_or_before_end {
                back.push(handle);
                node.right()
            } else {
                node.left()
            };
        }

        Self { front, back, remaining }
    }

    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.remaining
    }

    pub(crate) fn next<K, V>(&mut self, tree: &RawLLRBTreeMap<K, V>) -> Option<Handle> {
        if self.remaining == 0 {
            return None;
        }
        let handle = self.front.pop()?;
        self.descend_left(tree, tree.node(handle).right());
        self.remaining -= 1;
        Some(handle)
    }

    pub(crate) fn next_back<K, V>(&mut self, tree: &RawLLRBTreeMap<K, V>) -> Option<Handle> {
        if self.remaining == 0 {
            return None;
        }
        let handle = self.back.pop()?;
        self.descend_right(tree, tree.node(handle).left());
        self.remaining -= 1;
        Some(handle)
    }

    fn descend_left<K, V>(&mut self, tree: &RawLLRBTreeMap<K, V>, mut link: Link) {
        while let Some(handle) = link {
            self.front.push(handle);
            link = tree.node(handle).left();
        }
    }

    fn descend_right<K, V>(&mut self, tree: &RawLLRBTreeMap<K, V>, mut link: Link) {
        while let Some(handle) = link {
            self.back.push(handle);
            link = tree.node(handle).right();
        }
    }
}
