use alloc::vec::Vec;
use core::borrow::Borrow;
use core::cmp::Ordering;
use core::ops::Bound;

use smallvec::SmallVec;

use super::arena::Arena;
use super::handle::{Handle, Link};
use super::node::{Color, Node};
use super::size::Size;
use crate::error::Violation;

/// The left-leaning red-black tree backing `LLRBTreeMap`.
///
/// Every routine that restructures a subtree takes the handle of the subtree's
/// root and returns the handle of its (possibly different) new root; callers
/// must store the returned handle in the parent link.
pub(crate) struct RawLLRBTreeMap<K, V> {
    /// Arena storing all tree nodes.
    nodes: Arena<Node<K, V>>,
    /// Handle to the root node, if the tree is non-empty.
    root: Link,
}

/// Shape measurements collected while validating a tree.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) struct TreeShape {
    pub(crate) len: usize,
    pub(crate) height: usize,
    pub(crate) black_height: usize,
}

impl<K, V> RawLLRBTreeMap<K, V> {
    /// Creates a new, empty tree.
    pub(crate) const fn new() -> Self {
        Self {
            nodes: Arena::new(),
            root: None,
        }
    }

    /// Creates a new tree with room for `capacity` nodes.
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            nodes: Arena::with_capacity(capacity),
            root: None,
        }
    }

    /// Returns the number of key-value pairs, read from the root's size counter.
    pub(crate) fn len(&self) -> usize {
        self.link_size(self.root)
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    pub(crate) fn capacity(&self) -> usize {
        self.nodes.capacity()
    }

    pub(crate) fn clear(&mut self) {
        trace_event!(len = self.len(), "clearing tree");
        self.nodes.clear();
        self.root = None;
    }

    pub(crate) fn root(&self) -> Link {
        self.root
    }

    pub(crate) fn node(&self, handle: Handle) -> &Node<K, V> {
        self.nodes.get(handle)
    }

    /// Moves every entry out in ascending key order, leaving the tree empty.
    pub(crate) fn drain_to_vec(&mut self) -> Vec<(K, V)> {
        let mut result = Vec::with_capacity(self.len());
        let mut stack: SmallVec<[Handle; 64]> = SmallVec::new();
        let mut link = self.root.take();

        loop {
            while let Some(handle) = link {
                stack.push(handle);
                link = self.nodes.get(handle).left();
            }
            let Some(handle) = stack.pop() else {
                break;
            };
            let node = self.nodes.take(handle);
            link = node.right();
            result.push(node.into_entry());
        }

        debug_assert!(self.nodes.is_empty(), "`RawLLRBTreeMap::drain_to_vec()` - nodes left behind!");
        self.nodes.clear();
        result
    }

    /// Returns the number of nodes on the longest root-to-leaf path.
    pub(crate) fn height(&self) -> usize {
        self.link_height(self.root)
    }

    fn link_height(&self, link: Link) -> usize {
        link.map_or(0, |handle| {
            let node = self.nodes.get(handle);
            1 + self.link_height(node.left()).max(self.link_height(node.right()))
        })
    }

    /// Returns the leftmost node.
    pub(crate) fn first(&self) -> Link {
        let mut current = self.root?;
        while let Some(left) = self.nodes.get(current).left() {
            current = left;
        }
        Some(current)
    }

    /// Returns the rightmost node.
    pub(crate) fn last(&self) -> Link {
        let mut current = self.root?;
        while let Some(right) = self.nodes.get(current).right() {
            current = right;
        }
        Some(current)
    }

    // ─── Link helpers ───────────────────────────────────────────────────────

    #[inline]
    fn link_size(&self, link: Link) -> usize {
        link.map_or(0, |handle| self.nodes.get(handle).size().to_usize())
    }

    /// Empty links are black.
    #[inline]
    fn is_red(&self, link: Link) -> bool {
        link.is_some_and(|handle| self.nodes.get(handle).is_red())
    }

    #[inline]
    fn left_of(&self, handle: Handle) -> Link {
        self.nodes.get(handle).left()
    }

    #[inline]
    fn right_of(&self, handle: Handle) -> Link {
        self.nodes.get(handle).right()
    }

    /// Left child of the node behind `link`, if both exist.
    #[inline]
    fn left_of_link(&self, link: Link) -> Link {
        link.and_then(|handle| self.left_of(handle))
    }

    fn update_size(&mut self, handle: Handle) {
        let node = self.nodes.get(handle);
        let size = Size::of_children(self.link_size(node.left()), self.link_size(node.right()));
        self.nodes.get_mut(handle).set_size(size);
    }

    fn set_root_color(&mut self, color: Color) {
        if let Some(root) = self.root {
            self.nodes.get_mut(root).set_color(color);
        }
    }

    /// Colors the root red when both of its children are black, so that deletion
    /// can borrow a red link from the very top.
    fn redden_root_for_delete(&mut self) {
        if let Some(root) = self.root
            && !self.is_red(self.left_of(root))
            && !self.is_red(self.right_of(root))
        {
            self.nodes.get_mut(root).set_color(Color::Red);
        }
    }

    // ─── Elementary operations ──────────────────────────────────────────────

    //          h                       x
    //         / \                     / \
    //        a  (x)        =>       (h)  c
    //           / \                 / \
    //          b   c               a   b
    fn rotate_left(&mut self, handle: Handle) -> Handle {
        let x = self
            .right_of(handle)
            .expect("`RawLLRBTreeMap::rotate_left()` - node has no right child!");
        debug_assert!(self.nodes.get(x).is_red(), "`RawLLRBTreeMap::rotate_left()` - right link is not red!");

        let (color, size) = {
            let node = self.nodes.get(handle);
            (node.color(), node.size())
        };
        let inner = self.left_of(x);

        let node = self.nodes.get_mut(handle);
        node.set_right(inner);
        node.set_color(Color::Red);

        let promoted = self.nodes.get_mut(x);
        promoted.set_left(Some(handle));
        promoted.set_color(color);
        promoted.set_size(size);

        self.update_size(handle);
        x
    }

    //          h                   x
    //         / \                 / \
    //       (x)  c      =>       a  (h)
    //       / \                     / \
    //      a   b                   b   c
    fn rotate_right(&mut self, handle: Handle) -> Handle {
        let x = self
            .left_of(handle)
            .expect("`RawLLRBTreeMap::rotate_right()` - node has no left child!");
        debug_assert!(self.nodes.get(x).is_red(), "`RawLLRBTreeMap::rotate_right()` - left link is not red!");

        let (color, size) = {
            let node = self.nodes.get(handle);
            (node.color(), node.size())
        };
        let inner = self.right_of(x);

        let node = self.nodes.get_mut(handle);
        node.set_left(inner);
        node.set_color(Color::Red);

        let promoted = self.nodes.get_mut(x);
        promoted.set_right(Some(handle));
        promoted.set_color(color);
        promoted.set_size(size);

        self.update_size(handle);
        x
    }

    /// Toggles the colors of a node and both of its children.
    ///
    /// Black node over two red children splits a temporary 4-node; red node over
    /// two black children is the reverse flip deletion uses to borrow a link.
    fn flip_colors(&mut self, handle: Handle) {
        let left = self
            .left_of(handle)
            .expect("`RawLLRBTreeMap::flip_colors()` - node has no left child!");
        let right = self
            .right_of(handle)
            .expect("`RawLLRBTreeMap::flip_colors()` - node has no right child!");
        debug_assert_eq!(
            self.nodes.get(left).color(),
            self.nodes.get(right).color(),
            "`RawLLRBTreeMap::flip_colors()` - children have different colors!"
        );

        self.nodes.get_mut(handle).flip_color();
        self.nodes.get_mut(left).flip_color();
        self.nodes.get_mut(right).flip_color();
    }

    /// Restores the left-leaning shape on the way back up and refreshes the size.
    ///
    /// The three fixups run in this order at every node on the return path of
    /// both insertion and deletion.
    fn balance(&mut self, mut handle: Handle) -> Handle {
        if self.is_red(self.right_of(handle)) && !self.is_red(self.left_of(handle)) {
            handle = self.rotate_left(handle);
        }
        if self.is_red(self.left_of(handle)) && self.is_red(self.left_of_link(self.left_of(handle))) {
            handle = self.rotate_right(handle);
        }
        if self.is_red(self.left_of(handle)) && self.is_red(self.right_of(handle)) {
            self.flip_colors(handle);
        }
        self.update_size(handle);
        handle
    }

    /// Makes `h.left` or one of its children red, assuming `h` is red and both
    /// `h.left` and `h.left.left` are black.
    fn move_red_left(&mut self, mut handle: Handle) -> Handle {
        self.flip_colors(handle);
        let right = self
            .right_of(handle)
            .expect("`RawLLRBTreeMap::move_red_left()` - node has no right child!");
        if self.is_red(self.left_of(right)) {
            let right = self.rotate_right(right);
            self.nodes.get_mut(handle).set_right(Some(right));
            handle = self.rotate_left(handle);
            self.flip_colors(handle);
        }
        handle
    }

    /// Makes `h.right` or one of its children red, assuming `h` is red and both
    /// `h.right` and `h.right.left` are black.
    fn move_red_right(&mut self, mut handle: Handle) -> Handle {
        self.flip_colors(handle);
        if self.is_red(self.left_of_link(self.left_of(handle))) {
            handle = self.rotate_right(handle);
            self.flip_colors(handle);
        }
        handle
    }

    // ─── Deletion at the ends ───────────────────────────────────────────────

    /// Removes and returns the first (smallest) entry.
    pub(crate) fn pop_first(&mut self) -> Option<(K, V)> {
        self.redden_root_for_delete();
        let root = self.root.take()?;
        let (root, entry) = self.delete_min(root);
        self.root = root;
        self.set_root_color(Color::Black);
        trace_event!(len = self.len(), "removed first entry");
        Some(entry)
    }

    /// Removes and returns the last (largest) entry.
    pub(crate) fn pop_last(&mut self) -> Option<(K, V)> {
        self.redden_root_for_delete();
        let root = self.root.take()?;
        let (root, entry) = self.delete_max(root);
        self.root = root;
        self.set_root_color(Color::Black);
        trace_event!(len = self.len(), "removed last entry");
        Some(entry)
    }

    fn delete_min(&mut self, mut handle: Handle) -> (Link, (K, V)) {
        let Some(left) = self.left_of(handle) else {
            let node = self.nodes.take(handle);
            return (node.right(), node.into_entry());
        };

        if !self.is_red(Some(left)) && !self.is_red(self.left_of(left)) {
            handle = self.move_red_left(handle);
        }

        let left = self
            .left_of(handle)
            .expect("`RawLLRBTreeMap::delete_min()` - left subtree vanished!");
        let (left, entry) = self.delete_min(left);
        self.nodes.get_mut(handle).set_left(left);
        (Some(self.balance(handle)), entry)
    }

    fn delete_max(&mut self, mut handle: Handle) -> (Link, (K, V)) {
        if self.is_red(self.left_of(handle)) {
            handle = self.rotate_right(handle);
        }

        let Some(right) = self.right_of(handle) else {
            let node = self.nodes.take(handle);
            return (node.left(), node.into_entry());
        };

        if !self.is_red(Some(right)) && !self.is_red(self.left_of(right)) {
            handle = self.move_red_right(handle);
        }

        let right = self
            .right_of(handle)
            .expect("`RawLLRBTreeMap::delete_max()` - right subtree vanished!");
        let (right, entry) = self.delete_max(right);
        self.nodes.get_mut(handle).set_right(right);
        (Some(self.balance(handle)), entry)
    }
}

impl<K: Ord, V> RawLLRBTreeMap<K, V> {
    // ─── Lookup ─────────────────────────────────────────────────────────────

    /// Returns the node holding `key`, if any.
    pub(crate) fn search<Q>(&self, key: &Q) -> Link
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        let mut current = self.root;
        while let Some(handle) = current {
            let node = self.nodes.get(handle);
            current = match key.cmp(node.key().borrow()) {
                Ordering::Less => node.left(),
                Ordering::Greater => node.right(),
                Ordering::Equal => return Some(handle),
            };
        }
        None
    }

    pub(crate) fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.search(key).map(|handle| self.nodes.get(handle).value())
    }

    pub(crate) fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        let handle = self.search(key)?;
        Some(self.nodes.get_mut(handle).value_mut())
    }

    pub(crate) fn get_key_value<Q>(&self, key: &Q) -> Option<(&K, &V)>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.search(key).map(|handle| {
            let node = self.nodes.get(handle);
            (node.key(), node.value())
        })
    }

    pub(crate) fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.search(key).is_some()
    }

    // ─── Insertion ──────────────────────────────────────────────────────────

    /// Inserts a key-value pair. Returns the old value if the key was already present,
    /// in which case the stored key is kept.
    pub(crate) fn insert(&mut self, key: K, value: V) -> Option<V> {
        let (root, old_value) = self.put(self.root, key, value);
        self.root = Some(root);
        self.set_root_color(Color::Black);
        if old_value.is_none() {
            trace_event!(len = self.len(), "inserted new key");
        } else {
            trace_event!(len = self.len(), "overwrote value of existing key");
        }
        old_value
    }

    fn put(&mut self, link: Link, key: K, value: V) -> (Handle, Option<V>) {
        let Some(handle) = link else {
            return (self.nodes.alloc(Node::new(key, value)), None);
        };

        let ordering = key.cmp(self.nodes.get(handle).key());
        let old_value = match ordering {
            Ordering::Less => {
                let (left, old_value) = self.put(self.left_of(handle), key, value);
                self.nodes.get_mut(handle).set_left(Some(left));
                old_value
            }
            Ordering::Greater => {
                let (right, old_value) = self.put(self.right_of(handle), key, value);
                self.nodes.get_mut(handle).set_right(Some(right));
                old_value
            }
            Ordering::Equal => Some(core::mem::replace(self.nodes.get_mut(handle).value_mut(), value)),
        };

        (self.balance(handle), old_value)
    }

    // ─── Deletion by key ────────────────────────────────────────────────────

    /// Removes `key` and returns its entry. An absent key leaves the tree untouched.
    pub(crate) fn remove_entry<Q>(&mut self, key: &Q) -> Option<(K, V)>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        // The top-down borrowing below assumes the key is present.
        if !self.contains_key(key) {
            return None;
        }

        self.redden_root_for_delete();
        let root = self.root.take()?;
        let (root, entry) = self.delete(root, key);
        self.root = root;
        self.set_root_color(Color::Black);
        trace_event!(len = self.len(), "removed key");
        Some(entry)
    }

    fn delete<Q>(&mut self, mut handle: Handle, key: &Q) -> (Link, (K, V))
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        if key.cmp(self.nodes.get(handle).key().borrow()) == Ordering::Less {
            let left = self
                .left_of(handle)
                .expect("`RawLLRBTreeMap::delete()` - key missing from left subtree!");
            if !self.is_red(Some(left)) && !self.is_red(self.left_of(left)) {
                handle = self.move_red_left(handle);
            }
            let left = self
                .left_of(handle)
                .expect("`RawLLRBTreeMap::delete()` - left subtree vanished!");
            let (left, entry) = self.delete(left, key);
            self.nodes.get_mut(handle).set_left(left);
            return (Some(self.balance(handle)), entry);
        }

        if self.is_red(self.left_of(handle)) {
            handle = self.rotate_right(handle);
        }

        if key.cmp(self.nodes.get(handle).key().borrow()) == Ordering::Equal && self.right_of(handle).is_none() {
            let node = self.nodes.take(handle);
            return (node.left(), node.into_entry());
        }

        let right = self
            .right_of(handle)
            .expect("`RawLLRBTreeMap::delete()` - key missing from right subtree!");
        if !self.is_red(Some(right)) && !self.is_red(self.left_of(right)) {
            handle = self.move_red_right(handle);
        }

        let right = self
            .right_of(handle)
            .expect("`RawLLRBTreeMap::delete()` - right subtree vanished!");
        let entry = if key.cmp(self.nodes.get(handle).key().borrow()) == Ordering::Equal {
            // Replace this node's entry with its successor's, then drop the successor.
            let (right, (successor_key, successor_value)) = self.delete_min(right);
            let node = self.nodes.get_mut(handle);
            node.set_right(right);
            node.replace_entry(successor_key, successor_value)
        } else {
            let (right, entry) = self.delete(right, key);
            self.nodes.get_mut(handle).set_right(right);
            entry
        };

        (Some(self.balance(handle)), entry)
    }

    // ─── Ordered queries ────────────────────────────────────────────────────

    /// Returns the node with the largest key less than or equal to `key`.
    pub(crate) fn floor<Q>(&self, key: &Q) -> Link
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        let mut current = self.root;
        let mut best = None;
        while let Some(handle) = current {
            let node = self.nodes.get(handle);
            current = match key.cmp(node.key().borrow()) {
                Ordering::Equal => return Some(handle),
                Ordering::Less => node.left(),
                Ordering::Greater => {
                    best = Some(handle);
                    node.right()
                }
            };
        }
        best
    }

    /// Returns the node with the smallest key greater than or equal to `key`.
    pub(crate) fn ceiling<Q>(&self, key: &Q) -> Link
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        let mut current = self.root;
        let mut best = None;
        while let Some(handle) = current {
            let node = self.nodes.get(handle);
            current = match key.cmp(node.key().borrow()) {
                Ordering::Equal => return Some(handle),
                Ordering::Greater => node.right(),
                Ordering::Less => {
                    best = Some(handle);
                    node.left()
                }
            };
        }
        best
    }

    /// Returns the number of keys strictly less than `key`.
    pub(crate) fn rank<Q>(&self, key: &Q) -> usize
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.count_below(key, false)
    }

    /// Returns the number of keys less than or equal to `key`.
    pub(crate) fn rank_inclusive<Q>(&self, key: &Q) -> usize
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.count_below(key, true)
    }

    fn count_below<Q>(&self, key: &Q, inclusive: bool) -> usize
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        let mut current = self.root;
        let mut rank = 0;
        while let Some(handle) = current {
            let node = self.nodes.get(handle);
            match key.cmp(node.key().borrow()) {
                Ordering::Less => current = node.left(),
                Ordering::Greater => {
                    rank += 1 + self.link_size(node.left());
                    current = node.right();
                }
                Ordering::Equal => {
                    return rank + self.link_size(node.left()) + usize::from(inclusive);
                }
            }
        }
        rank
    }

    /// Returns the rank of `key` if it is present.
    pub(crate) fn rank_of<Q>(&self, key: &Q) -> Option<usize>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        let mut current = self.root;
        let mut rank = 0;
        while let Some(handle) = current {
            let node = self.nodes.get(handle);
            match key.cmp(node.key().borrow()) {
                Ordering::Less => current = node.left(),
                Ordering::Greater => {
                    rank += 1 + self.link_size(node.left());
                    current = node.right();
                }
                Ordering::Equal => return Some(rank + self.link_size(node.left())),
            }
        }
        None
    }

    /// Number of keys that precede the range starting at `bound`.
    pub(crate) fn rank_of_start<Q>(&self, bound: Bound<&Q>) -> usize
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        match bound {
            Bound::Included(key) => self.rank(key),
            Bound::Excluded(key) => self.rank_inclusive(key),
            Bound::Unbounded => 0,
        }
    }

    /// Number of keys up to and including the range ending at `bound`.
    pub(crate) fn rank_of_end<Q>(&self, bound: Bound<&Q>) -> usize
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        match bound {
            Bound::Included(key) => self.rank_inclusive(key),
            Bound::Excluded(key) => self.rank(key),
            Bound::Unbounded => self.len(),
        }
    }
}

impl<K, V> RawLLRBTreeMap<K, V> {
    /// Returns the node with exactly `rank` smaller keys.
    pub(crate) fn select(&self, rank: usize) -> Link {
        let mut current = self.root;
        let mut remaining = rank;
        while let Some(handle) = current {
            let node = self.nodes.get(handle);
            let left_size = self.link_size(node.left());
            current = match remaining.cmp(&left_size) {
                Ordering::Less => node.left(),
                Ordering::Greater => {
                    remaining -= left_size + 1;
                    node.right()
                }
                Ordering::Equal => return Some(handle),
            };
        }
        None
    }

    pub(crate) fn get_by_rank(&self, rank: usize) -> Option<(&K, &V)> {
        self.select(rank).map(|handle| {
            let node = self.nodes.get(handle);
            (node.key(), node.value())
        })
    }

    pub(crate) fn get_by_rank_mut(&mut self, rank: usize) -> Option<(&K, &mut V)> {
        let handle = self.select(rank)?;
        Some(self.nodes.get_mut(handle).key_value_mut())
    }
}

impl<K: Ord, V> RawLLRBTreeMap<K, V> {
    // ─── Validation ─────────────────────────────────────────────────────────

    /// Checks every red-black invariant and returns the tree's shape.
    pub(crate) fn validate(&self) -> Result<TreeShape, Violation> {
        if self.is_red(self.root) {
            debug_event!("validation failed: red root");
            return Err(Violation::RedRoot);
        }

        let shape = self.validate_link(self.root, None, None);
        if shape.is_err() {
            debug_event!(?shape, "validation failed");
        }
        shape
    }

    fn validate_link(&self, link: Link, lower: Option<&K>, upper: Option<&K>) -> Result<TreeShape, Violation> {
        let Some(handle) = link else {
            return Ok(TreeShape {
                len: 0,
                height: 0,
                black_height: 0,
            });
        };

        let node = self.nodes.get(handle);
        let key = node.key();
        if lower.is_some_and(|lower| key <= lower) || upper.is_some_and(|upper| key >= upper) {
            return Err(Violation::KeysOutOfOrder);
        }
        if self.is_red(node.right()) {
            return Err(Violation::RightLeaningRed);
        }
        if node.is_red() && self.is_red(node.left()) {
            return Err(Violation::ConsecutiveReds);
        }

        let left = self.validate_link(node.left(), lower, Some(key))?;
        let right = self.validate_link(node.right(), Some(key), upper)?;

        if left.black_height != right.black_height {
            return Err(Violation::UnbalancedBlackHeight {
                left: left.black_height,
                right: right.black_height,
            });
        }

        let actual = 1 + left.len + right.len;
        let stored = node.size().to_usize();
        if stored != actual {
            return Err(Violation::SizeMismatch { stored, actual });
        }

        Ok(TreeShape {
            len: actual,
            height: 1 + left.height.max(right.height),
            black_height: left.black_height + usize::from(!node.is_red()),
        })
    }
}

impl<K: Clone, V: Clone> Clone for RawLLRBTreeMap<K, V> {
    fn clone(&self) -> Self {
        Self {
            nodes: self.nodes.clone(),
            root: self.root,
        }
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
#[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap, clippy::cast_precision_loss)]
mod tests {
    use super::*;
    use alloc::collections::BTreeMap;
    use alloc::vec::Vec;
    use proptest::prelude::*;

    impl<K: Ord, V> RawLLRBTreeMap<K, V> {
        /// Panics with the violated invariant if the tree is malformed.
        fn assert_valid(&self) -> TreeShape {
            let shape = self.validate().unwrap_or_else(|violation| panic!("invalid tree: {violation}"));
            assert_eq!(shape.len, self.len(), "root size disagrees with node count");
            assert_eq!(shape.len, self.nodes.len(), "arena holds unreachable nodes");
            shape
        }

        fn keys_in_order(&self) -> Vec<&K> {
            (0..self.len()).map(|rank| self.get_by_rank(rank).unwrap().0).collect()
        }
    }

    fn tree_of(keys: impl IntoIterator<Item = i32>) -> RawLLRBTreeMap<i32, i32> {
        let mut tree = RawLLRBTreeMap::new();
        for key in keys {
            tree.insert(key, key * 2);
        }
        tree
    }

    #[derive(Clone, Debug)]
    enum Op {
        Insert(i32),
        Remove(i32),
        PopFirst,
        PopLast,
    }

    fn op_strategy() -> impl Strategy<Value = Op> {
        prop_oneof![
            6 => (0i32..1000).prop_map(Op::Insert),
            3 => (0i32..1000).prop_map(Op::Remove),
            1 => Just(Op::PopFirst),
            1 => Just(Op::PopLast),
        ]
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(50))]

        #[test]
        fn invariants_hold_after_every_operation(ops in prop::collection::vec(op_strategy(), 0..500)) {
            let mut tree: RawLLRBTreeMap<i32, i32> = RawLLRBTreeMap::new();
            let mut model: BTreeMap<i32, i32> = BTreeMap::new();

            for op in ops {
                match op {
                    Op::Insert(key) => {
                        prop_assert_eq!(tree.insert(key, key * 2), model.insert(key, key * 2));
                    }
                    Op::Remove(key) => {
                        prop_assert_eq!(tree.remove_entry(&key), model.remove_entry(&key));
                    }
                    Op::PopFirst => {
                        prop_assert_eq!(tree.pop_first(), model.pop_first());
                    }
                    Op::PopLast => {
                        prop_assert_eq!(tree.pop_last(), model.pop_last());
                    }
                }
                tree.assert_valid();
            }

            let expected: Vec<&i32> = model.keys().collect();
            prop_assert_eq!(tree.keys_in_order(), expected);
        }

        #[test]
        fn rank_and_select_are_inverse(keys in prop::collection::vec(0i32..500, 1..200)) {
            let tree = tree_of(keys);
            tree.assert_valid();

            for rank in 0..tree.len() {
                let handle = tree.select(rank).expect("rank below len must select a node");
                let key = tree.node(handle).key();
                prop_assert_eq!(tree.rank(key), rank);
                prop_assert_eq!(tree.rank_of(key), Some(rank));
            }
            prop_assert!(tree.select(tree.len()).is_none());
        }

        #[test]
        fn floor_and_ceiling_match_model(keys in prop::collection::vec(0i32..500, 0..200), probe in -10i32..510) {
            let tree = tree_of(keys.iter().copied());
            let model: BTreeMap<i32, i32> = keys.iter().map(|&k| (k, k * 2)).collect();

            let floor = tree.floor(&probe).map(|h| *tree.node(h).key());
            let ceiling = tree.ceiling(&probe).map(|h| *tree.node(h).key());
            prop_assert_eq!(floor, model.range(..=probe).next_back().map(|(&k, _)| k));
            prop_assert_eq!(ceiling, model.range(probe..).next().map(|(&k, _)| k));
            prop_assert_eq!(tree.rank(&probe), model.range(..probe).count());
            prop_assert_eq!(tree.rank_inclusive(&probe), model.range(..=probe).count());
        }
    }

    #[test]
    fn empty_tree_queries() {
        let mut tree: RawLLRBTreeMap<i32, i32> = RawLLRBTreeMap::new();
        assert_eq!(tree.assert_valid().len, 0);
        assert_eq!(tree.len(), 0);
        assert_eq!(tree.height(), 0);
        assert!(tree.first().is_none());
        assert!(tree.last().is_none());
        assert!(tree.select(0).is_none());
        assert_eq!(tree.rank(&5), 0);
        assert!(tree.floor(&5).is_none());
        assert!(tree.ceiling(&5).is_none());
        assert!(tree.pop_first().is_none());
        assert!(tree.pop_last().is_none());
        assert!(tree.remove_entry(&5).is_none());
    }

    #[test]
    fn overwrite_keeps_size_and_shape() {
        let mut tree = tree_of(0..10);
        let before = tree.assert_valid();
        assert_eq!(tree.insert(4, 400), Some(8));
        assert_eq!(tree.assert_valid(), before);
        assert_eq!(tree.get(&4), Some(&400));
    }

    #[test]
    fn ascending_insertions_stay_balanced() {
        let mut tree = RawLLRBTreeMap::new();
        for key in 0..10_000 {
            tree.insert(key, ());
        }
        let shape = tree.assert_valid();
        let bound = 2.0 * (10_000f64).log2() + 2.0;
        assert!((shape.height as f64) <= bound, "height {} exceeds {}", shape.height, bound);
        assert_eq!(shape.height, tree.height());
    }

    #[test]
    fn rotations_preserve_sizes_and_order() {
        // Inserting 2 then 1 yields a black 2 with a red left child 1.
        let mut tree = tree_of([2, 1]);
        let root = tree.root().unwrap();
        let rotated = tree.rotate_right(root);
        assert_eq!(*tree.node(rotated).key(), 1);
        assert_eq!(tree.node(rotated).size().to_usize(), 2);
        assert_eq!(tree.node(rotated).color(), Color::Black);
        assert_eq!(tree.node(root).color(), Color::Red);
        assert_eq!(tree.node(root).size().to_usize(), 1);

        let back = tree.rotate_left(rotated);
        assert_eq!(back, root);
        tree.root = Some(back);
        tree.assert_valid();
    }

    #[test]
    fn deleting_every_key_in_mixed_order() {
        let mut tree = tree_of(0..200);
        for key in (0..200).step_by(3).chain((1..200).step_by(3)).chain((2..200).step_by(3)) {
            assert_eq!(tree.remove_entry(&key), Some((key, key * 2)));
            tree.assert_valid();
        }
        assert!(tree.is_empty());
        assert!(tree.nodes.is_empty());
    }

    #[test]
    fn drain_yields_sorted_entries() {
        let mut tree = tree_of([5, 3, 8, 1, 4, 7, 9]);
        let drained = tree.drain_to_vec();
        assert_eq!(drained, alloc::vec![(1, 2), (3, 6), (4, 8), (5, 10), (7, 14), (8, 16), (9, 18)]);
        assert!(tree.is_empty());
        assert_eq!(tree.len(), 0);
    }

    #[test]
    fn slots_are_recycled_after_deletion() {
        let mut tree = tree_of(0..32);
        let capacity = tree.capacity();
        for key in 0..16 {
            tree.remove_entry(&key);
        }
        for key in 100..116 {
            tree.insert(key, key);
        }
        tree.assert_valid();
        assert_eq!(tree.capacity(), capacity);
    }

    #[test]
    fn validate_reports_broken_invariants() {
        let mut tree = tree_of(0..7);
        let root = tree.root().unwrap();

        tree.nodes.get_mut(root).set_color(Color::Red);
        assert_eq!(tree.validate(), Err(Violation::RedRoot));
        tree.nodes.get_mut(root).set_color(Color::Black);

        tree.nodes.get_mut(root).set_size(Size::from_usize(99));
        assert_eq!(tree.validate(), Err(Violation::SizeMismatch { stored: 99, actual: 7 }));
        tree.update_size(root);

        let right = tree.right_of(root).unwrap();
        tree.nodes.get_mut(right).set_color(Color::Red);
        assert_eq!(tree.validate(), Err(Violation::RightLeaningRed));
        tree.nodes.get_mut(right).set_color(Color::Black);

        let left = tree.left_of(root).unwrap();
        let (left_key, _) = tree.nodes.get_mut(left).replace_entry(1_000, 0);
        assert_eq!(tree.validate(), Err(Violation::KeysOutOfOrder));
        tree.nodes.get_mut(left).replace_entry(left_key, left_key * 2);

        tree.assert_valid();
    }
}
