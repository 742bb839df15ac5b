use super::handle::Link;
use super::size::Size;

/// Color of the link from a node's parent to the node.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum Color {
    /// Glues the node to its parent, forming a 3-node (or a temporary 4-node).
    Red,
    /// An ordinary 2-3 tree link.
    Black,
}

impl Color {
    #[inline]
    pub(crate) const fn flipped(self) -> Self {
        match self {
            Color::Red => Color::Black,
            Color::Black => Color::Red,
        }
    }
}

// A plain record: all structural logic lives in `RawLLRBTreeMap`.
#[derive(Clone)]
pub(crate) struct Node<K, V> {
    key: K,
    value: V,
    left: Link,
    right: Link,
    color: Color,
    // Number of nodes in the subtree rooted here.
    size: Size,
}

impl<K, V> Node<K, V> {
    /// Creates a red leaf, the shape every newly inserted key starts with.
    pub(crate) const fn new(key: K, value: V) -> Self {
        Self {
            key,
            value,
            left: None,
            right: None,
            color: Color::Red,
            size: Size::ONE,
        }
    }

    #[inline]
    pub(crate) fn key(&self) -> &K {
        &self.key
    }

    #[inline]
    pub(crate) fn value(&self) -> &V {
        &self.value
    }

    #[inline]
    pub(crate) fn value_mut(&mut self) -> &mut V {
        &mut self.value
    }

    /// Borrows the key and the value at once, the key immutably.
    #[inline]
    pub(crate) fn key_value_mut(&mut self) -> (&K, &mut V) {
        (&self.key, &mut self.value)
    }

    /// Swaps in a new entry, returning the old one. Used when a deleted node is
    /// replaced by its in-order successor.
    pub(crate) fn replace_entry(&mut self, key: K, value: V) -> (K, V) {
        let key = core::mem::replace(&mut self.key, key);
        let value = core::mem::replace(&mut self.value, value);
        (key, value)
    }

    pub(crate) fn into_entry(self) -> (K, V) {
        (self.key, self.value)
    }

    #[inline]
    pub(crate) fn left(&self) -> Link {
        self.left
    }

    #[inline]
    pub(crate) fn set_left(&mut self, left: Link) {
        self.left = left;
    }

    #[inline]
    pub(crate) fn right(&self) -> Link {
        self.right
    }

    #[inline]
    pub(crate) fn set_right(&mut self, right: Link) {
        self.right = right;
    }

    #[inline]
    pub(crate) fn color(&self) -> Color {
        self.color
    }

    #[inline]
    pub(crate) fn set_color(&mut self, color: Color) {
        self.color = color;
    }

    #[inline]
    pub(crate) fn is_red(&self) -> bool {
        self.color == Color::Red
    }

    pub(crate) fn flip_color(&mut self) {
        self.color = self.color.flipped();
    }

    #[inline]
    pub(crate) fn size(&self) -> Size {
        self.size
    }

    #[inline]
    pub(crate) fn set_size(&mut self, size: Size) {
        self.size = size;
    }
}
