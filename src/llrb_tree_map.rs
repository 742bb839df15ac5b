use core::borrow::Borrow;
use core::cmp::Ordering;
use core::fmt;
use core::hash::{Hash, Hasher};
use core::iter::FusedIterator;
use core::ops::{Bound, Index, RangeBounds};

use crate::MapError;
use crate::raw::{Cursor, RawLLRBTreeMap};

mod capacity;
mod order_statistic;
#[cfg(feature = "serde")]
mod serde_impl;

pub use crate::Rank;

/// Validates that the start bound does not exceed the end bound.
///
/// # Panics
///
/// Panics if `start > end` or if `start == end` and both bounds are `Excluded`.
fn validate_range_bounds<T, R>(range: &R)
where
    T: ?Sized + Ord,
    R: RangeBounds<T>,
{
    if let (Bound::Included(start) | Bound::Excluded(start), Bound::Included(end) | Bound::Excluded(end)) =
        (range.start_bound(), range.end_bound())
    {
        let valid =
            if matches!(range.start_bound(), Bound::Excluded(_)) && matches!(range.end_bound(), Bound::Excluded(_)) {
                start < end
            } else {
                start <= end
            };
        assert!(valid, "range start is greater than range end in LLRBTreeMap");
    }
}

/// An ordered map based on a [left-leaning red-black tree].
///
/// Given a key type with a [total order], an ordered map stores its entries in key order.
/// That means that keys must be of a type that implements the [`Ord`] trait,
/// such that two keys can always be compared to determine their [`Ordering`].
/// Examples of keys with a total order are strings with lexicographical order,
/// and numbers with their natural order.
///
/// Besides the usual `BTreeMap`-style API, the map answers the ordered
/// symbol-table queries of a binary search tree in O(log n):
/// [`floor`](LLRBTreeMap::floor), [`ceiling`](LLRBTreeMap::ceiling),
/// [`rank`](LLRBTreeMap::rank) and [`select`](LLRBTreeMap::select).
///
/// Iterators obtained from functions such as [`LLRBTreeMap::iter`], [`LLRBTreeMap::into_iter`],
/// [`LLRBTreeMap::values`], or [`LLRBTreeMap::keys`] produce their items in key order, and take
/// worst-case logarithmic and amortized constant time per item returned.
///
/// It is a logic error for a key to be modified in such a way that the key's ordering relative to
/// any other key, as determined by the [`Ord`] trait, changes while it is in the map. This is
/// normally only possible through [`Cell`], [`RefCell`], global state, I/O, or unsafe code.
/// The behavior resulting from such a logic error is not specified, but will be encapsulated to the
/// `LLRBTreeMap` that observed the logic error and not result in undefined behavior. This could
/// include panics, incorrect results, aborts, memory leaks, and non-termination.
///
/// # Examples
///
/// ```
/// use llrb_tree::LLRBTreeMap;
///
/// // type inference lets us omit an explicit type signature (which
/// // would be `LLRBTreeMap<char, usize>` in this example).
/// let mut index = LLRBTreeMap::new();
///
/// // remember the last position of every letter.
/// for (position, letter) in "SEARCHEXAMPLE".chars().enumerate() {
///     index.insert(letter, position);
/// }
///
/// assert_eq!(index.len(), 10);
/// assert_eq!(index.min_key(), Ok(&'A'));
/// assert_eq!(index.max_key(), Ok(&'X'));
///
/// // nearest keys around a missing one.
/// assert_eq!(index.floor(&'F'), Some(&'E'));
/// assert_eq!(index.ceiling(&'F'), Some(&'H'));
///
/// // sorted positions.
/// assert_eq!(index.rank(&'H'), 3);
/// assert_eq!(index.select(3), Ok(&'H'));
///
/// // look up the value for a key (will panic if the key is not found).
/// assert_eq!(index[&'E'], 12);
///
/// // iterate over everything.
/// let letters: String = index.keys().collect();
/// assert_eq!(letters, "ACEHLMPRSX");
/// ```
///
/// An `LLRBTreeMap` with a known list of items can be initialized from an array:
///
/// ```
/// use llrb_tree::LLRBTreeMap;
///
/// let solar_distance = LLRBTreeMap::from([
///     ("Mercury", 0.4),
///     ("Venus", 0.7),
///     ("Earth", 1.0),
///     ("Mars", 1.5),
/// ]);
/// ```
///
/// # Background
///
/// A red-black tree encodes a 2-3 tree as a binary search tree: a 3-node becomes a
/// pair of nodes joined by a *red* link, and every other link is *black*. The
/// left-leaning variant additionally requires red links to lean left, which
/// makes the encoding unique and shrinks the rebalancing code to three local
/// transformations (left rotation, right rotation and color flip).
///
/// Because the 2-3 tree is perfectly balanced, every path from the root to an
/// empty link crosses the same number of black links. No path has two red links
/// in a row, so the height of a tree holding n entries never exceeds
/// 2 log<sub>2</sub>(n + 1).
///
/// Every node also records the size of its subtree, which turns rank and select
/// into a single root-to-leaf descent.
///
/// Nodes are stored in an arena and linked by small integer handles rather than
/// individually boxed, so a tree is one allocation that grows geometrically.
///
/// [left-leaning red-black tree]: https://en.wikipedia.org/wiki/Left-leaning_red%E2%80%93black_tree
/// [total order]: https://en.wikipedia.org/wiki/Total_order
/// [`Cell`]: core::cell::Cell
/// [`RefCell`]: core::cell::RefCell
pub struct LLRBTreeMap<K, V> {
    raw: RawLLRBTreeMap<K, V>,
}

/// Shape of a valid tree, as reported by [`LLRBTreeMap::validate`].
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub struct Stats {
    /// Number of entries.
    pub len: usize,
    /// Number of nodes on the longest root-to-leaf path.
    pub height: usize,
    /// Number of black nodes on every root-to-leaf path.
    pub black_height: usize,
}

/// An iterator over the entries of a `LLRBTreeMap`.
///
/// This `struct` is created by the [`iter`] method on [`LLRBTreeMap`]. See its
/// documentation for more.
///
/// # Examples
///
/// ```
/// use llrb_tree::LLRBTreeMap;
///
/// let map = LLRBTreeMap::from([(1, "a"), (2, "b")]);
/// let mut iter = map.iter();
/// assert_eq!(iter.next(), Some((&1, &"a")));
/// assert_eq!(iter.next_back(), Some((&2, &"b")));
/// assert_eq!(iter.next(), None);
/// ```
///
/// [`iter`]: LLRBTreeMap::iter
#[must_use = "iterators are lazy and do nothing unless consumed"]
pub struct Iter<'a, K, V> {
    tree: Option<&'a RawLLRBTreeMap<K, V>>,
    cursor: Cursor,
}

/// An owning iterator over the entries of a `LLRBTreeMap`, sorted by key.
///
/// This `struct` is created by the [`into_iter`] method on [`LLRBTreeMap`]
/// (provided by the [`IntoIterator`] trait). See its documentation for more.
///
/// # Examples
///
/// ```
/// use llrb_tree::LLRBTreeMap;
///
/// let map = LLRBTreeMap::from([(1, "a"), (2, "b")]);
/// let mut iter = map.into_iter();
/// assert_eq!(iter.next(), Some((1, "a")));
/// assert_eq!(iter.next_back(), Some((2, "b")));
/// assert_eq!(iter.next(), None);
/// ```
///
/// [`into_iter`]: IntoIterator::into_iter
pub struct IntoIter<K, V> {
    inner: alloc::vec::IntoIter<(K, V)>,
}

/// An iterator over the keys of a `LLRBTreeMap`.
///
/// This `struct` is created by the [`keys`] method on [`LLRBTreeMap`]. See its
/// documentation for more.
///
/// # Examples
///
/// ```
/// use llrb_tree::LLRBTreeMap;
///
/// let map = LLRBTreeMap::from([(2, "b"), (1, "a")]);
/// let keys: Vec<_> = map.keys().copied().collect();
/// assert_eq!(keys, [1, 2]);
/// ```
///
/// [`keys`]: LLRBTreeMap::keys
#[must_use = "iterators are lazy and do nothing unless consumed"]
pub struct Keys<'a, K, V> {
    inner: Iter<'a, K, V>,
}

/// An iterator over the values of a `LLRBTreeMap`.
///
/// This `struct` is created by the [`values`] method on [`LLRBTreeMap`]. See its
/// documentation for more.
///
/// # Examples
///
/// ```
/// use llrb_tree::LLRBTreeMap;
///
/// let map = LLRBTreeMap::from([(1, "a"), (2, "b")]);
/// let values: Vec<_> = map.values().copied().collect();
/// assert_eq!(values, ["a", "b"]);
/// ```
///
/// [`values`]: LLRBTreeMap::values
#[must_use = "iterators are lazy and do nothing unless consumed"]
pub struct Values<'a, K, V> {
    inner: Iter<'a, K, V>,
}

/// An owning iterator over the keys of a `LLRBTreeMap`.
///
/// This `struct` is created by the [`into_keys`] method on [`LLRBTreeMap`].
/// See its documentation for more.
///
/// # Examples
///
/// ```
/// use llrb_tree::LLRBTreeMap;
///
/// let map = LLRBTreeMap::from([(2, "b"), (1, "a")]);
/// let mut keys = map.into_keys();
/// assert_eq!(keys.next(), Some(1));
/// assert_eq!(keys.next_back(), Some(2));
/// assert_eq!(keys.next(), None);
/// ```
///
/// [`into_keys`]: LLRBTreeMap::into_keys
#[must_use = "iterators are lazy and do nothing unless consumed"]
pub struct IntoKeys<K, V> {
    inner: IntoIter<K, V>,
}

/// An owning iterator over the values of a `LLRBTreeMap`.
///
/// This `struct` is created by the [`into_values`] method on [`LLRBTreeMap`].
/// See its documentation for more.
///
/// # Examples
///
/// ```
/// use llrb_tree::LLRBTreeMap;
///
/// let map = LLRBTreeMap::from([(1, "hello"), (2, "goodbye")]);
/// let mut values = map.into_values();
/// assert_eq!(values.next(), Some("hello"));
/// assert_eq!(values.next_back(), Some("goodbye"));
/// assert_eq!(values.next(), None);
/// ```
///
/// [`into_values`]: LLRBTreeMap::into_values
#[must_use = "iterators are lazy and do nothing unless consumed"]
pub struct IntoValues<K, V> {
    inner: IntoIter<K, V>,
}

/// An iterator over a sub-range of entries in a `LLRBTreeMap`.
///
/// This `struct` is created by the [`range`] method on [`LLRBTreeMap`]. See its
/// documentation for more.
///
/// # Examples
///
/// ```
/// use llrb_tree::LLRBTreeMap;
///
/// let map = LLRBTreeMap::from([(1, "a"), (2, "b"), (3, "c"), (4, "d")]);
/// let mut range = map.range(2..4);
/// assert_eq!(range.len(), 2);
/// assert_eq!(range.next(), Some((&2, &"b")));
/// assert_eq!(range.next_back(), Some((&3, &"c")));
/// assert_eq!(range.next(), None);
/// ```
///
/// [`range`]: LLRBTreeMap::range
#[must_use = "iterators are lazy and do nothing unless consumed"]
pub struct Range<'a, K, V> {
    inner: Iter<'a, K, V>,
}

impl<K, V> LLRBTreeMap<K, V> {
    /// Makes a new, empty `LLRBTreeMap`.
    ///
    /// Does not allocate anything on its own.
    ///
    /// # Complexity
    ///
    /// O(1)
    ///
    /// # Examples
    ///
    /// ```
    /// use llrb_tree::LLRBTreeMap;
    ///
    /// let mut map = LLRBTreeMap::new();
    ///
    /// // entries can now be inserted into the empty map
    /// map.insert(1, "a");
    /// ```
    #[must_use]
    pub const fn new() -> LLRBTreeMap<K, V> {
        LLRBTreeMap {
            raw: RawLLRBTreeMap::new(),
        }
    }

    /// Clears the map, removing all elements.
    ///
    /// The node arena keeps its capacity.
    ///
    /// # Complexity
    ///
    /// O(n)
    ///
    /// # Examples
    ///
    /// ```
    /// use llrb_tree::LLRBTreeMap;
    ///
    /// let mut a = LLRBTreeMap::new();
    /// a.insert(1, "a");
    /// a.clear();
    /// assert!(a.is_empty());
    /// ```
    pub fn clear(&mut self) {
        self.raw.clear();
    }

    /// Returns a reference to the value corresponding to the key.
    ///
    /// The key may be any borrowed form of the map's key type, but the ordering
    /// on the borrowed form *must* match the ordering on the key type.
    ///
    /// # Complexity
    ///
    /// O(log n)
    ///
    /// # Examples
    ///
    /// ```
    /// use llrb_tree::LLRBTreeMap;
    ///
    /// let mut map = LLRBTreeMap::new();
    /// map.insert(1, "a");
    /// assert_eq!(map.get(&1), Some(&"a"));
    /// assert_eq!(map.get(&2), None);
    /// ```
    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q> + Ord,
        Q: ?Sized + Ord,
    {
        self.raw.get(key)
    }

    /// Returns the key-value pair corresponding to the supplied key.
    ///
    /// The supplied key may be any borrowed form of the map's key type, but the ordering
    /// on the borrowed form *must* match the ordering on the key type.
    ///
    /// # Examples
    ///
    /// ```
    /// use llrb_tree::LLRBTreeMap;
    ///
    /// let mut map = LLRBTreeMap::new();
    /// map.insert(String::from("Paris"), 1);
    /// assert_eq!(map.get_key_value("Paris"), Some((&String::from("Paris"), &1)));
    /// assert_eq!(map.get_key_value("Rome"), None);
    /// ```
    ///
    /// # Complexity
    ///
    /// O(log n)
    pub fn get_key_value<Q>(&self, k: &Q) -> Option<(&K, &V)>
    where
        K: Borrow<Q> + Ord,
        Q: ?Sized + Ord,
    {
        self.raw.get_key_value(k)
    }

    /// Returns the first key-value pair in the map.
    /// The key in this pair is the minimum key in the map.
    ///
    /// # Examples
    ///
    /// ```
    /// use llrb_tree::LLRBTreeMap;
    ///
    /// let mut map = LLRBTreeMap::new();
    /// assert_eq!(map.first_key_value(), None);
    /// map.insert(1, "b");
    /// map.insert(2, "a");
    /// assert_eq!(map.first_key_value(), Some((&1, &"b")));
    /// ```
    ///
    /// # Complexity
    ///
    /// O(log n)
    #[must_use]
    pub fn first_key_value(&self) -> Option<(&K, &V)> {
        self.raw.first().map(|handle| {
            let node = self.raw.node(handle);
            (node.key(), node.value())
        })
    }

    /// Removes and returns the first element in the map.
    /// The key of this element is the minimum key that was in the map.
    ///
    /// This is [`delete_min`](LLRBTreeMap::delete_min) for callers that treat an
    /// empty map as a normal case.
    ///
    /// # Examples
    ///
    /// ```
    /// use llrb_tree::LLRBTreeMap;
    ///
    /// let mut map = LLRBTreeMap::new();
    /// map.insert(1, "a");
    /// map.insert(2, "b");
    /// while let Some((key, _val)) = map.pop_first() {
    ///     assert!(map.iter().all(|(k, _v)| *k > key));
    /// }
    /// assert!(map.is_empty());
    /// ```
    ///
    /// # Complexity
    ///
    /// O(log n)
    pub fn pop_first(&mut self) -> Option<(K, V)> {
        self.raw.pop_first()
    }

    /// Returns the last key-value pair in the map.
    /// The key in this pair is the maximum key in the map.
    ///
    /// # Examples
    ///
    /// ```
    /// use llrb_tree::LLRBTreeMap;
    ///
    /// let mut map = LLRBTreeMap::new();
    /// map.insert(1, "b");
    /// map.insert(2, "a");
    /// assert_eq!(map.last_key_value(), Some((&2, &"a")));
    /// ```
    ///
    /// # Complexity
    ///
    /// O(log n)
    #[must_use]
    pub fn last_key_value(&self) -> Option<(&K, &V)> {
        self.raw.last().map(|handle| {
            let node = self.raw.node(handle);
            (node.key(), node.value())
        })
    }

    /// Removes and returns the last element in the map.
    /// The key of this element is the maximum key that was in the map.
    ///
    /// # Examples
    ///
    /// ```
    /// use llrb_tree::LLRBTreeMap;
    ///
    /// let mut map = LLRBTreeMap::new();
    /// map.insert(1, "a");
    /// map.insert(2, "b");
    /// while let Some((key, _val)) = map.pop_last() {
    ///     assert!(map.iter().all(|(k, _v)| *k < key));
    /// }
    /// assert!(map.is_empty());
    /// ```
    ///
    /// # Complexity
    ///
    /// O(log n)
    pub fn pop_last(&mut self) -> Option<(K, V)> {
        self.raw.pop_last()
    }

    /// Returns the smallest key in the map.
    ///
    /// # Errors
    ///
    /// Returns [`MapError::EmptyMap`] if the map is empty.
    ///
    /// # Examples
    ///
    /// ```
    /// use llrb_tree::{LLRBTreeMap, MapError};
    ///
    /// let mut map = LLRBTreeMap::new();
    /// assert_eq!(map.min_key(), Err(MapError::EmptyMap));
    /// map.insert(2, "b");
    /// map.insert(1, "a");
    /// assert_eq!(map.min_key(), Ok(&1));
    /// ```
    ///
    /// # Complexity
    ///
    /// O(log n)
    pub fn min_key(&self) -> Result<&K, MapError> {
        self.first_key_value().map(|(key, _)| key).ok_or(MapError::EmptyMap)
    }

    /// Returns the largest key in the map.
    ///
    /// # Errors
    ///
    /// Returns [`MapError::EmptyMap`] if the map is empty.
    ///
    /// # Examples
    ///
    /// ```
    /// use llrb_tree::{LLRBTreeMap, MapError};
    ///
    /// let mut map = LLRBTreeMap::new();
    /// assert_eq!(map.max_key(), Err(MapError::EmptyMap));
    /// map.insert(2, "b");
    /// map.insert(1, "a");
    /// assert_eq!(map.max_key(), Ok(&2));
    /// ```
    ///
    /// # Complexity
    ///
    /// O(log n)
    pub fn max_key(&self) -> Result<&K, MapError> {
        self.last_key_value().map(|(key, _)| key).ok_or(MapError::EmptyMap)
    }

    /// Removes the entry with the smallest key and returns it.
    ///
    /// # Errors
    ///
    /// Returns [`MapError::EmptyMap`] if the map is empty; the map is left untouched.
    ///
    /// # Examples
    ///
    /// ```
    /// use llrb_tree::{LLRBTreeMap, MapError};
    ///
    /// let mut map = LLRBTreeMap::from([(2, "b"), (1, "a")]);
    /// assert_eq!(map.delete_min(), Ok((1, "a")));
    /// assert_eq!(map.delete_min(), Ok((2, "b")));
    /// assert_eq!(map.delete_min(), Err(MapError::EmptyMap));
    /// ```
    ///
    /// # Complexity
    ///
    /// O(log n)
    pub fn delete_min(&mut self) -> Result<(K, V), MapError> {
        self.raw.pop_first().ok_or_else(|| {
            debug_event!("delete_min on an empty map");
            MapError::EmptyMap
        })
    }

    /// Removes the entry with the largest key and returns it.
    ///
    /// # Errors
    ///
    /// Returns [`MapError::EmptyMap`] if the map is empty; the map is left untouched.
    ///
    /// # Examples
    ///
    /// ```
    /// use llrb_tree::{LLRBTreeMap, MapError};
    ///
    /// let mut map = LLRBTreeMap::from([(2, "b"), (1, "a")]);
    /// assert_eq!(map.delete_max(), Ok((2, "b")));
    /// assert_eq!(map.delete_max(), Ok((1, "a")));
    /// assert_eq!(map.delete_max(), Err(MapError::EmptyMap));
    /// ```
    ///
    /// # Complexity
    ///
    /// O(log n)
    pub fn delete_max(&mut self) -> Result<(K, V), MapError> {
        self.raw.pop_last().ok_or_else(|| {
            debug_event!("delete_max on an empty map");
            MapError::EmptyMap
        })
    }

    /// Returns `true` if the map contains a value for the specified key.
    ///
    /// The key may be any borrowed form of the map's key type, but the ordering
    /// on the borrowed form *must* match the ordering on the key type.
    ///
    /// # Examples
    ///
    /// ```
    /// use llrb_tree::LLRBTreeMap;
    ///
    /// let mut map = LLRBTreeMap::new();
    /// map.insert(1, "a");
    /// assert_eq!(map.contains_key(&1), true);
    /// assert_eq!(map.contains_key(&2), false);
    /// ```
    ///
    /// # Complexity
    ///
    /// O(log n)
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q> + Ord,
        Q: ?Sized + Ord,
    {
        self.raw.contains_key(key)
    }

    /// Returns a mutable reference to the value corresponding to the key.
    ///
    /// The key may be any borrowed form of the map's key type, but the ordering
    /// on the borrowed form *must* match the ordering on the key type.
    ///
    /// # Examples
    ///
    /// ```
    /// use llrb_tree::LLRBTreeMap;
    ///
    /// let mut map = LLRBTreeMap::new();
    /// map.insert(1, "a");
    /// if let Some(x) = map.get_mut(&1) {
    ///     *x = "b";
    /// }
    /// assert_eq!(map[&1], "b");
    /// ```
    ///
    /// # Complexity
    ///
    /// O(log n)
    pub fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        K: Borrow<Q> + Ord,
        Q: ?Sized + Ord,
    {
        self.raw.get_mut(key)
    }

    /// Inserts a key-value pair into the map.
    ///
    /// If the map did not have this key present, `None` is returned.
    ///
    /// If the map did have this key present, the value is updated, and the old
    /// value is returned. The key is not updated, though; this matters for
    /// types that can be `==` without being identical.
    ///
    /// # Examples
    ///
    /// ```
    /// use llrb_tree::LLRBTreeMap;
    ///
    /// let mut map = LLRBTreeMap::new();
    /// assert_eq!(map.insert(37, "a"), None);
    /// assert_eq!(map.is_empty(), false);
    ///
    /// map.insert(37, "b");
    /// assert_eq!(map.insert(37, "c"), Some("b"));
    /// assert_eq!(map[&37], "c");
    /// ```
    ///
    /// # Panics
    ///
    /// Panics if the map already holds the maximum number of entries a node
    /// handle can address (`u32::MAX - 1`).
    ///
    /// # Complexity
    ///
    /// O(log n)
    pub fn insert(&mut self, key: K, value: V) -> Option<V>
    where
        K: Ord,
    {
        self.raw.insert(key, value)
    }

    /// Removes a key from the map, returning the value at the key if the key
    /// was previously in the map.
    ///
    /// Removing an absent key leaves the map unchanged.
    ///
    /// The key may be any borrowed form of the map's key type, but the ordering
    /// on the borrowed form *must* match the ordering on the key type.
    ///
    /// # Examples
    ///
    /// ```
    /// use llrb_tree::LLRBTreeMap;
    ///
    /// let mut map = LLRBTreeMap::new();
    /// map.insert(1, "a");
    /// assert_eq!(map.remove(&1), Some("a"));
    /// assert_eq!(map.remove(&1), None);
    /// ```
    ///
    /// # Complexity
    ///
    /// O(log n)
    pub fn remove<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q> + Ord,
        Q: ?Sized + Ord,
    {
        self.raw.remove_entry(key).map(|(_, value)| value)
    }

    /// Removes a key from the map, returning the stored key and value if the key
    /// was previously in the map.
    ///
    /// The key may be any borrowed form of the map's key type, but the ordering
    /// on the borrowed form *must* match the ordering on the key type.
    ///
    /// # Examples
    ///
    /// ```
    /// use llrb_tree::LLRBTreeMap;
    ///
    /// let mut map = LLRBTreeMap::new();
    /// map.insert(1, "a");
    /// assert_eq!(map.remove_entry(&1), Some((1, "a")));
    /// assert_eq!(map.remove_entry(&1), None);
    /// ```
    ///
    /// # Complexity
    ///
    /// O(log n)
    pub fn remove_entry<Q>(&mut self, key: &Q) -> Option<(K, V)>
    where
        K: Borrow<Q> + Ord,
        Q: ?Sized + Ord,
    {
        self.raw.remove_entry(key)
    }

    /// Returns the largest key less than or equal to `key`, or `None` if every
    /// key in the map is greater.
    ///
    /// # Examples
    ///
    /// ```
    /// use llrb_tree::LLRBTreeMap;
    ///
    /// let map = LLRBTreeMap::from([(10, "a"), (20, "b"), (30, "c")]);
    /// assert_eq!(map.floor(&20), Some(&20));
    /// assert_eq!(map.floor(&25), Some(&20));
    /// assert_eq!(map.floor(&5), None);
    /// ```
    ///
    /// # Complexity
    ///
    /// O(log n)
    pub fn floor<Q>(&self, key: &Q) -> Option<&K>
    where
        K: Borrow<Q> + Ord,
        Q: ?Sized + Ord,
    {
        self.raw.floor(key).map(|handle| self.raw.node(handle).key())
    }

    /// Returns the smallest key greater than or equal to `key`, or `None` if
    /// every key in the map is smaller.
    ///
    /// # Examples
    ///
    /// ```
    /// use llrb_tree::LLRBTreeMap;
    ///
    /// let map = LLRBTreeMap::from([(10, "a"), (20, "b"), (30, "c")]);
    /// assert_eq!(map.ceiling(&20), Some(&20));
    /// assert_eq!(map.ceiling(&25), Some(&30));
    /// assert_eq!(map.ceiling(&35), None);
    /// ```
    ///
    /// # Complexity
    ///
    /// O(log n)
    pub fn ceiling<Q>(&self, key: &Q) -> Option<&K>
    where
        K: Borrow<Q> + Ord,
        Q: ?Sized + Ord,
    {
        self.raw.ceiling(key).map(|handle| self.raw.node(handle).key())
    }

    /// Constructs a double-ended iterator over a sub-range of elements in the map.
    /// The simplest way is to use the range syntax `min..max`, thus `range(min..max)` will
    /// yield elements from min (inclusive) to max (exclusive).
    /// The range may also be entered as `(Bound<T>, Bound<T>)`, so for example
    /// `range((Excluded(4), Included(10)))` will yield a left-exclusive, right-inclusive
    /// range from 4 to 10.
    ///
    /// # Panics
    ///
    /// Panics if range `start > end`.
    /// Panics if range `start == end` and both bounds are `Excluded`.
    ///
    /// # Examples
    ///
    /// ```
    /// use llrb_tree::LLRBTreeMap;
    /// use std::ops::Bound::Included;
    ///
    /// let mut map = LLRBTreeMap::new();
    /// map.insert(3, "a");
    /// map.insert(5, "b");
    /// map.insert(8, "c");
    /// for (&key, &value) in map.range((Included(&4), Included(&8))) {
    ///     println!("{key}: {value}");
    /// }
    /// assert_eq!(Some((&5, &"b")), map.range(4..).next());
    /// ```
    ///
    /// # Complexity
    ///
    /// O(log n) to create the iterator; each iteration step is O(1) amortized.
    pub fn range<T, R>(&self, range: R) -> Range<'_, K, V>
    where
        T: ?Sized + Ord,
        K: Borrow<T> + Ord,
        R: RangeBounds<T>,
    {
        validate_range_bounds(&range);

        Range {
            inner: Iter {
                tree: Some(&self.raw),
                cursor: Cursor::range(&self.raw, range.start_bound(), range.end_bound()),
            },
        }
    }

    /// Returns the number of keys that fall within `range`, without visiting them.
    ///
    /// This is an order-statistic extension and is not part of the standard
    /// `BTreeMap` API.
    ///
    /// # Panics
    ///
    /// Panics under the same conditions as [`range`](LLRBTreeMap::range).
    ///
    /// # Examples
    ///
    /// ```
    /// use llrb_tree::LLRBTreeMap;
    ///
    /// let map: LLRBTreeMap<i32, ()> = (0..100).map(|i| (i * 10, ())).collect();
    /// assert_eq!(map.range_len(15..=45), 3);
    /// assert_eq!(map.range_len(..), 100);
    /// assert_eq!(map.range_len(1000..), 0);
    /// ```
    ///
    /// # Complexity
    ///
    /// O(log n)
    #[must_use]
    pub fn range_len<T, R>(&self, range: R) -> usize
    where
        T: ?Sized + Ord,
        K: Borrow<T> + Ord,
        R: RangeBounds<T>,
    {
        validate_range_bounds(&range);

        self.raw
            .rank_of_end(range.end_bound())
            .saturating_sub(self.raw.rank_of_start(range.start_bound()))
    }

    /// Creates a consuming iterator visiting all the keys, in sorted order.
    /// The map cannot be used after calling this.
    ///
    /// # Examples
    ///
    /// ```
    /// use llrb_tree::LLRBTreeMap;
    ///
    /// let mut a = LLRBTreeMap::new();
    /// a.insert(2, "b");
    /// a.insert(1, "a");
    ///
    /// let keys: Vec<i32> = a.into_keys().collect();
    /// assert_eq!(keys, [1, 2]);
    /// ```
    ///
    /// # Complexity
    ///
    /// O(n) to create the iterator.
    pub fn into_keys(self) -> IntoKeys<K, V> {
        IntoKeys {
            inner: self.into_iter(),
        }
    }

    /// Creates a consuming iterator visiting all the values, in order by key.
    /// The map cannot be used after calling this.
    ///
    /// # Examples
    ///
    /// ```
    /// use llrb_tree::LLRBTreeMap;
    ///
    /// let mut a = LLRBTreeMap::new();
    /// a.insert(1, "hello");
    /// a.insert(2, "goodbye");
    ///
    /// let values: Vec<&str> = a.into_values().collect();
    /// assert_eq!(values, ["hello", "goodbye"]);
    /// ```
    ///
    /// # Complexity
    ///
    /// O(n) to create the iterator.
    pub fn into_values(self) -> IntoValues<K, V> {
        IntoValues {
            inner: self.into_iter(),
        }
    }

    /// Gets an iterator over the entries of the map, sorted by key.
    ///
    /// Each call starts a fresh, independent traversal.
    ///
    /// # Examples
    ///
    /// ```
    /// use llrb_tree::LLRBTreeMap;
    ///
    /// let mut map = LLRBTreeMap::new();
    /// map.insert(3, "c");
    /// map.insert(2, "b");
    /// map.insert(1, "a");
    ///
    /// for (key, value) in map.iter() {
    ///     println!("{key}: {value}");
    /// }
    ///
    /// let (first_key, first_value) = map.iter().next().unwrap();
    /// assert_eq!((*first_key, *first_value), (1, "a"));
    /// ```
    ///
    /// # Complexity
    ///
    /// O(log n) to create the iterator; each iteration step is O(1) amortized.
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            tree: Some(&self.raw),
            cursor: Cursor::full(&self.raw),
        }
    }

    /// Gets an iterator over the keys of the map, in sorted order.
    ///
    /// # Examples
    ///
    /// ```
    /// use llrb_tree::LLRBTreeMap;
    ///
    /// let mut a = LLRBTreeMap::new();
    /// a.insert(2, "b");
    /// a.insert(1, "a");
    ///
    /// let keys: Vec<_> = a.keys().cloned().collect();
    /// assert_eq!(keys, [1, 2]);
    /// ```
    ///
    /// # Complexity
    ///
    /// O(log n) to create the iterator; each iteration step is O(1) amortized.
    pub fn keys(&self) -> Keys<'_, K, V> {
        Keys { inner: self.iter() }
    }

    /// Gets an iterator over the values of the map, in order by key.
    ///
    /// # Examples
    ///
    /// ```
    /// use llrb_tree::LLRBTreeMap;
    ///
    /// let mut a = LLRBTreeMap::new();
    /// a.insert(1, "hello");
    /// a.insert(2, "goodbye");
    ///
    /// let values: Vec<&str> = a.values().cloned().collect();
    /// assert_eq!(values, ["hello", "goodbye"]);
    /// ```
    ///
    /// # Complexity
    ///
    /// O(log n) to create the iterator; each iteration step is O(1) amortized.
    pub fn values(&self) -> Values<'_, K, V> {
        Values { inner: self.iter() }
    }

    /// Returns the number of elements in the map.
    ///
    /// # Examples
    ///
    /// ```
    /// use llrb_tree::LLRBTreeMap;
    ///
    /// let mut a = LLRBTreeMap::new();
    /// assert_eq!(a.len(), 0);
    /// a.insert(1, "a");
    /// assert_eq!(a.len(), 1);
    /// ```
    ///
    /// # Complexity
    ///
    /// O(1)
    #[must_use]
    pub fn len(&self) -> usize {
        self.raw.len()
    }

    /// Returns `true` if the map contains no elements.
    ///
    /// # Examples
    ///
    /// ```
    /// use llrb_tree::LLRBTreeMap;
    ///
    /// let mut a = LLRBTreeMap::new();
    /// assert!(a.is_empty());
    /// a.insert(1, "a");
    /// assert!(!a.is_empty());
    /// ```
    ///
    /// # Complexity
    ///
    /// O(1)
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }

    /// Returns the number of nodes on the longest path from the root to a leaf.
    ///
    /// An empty map has height 0. The height never exceeds 2 log<sub>2</sub>(n + 1),
    /// whatever the insertion order.
    ///
    /// # Examples
    ///
    /// ```
    /// use llrb_tree::LLRBTreeMap;
    ///
    /// let map: LLRBTreeMap<u32, ()> = (0..1023).map(|i| (i, ())).collect();
    /// assert!(map.height() <= 20);
    /// ```
    ///
    /// # Complexity
    ///
    /// O(n)
    #[must_use]
    pub fn height(&self) -> usize {
        self.raw.height()
    }

    /// Checks every structural invariant of the tree and reports its shape.
    ///
    /// The checks are: keys in symmetric order, a black root, no right-leaning
    /// red links, no two red links in a row, equal black height on every path,
    /// and subtree sizes that match the actual node counts. A map built through
    /// this API always passes.
    ///
    /// # Errors
    ///
    /// Returns [`MapError::InvariantViolation`] naming the first broken invariant.
    ///
    /// # Examples
    ///
    /// ```
    /// use llrb_tree::LLRBTreeMap;
    ///
    /// let map: LLRBTreeMap<u32, ()> = (0..7).map(|i| (i, ())).collect();
    /// let stats = map.validate().unwrap();
    /// assert_eq!(stats.len, 7);
    /// assert_eq!(stats.height, 3);
    /// assert_eq!(stats.black_height, 3);
    /// ```
    ///
    /// # Complexity
    ///
    /// O(n)
    pub fn validate(&self) -> Result<Stats, MapError>
    where
        K: Ord,
    {
        let shape = self.raw.validate()?;
        Ok(Stats {
            len: shape.len,
            height: shape.height,
            black_height: shape.black_height,
        })
    }
}

impl<K: Clone, V: Clone> Clone for LLRBTreeMap<K, V> {
    fn clone(&self) -> Self {
        LLRBTreeMap {
            raw: self.raw.clone(),
        }
    }
}

impl<K: Hash, V: Hash> Hash for LLRBTreeMap<K, V> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.len().hash(state);
        for (k, v) in self {
            k.hash(state);
            v.hash(state);
        }
    }
}

impl<K: PartialEq, V: PartialEq> PartialEq for LLRBTreeMap<K, V> {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().zip(other.iter()).all(|(a, b)| a == b)
    }
}

impl<K: Eq, V: Eq> Eq for LLRBTreeMap<K, V> {}

impl<K: PartialOrd, V: PartialOrd> PartialOrd for LLRBTreeMap<K, V> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        self.iter().partial_cmp(other.iter())
    }
}

impl<K: Ord, V: Ord> Ord for LLRBTreeMap<K, V> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.iter().cmp(other.iter())
    }
}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for LLRBTreeMap<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<K, V> Default for LLRBTreeMap<K, V> {
    fn default() -> Self {
        LLRBTreeMap::new()
    }
}

impl<K: Ord, V> FromIterator<(K, V)> for LLRBTreeMap<K, V> {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut map = LLRBTreeMap::new();
        map.extend(iter);
        map
    }
}

impl<K: Ord, V> Extend<(K, V)> for LLRBTreeMap<K, V> {
    fn extend<T: IntoIterator<Item = (K, V)>>(&mut self, iter: T) {
        for (k, v) in iter {
            self.insert(k, v);
        }
    }
}

impl<'a, K: Ord + Copy, V: Copy> Extend<(&'a K, &'a V)> for LLRBTreeMap<K, V> {
    fn extend<T: IntoIterator<Item = (&'a K, &'a V)>>(&mut self, iter: T) {
        for (&k, &v) in iter {
            self.insert(k, v);
        }
    }
}

impl<'a, K, V> IntoIterator for &'a LLRBTreeMap<K, V> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Iter<'a, K, V> {
        self.iter()
    }
}

impl<K, V> IntoIterator for LLRBTreeMap<K, V> {
    type Item = (K, V);
    type IntoIter = IntoIter<K, V>;

    /// Gets an owning iterator over the entries of the map, sorted by key.
    ///
    /// # Examples
    ///
    /// ```
    /// use llrb_tree::LLRBTreeMap;
    ///
    /// let map = LLRBTreeMap::from([(2, "b"), (1, "a")]);
    /// let mut iter = map.into_iter();
    /// assert_eq!(iter.next(), Some((1, "a")));
    /// assert_eq!(iter.next_back(), Some((2, "b")));
    /// ```
    fn into_iter(mut self) -> IntoIter<K, V> {
        let entries = self.raw.drain_to_vec();
        IntoIter {
            inner: entries.into_iter(),
        }
    }
}

impl<K, Q, V> Index<&Q> for LLRBTreeMap<K, V>
where
    K: Borrow<Q> + Ord,
    Q: ?Sized + Ord,
{
    type Output = V;

    fn index(&self, key: &Q) -> &V {
        self.get(key).expect("no entry found for key")
    }
}

impl<K: Ord, V, const N: usize> From<[(K, V); N]> for LLRBTreeMap<K, V> {
    fn from(arr: [(K, V); N]) -> Self {
        arr.into_iter().collect()
    }
}

impl<'a, K: 'a, V: 'a> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        let tree = self.tree?;
        let handle = self.cursor.next(tree)?;
        let node = tree.node(handle);
        Some((node.key(), node.value()))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.cursor.len(), Some(self.cursor.len()))
    }

    fn last(mut self) -> Option<Self::Item> {
        self.next_back()
    }
}

impl<'a, K: 'a, V: 'a> DoubleEndedIterator for Iter<'a, K, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        let tree = self.tree?;
        let handle = self.cursor.next_back(tree)?;
        let node = tree.node(handle);
        Some((node.key(), node.value()))
    }
}

impl<K, V> ExactSizeIterator for Iter<'_, K, V> {
    fn len(&self) -> usize {
        self.cursor.len()
    }
}

impl<K, V> FusedIterator for Iter<'_, K, V> {}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for Iter<'_, K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.clone()).finish()
    }
}

impl<K, V> Default for Iter<'_, K, V> {
    /// Creates an empty `llrb_tree_map::Iter`.
    ///
    /// ```
    /// # use llrb_tree::llrb_tree_map;
    /// let iter: llrb_tree_map::Iter<'_, u8, u8> = Default::default();
    /// assert_eq!(iter.len(), 0);
    /// ```
    fn default() -> Self {
        Iter {
            tree: None,
            cursor: Cursor::empty(),
        }
    }
}

impl<K, V> Clone for Iter<'_, K, V> {
    fn clone(&self) -> Self {
        Iter {
            tree: self.tree,
            cursor: self.cursor.clone(),
        }
    }
}

impl<K, V> Iterator for IntoIter<K, V> {
    type Item = (K, V);

    fn next(&mut self) -> Option<(K, V)> {
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> DoubleEndedIterator for IntoIter<K, V> {
    fn next_back(&mut self) -> Option<(K, V)> {
        self.inner.next_back()
    }
}

impl<K, V> ExactSizeIterator for IntoIter<K, V> {
    fn len(&self) -> usize {
        self.inner.len()
    }
}

impl<K, V> FusedIterator for IntoIter<K, V> {}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for IntoIter<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.inner.as_slice()).finish()
    }
}

impl<K, V> Default for IntoIter<K, V> {
    /// Creates an empty `llrb_tree_map::IntoIter`.
    ///
    /// ```
    /// # use llrb_tree::llrb_tree_map;
    /// let iter: llrb_tree_map::IntoIter<u8, u8> = Default::default();
    /// assert_eq!(iter.len(), 0);
    /// ```
    fn default() -> Self {
        IntoIter {
            inner: alloc::vec::Vec::new().into_iter(),
        }
    }
}

impl<'a, K, V> Iterator for Keys<'a, K, V> {
    type Item = &'a K;

    fn next(&mut self) -> Option<&'a K> {
        self.inner.next().map(|(k, _)| k)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }

    fn last(mut self) -> Option<&'a K> {
        self.next_back()
    }
}

impl<K, V> DoubleEndedIterator for Keys<'_, K, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner.next_back().map(|(k, _)| k)
    }
}

impl<K, V> ExactSizeIterator for Keys<'_, K, V> {
    fn len(&self) -> usize {
        self.inner.len()
    }
}

impl<K, V> FusedIterator for Keys<'_, K, V> {}

impl<K: fmt::Debug, V> fmt::Debug for Keys<'_, K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.clone()).finish()
    }
}

impl<K, V> Default for Keys<'_, K, V> {
    /// Creates an empty `llrb_tree_map::Keys`.
    ///
    /// ```
    /// # use llrb_tree::llrb_tree_map;
    /// let iter: llrb_tree_map::Keys<'_, u8, u8> = Default::default();
    /// assert_eq!(iter.len(), 0);
    /// ```
    fn default() -> Self {
        Keys {
            inner: Iter::default(),
        }
    }
}

impl<K, V> Clone for Keys<'_, K, V> {
    fn clone(&self) -> Self {
        Keys {
            inner: self.inner.clone(),
        }
    }
}

impl<'a, K, V> Iterator for Values<'a, K, V> {
    type Item = &'a V;

    fn next(&mut self) -> Option<&'a V> {
        self.inner.next().map(|(_, v)| v)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }

    fn last(mut self) -> Option<&'a V> {
        self.next_back()
    }
}

impl<K, V> DoubleEndedIterator for Values<'_, K, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner.next_back().map(|(_, v)| v)
    }
}

impl<K, V> ExactSizeIterator for Values<'_, K, V> {
    fn len(&self) -> usize {
        self.inner.len()
    }
}

impl<K, V> FusedIterator for Values<'_, K, V> {}

impl<K, V> Clone for Values<'_, K, V> {
    fn clone(&self) -> Self {
        Values {
            inner: self.inner.clone(),
        }
    }
}

impl<K, V> Default for Values<'_, K, V> {
    /// Creates an empty `llrb_tree_map::Values`.
    ///
    /// ```
    /// # use llrb_tree::llrb_tree_map;
    /// let iter: llrb_tree_map::Values<'_, u8, u8> = Default::default();
    /// assert_eq!(iter.len(), 0);
    /// ```
    fn default() -> Self {
        Values {
            inner: Iter::default(),
        }
    }
}

impl<K, V: fmt::Debug> fmt::Debug for Values<'_, K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.clone()).finish()
    }
}

impl<K, V> Iterator for IntoKeys<K, V> {
    type Item = K;

    fn next(&mut self) -> Option<K> {
        self.inner.next().map(|(k, _)| k)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> DoubleEndedIterator for IntoKeys<K, V> {
    fn next_back(&mut self) -> Option<K> {
        self.inner.next_back().map(|(k, _)| k)
    }
}

impl<K, V> ExactSizeIterator for IntoKeys<K, V> {
    fn len(&self) -> usize {
        self.inner.len()
    }
}

impl<K, V> FusedIterator for IntoKeys<K, V> {}

impl<K: fmt::Debug, V> fmt::Debug for IntoKeys<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.inner.inner.as_slice().iter().map(|(k, _)| k)).finish()
    }
}

impl<K, V> Default for IntoKeys<K, V> {
    /// Creates an empty `llrb_tree_map::IntoKeys`.
    ///
    /// ```
    /// # use llrb_tree::llrb_tree_map;
    /// let iter: llrb_tree_map::IntoKeys<u8, u8> = Default::default();
    /// assert_eq!(iter.len(), 0);
    /// ```
    fn default() -> Self {
        IntoKeys {
            inner: IntoIter::default(),
        }
    }
}

impl<K, V> Iterator for IntoValues<K, V> {
    type Item = V;

    fn next(&mut self) -> Option<V> {
        self.inner.next().map(|(_, v)| v)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> DoubleEndedIterator for IntoValues<K, V> {
    fn next_back(&mut self) -> Option<V> {
        self.inner.next_back().map(|(_, v)| v)
    }
}

impl<K, V> ExactSizeIterator for IntoValues<K, V> {
    fn len(&self) -> usize {
        self.inner.len()
    }
}

impl<K, V> FusedIterator for IntoValues<K, V> {}

impl<K, V: fmt::Debug> fmt::Debug for IntoValues<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.inner.inner.as_slice().iter().map(|(_, v)| v)).finish()
    }
}

impl<K, V> Default for IntoValues<K, V> {
    /// Creates an empty `llrb_tree_map::IntoValues`.
    ///
    /// ```
    /// # use llrb_tree::llrb_tree_map;
    /// let iter: llrb_tree_map::IntoValues<u8, u8> = Default::default();
    /// assert_eq!(iter.len(), 0);
    /// ```
    fn default() -> Self {
        IntoValues {
            inner: IntoIter::default(),
        }
    }
}

impl<'a, K, V> Iterator for Range<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<(&'a K, &'a V)> {
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }

    fn last(mut self) -> Option<(&'a K, &'a V)> {
        self.next_back()
    }
}

impl<K, V> DoubleEndedIterator for Range<'_, K, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner.next_back()
    }
}

impl<K, V> ExactSizeIterator for Range<'_, K, V> {
    fn len(&self) -> usize {
        self.inner.len()
    }
}

impl<K, V> FusedIterator for Range<'_, K, V> {}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for Range<'_, K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.clone()).finish()
    }
}

impl<K, V> Default for Range<'_, K, V> {
    /// Creates an empty `llrb_tree_map::Range`.
    ///
    /// ```
    /// # use llrb_tree::llrb_tree_map;
    /// let iter: llrb_tree_map::Range<'_, u8, u8> = Default::default();
    /// assert_eq!(iter.len(), 0);
    /// ```
    fn default() -> Self {
        Range {
            inner: Iter::default(),
        }
    }
}

impl<K, V> Clone for Range<'_, K, V> {
    fn clone(&self) -> Self {
        Range {
            inner: self.inner.clone(),
        }
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    extern crate std;

    use super::*;
    use alloc::format;
    use alloc::vec::Vec;

    #[test]
    fn debug_formats_like_a_map() {
        let map = LLRBTreeMap::from([(2, 'b'), (1, 'a')]);
        assert_eq!(format!("{map:?}"), "{1: 'a', 2: 'b'}");
        assert_eq!(format!("{:?}", map.keys()), "[1, 2]");
        assert_eq!(format!("{:?}", map.values()), "['a', 'b']");
        assert_eq!(format!("{:?}", map.range(2..)), "[(2, 'b')]");
        assert_eq!(format!("{:?}", map.clone().into_keys()), "[1, 2]");
    }

    #[test]
    fn cloned_iterators_advance_independently() {
        let map: LLRBTreeMap<u32, ()> = (0..10).map(|k| (k, ())).collect();
        let mut first = map.keys();
        first.next();
        let second = first.clone();
        first.next();
        assert_eq!(first.copied().collect::<Vec<_>>(), (2..10).collect::<Vec<_>>());
        assert_eq!(second.copied().collect::<Vec<_>>(), (1..10).collect::<Vec<_>>());
    }

    #[test]
    fn failed_ordered_deletes_leave_map_untouched() {
        let mut map: LLRBTreeMap<u8, u8> = LLRBTreeMap::new();
        assert_eq!(map.delete_min(), Err(MapError::EmptyMap));
        assert_eq!(map.delete_max(), Err(MapError::EmptyMap));
        assert_eq!(map.remove(&1), None);
        assert!(map.is_empty());
        assert!(map.validate().is_ok());
    }

    #[test]
    #[should_panic(expected = "range start is greater than range end in LLRBTreeMap")]
    fn inverted_range_panics() {
        let map = LLRBTreeMap::from([(1, ())]);
        let _ = map.range(5..1);
    }

    #[test]
    #[should_panic(expected = "range start is greater than range end in LLRBTreeMap")]
    fn empty_excluded_range_panics() {
        let map = LLRBTreeMap::from([(1, ())]);
        let _ = map.range_len((Bound::Excluded(3), Bound::Excluded(3)));
    }

    #[test]
    fn stats_of_empty_map() {
        let map: LLRBTreeMap<u8, u8> = LLRBTreeMap::default();
        assert_eq!(
            map.validate(),
            Ok(Stats {
                len: 0,
                height: 0,
                black_height: 0,
            })
        );
    }

    #[test]
    fn equal_maps_hash_equally() {
        use core::hash::BuildHasher;
        use std::collections::hash_map::RandomState;

        let a: LLRBTreeMap<u32, u32> = (0..20).map(|k| (k, k)).collect();
        let b: LLRBTreeMap<u32, u32> = (0..20).rev().map(|k| (k, k)).collect();
        let state = RandomState::new();
        assert_eq!(a, b);
        assert_eq!(state.hash_one(&a), state.hash_one(&b));
    }
}
