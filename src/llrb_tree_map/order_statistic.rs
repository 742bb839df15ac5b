use core::borrow::Borrow;
use core::ops::{Index, IndexMut};

use super::LLRBTreeMap;
use crate::{MapError, Rank};

impl<K, V> LLRBTreeMap<K, V> {
    /// Returns the number of keys in the map strictly less than `key`.
    ///
    /// `key` need not be present. For a present key this is its zero-based
    /// position in sorted order.
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
    /// let map = LLRBTreeMap::from([(10, "a"), (20, "b"), (30, "c")]);
    ///
    /// assert_eq!(map.rank(&5), 0);
    /// assert_eq!(map.rank(&20), 1);
    /// assert_eq!(map.rank(&25), 2);
    /// assert_eq!(map.rank(&99), 3);
    /// ```
    #[must_use]
    pub fn rank<Q>(&self, key: &Q) -> usize
    where
        K: Borrow<Q> + Ord,
        Q: ?Sized + Ord,
    {
        self.raw.rank(key)
    }

    /// Returns the key with exactly `rank` smaller keys in the map.
    ///
    /// # Errors
    ///
    /// Returns [`MapError::IndexOutOfRange`] if `rank >= self.len()`.
    ///
    /// # Complexity
    ///
    /// O(log n)
    ///
    /// # Examples
    ///
    /// ```
    /// use llrb_tree::{LLRBTreeMap, MapError};
    ///
    /// let map = LLRBTreeMap::from([("c", 3), ("a", 1), ("b", 2)]);
    ///
    /// assert_eq!(map.select(0), Ok(&"a"));
    /// assert_eq!(map.select(2), Ok(&"c"));
    /// assert_eq!(map.select(3), Err(MapError::IndexOutOfRange { index: 3, len: 3 }));
    /// ```
    pub fn select(&self, rank: usize) -> Result<&K, MapError> {
        let Some(handle) = self.raw.select(rank) else {
            debug_event!(rank, len = self.len(), "select out of range");
            return Err(MapError::IndexOutOfRange {
                index: rank,
                len: self.len(),
            });
        };
        Ok(self.raw.node(handle).key())
    }

    /// Returns the key-value pair at position `rank` in sorted order.
    ///
    /// This is an order-statistic extension and is not part of the standard
    /// `BTreeMap` API.
    ///
    /// The rank is zero-based. Returns `None` if `rank` is out of bounds.
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
    /// map.insert("a", 10);
    /// map.insert("c", 30);
    /// map.insert("b", 20);
    ///
    /// let (key, value) = map.get_by_rank(1).unwrap();
    /// assert_eq!((key, value), (&"b", &20));
    /// assert!(map.get_by_rank(3).is_none());
    /// ```
    #[must_use]
    pub fn get_by_rank(&self, rank: usize) -> Option<(&K, &V)> {
        self.raw.get_by_rank(rank)
    }

    /// Returns the key and a mutable reference to the value at position `rank`
    /// in sorted order.
    ///
    /// The rank is zero-based. Returns `None` if `rank` is out of bounds.
    /// The key is returned as a shared reference because mutating it would
    /// violate the map's ordering invariants.
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
    /// map.insert(10, "a");
    /// map.insert(5, "b");
    ///
    /// if let Some((key, value)) = map.get_by_rank_mut(0) {
    ///     assert_eq!(*key, 5);
    ///     *value = "updated";
    /// }
    ///
    /// assert_eq!(map.get(&5), Some(&"updated"));
    /// ```
    #[must_use]
    pub fn get_by_rank_mut(&mut self, rank: usize) -> Option<(&K, &mut V)> {
        self.raw.get_by_rank_mut(rank)
    }

    /// Returns the zero-based rank of `key` in sorted order, or `None` if the
    /// key is not present.
    ///
    /// Unlike [`rank`](LLRBTreeMap::rank), this tells an absent key apart from
    /// a present one.
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
    /// map.insert(10, "a");
    /// map.insert(20, "b");
    ///
    /// assert_eq!(map.rank_of(&10), Some(0));
    /// assert_eq!(map.rank_of(&15), None);
    /// ```
    #[must_use]
    pub fn rank_of<Q>(&self, key: &Q) -> Option<usize>
    where
        K: Borrow<Q> + Ord,
        Q: ?Sized + Ord,
    {
        self.raw.rank_of(key)
    }
}

/// Indexes into the map by rank.
///
/// # Panics
///
/// Panics if `rank` is out of bounds.
///
/// # Examples
///
/// ```
/// use llrb_tree::{LLRBTreeMap, Rank};
///
/// let mut map = LLRBTreeMap::new();
/// map.insert("a", 1);
/// map.insert("b", 2);
///
/// assert_eq!(map[Rank(0)], 1);
/// ```
impl<K, V> Index<Rank> for LLRBTreeMap<K, V> {
    type Output = V;

    fn index(&self, rank: Rank) -> &Self::Output {
        self.get_by_rank(rank.0).map(|(_, v)| v).expect("rank out of bounds")
    }
}

/// Mutably indexes into the map by rank.
///
/// # Panics
///
/// Panics if `rank` is out of bounds.
///
/// # Examples
///
/// ```
/// use llrb_tree::{LLRBTreeMap, Rank};
///
/// let mut map = LLRBTreeMap::from([("a", 1), ("b", 2)]);
/// map[Rank(1)] = 5;
///
/// assert_eq!(map.get(&"b"), Some(&5));
/// ```
impl<K, V> IndexMut<Rank> for LLRBTreeMap<K, V> {
    fn index_mut(&mut self, rank: Rank) -> &mut Self::Output {
        self.get_by_rank_mut(rank.0).map(|(_, v)| v).expect("rank out of bounds")
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn select_on_empty_map_reports_length_zero() {
        let map: LLRBTreeMap<u8, ()> = LLRBTreeMap::new();
        assert_eq!(map.select(0), Err(MapError::IndexOutOfRange { index: 0, len: 0 }));
        assert_eq!(map.rank(&9), 0);
        assert_eq!(map.rank_of(&9), None);
    }

    #[test]
    #[should_panic(expected = "rank out of bounds")]
    fn index_past_len_panics() {
        let map = LLRBTreeMap::from([(1, 'a')]);
        let _ = map[Rank(1)];
    }

    #[test]
    fn index_mut_updates_in_place() {
        let mut map: LLRBTreeMap<u32, u32> = (0..50).map(|k| (k, 0)).collect();
        for rank in 0..50 {
            map[Rank(rank)] += u32::try_from(rank).unwrap();
        }
        assert!(map.iter().all(|(k, v)| k == v));
        assert!(map.validate().is_ok());
    }
}
