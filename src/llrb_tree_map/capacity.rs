use super::LLRBTreeMap;
use crate::raw::RawLLRBTreeMap;

impl<K, V> LLRBTreeMap<K, V> {
    /// Creates an empty map with room for at least `capacity` entries before the
    /// node arena reallocates.
    ///
    /// This is an extension and is not part of the standard `BTreeMap` API.
    ///
    /// # Examples
    ///
    /// ```
    /// use llrb_tree::LLRBTreeMap;
    ///
    /// let map: LLRBTreeMap<i32, i32> = LLRBTreeMap::with_capacity(32);
    /// assert!(map.is_empty());
    /// ```
    ///
    /// # Complexity
    ///
    /// O(capacity) for memory allocation.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        LLRBTreeMap {
            raw: RawLLRBTreeMap::with_capacity(capacity),
        }
    }

    /// Returns the number of entries the map can hold without reallocating.
    ///
    /// Slots freed by removals are reused, so a map that shrinks and grows again
    /// keeps its capacity.
    ///
    /// This is an extension and is not part of the standard `BTreeMap` API.
    ///
    /// # Examples
    ///
    /// ```
    /// use llrb_tree::LLRBTreeMap;
    ///
    /// let mut map: LLRBTreeMap<i32, i32> = LLRBTreeMap::with_capacity(32);
    /// assert!(map.capacity() >= 32);
    ///
    /// map.extend((0..32).map(|i| (i, i)));
    /// let capacity = map.capacity();
    /// map.remove(&7);
    /// map.insert(100, 100);
    /// assert_eq!(map.capacity(), capacity);
    /// ```
    ///
    /// # Complexity
    ///
    /// O(1)
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.raw.capacity()
    }
}
