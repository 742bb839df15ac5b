/// A zero-based position in the sorted order of a map.
///
/// Indexing an [`LLRBTreeMap`](crate::LLRBTreeMap) with a `Rank` reaches the
/// value whose key has exactly `rank` smaller keys, the same entry
/// [`select`](crate::LLRBTreeMap::select) names.
///
/// # Examples
///
/// ```
/// use llrb_tree::{LLRBTreeMap, Rank};
///
/// let mut map = LLRBTreeMap::new();
/// map.insert("b", 20);
/// map.insert("a", 10);
///
/// assert_eq!(map[Rank(0)], 10);
/// assert_eq!(map[Rank(1)], 20);
/// ```
#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct Rank(pub usize);
