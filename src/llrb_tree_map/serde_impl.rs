use core::fmt;
use core::marker::PhantomData;
use core::mem;

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::LLRBTreeMap;

/// Serializes as a map whose entries appear in ascending key order.
impl<K, V> Serialize for LLRBTreeMap<K, V>
where
    K: Serialize,
    V: Serialize,
{
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.len()))?;
        for (key, value) in self {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

/// Upper bound, in bytes, on what a format's reported entry count may preallocate.
const MAX_PREALLOC_BYTES: usize = 1024 * 1024;

/// Caps an untrusted length hint so a lying input cannot force a huge allocation.
fn cautious_capacity<K, V>(hint: Option<usize>) -> usize {
    let limit = MAX_PREALLOC_BYTES / mem::size_of::<(K, V)>().max(1);
    hint.map_or(0, |len| len.min(limit))
}

struct LLRBTreeMapVisitor<K, V> {
    marker: PhantomData<fn() -> LLRBTreeMap<K, V>>,
}

impl<'de, K, V> Visitor<'de> for LLRBTreeMapVisitor<K, V>
where
    K: Deserialize<'de> + Ord,
    V: Deserialize<'de>,
{
    type Value = LLRBTreeMap<K, V>;

    fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str("a map")
    }

    fn visit_map<A>(self, mut access: A) -> Result<Self::Value, A::Error>
    where
        A: MapAccess<'de>,
    {
        // Entries are inserted one at a time, so a repeated key keeps its last value.
        let mut map = LLRBTreeMap::with_capacity(cautious_capacity::<K, V>(access.size_hint()));
        while let Some((key, value)) = access.next_entry()? {
            map.insert(key, value);
        }
        Ok(map)
    }
}

impl<'de, K, V> Deserialize<'de> for LLRBTreeMap<K, V>
where
    K: Deserialize<'de> + Ord,
    V: Deserialize<'de>,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_map(LLRBTreeMapVisitor { marker: PhantomData })
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use alloc::string::String;

    #[test]
    fn serializes_in_key_order() {
        let map = LLRBTreeMap::from([(3, "c"), (1, "a"), (2, "b")]);
        let json = serde_json::to_string(&map).unwrap();
        assert_eq!(json, r#"{"1":"a","2":"b","3":"c"}"#);
    }

    #[test]
    fn round_trip_preserves_entries_and_shape() {
        let map: LLRBTreeMap<String, u32> = (0..100).map(|i| (alloc::format!("key{i:03}"), i)).collect();
        let json = serde_json::to_string(&map).unwrap();
        let back: LLRBTreeMap<String, u32> = serde_json::from_str(&json).unwrap();
        assert_eq!(back, map);
        assert!(back.validate().is_ok());
    }

    #[test]
    fn repeated_key_keeps_last_value() {
        let map: LLRBTreeMap<String, u32> = serde_json::from_str(r#"{"a":1,"b":2,"a":3}"#).unwrap();
        assert_eq!(map.len(), 2);
        assert_eq!(map.get("a"), Some(&3));
    }

    /// Reports an arbitrary entry count but yields nothing.
    struct LyingMapAccess {
        hint: usize,
    }

    impl<'de> MapAccess<'de> for LyingMapAccess {
        type Error = serde::de::value::Error;

        fn next_key_seed<S>(&mut self, _seed: S) -> Result<Option<S::Value>, Self::Error>
        where
            S: serde::de::DeserializeSeed<'de>,
        {
            Ok(None)
        }

        fn next_value_seed<S>(&mut self, _seed: S) -> Result<S::Value, Self::Error>
        where
            S: serde::de::DeserializeSeed<'de>,
        {
            unreachable!("no keys were produced")
        }

        fn size_hint(&self) -> Option<usize> {
            Some(self.hint)
        }
    }

    #[test]
    fn huge_size_hint_does_not_preallocate() {
        let visitor = LLRBTreeMapVisitor::<u64, u64> { marker: PhantomData };
        let map = visitor.visit_map(LyingMapAccess { hint: usize::MAX / 64 }).unwrap();
        assert!(map.is_empty());
        assert!(map.capacity() <= MAX_PREALLOC_BYTES);
    }

    #[test]
    fn small_size_hint_is_honored() {
        assert_eq!(cautious_capacity::<u64, u64>(Some(10)), 10);
        assert_eq!(cautious_capacity::<u64, u64>(None), 0);
        assert_eq!(cautious_capacity::<(), ()>(Some(usize::MAX)), MAX_PREALLOC_BYTES);
    }

    #[test]
    fn non_map_input_is_rejected() {
        let result: Result<LLRBTreeMap<String, u32>, _> = serde_json::from_str("[1, 2, 3]");
        assert!(result.is_err());
    }
}
