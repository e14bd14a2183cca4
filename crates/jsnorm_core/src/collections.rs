//! Collection types used throughout the toolkit.

use rustc_hash::FxHashMap;
use std::hash::Hash;

/// An ordered map that preserves insertion order.
///
/// Scope binding tables use this so that renaming is deterministic: bindings
/// are numbered in the order the scope builder discovered them.
#[derive(Debug, Clone)]
pub struct OrderedMap<K, V> {
    entries: Vec<(K, V)>,
    index: FxHashMap<K, usize>,
}

impl<K: Eq + Hash + Clone, V> OrderedMap<K, V> {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            index: FxHashMap::default(),
        }
    }

    /// Insert a key/value pair. If the key is already present its value is
    /// replaced in place and the old value returned; the position the key
    /// was first inserted at is kept.
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        if let Some(&idx) = self.index.get(&key) {
            let old = std::mem::replace(&mut self.entries[idx].1, value);
            Some(old)
        } else {
            let idx = self.entries.len();
            self.index.insert(key.clone(), idx);
            self.entries.push((key, value));
            None
        }
    }

    pub fn get(&self, key: &K) -> Option<&V> {
        self.index.get(key).map(|&idx| &self.entries[idx].1)
    }

    pub fn get_mut(&mut self, key: &K) -> Option<&mut V> {
        self.index
            .get(key)
            .copied()
            .map(move |idx| &mut self.entries[idx].1)
    }

    pub fn contains_key(&self, key: &K) -> bool {
        self.index.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&K, &V)> {
        self.entries.iter().map(|(k, v)| (k, v))
    }

    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.entries.iter().map(|(k, _)| k)
    }

    pub fn values(&self) -> impl Iterator<Item = &V> {
        self.entries.iter().map(|(_, v)| v)
    }
}

impl<K: Eq + Hash + Clone, V> Default for OrderedMap<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

/// A multimap storing several values per key. The inverter uses one to
/// collect every reference node for each suffixed name.
#[derive(Debug, Clone)]
pub struct MultiMap<K, V> {
    map: FxHashMap<K, Vec<V>>,
}

impl<K: Eq + Hash, V> MultiMap<K, V> {
    pub fn new() -> Self {
        Self {
            map: FxHashMap::default(),
        }
    }

    pub fn insert(&mut self, key: K, value: V) {
        self.map.entry(key).or_default().push(value);
    }

    pub fn get(&self, key: &K) -> Option<&[V]> {
        self.map.get(key).map(|v| v.as_slice())
    }

    /// Remove and return all values stored under a key.
    pub fn remove_all(&mut self, key: &K) -> Vec<V> {
        self.map.remove(key).unwrap_or_default()
    }

    pub fn contains_key(&self, key: &K) -> bool {
        self.map.contains_key(key)
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn clear(&mut self) {
        self.map.clear();
    }
}

impl<K: Eq + Hash, V> Default for MultiMap<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ordered_map_preserves_order() {
        let mut map = OrderedMap::new();
        map.insert("c", 3);
        map.insert("a", 1);
        map.insert("b", 2);

        let keys: Vec<_> = map.keys().copied().collect();
        assert_eq!(keys, vec!["c", "a", "b"]);
    }

    #[test]
    fn test_ordered_map_update_keeps_position() {
        let mut map = OrderedMap::new();
        map.insert("a", 1);
        map.insert("b", 2);
        let old = map.insert("a", 3);
        assert_eq!(old, Some(1));
        let keys: Vec<_> = map.keys().copied().collect();
        assert_eq!(keys, vec!["a", "b"]);
    }

    #[test]
    fn test_multi_map_remove_all() {
        let mut map = MultiMap::new();
        map.insert("key", 1);
        map.insert("key", 2);
        assert_eq!(map.get(&"key"), Some(&[1, 2][..]));
        assert_eq!(map.remove_all(&"key"), vec![1, 2]);
        assert_eq!(map.get(&"key"), None);
    }
}
