use std::cmp::Ordering;

use serde_derive::{Deserialize, Serialize};

/// An immutable key/value pair, the unit stored inside a B-tree node.
///
/// Equality and ordering only consider the key.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct KeyVal<K, V> {
    key: K,
    val: V,
}

impl<K, V> KeyVal<K, V> {
    pub fn new(key: K, val: V) -> KeyVal<K, V> {
        KeyVal { key, val }
    }

    pub fn key(&self) -> &K {
        &self.key
    }

    pub fn val(&self) -> &V {
        &self.val
    }

    pub fn into_parts(self) -> (K, V) {
        (self.key, self.val)
    }
}

impl<K: Ord, V> PartialEq for KeyVal<K, V> {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

impl<K: Ord, V> Eq for KeyVal<K, V> {}

impl<K: Ord, V> PartialOrd for KeyVal<K, V> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<K: Ord, V> Ord for KeyVal<K, V> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.key.cmp(&other.key)
    }
}
