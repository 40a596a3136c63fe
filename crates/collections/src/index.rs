//! Open-chaining hash index over a node slab.

use std::hash::{BuildHasher, BuildHasherDefault, Hash, Hasher};

const NIL: u32 = u32::MAX;
const INITIAL_BUCKETS: usize = 16;

/// Target density before the bucket array doubles.
const DENSITY_PERCENT: usize = 80;

type DefaultBuild = BuildHasherDefault<std::collections::hash_map::DefaultHasher>;

/// Errors surfaced by [`HashIndex`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexError {
    /// `insert` found an entry under the same key.
    KeyAlreadyExists,
}

impl std::fmt::Display for IndexError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IndexError::KeyAlreadyExists => write!(f, "key already exists"),
        }
    }
}

impl std::error::Error for IndexError {}

#[derive(Clone)]
struct Entry<K, V> {
    hash: u64,
    next: u32,
    slot: Option<(K, V)>,
}

/// Hash map with open chaining.
///
/// Entries live in a slab; buckets hold chain heads by index. The bucket
/// array doubles (with a full rehash) when density reaches 80%. Removed
/// entries go on a free list for O(1) reuse. `reset` clears the entries
/// but keeps the bucket array.
#[derive(Clone)]
pub struct HashIndex<K, V> {
    buckets: Vec<u32>,
    entries: Vec<Entry<K, V>>,
    free: u32,
    len: usize,
    build: DefaultBuild,
}

impl<K: Eq + Hash, V> Default for HashIndex<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Eq + Hash, V> HashIndex<K, V> {
    /// Creates an empty index.
    pub fn new() -> Self {
        Self::with_buckets(INITIAL_BUCKETS)
    }

    /// Creates an empty index with a chosen initial bucket count.
    pub fn with_buckets(buckets: usize) -> Self {
        Self {
            buckets: vec![NIL; buckets.next_power_of_two().max(2)],
            entries: Vec::new(),
            free: NIL,
            len: 0,
            build: DefaultBuild::default(),
        }
    }

    /// Number of live entries.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the index holds no entries.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    fn hash_of(&self, key: &K) -> u64 {
        let mut h = self.build.build_hasher();
        key.hash(&mut h);
        h.finish()
    }

    fn bucket_of(&self, hash: u64) -> usize {
        (hash as usize) & (self.buckets.len() - 1)
    }

    fn find_entry(&self, hash: u64, key: &K) -> Option<u32> {
        let mut curr = self.buckets[self.bucket_of(hash)];
        while curr != NIL {
            let entry = &self.entries[curr as usize];
            if entry.hash == hash {
                if let Some((k, _)) = &entry.slot {
                    if k == key {
                        return Some(curr);
                    }
                }
            }
            curr = entry.next;
        }
        None
    }

    fn grow(&mut self) {
        let new_len = self.buckets.len() * 2;
        self.buckets = vec![NIL; new_len];
        for idx in 0..self.entries.len() {
            if self.entries[idx].slot.is_none() {
                continue;
            }
            let bucket = self.bucket_of(self.entries[idx].hash);
            self.entries[idx].next = self.buckets[bucket];
            self.buckets[bucket] = idx as u32;
        }
    }

    fn attach(&mut self, hash: u64, key: K, value: V) {
        if (self.len + 1) * 100 > self.buckets.len() * DENSITY_PERCENT {
            self.grow();
        }
        let idx = if self.free != NIL {
            let idx = self.free;
            self.free = self.entries[idx as usize].next;
            self.entries[idx as usize].hash = hash;
            self.entries[idx as usize].slot = Some((key, value));
            idx
        } else {
            self.entries.push(Entry {
                hash,
                next: NIL,
                slot: Some((key, value)),
            });
            (self.entries.len() - 1) as u32
        };
        let bucket = self.bucket_of(hash);
        self.entries[idx as usize].next = self.buckets[bucket];
        self.buckets[bucket] = idx;
        self.len += 1;
    }

    /// Whether an entry exists under `key`.
    pub fn exists(&self, key: &K) -> bool {
        self.find_entry(self.hash_of(key), key).is_some()
    }

    /// Looks up the value stored under `key`.
    pub fn find(&self, key: &K) -> Option<&V> {
        let idx = self.find_entry(self.hash_of(key), key)?;
        self.entries[idx as usize].slot.as_ref().map(|(_, v)| v)
    }

    /// Looks up the value stored under `key`, mutably.
    pub fn find_mut(&mut self, key: &K) -> Option<&mut V> {
        let idx = self.find_entry(self.hash_of(key), key)?;
        self.entries[idx as usize].slot.as_mut().map(|(_, v)| v)
    }

    /// Adds an entry; fails if the key is already present.
    pub fn insert(&mut self, key: K, value: V) -> Result<(), IndexError> {
        let hash = self.hash_of(&key);
        if self.find_entry(hash, &key).is_some() {
            return Err(IndexError::KeyAlreadyExists);
        }
        self.attach(hash, key, value);
        Ok(())
    }

    /// Adds or overwrites an entry; returns the displaced value, if any.
    pub fn upsert(&mut self, key: K, value: V) -> Option<V> {
        let hash = self.hash_of(&key);
        if let Some(idx) = self.find_entry(hash, &key) {
            let slot = self.entries[idx as usize].slot.as_mut().unwrap();
            return Some(std::mem::replace(&mut slot.1, value));
        }
        self.attach(hash, key, value);
        None
    }

    /// Removes the entry under `key` and returns its value.
    pub fn delete(&mut self, key: &K) -> Option<V> {
        let hash = self.hash_of(key);
        let bucket = self.bucket_of(hash);
        let mut prev = NIL;
        let mut curr = self.buckets[bucket];
        while curr != NIL {
            let matches = {
                let entry = &self.entries[curr as usize];
                entry.hash == hash && entry.slot.as_ref().map(|(k, _)| k == key).unwrap_or(false)
            };
            if matches {
                let next = self.entries[curr as usize].next;
                if prev == NIL {
                    self.buckets[bucket] = next;
                } else {
                    self.entries[prev as usize].next = next;
                }
                let (_, v) = self.entries[curr as usize].slot.take().unwrap();
                self.entries[curr as usize].next = self.free;
                self.free = curr;
                self.len -= 1;
                return Some(v);
            }
            prev = curr;
            curr = self.entries[curr as usize].next;
        }
        None
    }

    /// Clears every entry but keeps the bucket array at its current size.
    pub fn reset(&mut self) {
        self.buckets.fill(NIL);
        self.entries.clear();
        self.free = NIL;
        self.len = 0;
    }

    /// Iterates over `(key, value)` pairs in unspecified order.
    pub fn iter(&self) -> impl Iterator<Item = (&K, &V)> {
        self.entries
            .iter()
            .filter_map(|e| e.slot.as_ref().map(|(k, v)| (k, v)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_find_delete() {
        let mut index: HashIndex<String, u32> = HashIndex::new();
        index.insert("foo".to_owned(), 1).unwrap();
        index.insert("bar".to_owned(), 2).unwrap();
        assert!(index.exists(&"foo".to_owned()));
        assert_eq!(index.find(&"bar".to_owned()), Some(&2));
        assert_eq!(index.delete(&"foo".to_owned()), Some(1));
        assert!(!index.exists(&"foo".to_owned()));
        assert_eq!(index.len(), 1);
    }

    #[test]
    fn insert_refuses_duplicates() {
        let mut index: HashIndex<u64, u64> = HashIndex::new();
        index.insert(7, 70).unwrap();
        assert_eq!(index.insert(7, 71), Err(IndexError::KeyAlreadyExists));
        assert_eq!(index.find(&7), Some(&70));
    }

    #[test]
    fn upsert_overwrites() {
        let mut index: HashIndex<u64, u64> = HashIndex::new();
        assert_eq!(index.upsert(7, 70), None);
        assert_eq!(index.upsert(7, 71), Some(70));
        assert_eq!(index.find(&7), Some(&71));
    }

    #[test]
    fn growth_keeps_all_entries_reachable() {
        let mut index: HashIndex<u32, u32> = HashIndex::with_buckets(2);
        for i in 0..1000 {
            index.insert(i, i * 3).unwrap();
        }
        for i in 0..1000 {
            assert_eq!(index.find(&i), Some(&(i * 3)));
        }
    }

    #[test]
    fn reset_keeps_bucket_array() {
        let mut index: HashIndex<u32, u32> = HashIndex::with_buckets(2);
        for i in 0..100 {
            index.insert(i, i).unwrap();
        }
        let buckets = index.buckets.len();
        index.reset();
        assert_eq!(index.buckets.len(), buckets);
        assert!(index.is_empty());
        index.insert(1, 1).unwrap();
        assert_eq!(index.find(&1), Some(&1));
    }
}
