use std::fmt;
use std::mem;

use crate::hasher::KeyHasher;

/// Bucket count used by [`BucketMap::new`].
pub const DEFAULT_BUCKETS: usize = 10_000;

/// A hash map with a fixed number of buckets and a pluggable [`KeyHasher`].
///
/// The bucket of a key is `hash(key) % bucket_count`; keys that share a bucket
/// are chained in a small vector and found by `keys_equal`. The bucket count
/// never changes, so a map holding many more keys than buckets degrades to
/// linear scans, but stays correct.
pub struct BucketMap<K, V, H> {
    hasher: H,
    buckets: Box<[Vec<(K, V)>]>,
    len: usize,
}

impl<K, V, H: KeyHasher<K>> BucketMap<K, V, H> {
    pub fn new(hasher: H) -> Self {
        Self::with_buckets(hasher, DEFAULT_BUCKETS)
    }

    /// # Panics
    ///
    /// Panics if `bucket_count` is 0.
    pub fn with_buckets(hasher: H, bucket_count: usize) -> Self {
        assert!(bucket_count > 0, "a map needs at least one bucket");
        let mut buckets = Vec::with_capacity(bucket_count);
        buckets.resize_with(bucket_count, Vec::new);
        BucketMap {
            hasher,
            buckets: buckets.into_boxed_slice(),
            len: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }

    fn bucket_index(&self, key: &K) -> usize {
        self.hasher.hash(key) as usize % self.buckets.len()
    }

    fn position(&self, bucket: usize, key: &K) -> Option<usize> {
        self.buckets[bucket]
            .iter()
            .position(|(k, _)| self.hasher.keys_equal(k, key))
    }

    /// Maps `key` to `value`, returning the value it replaced.
    pub fn put(&mut self, key: K, value: V) -> Option<V> {
        let bucket = self.bucket_index(&key);
        match self.position(bucket, &key) {
            Some(pos) => Some(mem::replace(&mut self.buckets[bucket][pos].1, value)),
            None => {
                self.buckets[bucket].push((key, value));
                self.len += 1;
                None
            }
        }
    }

    pub fn get(&self, key: &K) -> Option<&V> {
        let bucket = self.bucket_index(key);
        let pos = self.position(bucket, key)?;
        Some(&self.buckets[bucket][pos].1)
    }

    pub fn contains_key(&self, key: &K) -> bool {
        self.get(key).is_some()
    }

    /// Removes the mapping of `key`. Returns whether there was one.
    pub fn remove(&mut self, key: &K) -> bool {
        let bucket = self.bucket_index(key);
        match self.position(bucket, key) {
            Some(pos) => {
                self.buckets[bucket].swap_remove(pos);
                self.len -= 1;
                true
            }
            None => false,
        }
    }
}

impl<K, V, H> fmt::Debug for BucketMap<K, V, H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BucketMap")
            .field("buckets", &self.buckets.len())
            .field("len", &self.len)
            .finish()
    }
}
