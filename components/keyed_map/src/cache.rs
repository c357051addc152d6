use std::fmt;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::hasher::KeyHasher;
use crate::map::{BucketMap, DEFAULT_BUCKETS};

/// A memoizing cache: a [`BucketMap`] behind a read/write lock.
///
/// Lookups share the read lock. A miss computes the value with no lock held,
/// then takes the write lock and inserts it unless another thread inserted the
/// same key in the meantime. Slow computations therefore never block readers
/// or computations of other keys.
pub struct CacheMap<K, V, H> {
    map: RwLock<BucketMap<K, V, H>>,
}

impl<K, V, H> CacheMap<K, V, H>
where
    V: Clone,
    H: KeyHasher<K>,
{
    pub fn new(hasher: H) -> Self {
        Self::with_buckets(hasher, DEFAULT_BUCKETS)
    }

    pub fn with_buckets(hasher: H, bucket_count: usize) -> Self {
        CacheMap {
            map: RwLock::new(BucketMap::with_buckets(hasher, bucket_count)),
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, BucketMap<K, V, H>> {
        self.map.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, BucketMap<K, V, H>> {
        self.map.write().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    /// Returns the cached value of `key` without computing anything.
    pub fn get(&self, key: &K) -> Option<V> {
        self.read().get(key).cloned()
    }

    /// Returns the cached value of `key`, computing it with `factory` on a
    /// miss.
    ///
    /// On a miss the freshly computed value is returned even if a concurrent
    /// caller cached its own value for `key` first; the cache keeps the first
    /// one inserted.
    pub fn get_or_insert_with<F>(&self, key: K, factory: F) -> V
    where
        F: FnOnce() -> V,
    {
        if let Some(value) = self.get(&key) {
            return value;
        }

        let value = factory();

        let mut map = self.write();
        if !map.contains_key(&key) {
            map.put(key, value.clone());
        } else {
            slog_global::trace!("cache entry inserted concurrently, keeping the first");
        }
        value
    }
}

impl<K, V, H> fmt::Debug for CacheMap<K, V, H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.map.try_read() {
            Ok(map) => f.debug_struct("CacheMap").field("map", &*map).finish(),
            Err(_) => f.debug_struct("CacheMap").field("map", &"<locked>").finish(),
        }
    }
}
