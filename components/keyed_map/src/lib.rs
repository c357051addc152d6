//! A fixed-bucket hash map with a pluggable hashing strategy, and a
//! read/write-locked memoizing cache built on top of it.

pub mod cache;
pub mod hasher;
pub mod map;

pub use crate::cache::CacheMap;
pub use crate::hasher::{FnHasher, Fnv1aHasher, KeyHasher};
pub use crate::map::{BucketMap, DEFAULT_BUCKETS};
