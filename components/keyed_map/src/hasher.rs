/// How a [`BucketMap`] hashes and compares its keys.
///
/// Keys that compare equal must hash equally. Nothing else is required: a
/// strategy that hashes every key to the same value is slow but correct.
///
/// [`BucketMap`]: crate::BucketMap
pub trait KeyHasher<K: ?Sized> {
    fn hash(&self, key: &K) -> u32;

    fn keys_equal(&self, a: &K, b: &K) -> bool;
}

const FNV_OFFSET: u32 = 2_166_136_261;
const FNV_PRIME: u32 = 16_777_619;

/// 32-bit FNV-1a over the key bytes; equality by `==`.
#[derive(Clone, Copy, Debug, Default)]
pub struct Fnv1aHasher;

impl<K: AsRef<[u8]> + PartialEq + ?Sized> KeyHasher<K> for Fnv1aHasher {
    fn hash(&self, key: &K) -> u32 {
        key.as_ref()
            .iter()
            .fold(FNV_OFFSET, |hash, &b| (hash ^ u32::from(b)).wrapping_mul(FNV_PRIME))
    }

    fn keys_equal(&self, a: &K, b: &K) -> bool {
        a == b
    }
}

/// A strategy made of two closures.
#[derive(Clone, Copy, Debug)]
pub struct FnHasher<H, E> {
    hash: H,
    equal: E,
}

impl<H, E> FnHasher<H, E> {
    pub fn new(hash: H, equal: E) -> Self {
        FnHasher { hash, equal }
    }
}

impl<K: ?Sized, H, E> KeyHasher<K> for FnHasher<H, E>
where
    H: Fn(&K) -> u32,
    E: Fn(&K, &K) -> bool,
{
    fn hash(&self, key: &K) -> u32 {
        (self.hash)(key)
    }

    fn keys_equal(&self, a: &K, b: &K) -> bool {
        (self.equal)(a, b)
    }
}
