use std::fmt;

use jump_hash::{consistent_hash, consistent_hash_xxh3};

pub(crate) trait Algorithm: fmt::Display {
    fn hash(&self, key: &[u8], buckets: i32) -> i32;
}

#[derive(Clone, Debug)]
pub(crate) struct JumpHash;
impl fmt::Display for JumpHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Jump Hash")
    }
}
impl Algorithm for JumpHash {
    #[inline]
    fn hash(&self, key: &[u8], buckets: i32) -> i32 {
        debug_assert!(key.len() >= 8);
        consistent_hash(i64::from_ne_bytes(key[..8].try_into().unwrap()), buckets).unwrap()
    }
}

#[derive(Clone, Debug)]
pub(crate) struct JumpHashXXH3;
impl fmt::Display for JumpHashXXH3 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Jump Hash (XXH3)")
    }
}
impl Algorithm for JumpHashXXH3 {
    #[inline]
    fn hash(&self, key: &[u8], buckets: i32) -> i32 {
        consistent_hash_xxh3(key, buckets).unwrap()
    }
}
