// Unless explicitly stated otherwise all files in this repository are licensed under the Apache License Version 2.0.
// This product includes software developed at Datadog (https://www.datadoghq.com/).
// Copyright 2024 Datadog, Inc.

//! Jump Consistent Hash maps a 64-bit `key` to one of `buckets` buckets,
//! numbered `0..buckets`, without storing any assignment table.
//!
//! It is:
//!
//! - __regular__ (i.e., uniform, balanced): it distributes the keys evenly over
//!   the buckets,
//! - __monotone__ (i.e., stable): when a bucket is added, a key either keeps
//!   its bucket or moves to the new bucket, so only about `1/buckets` of the
//!   keys are remapped,
//! - __portable__: the sequence of buckets produced for a key is bit-for-bit
//!   identical to the other implementations of the algorithm, so services
//!   written in different languages agree on key placement.
//!
//! The evaluation runs in time logarithmic in `buckets`. See the
//! [Jump Consistent Hash paper](https://arxiv.org/abs/1406.2294) for details.
//!
//! # Usage
//!
//! ```
//! use jump_hash::consistent_hash;
//!
//! let bucket = consistent_hash(1, 100)?;
//!
//! assert_eq!(bucket, 55);
//! # Ok::<(), jump_hash::Error>(())
//! ```
//!
//! # Regularity
//!
//! With a large enough number of distinct keys, the numbers of keys in each
//! bucket are relatively close to one another.
//!
//! ```
//! use jump_hash::consistent_hash;
//!
//! let mut bucket_counts = [0_u64; 10];
//! for key in 0_i64..1_000_000_i64 {
//!     let bucket = consistent_hash(key, 10)?;
//!     bucket_counts[bucket as usize] += 1;
//! }
//!
//! let (min_count, max_count) = (
//!     *bucket_counts.iter().min().unwrap() as f64,
//!     *bucket_counts.iter().max().unwrap() as f64,
//! );
//! let relative_difference = (max_count - min_count) / min_count;
//! assert!(relative_difference < 0.01);
//! # Ok::<(), jump_hash::Error>(())
//! ```
//!
//! # Monotonicity
//!
//! When the number of buckets grows by one, the bucket of a key either stays
//! unchanged or becomes the new bucket.
//!
//! ```
//! use jump_hash::consistent_hash;
//!
//! let key = 8061045712430613959;
//!
//! let mut previous_bucket = 0;
//! for buckets in 1..1000 {
//!     let bucket = consistent_hash(key, buckets)?;
//!     assert!(bucket == previous_bucket || bucket == buckets - 1);
//!     previous_bucket = bucket;
//! }
//! # Ok::<(), jump_hash::Error>(())
//! ```

mod error;
mod lcg;

pub use error::Error;
use lcg::LinearCongruentialGenerator;

/// Assigns `key` to a bucket of `0..buckets`, uniformly and with stability.
///
/// `consistent_hash(key, n)` equals `n - 1` with probability close to `1/n`,
/// and `consistent_hash(key, n - 1)` otherwise.
///
/// # Errors
///
/// Returns [`Error::InvalidBucketCount`] if `buckets` is not positive.
///
/// # Example
///
/// ```
/// use jump_hash::{consistent_hash, Error};
///
/// let key = -3705298394137510231;
/// let bucket_17 = consistent_hash(key, 17)?;
/// let bucket_18 = consistent_hash(key, 18)?;
///
/// assert!((0..17).contains(&bucket_17));
/// assert!(bucket_18 == bucket_17 || bucket_18 == 17);
/// assert_eq!(consistent_hash(key, 0), Err(Error::InvalidBucketCount(0)));
/// # Ok::<(), Error>(())
/// ```
#[inline]
pub fn consistent_hash(key: i64, buckets: i32) -> Result<i32, Error> {
    if buckets <= 0 {
        return Err(Error::InvalidBucketCount(buckets));
    }
    let mut generator = LinearCongruentialGenerator::new(key);
    let mut candidate = 0_i32;
    loop {
        // Saturating cast: quotients past i32::MAX end the walk.
        let next = (f64::from(candidate + 1) / generator.next_f64()) as i32;
        if (0..buckets).contains(&next) {
            candidate = next;
        } else {
            return Ok(candidate);
        }
    }
}

/// Hashes `key` with XXH3 and assigns the digest to a bucket of
/// `0..buckets` with [`consistent_hash`].
///
/// # Errors
///
/// Returns [`Error::InvalidBucketCount`] if `buckets` is not positive.
#[cfg(feature = "xxh3")]
#[inline]
pub fn consistent_hash_xxh3(key: &[u8], buckets: i32) -> Result<i32, Error> {
    consistent_hash(xxhash_rust::xxh3::xxh3_64(key) as i64, buckets)
}
