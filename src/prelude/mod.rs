//! Internals shared by the filter construction routines.

#[cfg(feature = "binary-fuse")]
pub mod bfuse;
pub mod fuse;
pub mod xor;

use alloc::boxed::Box;
use alloc::vec::Vec;

use crate::murmur3;
use crate::Error;

/// Seed attempts before construction gives up and reports the keys as likely
/// duplicated.
pub const MAX_ITERATIONS: u32 = 100;

/// Applies a finalization mix to a seeded key, resulting in an avalanched
/// hash. This keeps the three derived slot indices and the fingerprint
/// decorrelated from the raw key bits.
#[inline]
pub const fn mix(key: u64, seed: u64) -> u64 {
    murmur3::mix64(key.wrapping_add(seed))
}

/// Left-rotates a 64-bit value by `c mod 64`.
#[inline]
pub const fn rotl64(n: u64, c: u32) -> u64 {
    n.rotate_left(c)
}

/// Maps a 32-bit hash uniformly onto `[0, n)` without a modulo, per Lemire's
/// fast range reduction.
#[inline]
pub const fn reduce(hash: u32, n: usize) -> usize {
    ((hash as u64 * n as u64) >> 32) as usize
}

/// The hash of a key and the slot index of that key in the construction
/// array H.
#[derive(Clone, Copy, Default)]
pub struct KeyIndex {
    pub hash: u64,
    pub index: usize,
}

/// A set in the construction array H. Member hashes are encoded by xor into
/// the mask; when only one key remains, the mask contains its hash wholly.
#[derive(Clone, Default)]
pub struct HSet {
    pub count: u32,
    pub mask: u64,
}

/// Enqueues a set from the construction array if it has exactly one key left.
#[inline]
pub fn try_enqueue(sets: &[HSet], idx: usize, queue: &mut [KeyIndex], queue_size: &mut usize) {
    if sets[idx].count == 1 {
        queue[*queue_size] = KeyIndex {
            index: idx,
            hash: sets[idx].mask,
        };
        *queue_size += 1;
    }
}

/// Allocates a zero-initialised boxed slice, surfacing allocator failure
/// instead of aborting.
pub fn try_boxed_slice<T: Clone + Default>(len: usize) -> Result<Box<[T]>, Error> {
    let mut block = Vec::new();
    block
        .try_reserve_exact(len)
        .map_err(|_| Error::AllocationFailed)?;
    block.resize(len, T::default());
    Ok(block.into_boxed_slice())
}
