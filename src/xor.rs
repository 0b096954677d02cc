//! Implements xor filters as described in [Xor Filters: Faster and Smaller Than Bloom and Cuckoo Filters].
//!
//! [Xor Filters: Faster and Smaller Than Bloom and Cuckoo Filters]: https://arxiv.org/abs/1912.08258

use alloc::boxed::Box;
use alloc::vec::Vec;
use core::convert::TryFrom;
use core::mem;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::fingerprint::Fingerprint;
use crate::keys::{slice_keys, KeyStream};
use crate::prelude::xor::{block_index, block_length_for, construct};
use crate::prelude::{mix, try_boxed_slice};
use crate::{Error, Filter};

/// Xor filter over three equal blocks of fingerprint slots, generic over the
/// fingerprint width.
///
/// A key indexes one slot per block; the xor of the three slots equals the
/// key's fingerprint for every key the filter was built from. Space usage is
/// ≈1.23·w bits per key for w-bit fingerprints; the false positive rate is
/// ≈2^-w. Construction requires distinct keys; see [`crate::dedup`].
///
/// The width aliases [`Xor8`], [`Xor16`] and [`Xor32`] cover the common
/// cases.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Debug)]
pub struct Xor<Fp> {
    /// The seed under which the key set peeled successfully.
    pub seed: u64,
    /// The number of slots in each of the three blocks.
    pub block_length: usize,
    /// The fingerprints, `3 * block_length` of them.
    pub fingerprints: Box<[Fp]>,
}

/// Xor filter using 8-bit fingerprints: <10 bits per key, false positive rate
/// of <0.4%.
///
/// ```
/// # extern crate alloc;
/// use xorfuse::{Filter, Xor8};
/// use core::convert::TryFrom;
/// # use alloc::vec::Vec;
/// # use rand::Rng;
///
/// # let mut rng = rand::thread_rng();
/// const SAMPLE_SIZE: usize = 1_000_000;
/// let keys: Vec<u64> = (0..SAMPLE_SIZE).map(|_| rng.gen()).collect();
/// let filter = Xor8::try_from(&keys).unwrap();
///
/// // no false negatives
/// for key in keys {
///     assert!(filter.contains(&key));
/// }
///
/// // bits per entry
/// let bpe = (filter.len() as f64) * 8.0 / (SAMPLE_SIZE as f64);
/// assert!(bpe < 10., "Bits per entry is {}", bpe);
///
/// // false positive rate
/// let false_positives: usize = (0..SAMPLE_SIZE)
///     .map(|_| rng.gen())
///     .filter(|n| filter.contains(n))
///     .count();
/// let fp_rate: f64 = (false_positives * 100) as f64 / SAMPLE_SIZE as f64;
/// assert!(fp_rate < 0.406, "False positive rate is {}", fp_rate);
/// ```
pub type Xor8 = Xor<u8>;

/// Xor filter using 16-bit fingerprints: <20 bits per key, false positive
/// rate of ≈0.0015%.
pub type Xor16 = Xor<u16>;

/// Xor filter using 32-bit fingerprints, for when false positives are nearly
/// unaffordable.
pub type Xor32 = Xor<u32>;

impl<Fp: Fingerprint> Xor<Fp> {
    /// Allocates an unpopulated filter sized for an expected number of keys.
    ///
    /// # Errors
    ///
    /// [`Error::AllocationFailed`] if the fingerprint storage cannot be
    /// allocated.
    pub fn with_capacity(capacity: usize) -> Result<Self, Error> {
        let block_length = block_length_for(capacity);
        Ok(Self {
            seed: 0,
            block_length,
            fingerprints: try_boxed_slice(3 * block_length)?,
        })
    }

    /// Builds the filter from a stream of distinct keys. One-shot: a filter
    /// is populated at most once.
    ///
    /// The stream should produce the number of keys the filter was sized for;
    /// construction makes several passes, iterating a fresh clone of the
    /// stream each time (see [`KeyStream`]).
    ///
    /// # Errors
    ///
    /// [`Error::KeysLikelyNotUnique`] if no seed yields a peelable key set;
    /// in practice, duplicated keys. [`Error::AllocationFailed`] if the
    /// construction scratch cannot be allocated.
    pub fn populate<K: KeyStream>(&mut self, keys: K) -> Result<(), Error> {
        self.seed = construct(keys, self.block_length, &mut self.fingerprints)?;
        Ok(())
    }

    /// Builds the filter from a slice of distinct keys.
    pub fn populate_from_slice(&mut self, keys: &[u64]) -> Result<(), Error> {
        self.populate(slice_keys(keys))
    }

    /// Reports the memory footprint: fingerprint storage plus the fixed
    /// header.
    pub fn size_in_bytes(&self) -> usize {
        mem::size_of::<Self>() + self.fingerprints.len() * mem::size_of::<Fp>()
    }
}

impl<Fp: Fingerprint> Filter<u64> for Xor<Fp> {
    fn contains(&self, key: &u64) -> bool {
        let hash = mix(*key, self.seed);
        let fp = Fp::from_hash(hash);
        fp == self.fingerprints[block_index(hash, 0, self.block_length)]
            ^ self.fingerprints[block_index(hash, 1, self.block_length) + self.block_length]
            ^ self.fingerprints[block_index(hash, 2, self.block_length) + 2 * self.block_length]
    }

    fn len(&self) -> usize {
        self.fingerprints.len()
    }
}

impl<Fp: Fingerprint> TryFrom<&[u64]> for Xor<Fp> {
    type Error = Error;

    fn try_from(keys: &[u64]) -> Result<Self, Self::Error> {
        let mut filter = Self::with_capacity(keys.len())?;
        filter.populate_from_slice(keys)?;
        Ok(filter)
    }
}

impl<Fp: Fingerprint> TryFrom<&Vec<u64>> for Xor<Fp> {
    type Error = Error;

    fn try_from(v: &Vec<u64>) -> Result<Self, Self::Error> {
        Self::try_from(v.as_slice())
    }
}

impl<Fp: Fingerprint> TryFrom<Vec<u64>> for Xor<Fp> {
    type Error = Error;

    fn try_from(v: Vec<u64>) -> Result<Self, Self::Error> {
        Self::try_from(v.as_slice())
    }
}
