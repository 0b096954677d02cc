//! Implements classical fuse filters.

#![allow(deprecated)] // Fuse filters are deprecated, but we still ship them.

use alloc::boxed::Box;
use alloc::vec::Vec;
use core::convert::TryFrom;
use core::mem;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::fingerprint::Fingerprint;
use crate::keys::{slice_keys, KeyStream};
use crate::prelude::fuse::{construct, h012, FUSE_OVERHEAD, SLOTS};
use crate::prelude::{mix, try_boxed_slice};
use crate::{Error, Filter};

/// Classical fuse filter in a [fuse graph] of 100 segments, generic over the
/// fingerprint width.
///
/// Denser than an [`Xor`](crate::Xor) filter (≈1.14·w bits per key), but the
/// fixed segmentation is tuned for very large key sets: construction on fewer
/// than roughly 125,000 unique keys fails with
/// [`Error::KeysLikelyNotUnique`]. Binary fuse filters keep the density
/// without the minimum, which is why this family is deprecated.
///
/// [fuse graph]: https://arxiv.org/abs/1907.04749
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Debug)]
#[deprecated(since = "0.1.0", note = "prefer a `BinaryFuse` filter")]
pub struct Fuse<Fp> {
    /// The seed under which the key set peeled successfully.
    pub seed: u64,
    /// The length of each of the 102 slot segments.
    pub segment_length: usize,
    /// The fingerprints, `102 * segment_length` of them.
    pub fingerprints: Box<[Fp]>,
}

/// Fuse filter using 8-bit fingerprints: <9.102 bits per key, false positive
/// rate of <0.4%. Requires >100k unique keys to construct.
#[deprecated(since = "0.1.0", note = "prefer using a `BinaryFuse8`")]
pub type Fuse8 = Fuse<u8>;

/// Fuse filter using 16-bit fingerprints. Requires >100k unique keys to
/// construct.
#[deprecated(since = "0.1.0", note = "prefer using a `BinaryFuse16`")]
pub type Fuse16 = Fuse<u16>;

/// Fuse filter using 32-bit fingerprints. Requires >100k unique keys to
/// construct.
#[deprecated(since = "0.1.0", note = "prefer using a `BinaryFuse32`")]
pub type Fuse32 = Fuse<u32>;

impl<Fp: Fingerprint> Fuse<Fp> {
    /// Allocates an unpopulated filter sized for an expected number of keys.
    ///
    /// # Errors
    ///
    /// [`Error::AllocationFailed`] if the fingerprint storage cannot be
    /// allocated.
    pub fn with_capacity(capacity: usize) -> Result<Self, Error> {
        let slots = (FUSE_OVERHEAD * capacity as f64) as usize;
        let segment_length = slots / SLOTS;
        Ok(Self {
            seed: 0,
            segment_length,
            fingerprints: try_boxed_slice(SLOTS * segment_length)?,
        })
    }

    /// Builds the filter from a stream of distinct keys. One-shot: a filter
    /// is populated at most once.
    ///
    /// # Errors
    ///
    /// [`Error::KeysLikelyNotUnique`] if no seed yields a peelable key set:
    /// duplicated keys, or a key set below the documented minimum size.
    /// [`Error::AllocationFailed`] if the construction scratch cannot be
    /// allocated.
    pub fn populate<K: KeyStream>(&mut self, keys: K) -> Result<(), Error> {
        if self.segment_length == 0 {
            // Sized under one slot block; nothing can peel into it.
            return if keys.len() == 0 {
                Ok(())
            } else {
                Err(Error::KeysLikelyNotUnique)
            };
        }
        self.seed = construct(keys, self.segment_length, &mut self.fingerprints)?;
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

impl<Fp: Fingerprint> Filter<u64> for Fuse<Fp> {
    fn contains(&self, key: &u64) -> bool {
        let hash = mix(*key, self.seed);
        let fp = Fp::from_hash(hash);
        let [h0, h1, h2] = h012(hash, self.segment_length);
        fp == self.fingerprints[h0] ^ self.fingerprints[h1] ^ self.fingerprints[h2]
    }

    fn len(&self) -> usize {
        self.fingerprints.len()
    }
}

impl<Fp: Fingerprint> TryFrom<&[u64]> for Fuse<Fp> {
    type Error = Error;

    fn try_from(keys: &[u64]) -> Result<Self, Self::Error> {
        let mut filter = Self::with_capacity(keys.len())?;
        filter.populate_from_slice(keys)?;
        Ok(filter)
    }
}

impl<Fp: Fingerprint> TryFrom<&Vec<u64>> for Fuse<Fp> {
    type Error = Error;

    fn try_from(v: &Vec<u64>) -> Result<Self, Self::Error> {
        Self::try_from(v.as_slice())
    }
}

impl<Fp: Fingerprint> TryFrom<Vec<u64>> for Fuse<Fp> {
    type Error = Error;

    fn try_from(v: Vec<u64>) -> Result<Self, Self::Error> {
        Self::try_from(v.as_slice())
    }
}

#[cfg(test)]
mod test {
    use crate::{Filter, Fuse16, Fuse8};

    use alloc::vec::Vec;
    use rand::Rng;

    #[test]
    fn test_initialization() {
        const SAMPLE_SIZE: usize = 1_000_000;
        let mut rng = rand::thread_rng();
        let keys: Vec<u64> = (0..SAMPLE_SIZE).map(|_| rng.gen()).collect();

        let filter = Fuse8::try_from(&keys).unwrap();

        for key in keys {
            assert!(filter.contains(&key));
        }
    }

    #[test]
    fn test_bits_per_entry() {
        const SAMPLE_SIZE: usize = 1_000_000;
        let mut rng = rand::thread_rng();
        let keys: Vec<u64> = (0..SAMPLE_SIZE).map(|_| rng.gen()).collect();

        let filter = Fuse8::try_from(&keys).unwrap();
        let bpe = (filter.len() as f64) * 8.0 / (SAMPLE_SIZE as f64);

        assert!(bpe < 9.102, "Bits per entry is {}", bpe);
    }

    #[test]
    fn test_false_positives() {
        const SAMPLE_SIZE: usize = 1_000_000;
        let mut rng = rand::thread_rng();
        let keys: Vec<u64> = (0..SAMPLE_SIZE).map(|_| rng.gen()).collect();

        let filter = Fuse16::try_from(&keys).unwrap();

        let false_positives: usize = (0..SAMPLE_SIZE)
            .map(|_| rng.gen())
            .filter(|n| filter.contains(n))
            .count();
        assert!(
            false_positives < 100,
            "{} false positives over {} trials",
            false_positives,
            SAMPLE_SIZE
        );
    }

    #[test]
    fn test_small_key_sets_fail() {
        let keys: Vec<u64> = (0..100).collect();
        assert!(Fuse8::try_from(&keys).is_err());
    }

    #[test]
    fn test_empty_key_set() {
        let keys: Vec<u64> = Vec::new();
        let filter = Fuse8::try_from(&keys).unwrap();
        assert!(filter.is_empty());
    }
}
