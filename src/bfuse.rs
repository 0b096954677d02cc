//! Implements binary fuse filters.

use alloc::boxed::Box;
use alloc::vec::Vec;
use core::convert::TryFrom;
use core::mem;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::fingerprint::Fingerprint;
use crate::keys::{slice_keys, KeyStream};
use crate::prelude::bfuse::{construct, hash_of_hash, Layout};
use crate::prelude::{mix, try_boxed_slice};
use crate::{Error, Filter};

/// Binary fuse filter, generic over the fingerprint width.
///
/// The revised fuse construction: the same ≈0.879 fill factor as a classical
/// fuse filter, but the segment geometry is derived from the key count, so
/// arbitrarily small key sets build fine, and duplicated keys are detected
/// and dropped during construction instead of causing failure. This is the
/// best general-purpose filter in the crate.
///
/// The width aliases [`BinaryFuse8`], [`BinaryFuse16`] and [`BinaryFuse32`]
/// cover the common cases.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Debug)]
pub struct BinaryFuse<Fp> {
    /// The seed under which construction succeeded.
    pub seed: u64,
    /// Length of each slot segment; a power of two.
    pub segment_length: u32,
    /// `segment_length - 1`, for masking in-segment offsets.
    pub segment_length_mask: u32,
    /// Number of logical segments a key's window can start in.
    pub segment_count: u32,
    /// `segment_count * segment_length`.
    pub segment_count_length: u32,
    /// The fingerprints, `(segment_count + 2) * segment_length` of them.
    pub fingerprints: Box<[Fp]>,
}

/// Binary fuse filter using 8-bit fingerprints: ≈9 bits per key, false
/// positive rate of <0.4%.
///
/// ```
/// # extern crate alloc;
/// use xorfuse::{BinaryFuse8, Filter};
/// use core::convert::TryFrom;
/// # use alloc::vec::Vec;
/// # use rand::Rng;
///
/// # let mut rng = rand::thread_rng();
/// const SAMPLE_SIZE: usize = 1_000_000;
/// let keys: Vec<u64> = (0..SAMPLE_SIZE).map(|_| rng.gen()).collect();
/// let filter = BinaryFuse8::try_from(&keys).unwrap();
///
/// // no false negatives
/// for key in keys {
///     assert!(filter.contains(&key));
/// }
///
/// // bits per entry
/// let bpe = (filter.len() as f64) * 8.0 / (SAMPLE_SIZE as f64);
/// assert!(bpe < 9.1, "Bits per entry is {}", bpe);
///
/// // false positive rate
/// let false_positives: usize = (0..SAMPLE_SIZE)
///     .map(|_| rng.gen())
///     .filter(|n| filter.contains(n))
///     .count();
/// let fp_rate: f64 = (false_positives * 100) as f64 / SAMPLE_SIZE as f64;
/// assert!(fp_rate < 0.406, "False positive rate is {}", fp_rate);
/// ```
pub type BinaryFuse8 = BinaryFuse<u8>;

/// Binary fuse filter using 16-bit fingerprints: ≈18 bits per key, false
/// positive rate of ≈0.0015%.
pub type BinaryFuse16 = BinaryFuse<u16>;

/// Binary fuse filter using 32-bit fingerprints, for when false positives
/// are nearly unaffordable.
pub type BinaryFuse32 = BinaryFuse<u32>;

impl<Fp: Fingerprint> BinaryFuse<Fp> {
    /// Allocates an unpopulated filter sized for an expected number of keys.
    ///
    /// # Errors
    ///
    /// [`Error::AllocationFailed`] if the fingerprint storage cannot be
    /// allocated.
    pub fn with_capacity(capacity: usize) -> Result<Self, Error> {
        let layout = Layout::for_keys(capacity as u32);
        Ok(Self {
            seed: 0,
            segment_length: layout.segment_length,
            segment_length_mask: layout.segment_length_mask,
            segment_count: layout.segment_count,
            segment_count_length: layout.segment_count_length,
            fingerprints: try_boxed_slice(layout.array_length)?,
        })
    }

    /// Builds the filter from a stream of keys. One-shot: a filter is
    /// populated at most once. Duplicated keys are tolerated.
    ///
    /// The stream should produce the number of keys the filter was sized for;
    /// construction makes several passes, iterating a fresh clone of the
    /// stream each time (see [`KeyStream`]).
    ///
    /// # Errors
    ///
    /// [`Error::KeysLikelyNotUnique`] if construction fails repeatedly, which
    /// takes a pathologically adversarial key set.
    /// [`Error::AllocationFailed`] if the construction scratch cannot be
    /// allocated.
    pub fn populate<K: KeyStream>(&mut self, keys: K) -> Result<(), Error> {
        let layout = Layout {
            segment_length: self.segment_length,
            segment_length_mask: self.segment_length_mask,
            segment_count: self.segment_count,
            segment_count_length: self.segment_count_length,
            array_length: self.fingerprints.len(),
        };
        self.seed = construct(keys, layout, &mut self.fingerprints)?;
        Ok(())
    }

    /// Builds the filter from a slice of keys.
    pub fn populate_from_slice(&mut self, keys: &[u64]) -> Result<(), Error> {
        self.populate(slice_keys(keys))
    }

    /// Reports the memory footprint: fingerprint storage plus the fixed
    /// header.
    pub fn size_in_bytes(&self) -> usize {
        mem::size_of::<Self>() + self.fingerprints.len() * mem::size_of::<Fp>()
    }
}

impl<Fp: Fingerprint> Filter<u64> for BinaryFuse<Fp> {
    fn contains(&self, key: &u64) -> bool {
        let hash = mix(*key, self.seed);
        let (h0, h1, h2) = hash_of_hash(
            hash,
            self.segment_length,
            self.segment_length_mask,
            self.segment_count_length,
        );
        Fp::from_hash(hash)
            ^ self.fingerprints[h0 as usize]
            ^ self.fingerprints[h1 as usize]
            ^ self.fingerprints[h2 as usize]
            == Fp::default()
    }

    fn len(&self) -> usize {
        self.fingerprints.len()
    }
}

impl<Fp: Fingerprint> TryFrom<&[u64]> for BinaryFuse<Fp> {
    type Error = Error;

    fn try_from(keys: &[u64]) -> Result<Self, Self::Error> {
        let mut filter = Self::with_capacity(keys.len())?;
        filter.populate_from_slice(keys)?;
        Ok(filter)
    }
}

impl<Fp: Fingerprint> TryFrom<&Vec<u64>> for BinaryFuse<Fp> {
    type Error = Error;

    fn try_from(v: &Vec<u64>) -> Result<Self, Self::Error> {
        Self::try_from(v.as_slice())
    }
}

impl<Fp: Fingerprint> TryFrom<Vec<u64>> for BinaryFuse<Fp> {
    type Error = Error;

    fn try_from(v: Vec<u64>) -> Result<Self, Self::Error> {
        Self::try_from(v.as_slice())
    }
}

#[cfg(test)]
mod test {
    use crate::{BinaryFuse16, BinaryFuse8, Filter};

    use alloc::vec::Vec;
    use alloc::{format, vec};
    use rand::Rng;

    #[test]
    fn test_initialization() {
        const SAMPLE_SIZE: usize = 1_000_000;
        let mut rng = rand::thread_rng();
        let keys: Vec<u64> = (0..SAMPLE_SIZE).map(|_| rng.gen()).collect();

        let filter = BinaryFuse8::try_from(&keys).unwrap();

        for key in keys {
            assert!(filter.contains(&key));
        }
    }

    #[test]
    fn test_sequential_keys() {
        let keys: Vec<u64> = (0..1_000_000).collect();
        let filter = BinaryFuse8::try_from(&keys).unwrap();

        for key in keys {
            assert!(filter.contains(&key));
        }
    }

    #[test]
    fn test_bits_per_entry() {
        const SAMPLE_SIZE: usize = 1_000_000;
        let mut rng = rand::thread_rng();
        let keys: Vec<u64> = (0..SAMPLE_SIZE).map(|_| rng.gen()).collect();

        let filter = BinaryFuse8::try_from(&keys).unwrap();
        let bpe = (filter.len() as f64) * 8.0 / (SAMPLE_SIZE as f64);

        assert!(bpe < 9.1, "Bits per entry is {}", bpe);
    }

    #[test]
    fn test_false_positives() {
        const SAMPLE_SIZE: usize = 1_000_000;
        let mut rng = rand::thread_rng();
        let keys: Vec<u64> = (0..SAMPLE_SIZE).map(|_| rng.gen()).collect();

        let filter = BinaryFuse8::try_from(&keys).unwrap();

        let false_positives: usize = (0..SAMPLE_SIZE)
            .map(|_| rng.gen())
            .filter(|n| filter.contains(n))
            .count();
        let fp_rate: f64 = (false_positives * 100) as f64 / SAMPLE_SIZE as f64;
        assert!(fp_rate < 0.406, "False positive rate is {}", fp_rate);
    }

    #[test]
    fn test_false_positives_16() {
        const SAMPLE_SIZE: usize = 1_000_000;
        let mut rng = rand::thread_rng();
        let keys: Vec<u64> = (0..SAMPLE_SIZE).map(|_| rng.gen()).collect();

        let filter = BinaryFuse16::try_from(&keys).unwrap();

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
    fn test_degenerate_key_sets() {
        for size in [0usize, 1, 2, 3, 10] {
            let keys: Vec<u64> = (0..size as u64).map(|k| k * 0x0bad_cafe + 7).collect();
            let filter = BinaryFuse8::try_from(&keys)
                .unwrap_or_else(|_| panic!("construction failed for {} keys", size));
            for key in keys {
                assert!(filter.contains(&key));
            }
        }
    }

    #[test]
    fn test_single_random_key() {
        let key = rand::random();
        let filter = BinaryFuse8::try_from(vec![key]).unwrap();
        assert!(filter.contains(&key));
    }

    #[test]
    fn test_duplicate_keys_are_tolerated() {
        let keys = vec![303u64, 1, 77, 31, 241, 303];
        let filter = BinaryFuse8::try_from(&keys).unwrap();
        for key in [303u64, 1, 77, 31, 241] {
            assert!(filter.contains(&key));
        }
    }

    #[test]
    fn test_many_duplicates() {
        let mut rng = rand::thread_rng();
        let mut keys: Vec<u64> = (0..1337).map(|_| rng.gen()).collect();
        keys.push(keys[0]);
        keys.push(keys[711]);

        let filter = BinaryFuse8::try_from(&keys).unwrap();
        for key in keys {
            assert!(filter.contains(&key));
        }
    }

    #[test]
    fn test_size_formula() {
        let keys: Vec<u64> = (0..100_000).collect();
        let filter = BinaryFuse8::try_from(&keys).unwrap();

        assert_eq!(filter.segment_length_mask + 1, filter.segment_length);
        assert!(filter.segment_length.is_power_of_two());
        assert_eq!(
            filter.len(),
            ((filter.segment_count + 2) * filter.segment_length) as usize
        );
        assert_eq!(
            filter.size_in_bytes(),
            filter.len() + core::mem::size_of::<BinaryFuse8>()
        );
    }

    #[test]
    fn test_deterministic_construction() {
        let keys: Vec<u64> = (0..50_000).map(|k| k * 11 + 3).collect();
        let a = BinaryFuse8::try_from(&keys).unwrap();
        let b = BinaryFuse8::try_from(&keys).unwrap();

        assert_eq!(a.seed, b.seed);
        assert_eq!(a.fingerprints, b.fingerprints);
    }

    #[test]
    fn test_debug_format_names_geometry() {
        let filter = BinaryFuse8::try_from(vec![1u64, 2, 3]).unwrap();
        let repr = format!("{:?}", filter);
        assert!(repr.contains("segment_length"));
    }
}
