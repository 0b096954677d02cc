//! Xor, fuse and binary fuse filters: probabilistic data structures answering
//! approximate set membership queries. Given a key, a filter answers either
//! "definitely not in the set" or "probably in the set", with a false positive
//! rate of roughly 2^-w for w-bit fingerprints, while storing only a little
//! over w bits per key.
//!
//! A filter is built exactly once from a set of distinct `u64` keys and is
//! immutable afterwards; lookups are read-only and freely shareable across
//! threads.
//!
//! ```
//! # extern crate alloc;
//! use xorfuse::{BinaryFuse8, Filter};
//! use core::convert::TryFrom;
//! # use alloc::vec::Vec;
//!
//! let keys: Vec<u64> = (0..10_000).collect();
//! let filter = BinaryFuse8::try_from(&keys).unwrap();
//!
//! assert!(filter.contains(&1234));
//! ```
//!
//! [`Xor8`] (and its 16- and 32-bit siblings) is the recommended general
//! default among the three-block filters; [`BinaryFuse8`] is denser still,
//! handles arbitrarily small key sets and tolerates duplicate keys, so prefer
//! it when the `binary-fuse` feature (on by default) is enabled. The classical
//! [`Fuse8`] family is kept for completeness but deprecated.
//!
//! Xor and classical fuse construction requires distinct keys. The [`dedup`]
//! module provides an in-place, allocation-free deduplication pass to
//! establish that precondition.

#![no_std]
#![warn(missing_docs)]

extern crate alloc;

use thiserror::Error;

pub mod dedup;
mod fingerprint;
mod keys;
mod murmur3;
mod prelude;
mod splitmix64;

#[cfg(feature = "binary-fuse")]
mod bfuse;
mod fuse;
mod xor;

#[cfg(feature = "binary-fuse")]
pub use bfuse::{BinaryFuse, BinaryFuse16, BinaryFuse32, BinaryFuse8};
pub use fingerprint::Fingerprint;
#[allow(deprecated)]
pub use fuse::{Fuse, Fuse16, Fuse32, Fuse8};
pub use keys::{slice_keys, KeyStream, SliceKeys};
pub use xor::{Xor, Xor16, Xor32, Xor8};

/// Methods common to xor, fuse and binary fuse filters.
pub trait Filter<Type> {
    /// Returns `true` if the filter probably contains the specified key.
    ///
    /// There are no false negatives: every key the filter was populated with
    /// is reported as contained.
    fn contains(&self, key: &Type) -> bool;

    /// Returns the number of fingerprint slots in the filter.
    fn len(&self) -> usize;

    /// Returns `true` if the filter has no fingerprint slots.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Errors surfaced by filter construction.
///
/// Lookups never fail; these arise only from allocation and population.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum Error {
    /// The allocator could not provide backing storage for the fingerprint
    /// array or the construction scratch.
    #[error("allocation of filter storage failed")]
    AllocationFailed,

    /// Construction exhausted its seed retry budget. For a correctly sized
    /// input the probability of this is astronomically small, so it almost
    /// always means the keys violate the distinctness precondition. Run the
    /// input through [`dedup::auto_unique`] first, or switch to a binary fuse
    /// filter, which deduplicates during construction.
    #[error("could not find a collision-free seed; input keys are likely not distinct")]
    KeysLikelyNotUnique,
}
