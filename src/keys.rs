//! The key stream contract consumed by filter construction.

use core::iter::Copied;
use core::slice;

/// A finite, restartable producer of `u64` keys with a length known up front.
///
/// Filter construction is a retrying algorithm: when a seed fails to produce a
/// peelable hypergraph, the whole key set is rescanned under a fresh seed.
/// Each pass iterates a fresh [`Clone`] of the stream, so cloning must restart
/// iteration from the first key. That holds for slice iterators and most
/// adapters, but a stream backed by external storage must take care to rewind
/// on clone; a stream that does not restart silently corrupts construction.
///
/// `len()` (via [`ExactSizeIterator`]) sizes the construction scratch and must
/// match the number of keys actually produced.
///
/// The trait is blanket-implemented; any `ExactSizeIterator<Item = u64> +
/// Clone` qualifies:
///
/// ```
/// use xorfuse::{Filter, Xor8};
///
/// // Range<u64> is not ExactSizeIterator; produce keys from a usize range.
/// let mut filter = Xor8::with_capacity(64).unwrap();
/// filter.populate((0..64usize).map(|k| (k * k) as u64)).unwrap();
/// assert!(filter.contains(&49));
/// ```
pub trait KeyStream: ExactSizeIterator<Item = u64> + Clone {}

impl<I> KeyStream for I where I: ExactSizeIterator<Item = u64> + Clone {}

/// A [`KeyStream`] borrowing a slice of keys.
pub type SliceKeys<'a> = Copied<slice::Iter<'a, u64>>;

/// Adapts a slice of keys into a [`KeyStream`].
#[inline]
pub fn slice_keys(keys: &[u64]) -> SliceKeys<'_> {
    keys.iter().copied()
}
