//! Fingerprint storage widths.

use core::fmt::Debug;
use core::ops::BitXor;

/// Storage for a w-bit filter fingerprint.
///
/// A fingerprint is the low [`BITS`](Fingerprint::BITS) bits of the folded
/// 64-bit key hash. Storage rounds up to whole bytes, but widths below the
/// storage width remain useful: the false positive rate tracks the logical
/// width (≈2^-w), and a caller doing its own bit-packed serialisation only
/// needs the masked values. Implementations for `u8`, `u16`, `u32` and `u64`
/// cover the common byte-aligned widths; [`narrow_fingerprint!`] stamps out a
/// type for any other width from 2 to 63.
///
/// [`narrow_fingerprint!`]: crate::narrow_fingerprint
pub trait Fingerprint: Copy + Clone + Debug + Default + PartialEq + BitXor<Output = Self> {
    /// Logical width w of the fingerprint, in bits.
    const BITS: u32;
    /// Mask selecting the low `BITS` bits of a hash: `(1 << BITS) - 1`.
    const MASK: u64;

    /// Derives a fingerprint from a mixed 64-bit key hash by folding the high
    /// half onto the low half and masking to width.
    fn from_hash(hash: u64) -> Self;
}

macro_rules! byte_aligned_fingerprint(
    ($($ty:ty),*) => {$(
        impl Fingerprint for $ty {
            const BITS: u32 = <$ty>::BITS;
            const MASK: u64 = u64::MAX >> (64 - Self::BITS);

            #[inline]
            fn from_hash(hash: u64) -> Self {
                ((hash ^ (hash >> 32)) & Self::MASK) as $ty
            }
        }
    )*};
);

byte_aligned_fingerprint!(u8, u16, u32, u64);

/// Defines a fingerprint type of an arbitrary width between 2 and 63 bits,
/// stored in the given unsigned integer type.
///
/// ```
/// use xorfuse::{narrow_fingerprint, Filter, Xor};
/// use core::convert::TryFrom;
///
/// narrow_fingerprint!(struct Fp4(u8, 4));
///
/// let keys: Vec<u64> = (0..10_000).collect();
/// let filter: Xor<Fp4> = Xor::try_from(keys.as_slice()).unwrap();
/// assert!(filter.contains(&77));
/// ```
#[macro_export]
macro_rules! narrow_fingerprint(
    ($(#[$attr:meta])* $vis:vis struct $name:ident($storage:ty, $bits:expr)) => {
        $(#[$attr])*
        #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
        $vis struct $name($storage);

        impl ::core::ops::BitXor for $name {
            type Output = Self;

            #[inline]
            fn bitxor(self, rhs: Self) -> Self {
                Self(self.0 ^ rhs.0)
            }
        }

        impl $crate::Fingerprint for $name {
            const BITS: u32 = $bits;
            const MASK: u64 = u64::MAX >> (64 - $bits);

            #[inline]
            fn from_hash(hash: u64) -> Self {
                Self(((hash ^ (hash >> 32)) & Self::MASK) as $storage)
            }
        }
    };
);
