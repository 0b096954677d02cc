//! In-place deduplication.
//!
//! Xor and classical fuse construction requires distinct keys. This module
//! rearranges a buffer so that a prefix holds each distinct value exactly
//! once, in O(n) expected time and O(1) auxiliary space (the buffer itself is
//! the working memory), so very large key sets can be deduplicated without a
//! hash table. Element order is not preserved.
//!
//! The algorithm is a home-address classification sweep: hashing assigns each
//! value a home slot; a value meeting a copy of itself already sitting at its
//! home is a duplicate and is overwritten with a sentinel value (the first
//! element of the region). Homed values and sentinels are then compacted to
//! the front and back respectively. The unresolved middle block (values whose
//! home was occupied by a different homed value) is deduplicated recursively
//! under its own sentinel and modulus.

use core::hash::{Hash, Hasher};

use xxhash_rust::xxh64::Xxh64;

/// Rearranges `data` so that a prefix contains each distinct value exactly
/// once and returns that prefix. Values are compared with `eq` and hashed
/// with `hash`; the hash only steers slot placement, so a weak hash degrades
/// speed, not correctness. Order is not preserved.
pub fn unique_by<T, H, E>(data: &mut [T], hash: H, eq: E) -> &mut [T]
where
    T: Clone,
    H: Fn(&T) -> u64,
    E: Fn(&T, &T) -> bool,
{
    let len = unique_block(data, &hash, &eq);
    &mut data[..len]
}

/// [`unique_by`] with the element type's own hash and equality.
///
/// ```
/// let mut data = [1u64, 2, 2, 3, 3, 4, 2, 1, 4, 1, 2, 3, 4, 4, 3, 2, 1];
/// let unique = xorfuse::dedup::auto_unique(&mut data);
///
/// unique.sort_unstable();
/// assert_eq!(unique, [1, 2, 3, 4]);
/// ```
pub fn auto_unique<T>(data: &mut [T]) -> &mut [T]
where
    T: Clone + Hash + PartialEq,
{
    unique_by(
        data,
        |value| {
            let mut hasher = Xxh64::new(0);
            value.hash(&mut hasher);
            hasher.finish()
        },
        |a, b| a == b,
    )
}

/// Deduplicates one region, returning the length of its unique prefix.
fn unique_block<T, H, E>(data: &mut [T], hash: &H, eq: &E) -> usize
where
    T: Clone,
    H: Fn(&T) -> u64,
    E: Fn(&T, &T) -> bool,
{
    if data.len() < 2 {
        return data.len();
    }

    // The region's first element serves as the sentinel marking erased
    // duplicates; its own copies are erased by the skip in the sweep.
    let sentinel = data[0].clone();
    let rest = &mut data[1..];
    let modulus = rest.len() as u64;
    let home_of = |value: &T| (hash(value) % modulus) as usize;

    // Sweep values toward their home slots. A value whose home already holds
    // an equal value is a duplicate. Swapping into a slot behind the cursor
    // is fine; that slot has already been classified.
    let mut i = 0;
    while i < rest.len() {
        if eq(&rest[i], &sentinel) {
            i += 1;
            continue;
        }
        let home = home_of(&rest[i]);
        if i == home {
            i += 1;
            continue;
        }
        if eq(&rest[i], &rest[home]) {
            rest[i] = sentinel.clone();
            i += 1;
            continue;
        }
        if eq(&rest[home], &sentinel) {
            rest.swap(i, home);
            i += 1;
            continue;
        }
        if home_of(&rest[home]) != home {
            rest.swap(i, home);
            if home < i {
                i += 1;
            }
        } else {
            i += 1;
        }
    }

    // Compact values sitting at their own home to the front; each is the
    // surviving copy of its value.
    let mut swap_pos = 0;
    for i in 0..rest.len() {
        if !eq(&rest[i], &sentinel) && home_of(&rest[i]) == i {
            rest.swap(i, swap_pos);
            swap_pos += 1;
        }
    }

    // Push the sentinel copies to the tail.
    let mut sentinel_pos = rest.len();
    let mut i = swap_pos;
    while i < sentinel_pos {
        if eq(&rest[i], &sentinel) {
            sentinel_pos -= 1;
            rest.swap(i, sentinel_pos);
        } else {
            i += 1;
        }
    }

    // What remains between the homed block and the sentinels are values that
    // lost the race for an occupied home slot; none equal the sentinel, and
    // none duplicate a homed value, but they may duplicate each other.
    let tail = unique_block(&mut rest[swap_pos..sentinel_pos], hash, eq);

    1 + swap_pos + tail
}

#[cfg(test)]
mod test {
    use super::{auto_unique, unique_by};

    use alloc::collections::BTreeSet;
    use alloc::vec::Vec;
    use rand::Rng;

    #[test]
    fn test_small_multiset() {
        let mut data = [1u64, 2, 2, 3, 3, 4, 2, 1, 4, 1, 2, 3, 4, 4, 3, 2, 1];
        let unique = auto_unique(&mut data);

        assert_eq!(unique.len(), 4);
        let set: BTreeSet<u64> = unique.iter().copied().collect();
        assert_eq!(set.into_iter().collect::<Vec<_>>(), [1, 2, 3, 4]);
    }

    #[test]
    fn test_empty_and_singleton() {
        let mut empty: [u64; 0] = [];
        assert_eq!(auto_unique(&mut empty).len(), 0);

        let mut one = [99u64];
        assert_eq!(auto_unique(&mut one), [99]);
    }

    #[test]
    fn test_all_equal() {
        let mut data = [7u64; 64];
        assert_eq!(auto_unique(&mut data), [7]);
    }

    #[test]
    fn test_already_unique() {
        let mut data: Vec<u64> = (0..1000).collect();
        let unique = auto_unique(&mut data);
        assert_eq!(unique.len(), 1000);
    }

    #[test]
    fn test_matches_reference_set() {
        let mut rng = rand::thread_rng();
        for _ in 0..20 {
            let mut data: Vec<u64> = (0..2000).map(|_| rng.gen_range(0..500)).collect();
            let expected: BTreeSet<u64> = data.iter().copied().collect();

            let unique = auto_unique(&mut data);
            let actual: BTreeSet<u64> = unique.iter().copied().collect();

            assert_eq!(unique.len(), expected.len());
            assert_eq!(actual, expected);
        }
    }

    #[test]
    fn test_idempotent() {
        let mut rng = rand::thread_rng();
        let mut data: Vec<u64> = (0..4096).map(|_| rng.gen_range(0..700)).collect();

        let first_len = auto_unique(&mut data).len();
        let second_len = auto_unique(&mut data[..first_len]).len();
        assert_eq!(first_len, second_len);
    }

    #[test]
    fn test_custom_hash_and_eq() {
        // Deduplicate case-insensitively; the hash must agree with eq.
        let mut data = ["a", "B", "b", "A", "c"];
        let unique = unique_by(
            &mut data,
            |s| s.bytes().map(|b| (b as u64 | 0x20).wrapping_mul(0x100_0000_01b3)).sum(),
            |a, b| a.eq_ignore_ascii_case(b),
        );
        assert_eq!(unique.len(), 3);
    }

    #[test]
    fn test_adversarial_constant_hash() {
        // A constant hash sends everything to the same home; the recursion
        // must still terminate and collapse duplicates.
        let mut data: Vec<u64> = (0..200).map(|k| k % 50).collect();
        let unique = unique_by(&mut data, |_| 0, |a, b| a == b);
        assert_eq!(unique.len(), 50);
    }

    #[test]
    fn test_feeds_xor_construction() {
        use crate::{Filter, Xor8};

        let mut rng = rand::thread_rng();
        let mut keys: Vec<u64> = (0..10_000).map(|_| rng.gen_range(0..4096)).collect();

        let unique = auto_unique(&mut keys);
        let filter = Xor8::try_from(&*unique).unwrap();
        for key in 0..4096u64 {
            if unique.contains(&key) {
                assert!(filter.contains(&key));
            }
        }
    }
}
