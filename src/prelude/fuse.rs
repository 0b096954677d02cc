//! Construction for classical fuse filters: a single slot array divided into
//! 100 segments, each key drawing its three slots from three consecutive
//! segments.

use alloc::boxed::Box;

use crate::fingerprint::Fingerprint;
use crate::keys::KeyStream;
use crate::prelude::{mix, reduce, rotl64, try_boxed_slice, try_enqueue, HSet, KeyIndex, MAX_ITERATIONS};
use crate::splitmix64::splitmix64;
use crate::Error;

const H3: u64 = 0xBF58_476D_1CE4_E5B9;
const ARITY: usize = 3;
const SEGMENT_COUNT: usize = 100;

/// Slot blocks per filter: `SEGMENT_COUNT + ARITY - 1`, so the last segment's
/// edges have two segments to spill into.
pub const SLOTS: usize = SEGMENT_COUNT + ARITY - 1;

/// Space overhead of the fuse layout relative to the key count.
pub const FUSE_OVERHEAD: f64 = 1.0 / 0.879;

/// The three slot indices of a key's hyperedge.
#[inline]
pub const fn h012(hash: u64, segment_length: usize) -> [usize; 3] {
    let r0 = hash as u32;
    let r1 = rotl64(hash, 21) as u32;
    let r2 = rotl64(hash, 42) as u32;
    let r3 = (H3.wrapping_mul(hash) >> 32) as u32;

    let seg = reduce(r0, SEGMENT_COUNT);

    [
        seg * segment_length + reduce(r1, segment_length),
        (seg + 1) * segment_length + reduce(r2, segment_length),
        (seg + 2) * segment_length + reduce(r3, segment_length),
    ]
}

/// Peel-and-assign construction over the segmented slot array. Writes into
/// the zeroed `fingerprints` array of `SLOTS * segment_length` slots and
/// returns the successful seed.
pub fn construct<Fp, K>(
    keys: K,
    segment_length: usize,
    fingerprints: &mut [Fp],
) -> Result<u64, Error>
where
    Fp: Fingerprint,
    K: KeyStream,
{
    let num_keys = keys.len();
    let capacity = fingerprints.len();

    let mut sets: Box<[HSet]> = try_boxed_slice(capacity)?;
    let mut queue: Box<[KeyIndex]> = try_boxed_slice(capacity)?;
    let mut stack: Box<[KeyIndex]> = try_boxed_slice(num_keys)?;

    let mut rng: u64 = 1;
    let mut seed = splitmix64(&mut rng);
    let mut done = false;
    for _ in 0..MAX_ITERATIONS {
        for key in keys.clone() {
            let hash = mix(key, seed);
            for idx in h012(hash, segment_length) {
                sets[idx].mask ^= hash;
                sets[idx].count += 1;
            }
        }

        let mut queue_size = 0;
        for idx in 0..capacity {
            try_enqueue(&sets, idx, &mut queue, &mut queue_size);
        }

        let mut stack_size = 0;
        while queue_size > 0 {
            queue_size -= 1;
            let ki = queue[queue_size];
            if sets[ki.index].count == 0 {
                continue; // stale entry, already peeled
            }

            stack[stack_size] = ki;
            stack_size += 1;

            for idx in h012(ki.hash, segment_length) {
                sets[idx].mask ^= ki.hash;
                sets[idx].count -= 1;
                try_enqueue(&sets, idx, &mut queue, &mut queue_size);
            }
        }

        if stack_size == num_keys {
            done = true;
            break;
        }

        for set in sets.iter_mut() {
            *set = HSet::default();
        }
        seed = splitmix64(&mut rng);
    }
    if !done {
        return Err(Error::KeysLikelyNotUnique);
    }

    for ki in stack.iter().rev() {
        let [h0, h1, h2] = h012(ki.hash, segment_length);
        let others = match ki.index {
            i if i == h0 => fingerprints[h1] ^ fingerprints[h2],
            i if i == h1 => fingerprints[h0] ^ fingerprints[h2],
            i if i == h2 => fingerprints[h0] ^ fingerprints[h1],
            _ => unreachable!(),
        };
        fingerprints[ki.index] = Fp::from_hash(ki.hash) ^ others;
    }

    Ok(seed)
}
