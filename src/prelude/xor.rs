//! Peelable-hypergraph construction for three-block xor filters.

use alloc::boxed::Box;

use crate::fingerprint::Fingerprint;
use crate::keys::KeyStream;
use crate::prelude::{mix, reduce, rotl64, try_boxed_slice, try_enqueue, HSet, KeyIndex, MAX_ITERATIONS};
use crate::splitmix64::splitmix64;
use crate::Error;

/// For each block, the other two blocks an edge is incident to.
const OTHER_BLOCKS: [[usize; 2]; 3] = [[1, 2], [0, 2], [0, 1]];

/// Number of fingerprint slots per block for an expected key count, from the
/// 1.23x space bound (plus slack for small sets) split across three blocks.
pub fn block_length_for(capacity: usize) -> usize {
    let slots = (1.23 * capacity as f64) as usize + 32;
    slots / 3
}

/// Derives the in-block slot index of `hash` for block `b`.
#[inline]
pub const fn block_index(hash: u64, b: u32, block_length: usize) -> usize {
    reduce(rotl64(hash, b * 21) as u32, block_length)
}

/// Runs the peel-and-assign construction, writing fingerprints into the
/// zeroed `fingerprints` array of `3 * block_length` slots. Returns the seed
/// that produced a peelable hypergraph.
///
/// Every key is a hyperedge over one slot in each of the three blocks. A seed
/// works iff edges can be removed one at a time, each having a slot of degree
/// one when removed; fingerprints are then assigned in reverse removal order,
/// so each edge's chosen slot is still vacant while its other two slots are
/// final.
pub fn construct<Fp, K>(
    keys: K,
    block_length: usize,
    fingerprints: &mut [Fp],
) -> Result<u64, Error>
where
    Fp: Fingerprint,
    K: KeyStream,
{
    let num_keys = keys.len();

    let mut sets: [Box<[HSet]>; 3] = [
        try_boxed_slice(block_length)?,
        try_boxed_slice(block_length)?,
        try_boxed_slice(block_length)?,
    ];
    let mut queues: [Box<[KeyIndex]>; 3] = [
        try_boxed_slice(block_length)?,
        try_boxed_slice(block_length)?,
        try_boxed_slice(block_length)?,
    ];
    let mut stack: Box<[KeyIndex]> = try_boxed_slice(num_keys)?;

    let mut rng: u64 = 1;
    let mut seed = splitmix64(&mut rng);
    let mut done = false;
    for _ in 0..MAX_ITERATIONS {
        // Add each key to its set in all three blocks.
        for key in keys.clone() {
            let hash = mix(key, seed);
            for (b, block) in sets.iter_mut().enumerate() {
                let idx = block_index(hash, b as u32, block_length);
                block[idx].mask ^= hash;
                block[idx].count += 1;
            }
        }

        // Harvest sets holding a single key into the per-block queues.
        let mut queue_sizes: [usize; 3] = [0, 0, 0];
        for b in 0..3 {
            for idx in 0..block_length {
                try_enqueue(&sets[b], idx, &mut queues[b], &mut queue_sizes[b]);
            }
        }

        // Peel: each popped entry is removed from its two other blocks, and
        // any set thereby reduced to one key is enqueued in turn.
        let mut stack_size = 0;
        while queue_sizes.iter().sum::<usize>() > 0 {
            for b in 0..3 {
                while queue_sizes[b] > 0 {
                    queue_sizes[b] -= 1;
                    let mut ki = queues[b][queue_sizes[b]];
                    if sets[b][ki.index].count == 0 {
                        continue; // stale entry, already peeled
                    }

                    ki.index += b * block_length;
                    stack[stack_size] = ki;
                    stack_size += 1;

                    for &other in &OTHER_BLOCKS[b] {
                        let idx = block_index(ki.hash, other as u32, block_length);
                        sets[other][idx].mask ^= ki.hash;
                        sets[other][idx].count -= 1;
                        try_enqueue(&sets[other], idx, &mut queues[other], &mut queue_sizes[other]);
                    }
                }
            }
        }

        if stack_size == num_keys {
            done = true;
            break;
        }

        // Not peelable under this seed; reset and try the next one.
        for block in sets.iter_mut() {
            for set in block.iter_mut() {
                *set = HSet::default();
            }
        }
        seed = splitmix64(&mut rng);
    }
    if !done {
        return Err(Error::KeysLikelyNotUnique);
    }

    // Assign fingerprints in reverse peel order. The entry's own slot is one
    // of the three xor terms and still zero, so the stored value makes the
    // three-way xor equal the key's fingerprint.
    for ki in stack.iter().rev() {
        fingerprints[ki.index] = Fp::from_hash(ki.hash)
            ^ fingerprints[block_index(ki.hash, 0, block_length)]
            ^ fingerprints[block_index(ki.hash, 1, block_length) + block_length]
            ^ fingerprints[block_index(ki.hash, 2, block_length) + 2 * block_length];
    }

    Ok(seed)
}
