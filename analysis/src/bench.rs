//! Filter benchmark: populate time, lookup time, observed false-positive
//! rate, bits per entry and memory use for each filter type over a range of
//! key counts, reported as a Markdown table.

use std::alloc::{GlobalAlloc, Layout, System};
use std::convert::TryFrom;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Instant;

use clap::Parser;
use rand::Rng;
use xorfuse::dedup::auto_unique;
use xorfuse::{BinaryFuse16, BinaryFuse8, Filter, Xor16, Xor8};

/// Global allocator wrapper tracking live and peak bytes, for measuring the
/// transient memory cost of filter construction.
struct MeasuringAllocator;

static LIVE: AtomicUsize = AtomicUsize::new(0);
static PEAK: AtomicUsize = AtomicUsize::new(0);

unsafe impl GlobalAlloc for MeasuringAllocator {
    unsafe fn alloc(&self, layout: Layout) -> *mut u8 {
        let ptr = System.alloc(layout);
        if !ptr.is_null() {
            let live = LIVE.fetch_add(layout.size(), Ordering::Relaxed) + layout.size();
            PEAK.fetch_max(live, Ordering::Relaxed);
        }
        ptr
    }

    unsafe fn dealloc(&self, ptr: *mut u8, layout: Layout) {
        LIVE.fetch_sub(layout.size(), Ordering::Relaxed);
        System.dealloc(ptr, layout);
    }
}

#[global_allocator]
static ALLOCATOR: MeasuringAllocator = MeasuringAllocator;

fn reset_peak() -> usize {
    let live = LIVE.load(Ordering::Relaxed);
    PEAK.store(live, Ordering::Relaxed);
    live
}

#[derive(Parser)]
#[command(about = "Benchmark xor, fuse and binary fuse filters")]
struct Options {
    /// Number of random lookups per false-positive and timing measurement.
    #[arg(long, default_value_t = 100_000_000)]
    num_trials: u64,
}

struct Report {
    populate_ms: f64,
    lookup_ns: f64,
    fp_rate: f64,
    bits_per_entry: f64,
    peak_construction_bytes: usize,
    filter_bytes: usize,
}

fn measure<F: Filter<u64>>(
    build: impl Fn(&[u64]) -> F,
    size_in_bytes: impl Fn(&F) -> usize,
    keys: &[u64],
    num_trials: u64,
) -> Report {
    let baseline = reset_peak();
    let start = Instant::now();
    let filter = build(keys);
    let populate_ms = start.elapsed().as_secs_f64() * 1e3;
    let peak_construction_bytes = PEAK.load(Ordering::Relaxed) - baseline;

    for key in keys {
        assert!(filter.contains(key), "false negative for {key}");
    }

    // Random probes; keys are sparse in the u64 space, so essentially every
    // hit is a false positive.
    let mut rng = rand::thread_rng();
    let mut hits = 0u64;
    let start = Instant::now();
    for _ in 0..num_trials {
        if filter.contains(&rng.gen()) {
            hits += 1;
        }
    }
    let lookup_ns = start.elapsed().as_secs_f64() * 1e9 / num_trials as f64;

    Report {
        populate_ms,
        lookup_ns,
        fp_rate: hits as f64 / num_trials as f64,
        bits_per_entry: (size_in_bytes(&filter) * 8) as f64 / keys.len() as f64,
        peak_construction_bytes,
        filter_bytes: size_in_bytes(&filter),
    }
}

fn row(algorithm: &str, num_keys: usize, r: &Report) {
    println!(
        "| {} | {} | {:.1} | {:.1} | {:.5}% | {:.2} | {} | {} |",
        algorithm,
        num_keys,
        r.populate_ms,
        r.lookup_ns,
        r.fp_rate * 100.0,
        r.bits_per_entry,
        r.peak_construction_bytes,
        r.filter_bytes
    );
}

fn main() {
    let options = Options::parse();

    println!(
        "| algorithm | keys | populate (ms) | lookup (ns) | fp rate | bits/entry | peak build (B) | filter (B) |"
    );
    println!("|---|---|---|---|---|---|---|---|");

    let mut rng = rand::thread_rng();
    for num_keys in [10_000usize, 100_000, 1_000_000] {
        let mut keys: Vec<u64> = (0..num_keys).map(|_| rng.gen()).collect();
        let keys = auto_unique(&mut keys).to_vec();

        let r = measure(
            |k| Xor8::try_from(k).unwrap(),
            Xor8::size_in_bytes,
            &keys,
            options.num_trials,
        );
        row("xor8", keys.len(), &r);

        let r = measure(
            |k| Xor16::try_from(k).unwrap(),
            Xor16::size_in_bytes,
            &keys,
            options.num_trials,
        );
        row("xor16", keys.len(), &r);

        let r = measure(
            |k| BinaryFuse8::try_from(k).unwrap(),
            BinaryFuse8::size_in_bytes,
            &keys,
            options.num_trials,
        );
        row("binary-fuse8", keys.len(), &r);

        let r = measure(
            |k| BinaryFuse16::try_from(k).unwrap(),
            BinaryFuse16::size_in_bytes,
            &keys,
            options.num_trials,
        );
        row("binary-fuse16", keys.len(), &r);
    }
}
