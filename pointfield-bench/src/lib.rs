//! Benchmark support for pointfield
//!
//! Criterion measures wall time by default; the measurements in [`mem`] count
//! heap allocations instead, which is what matters for the per-frame path.
//! Bench binaries using them must install [`mem::INSTRUMENTED_SYSTEM`] as the
//! global allocator.

use criterion::measurement::Measurement;

pub mod mem;

/// A criterion measurement with a display name for benchmark group titles
pub trait PointfieldMeasurement: Measurement {
    const NAME: &'static str;
}
