use criterion::measurement::{Measurement, ValueFormatter};
use criterion::Throughput;
use stats_alloc::INSTRUMENTED_SYSTEM;

use crate::PointfieldMeasurement;

/// Number of heap allocations and reallocations made during an iteration.
///
/// A steady-state animation frame should report zero.
pub struct Allocations;

impl PointfieldMeasurement for Allocations {
    const NAME: &'static str = "allocations";
}

fn allocation_events() -> usize {
    let stats = INSTRUMENTED_SYSTEM.stats();
    stats.allocations + stats.reallocations
}

impl Measurement for Allocations {
    type Intermediate = usize;
    type Value = usize;

    fn start(&self) -> Self::Intermediate {
        allocation_events()
    }

    fn end(&self, start: Self::Intermediate) -> Self::Value {
        allocation_events() - start
    }

    fn add(&self, &v1: &Self::Value, &v2: &Self::Value) -> Self::Value {
        v1 + v2
    }

    fn zero(&self) -> Self::Value {
        0
    }

    fn to_f64(&self, &value: &Self::Value) -> f64 {
        value as f64
    }

    fn formatter(&self) -> &dyn ValueFormatter {
        &AllocationsFormatter
    }
}

struct AllocationsFormatter;

impl ValueFormatter for AllocationsFormatter {
    fn scale_values(&self, _: f64, _: &mut [f64]) -> &'static str {
        "allocs"
    }

    fn scale_throughputs(&self, _: f64, throughput: &Throughput, values: &mut [f64]) -> &'static str {
        // Report allocations per animated point when the bench declares element throughput.
        if let Throughput::Elements(points) = throughput {
            for value in values {
                *value /= *points as f64;
            }
            "allocs/point"
        } else {
            "allocs"
        }
    }

    fn scale_for_machines(&self, _: &mut [f64]) -> &'static str {
        "allocs"
    }
}
