use criterion::measurement::{Measurement, ValueFormatter};
use criterion::Throughput;
use stats_alloc::INSTRUMENTED_SYSTEM;

use crate::PointfieldMeasurement;

/// Bytes requested from the allocator during an iteration, reallocations included
pub struct AllocationSize;

impl PointfieldMeasurement for AllocationSize {
    const NAME: &'static str = "allocated bytes";
}

fn bytes_requested() -> usize {
    let stats = INSTRUMENTED_SYSTEM.stats();
    stats.bytes_allocated + stats.bytes_reallocated.max(0) as usize
}

impl Measurement for AllocationSize {
    type Intermediate = usize;
    type Value = usize;

    fn start(&self) -> Self::Intermediate {
        bytes_requested()
    }

    fn end(&self, start: Self::Intermediate) -> Self::Value {
        bytes_requested() - start
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
        &AllocationSizeFormatter
    }
}

const UNITS: [&str; 5] = ["B", "KiB", "MiB", "GiB", "TiB"];

struct AllocationSizeFormatter;

impl ValueFormatter for AllocationSizeFormatter {
    fn scale_values(&self, typical_value: f64, values: &mut [f64]) -> &'static str {
        // Zero-allocation frames are the expected case; log2(0) would be -inf.
        if typical_value < 1024.0 {
            return UNITS[0];
        }
        let magnitude = ((typical_value.log2() / 10.0).floor() as usize).min(UNITS.len() - 1);
        let factor = 1024.0_f64.powi(magnitude as i32);
        for value in values {
            *value /= factor;
        }
        UNITS[magnitude]
    }

    fn scale_throughputs(&self, _: f64, throughput: &Throughput, values: &mut [f64]) -> &'static str {
        if let Throughput::Elements(points) = throughput {
            for value in values {
                *value /= *points as f64;
            }
            "B/point"
        } else {
            "B"
        }
    }

    fn scale_for_machines(&self, _: &mut [f64]) -> &'static str {
        "B"
    }
}
