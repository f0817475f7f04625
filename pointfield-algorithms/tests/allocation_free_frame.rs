//! A steady-state frame must not touch the heap.
//!
//! Kept in its own test binary: the counting allocator is process-wide, so
//! other tests running in parallel would pollute the numbers.

use pointfield_algorithms::ProceduralPointField;
use pointfield_core::{FieldConfig, FrameClock};
use stats_alloc::{Region, StatsAlloc, INSTRUMENTED_SYSTEM};
use std::alloc::System;

#[global_allocator]
static GLOBAL: &StatsAlloc<System> = &INSTRUMENTED_SYSTEM;

#[test]
fn steady_state_frames_do_not_allocate() {
    let mut fields: Vec<_> = ["sphere", "helicoid", "swarm"]
        .iter()
        .map(|name| {
            let mut config = FieldConfig::preset(name).unwrap();
            config.sampler.seed = Some(1);
            config.sampler.slices = 30;
            config.sampler.stacks = 30;
            config.animation.swarm.start_delay = 0.0;
            ProceduralPointField::build(config).unwrap()
        })
        .collect();
    let mut clock = FrameClock::manual();
    let mut uploads = 0usize;

    // Warm up so any lazily initialised state is in place.
    for field in &mut fields {
        field.animate(clock.advance(1.0 / 60.0)).unwrap();
    }

    let region = Region::new(GLOBAL);
    for _ in 0..120 {
        let time = clock.advance(1.0 / 60.0);
        for field in &mut fields {
            field.animate(time).unwrap();
            field.present(&mut |_: &pointfield_core::BufferView<'_>| uploads += 1).unwrap();
        }
    }
    let change = region.change();

    assert_eq!(uploads, 360);
    assert_eq!(change.allocations, 0, "{:?}", change);
    assert_eq!(change.reallocations, 0, "{:?}", change);
}
