use stats_alloc::StatsAlloc;

pub type InstrumentedSystem = StatsAlloc<std::alloc::System>;
pub use stats_alloc::INSTRUMENTED_SYSTEM;

mod allocation_size;
mod allocations;
pub use allocation_size::AllocationSize;
pub use allocations::Allocations;
