//! # Pointfield
//!
//! Procedural point clouds sampled from parametric domains and animated per frame.
//!
//! This is the umbrella crate. It re-exports the core data types and, with the
//! default `algorithms` feature, the sampler, animators and the
//! [`ProceduralPointField`](algorithms::ProceduralPointField) component.
//!
//! ## Quick Start
//!
//! ```rust
//! use pointfield::prelude::*;
//!
//! let mut field = ProceduralPointField::build(FieldConfig::hyperbolic_helicoid()).unwrap();
//! let mut clock = FrameClock::manual();
//!
//! field.animate(clock.advance(1.0 / 60.0)).unwrap();
//! let view = field.view().unwrap();
//! assert_eq!(view.count, 150 * 150);
//!
//! field.release().unwrap();
//! ```
//!
//! ## Feature Flags
//!
//! - `default`: Enables algorithms
//! - `algorithms`: Sampling, animation and the point field lifecycle

// Re-export core functionality
pub use pointfield_core::*;

#[cfg(feature = "algorithms")]
pub use pointfield_algorithms as algorithms;

/// Convenient imports for common use cases
pub mod prelude {
    pub use pointfield_core::*;

    #[cfg(feature = "algorithms")]
    pub use pointfield_algorithms::*;
}
