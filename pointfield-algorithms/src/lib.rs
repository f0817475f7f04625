//! # Pointfield Algorithms
//!
//! Procedural sampling and per-frame animation of point fields.
//!
//! A field is sampled once from a parametric domain (sphere surface, hyperbolic
//! helicoid, random volume), then rewritten in place every frame by an animator
//! (float, helicoid, swarm). [`ProceduralPointField`] ties the two together and
//! hands the buffer to the renderer through an upload sink.

pub mod animator;
pub mod field;
pub mod sampler;

// Re-export commonly used items
pub use animator::*;
pub use field::*;
pub use sampler::*;
