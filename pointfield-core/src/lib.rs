//! Core data structures and traits for pointfield
//!
//! This crate provides the fundamental types for procedural point fields:
//! the fixed-size [`PointBuffer`] and the [`BufferView`] lent to renderers,
//! frame timing, construction-time configuration, and the error type.

pub mod buffer;
pub mod clock;
pub mod config;
pub mod error;
pub mod point;
pub mod traits;
pub mod transform;

pub use buffer::*;
pub use clock::*;
pub use config::*;
pub use error::*;
pub use point::*;
pub use traits::*;
pub use transform::*;

/// Re-export commonly used types from nalgebra
pub use nalgebra::{Matrix4, Point3, UnitQuaternion, Vector3};
