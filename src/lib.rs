//! Robust geometric core of a physically based ray tracer: error-bounded
//! floating point, affine and animated transforms, bounding boxes and the
//! quadric shapes with their ray intersection routines.

pub mod core;
pub mod shapes;

pub use crate::core::pbrt::{Float, PI};
