pub mod animated_transform;
pub mod efloat;
pub mod error;
pub mod geometry;
pub mod interaction;
pub mod interval;
pub mod pbrt;
pub mod quaternion;
pub mod shape;
pub mod transform;
