//! Halo math - the geometric vocabulary shared by the renderer.
//!
//! Vectors are glam's double-precision `DVec3`, aliased as [`Vec3`],
//! [`Point3`] and [`Color`] by convention only. The aliases do not
//! introduce distinct types.

// Re-export glam for convenience
pub use glam::{dvec3, DVec3};

mod aabb;
mod interval;
mod ray;
mod vec;

pub use aabb::Aabb;
pub use interval::Interval;
pub use ray::Ray;
pub use vec::Vec3Ext;

/// Three-component double-precision vector.
pub type Vec3 = DVec3;

/// A position in space.
pub type Point3 = DVec3;

/// Linear RGB color, nominally in [0, 1] per channel.
pub type Color = DVec3;
