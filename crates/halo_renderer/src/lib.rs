//! Halo renderer - CPU path tracing.
//!
//! A Monte Carlo path tracer for analytic spheres:
//!
//! - **Geometry**: [`Sphere`] primitives behind the [`Hittable`] trait,
//!   collected in a flat [`HittableList`] or a [`BvhNode`] hierarchy.
//!   Both answer the same closest-hit query and must agree exactly.
//! - **Materials**: [`Diffusion`], [`Metal`] and [`Dielectric`] scattering.
//! - **Integration**: an iterative, depth-bounded path tracer
//!   ([`trace`], [`ray_color`]) averaged over jittered camera samples
//!   ([`render_pixel`]).
//! - **Scheduling**: pixels fan out over a fixed-size worker pool through
//!   [`ParallelMap`], which yields results back in scan order.
//!
//! # Example
//!
//! ```no_run
//! use halo_renderer::{scenes, Camera, DiffusionKind, RenderConfig, Vec3};
//!
//! let mut rng = rand::thread_rng();
//! let world = scenes::random_spheres(&mut rng, DiffusionKind::Lambertian)
//!     .into_bvh()
//!     .expect("scene is not empty");
//!
//! let mut camera = Camera::new()
//!     .with_resolution(400, 225)
//!     .with_position(Vec3::new(13.0, 2.0, 3.0), Vec3::ZERO, Vec3::Y)
//!     .with_lens(20.0, 0.1, 10.0);
//! camera.initialize();
//!
//! let output = halo_renderer::render(&camera, &world, &RenderConfig::default());
//! output.image.save("cover.png").expect("write image");
//! ```

mod bvh;
mod camera;
mod config;
mod hittable;
mod material;
mod output;
mod parallel;
mod renderer;
pub mod sampling;
pub mod scenes;
mod sphere;

pub use bvh::{BvhError, BvhNode, BvhStats, SplitAxis};
pub use camera::{Camera, PixelCoord};
pub use config::{Background, ConfigError, RenderConfig};
pub use hittable::{HitRecord, Hittable, HittableList};
pub use material::{Dielectric, Diffusion, DiffusionKind, Material, Metal, ScatterResult};
pub use output::{write_ppm, ImageBuffer, OutputError};
pub use parallel::ParallelMap;
pub use renderer::{
    color_to_rgb, ray_color, render, render_cancellable, render_pixel, render_to, trace,
    PathSample, RenderOutput, RenderStats, Termination, SHADOW_ACNE_EPSILON,
};
pub use sphere::Sphere;

/// Re-export Vec3 and common math types from halo_math
pub use halo_math::{Aabb, Color, Interval, Point3, Ray, Vec3, Vec3Ext};
