//! Demo scenes and matching cameras.

use crate::sampling::random_vec3;
use crate::{Camera, Dielectric, Diffusion, DiffusionKind, HittableList, Material, Metal, Sphere};
use halo_math::{Color, Point3, Vec3};
use rand::Rng;
use std::sync::Arc;

/// The classic cover scene: a ground sphere, a 22x22 grid of small
/// jittered spheres and three large feature spheres.
///
/// Small spheres are 80% diffuse, 15% metal and 5% glass.
pub fn random_spheres<R: Rng + ?Sized>(rng: &mut R, diffusion: DiffusionKind) -> HittableList {
    let mut world = HittableList::new();

    let ground = Arc::new(Diffusion::new(Color::new(0.8, 0.8, 0.0), diffusion));
    world.add(Sphere::new(Point3::new(0.0, -1000.0, 0.0), 1000.0, ground));

    // Keep small spheres clear of the metal feature sphere
    let clearing = Point3::new(4.0, 0.2, 0.0);
    for a in -11..11 {
        for b in -11..11 {
            let center = Point3::new(
                a as f64 + 0.9 * rng.gen::<f64>(),
                0.2,
                b as f64 + 0.9 * rng.gen::<f64>(),
            );
            if (center - clearing).length() <= 0.9 {
                continue;
            }

            let choose: f64 = rng.gen();
            let material: Arc<dyn Material> = if choose < 0.8 {
                let albedo = random_vec3(rng, 0.0, 1.0) * random_vec3(rng, 0.0, 1.0);
                Arc::new(Diffusion::new(albedo, diffusion))
            } else if choose < 0.95 {
                let albedo = random_vec3(rng, 0.5, 1.0);
                let fuzz = rng.gen_range(0.0..0.5);
                Arc::new(Metal::new(albedo, fuzz))
            } else {
                Arc::new(Dielectric::new(1.5))
            };

            world.add(Sphere::new(center, 0.2, material));
        }
    }

    world.add(Sphere::new(
        Point3::new(0.0, 1.0, 0.0),
        1.0,
        Arc::new(Dielectric::new(1.5)),
    ));
    world.add(Sphere::new(
        Point3::new(-4.0, 1.0, 0.0),
        1.0,
        Arc::new(Diffusion::new(Color::new(0.4, 0.2, 0.1), diffusion)),
    ));
    world.add(Sphere::new(
        Point3::new(4.0, 1.0, 0.0),
        1.0,
        Arc::new(Metal::new(Color::new(0.7, 0.6, 0.5), 0.0)),
    ));

    world
}

/// Camera framing [`random_spheres`].
pub fn random_spheres_camera(width: u32, height: u32) -> Camera {
    let mut camera = Camera::new()
        .with_resolution(width, height)
        .with_position(Point3::new(13.0, 2.0, 3.0), Point3::ZERO, Vec3::Y)
        .with_lens(20.0, 0.1, 10.0);
    camera.initialize();
    camera
}

/// Diffuse, glass and metal spheres side by side on a large ground sphere.
pub fn three_spheres(diffusion: DiffusionKind) -> HittableList {
    let mut world = HittableList::new();

    world.add(Sphere::new(
        Point3::new(0.0, -100.5, -1.0),
        100.0,
        Arc::new(Diffusion::new(Color::new(0.8, 0.8, 0.0), diffusion)),
    ));
    world.add(Sphere::new(
        Point3::new(0.0, 0.0, -1.0),
        0.5,
        Arc::new(Diffusion::new(Color::new(0.1, 0.2, 0.5), diffusion)),
    ));
    world.add(Sphere::new(
        Point3::new(-1.0, 0.0, -1.0),
        0.5,
        Arc::new(Dielectric::new(1.5)),
    ));
    world.add(Sphere::new(
        Point3::new(1.0, 0.0, -1.0),
        0.5,
        Arc::new(Metal::new(Color::new(0.8, 0.6, 0.2), 0.0)),
    ));

    world
}

/// Camera framing [`three_spheres`].
pub fn three_spheres_camera(width: u32, height: u32) -> Camera {
    let mut camera = Camera::new()
        .with_resolution(width, height)
        .with_position(Point3::ZERO, Point3::new(0.0, 0.0, -1.0), Vec3::Y)
        .with_lens(90.0, 0.0, 1.0);
    camera.initialize();
    camera
}
