//! Simple path tracer example.
//!
//! Renders a hand-built scene with every material type and saves to PPM.

use halo_renderer::{
    render, BvhNode, Camera, Color, Dielectric, Diffusion, Hittable, Metal, RenderConfig,
    Sphere, Vec3,
};
use std::sync::Arc;

fn main() {
    println!("Halo Path Tracer - Simple Example");
    println!("=================================");

    // Build the scene
    let start = std::time::Instant::now();
    let world = build_scene();
    println!("Scene built in {:?}", start.elapsed());

    // Set up camera
    let mut camera = Camera::new()
        .with_resolution(400, 225)
        .with_position(
            Vec3::new(13.0, 2.0, 3.0), // look_from
            Vec3::new(0.0, 0.0, 0.0),  // look_at
            Vec3::new(0.0, 1.0, 0.0),  // vup
        )
        .with_lens(20.0, 0.1, 10.0);
    camera.initialize();

    let config = RenderConfig::default().with_quality(32, 10);

    println!(
        "Rendering {}x{} @ {} spp...",
        camera.image_width, camera.image_height, config.samples_per_pixel
    );

    let output = render(&camera, &world, &config);
    println!(
        "Rendered in {:?} ({:.0} rays/s)",
        output.stats.elapsed,
        output.stats.rays_per_second()
    );

    let filename = "output.ppm";
    output.image.save(filename).expect("Failed to save image");
    println!("Saved to {}", filename);
}

fn build_scene() -> BvhNode {
    let mut objects: Vec<Box<dyn Hittable>> = Vec::new();

    // Ground
    objects.push(Box::new(Sphere::new(
        Vec3::new(0.0, -1000.0, 0.0),
        1000.0,
        Arc::new(Diffusion::lambertian(Color::new(0.5, 0.5, 0.5))),
    )));

    // Clear glass, a hollow bubble inside it, then diffuse and metal
    let glass = Arc::new(Dielectric::new(1.5));
    objects.push(Box::new(Sphere::new(Vec3::new(0.0, 1.0, 0.0), 1.0, glass.clone())));
    objects.push(Box::new(Sphere::new(
        Vec3::new(0.0, 1.0, 0.0),
        0.8,
        Arc::new(Dielectric::new(1.0 / 1.5)),
    )));
    objects.push(Box::new(Sphere::new(
        Vec3::new(-4.0, 1.0, 0.0),
        1.0,
        Arc::new(Diffusion::simple(Color::new(0.4, 0.2, 0.1))),
    )));
    objects.push(Box::new(Sphere::new(
        Vec3::new(4.0, 1.0, 0.0),
        1.0,
        Arc::new(Metal::new(Color::new(0.7, 0.6, 0.5), 0.0)),
    )));

    // A tinted glass marble in front
    objects.push(Box::new(Sphere::new(
        Vec3::new(2.0, 0.4, 2.0),
        0.4,
        Arc::new(Dielectric::tinted(Color::new(0.8, 1.0, 0.8), 1.5)),
    )));

    println!("Created {} objects", objects.len());
    BvhNode::new(objects).expect("scene is not empty")
}
