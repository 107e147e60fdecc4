//! Core path tracing renderer.
//!
//! Implements Monte Carlo path tracing with:
//! - Iterative ray bouncing bounded by a maximum depth
//! - Anti-aliasing via jittered multi-sampling
//! - Gamma correction and 8-bit quantization
//! - Parallel, scan-ordered pixel delivery

use crate::{
    Background, Camera, Color, Hittable, ImageBuffer, ParallelMap, PixelCoord, RenderConfig,
};
use halo_math::{Interval, Ray};
use rand::rngs::SmallRng;
use rand::{Rng, RngCore, SeedableRng};
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Minimum hit distance for world queries. Keeps a scattered ray from
/// re-hitting the surface it just left.
pub const SHADOW_ACNE_EPSILON: f64 = 1e-3;

/// Why a path stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    /// Missed the world and picked up the background.
    Escaped,
    /// A material absorbed the ray.
    Absorbed,
    /// Ran out of bounces.
    DepthExhausted,
}

/// Result of tracing one camera sample.
#[derive(Debug, Clone, Copy)]
pub struct PathSample {
    pub color: Color,
    /// Successful scatter events along the path
    pub bounces: u32,
    pub termination: Termination,
}

impl PathSample {
    /// World queries issued while tracing this path.
    pub fn queries(&self) -> u32 {
        match self.termination {
            Termination::DepthExhausted => self.bounces,
            Termination::Escaped | Termination::Absorbed => self.bounces + 1,
        }
    }
}

/// Trace a ray through the world, bouncing at most `max_depth` times.
pub fn trace(
    ray: &Ray,
    world: &dyn Hittable,
    max_depth: u32,
    background: &Background,
    rng: &mut dyn RngCore,
) -> PathSample {
    let mut ray = *ray;
    let mut attenuation = Color::ONE;

    for bounces in 0..max_depth {
        let Some(rec) = world.hit(&ray, Interval::new(SHADOW_ACNE_EPSILON, f64::INFINITY)) else {
            return PathSample {
                color: attenuation * background.color(&ray),
                bounces,
                termination: Termination::Escaped,
            };
        };

        match rec.material.scatter(&ray, &rec, rng) {
            Some(result) => {
                attenuation *= result.attenuation;
                ray = result.scattered;
            }
            None => {
                return PathSample {
                    color: Color::ZERO,
                    bounces,
                    termination: Termination::Absorbed,
                };
            }
        }
    }

    // Energy still bouncing around is treated as absorbed
    PathSample {
        color: Color::ZERO,
        bounces: max_depth,
        termination: Termination::DepthExhausted,
    }
}

/// Compute the color seen by a ray.
pub fn ray_color(
    ray: &Ray,
    world: &dyn Hittable,
    max_depth: u32,
    background: &Background,
    rng: &mut dyn RngCore,
) -> Color {
    trace(ray, world, max_depth, background, rng).color
}

/// Apply gamma correction (gamma = 2.0).
#[inline]
fn linear_to_gamma(linear: f64) -> f64 {
    if linear > 0.0 {
        linear.sqrt()
    } else {
        0.0
    }
}

/// Convert a linear color to 8-bit RGB.
pub fn color_to_rgb(color: Color) -> [u8; 3] {
    let quantize = |c: f64| (256.0 * linear_to_gamma(c).clamp(0.0, 0.999)) as u8;
    [quantize(color.x), quantize(color.y), quantize(color.z)]
}

/// Generator for one pixel, independent of which worker renders it.
fn pixel_rng(seed: u64, coord: PixelCoord) -> SmallRng {
    let position = ((coord.j as u64) << 32) | coord.i as u64;
    SmallRng::seed_from_u64(seed.wrapping_mul(0x9E37_79B9_7F4A_7C15) ^ position)
}

/// Average of all samples for one pixel plus the world queries spent.
fn sample_pixel(
    camera: &Camera,
    world: &dyn Hittable,
    coord: PixelCoord,
    config: &RenderConfig,
) -> (Color, u64) {
    let mut rng = pixel_rng(config.seed, coord);
    let samples = config.samples_per_pixel.max(1);
    let width = camera.image_width as f64;
    let height = camera.image_height as f64;

    let mut pixel_color = Color::ZERO;
    let mut rays = 0u64;
    for _ in 0..samples {
        let u = (coord.i as f64 + rng.gen::<f64>()) / width;
        let v = (coord.j as f64 + rng.gen::<f64>()) / height;
        let ray = camera.get_ray(u, v, &mut rng);
        let sample = trace(&ray, world, config.max_depth, &config.background, &mut rng);
        pixel_color += sample.color;
        rays += sample.queries() as u64;
    }

    (pixel_color / samples as f64, rays)
}

/// Render a single pixel with multi-sampling, returning linear color.
///
/// The result only depends on `config.seed` and the pixel position, so
/// it is the same no matter how pixels are scheduled.
pub fn render_pixel(
    camera: &Camera,
    world: &dyn Hittable,
    coord: PixelCoord,
    config: &RenderConfig,
) -> Color {
    sample_pixel(camera, world, coord, config).0
}

/// Counters for a finished (or cancelled) render.
#[derive(Debug, Clone, Copy, Default)]
pub struct RenderStats {
    pub pixels: u64,
    /// World queries issued across all samples
    pub rays: u64,
    pub elapsed: Duration,
}

impl RenderStats {
    pub fn rays_per_second(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs > 0.0 {
            self.rays as f64 / secs
        } else {
            0.0
        }
    }
}

/// A rendered image plus how it went.
pub struct RenderOutput {
    pub image: ImageBuffer,
    pub stats: RenderStats,
    /// True if rendering stopped before every pixel was produced. The
    /// image is then incomplete.
    pub cancelled: bool,
}

/// Render the entire scene to an image buffer.
pub fn render(camera: &Camera, world: &dyn Hittable, config: &RenderConfig) -> RenderOutput {
    render_into_image(camera, world, config, None)
}

/// Render the entire scene, stopping early once `cancel` is raised.
pub fn render_cancellable(
    camera: &Camera,
    world: &dyn Hittable,
    config: &RenderConfig,
    cancel: Arc<AtomicBool>,
) -> RenderOutput {
    render_into_image(camera, world, config, Some(cancel))
}

/// Stream every pixel to `sink` in scan order as it becomes available.
pub fn render_to<S>(
    camera: &Camera,
    world: &dyn Hittable,
    config: &RenderConfig,
    sink: S,
) -> RenderStats
where
    S: FnMut(PixelCoord, [u8; 3]),
{
    drive(camera, world, config, None, sink).0
}

fn render_into_image(
    camera: &Camera,
    world: &dyn Hittable,
    config: &RenderConfig,
    cancel: Option<Arc<AtomicBool>>,
) -> RenderOutput {
    let mut image = ImageBuffer::new(camera.image_width, camera.image_height);
    let (stats, cancelled) = drive(camera, world, config, cancel, |coord, rgb| {
        image.set_pixel(coord, rgb)
    });
    RenderOutput {
        image,
        stats,
        cancelled,
    }
}

fn drive<S>(
    camera: &Camera,
    world: &dyn Hittable,
    config: &RenderConfig,
    cancel: Option<Arc<AtomicBool>>,
    mut sink: S,
) -> (RenderStats, bool)
where
    S: FnMut(PixelCoord, [u8; 3]),
{
    let start = Instant::now();
    let workers = match config.workers {
        0 => "auto".to_string(),
        n => n.to_string(),
    };
    log::info!(
        "Rendering {}x{} at {} spp, max depth {}, {} workers",
        camera.image_width,
        camera.image_height,
        config.samples_per_pixel,
        config.max_depth,
        workers
    );

    let mut pixels = ParallelMap::new(camera.pixel_coords(), |coord| {
        let (color, rays) = sample_pixel(camera, world, coord, config);
        (coord, color_to_rgb(color), rays)
    })
    .workers(config.workers)
    .chunk_size(config.chunk_size);
    if let Some(flag) = cancel {
        pixels = pixels.cancel_flag(flag);
    }

    let mut stats = RenderStats::default();
    let row_width = u64::from(camera.image_width.max(1));
    for (coord, rgb, rays) in pixels {
        sink(coord, rgb);
        stats.pixels += 1;
        stats.rays += rays;

        if config.progress_every > 0 && stats.pixels % row_width == 0 {
            let rows = stats.pixels / row_width;
            if rows % u64::from(config.progress_every) == 0 {
                log::debug!("{}/{} rows done", rows, camera.image_height);
            }
        }
    }
    stats.elapsed = start.elapsed();

    let cancelled = stats.pixels < camera.pixel_count() as u64;
    if cancelled {
        log::warn!(
            "Render cancelled after {} of {} pixels",
            stats.pixels,
            camera.pixel_count()
        );
    } else {
        log::info!(
            "Rendered {} pixels in {:.2?} ({} rays, {:.0} rays/s)",
            stats.pixels,
            stats.elapsed,
            stats.rays,
            stats.rays_per_second()
        );
    }

    (stats, cancelled)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        Diffusion, HitRecord, HittableList, Material, Metal, ScatterResult, Sphere, Vec3,
    };
    use halo_math::Point3;
    use rand::rngs::StdRng;

    #[derive(Debug)]
    struct Absorber;

    impl Material for Absorber {
        fn scatter(&self, _: &Ray, _: &HitRecord, _: &mut dyn RngCore) -> Option<ScatterResult> {
            None
        }
    }

    fn single(sphere: Sphere) -> HittableList {
        let mut world = HittableList::new();
        world.add(sphere);
        world
    }

    fn camera(width: u32, height: u32) -> Camera {
        let mut camera = Camera::new().with_resolution(width, height);
        camera.initialize();
        camera
    }

    #[test]
    fn test_linear_to_gamma() {
        assert_eq!(linear_to_gamma(0.0), 0.0);
        assert_eq!(linear_to_gamma(-1.0), 0.0);
        assert!((linear_to_gamma(1.0) - 1.0).abs() < 0.0001);
        assert!((linear_to_gamma(0.25) - 0.5).abs() < 0.0001);
    }

    #[test]
    fn test_color_to_rgb() {
        assert_eq!(color_to_rgb(Color::ZERO), [0, 0, 0]);
        assert_eq!(color_to_rgb(Color::ONE), [255, 255, 255]);
        assert_eq!(color_to_rgb(Color::splat(4.0)), [255, 255, 255]);
        assert_eq!(color_to_rgb(Color::new(0.25, -1.0, f64::NAN)), [128, 0, 0]);
    }

    #[test]
    fn test_trace_escapes_empty_world() {
        let mut rng = StdRng::seed_from_u64(42);
        let world = HittableList::new();
        let ray = Ray::new(Point3::ZERO, Vec3::Y);
        let sample = trace(&ray, &world, 10, &Background::Sky, &mut rng);

        assert_eq!(sample.termination, Termination::Escaped);
        assert_eq!(sample.bounces, 0);
        assert_eq!(sample.queries(), 1);
        assert!((sample.color - Color::new(0.5, 0.7, 1.0)).length() < 1e-12);
    }

    #[test]
    fn test_trace_absorbed_is_black() {
        let mut rng = StdRng::seed_from_u64(42);
        let world = single(Sphere::new(Point3::new(0.0, 0.0, -2.0), 0.5, Arc::new(Absorber)));
        let ray = Ray::new(Point3::ZERO, Vec3::new(0.0, 0.0, -1.0));
        let sample = trace(&ray, &world, 10, &Background::Sky, &mut rng);

        assert_eq!(sample.termination, Termination::Absorbed);
        assert_eq!(sample.bounces, 0);
        assert_eq!(sample.color, Color::ZERO);
    }

    #[test]
    fn test_trace_attenuates_by_albedo() {
        let mut rng = StdRng::seed_from_u64(42);
        // Mirror facing the ray sends it straight back out to a white sky
        let world = single(Sphere::new(
            Point3::new(0.0, 0.0, -2.0),
            0.5,
            Arc::new(Metal::new(Color::new(0.5, 0.25, 1.0), 0.0)),
        ));
        let ray = Ray::new(Point3::ZERO, Vec3::new(0.0, 0.0, -1.0));
        let sample = trace(&ray, &world, 10, &Background::Solid(Color::ONE), &mut rng);

        assert_eq!(sample.termination, Termination::Escaped);
        assert_eq!(sample.bounces, 1);
        assert_eq!(sample.color, Color::new(0.5, 0.25, 1.0));
    }

    #[test]
    fn test_trace_depth_exhausted_inside_mirror() {
        let mut rng = StdRng::seed_from_u64(42);
        let world = single(Sphere::new(
            Point3::ZERO,
            1.0,
            Arc::new(Metal::new(Color::ONE, 0.0)),
        ));
        let ray = Ray::new(Point3::ZERO, Vec3::X);
        let sample = trace(&ray, &world, 7, &Background::Sky, &mut rng);

        assert_eq!(sample.termination, Termination::DepthExhausted);
        assert_eq!(sample.bounces, 7);
        assert_eq!(sample.queries(), 7);
        assert_eq!(sample.color, Color::ZERO);

        let sample = trace(&ray, &world, 0, &Background::Sky, &mut rng);
        assert_eq!(sample.termination, Termination::DepthExhausted);
        assert_eq!(sample.queries(), 0);
    }

    #[test]
    fn test_render_pixel_deterministic() {
        let world = single(Sphere::new(
            Point3::new(0.0, 0.0, -1.0),
            0.5,
            Arc::new(Diffusion::lambertian(Color::splat(0.5))),
        ));
        let camera = camera(10, 10);
        let config = RenderConfig::default().with_quality(4, 5).with_seed(3);
        let coord = PixelCoord { i: 5, j: 5 };

        let a = render_pixel(&camera, &world, coord, &config);
        let b = render_pixel(&camera, &world, coord, &config);
        assert_eq!(a, b);
        // Center pixel hits the sphere, which darkens the sky
        assert!(a.length() > 0.0);
        assert!(a.x < 1.0);
    }

    #[test]
    fn test_render_solid_background() {
        let world = HittableList::new();
        let camera = camera(4, 3);
        let config = RenderConfig::default()
            .with_quality(4, 5)
            .with_background(Background::Solid(Color::splat(0.25)))
            .with_workers(2);

        let output = render(&camera, &world, &config);
        assert!(!output.cancelled);
        assert_eq!(output.stats.pixels, 12);
        assert_eq!(output.stats.rays, 12 * 4);
        for y in 0..3 {
            for x in 0..4 {
                assert_eq!(output.image.get(x, y), [128, 128, 128]);
            }
        }
    }

    #[test]
    fn test_render_to_streams_scan_order() {
        let world = HittableList::new();
        let camera = camera(5, 4);
        let config = RenderConfig::default().with_quality(1, 2).with_workers(3).with_chunk_size(2);

        let mut seen = Vec::new();
        let stats = render_to(&camera, &world, &config, |coord, _| seen.push(coord));
        assert_eq!(stats.pixels, 20);
        assert_eq!(seen, camera.pixel_coords().collect::<Vec<_>>());
    }

    #[test]
    fn test_render_cancelled_before_start() {
        let world = HittableList::new();
        let camera = camera(8, 8);
        let config = RenderConfig::default().with_quality(1, 2);
        let cancel = Arc::new(AtomicBool::new(true));

        let output = render_cancellable(&camera, &world, &config, cancel);
        assert!(output.cancelled);
        assert_eq!(output.stats.pixels, 0);
    }

    #[test]
    fn test_rays_per_second() {
        let stats = RenderStats {
            pixels: 1,
            rays: 500,
            elapsed: Duration::from_millis(250),
        };
        assert!((stats.rays_per_second() - 2000.0).abs() < 1e-9);
        assert_eq!(RenderStats::default().rays_per_second(), 0.0);
    }
}
