//! Camera for ray generation.

use crate::sampling::random_in_unit_disk;
use halo_math::{Point3, Ray, Vec3, Vec3Ext};
use rand::RngCore;

/// A pixel position. `i` counts columns from the left, `j` counts rows
/// from the bottom of the image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PixelCoord {
    pub i: u32,
    pub j: u32,
}

/// Thin-lens camera for generating rays into the scene.
#[derive(Debug, Clone)]
pub struct Camera {
    // Image settings
    pub image_width: u32,
    pub image_height: u32,

    // Camera positioning
    look_from: Point3,
    look_at: Point3,
    vup: Vec3,

    // Lens settings
    vfov: f64,       // Vertical field of view in degrees
    aperture: f64,   // Lens diameter, 0 = pinhole
    focus_dist: f64, // Distance from camera to plane of perfect focus

    // Cached computed values (set by initialize())
    origin: Point3,
    lower_left_corner: Point3,
    horizontal: Vec3,
    vertical: Vec3,
    u: Vec3,
    v: Vec3,
    w: Vec3,
    lens_radius: f64,
}

impl Camera {
    /// Create a new camera with default settings.
    pub fn new() -> Self {
        Self {
            image_width: 400,
            image_height: 225,
            look_from: Point3::ZERO,
            look_at: Point3::new(0.0, 0.0, -1.0),
            vup: Vec3::Y,
            vfov: 90.0,
            aperture: 0.0,
            focus_dist: 1.0,
            // Cached values (initialized to defaults)
            origin: Point3::ZERO,
            lower_left_corner: Point3::ZERO,
            horizontal: Vec3::ZERO,
            vertical: Vec3::ZERO,
            u: Vec3::X,
            v: Vec3::Y,
            w: Vec3::Z,
            lens_radius: 0.0,
        }
    }

    /// Set image resolution.
    pub fn with_resolution(mut self, width: u32, height: u32) -> Self {
        self.image_width = width;
        self.image_height = height;
        self
    }

    /// Set camera position.
    pub fn with_position(mut self, look_from: Point3, look_at: Point3, vup: Vec3) -> Self {
        self.look_from = look_from;
        self.look_at = look_at;
        self.vup = vup;
        self
    }

    /// Set lens settings.
    pub fn with_lens(mut self, vfov: f64, aperture: f64, focus_dist: f64) -> Self {
        self.vfov = vfov;
        self.aperture = aperture;
        self.focus_dist = focus_dist;
        self
    }

    /// Initialize the camera (must be called before generating rays).
    ///
    /// Panics if `look_from == look_at` or `vup` is parallel to the view
    /// direction, since no basis exists then.
    pub fn initialize(&mut self) {
        self.origin = self.look_from;

        // Calculate viewport dimensions
        let theta = self.vfov.to_radians();
        let h = (theta / 2.0).tan();
        let viewport_height = 2.0 * h;
        let viewport_width = viewport_height * self.aspect_ratio();

        // Calculate camera basis vectors
        self.w = (self.look_from - self.look_at).unit();
        self.u = self.vup.cross(self.w).unit();
        self.v = self.w.cross(self.u);

        self.horizontal = self.focus_dist * viewport_width * self.u;
        self.vertical = self.focus_dist * viewport_height * self.v;
        self.lower_left_corner = self.origin
            - self.horizontal / 2.0
            - self.vertical / 2.0
            - self.focus_dist * self.w;

        self.lens_radius = self.aperture / 2.0;
    }

    /// Width over height.
    pub fn aspect_ratio(&self) -> f64 {
        self.image_width as f64 / self.image_height.max(1) as f64
    }

    /// Generate a ray through the normalized image-plane point `(s, t)`.
    ///
    /// `s` runs left to right and `t` bottom to top, both over `[0, 1]`.
    pub fn get_ray(&self, s: f64, t: f64, rng: &mut dyn RngCore) -> Ray {
        let offset = if self.lens_radius > 0.0 {
            let rd = self.lens_radius * random_in_unit_disk(rng);
            self.u * rd.x + self.v * rd.y
        } else {
            Vec3::ZERO
        };

        let ray_origin = self.origin + offset;
        let target = self.lower_left_corner + s * self.horizontal + t * self.vertical;
        Ray::new(ray_origin, target - ray_origin)
    }

    /// Every pixel exactly once in output scan order: rows top to bottom,
    /// columns left to right.
    pub fn pixel_coords(&self) -> impl Iterator<Item = PixelCoord> + Send + 'static {
        let (width, height) = (self.image_width, self.image_height);
        (0..height)
            .rev()
            .flat_map(move |j| (0..width).map(move |i| PixelCoord { i, j }))
    }

    /// Total number of pixels.
    pub fn pixel_count(&self) -> usize {
        self.image_width as usize * self.image_height as usize
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new()
    }
}
