//! Material trait for surface scattering.

use crate::hittable::HitRecord;
use crate::sampling::{
    random_in_hemisphere, random_in_unit_sphere, random_unit_vector, reflect, refract,
};
use halo_math::{Color, Ray, Vec3Ext};
use rand::{Rng, RngCore};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Outcome of a scattering event.
#[derive(Debug, Clone, Copy)]
pub struct ScatterResult {
    /// Per-channel multiplier applied to everything traced along `scattered`
    pub attenuation: Color,
    /// The continuation ray, starting at the hit point
    pub scattered: Ray,
}

/// Trait for materials that describe how light interacts with surfaces.
pub trait Material: Send + Sync + fmt::Debug {
    /// Scatter an incoming ray.
    ///
    /// Returns `None` if the ray is absorbed.
    fn scatter(
        &self,
        ray_in: &Ray,
        rec: &HitRecord,
        rng: &mut dyn RngCore,
    ) -> Option<ScatterResult>;
}

/// Which diffuse sampling strategy to use.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiffusionKind {
    /// Normal plus a random unit vector (cosine-weighted).
    #[default]
    Lambertian,
    /// Normal plus a random vector in the hemisphere around it.
    Simple,
}

/// Diffuse material.
#[derive(Debug, Clone)]
pub struct Diffusion {
    albedo: Color,
    kind: DiffusionKind,
}

impl Diffusion {
    pub fn new(albedo: Color, kind: DiffusionKind) -> Self {
        Self { albedo, kind }
    }

    pub fn lambertian(albedo: Color) -> Self {
        Self::new(albedo, DiffusionKind::Lambertian)
    }

    pub fn simple(albedo: Color) -> Self {
        Self::new(albedo, DiffusionKind::Simple)
    }

    pub fn kind(&self) -> DiffusionKind {
        self.kind
    }
}

impl Material for Diffusion {
    fn scatter(
        &self,
        _ray_in: &Ray,
        rec: &HitRecord,
        rng: &mut dyn RngCore,
    ) -> Option<ScatterResult> {
        let mut scatter_direction = match self.kind {
            DiffusionKind::Lambertian => rec.normal + random_unit_vector(rng),
            DiffusionKind::Simple => rec.normal + random_in_hemisphere(rng, rec.normal),
        };

        // Catch degenerate scatter direction
        if scatter_direction.near_zero() {
            scatter_direction = rec.normal;
        }

        Some(ScatterResult {
            attenuation: self.albedo,
            scattered: Ray::new(rec.p, scatter_direction),
        })
    }
}

/// Metal (specular) material.
#[derive(Debug, Clone)]
pub struct Metal {
    albedo: Color,
    fuzz: f64,
}

impl Metal {
    /// Create a new Metal material.
    ///
    /// - `albedo`: The color of the metal
    /// - `fuzz`: Roughness, 0.0 = perfect mirror, 1.0 = very rough
    pub fn new(albedo: Color, fuzz: f64) -> Self {
        Self {
            albedo,
            fuzz: fuzz.clamp(0.0, 1.0),
        }
    }

    pub fn fuzz(&self) -> f64 {
        self.fuzz
    }
}

impl Material for Metal {
    fn scatter(
        &self,
        ray_in: &Ray,
        rec: &HitRecord,
        rng: &mut dyn RngCore,
    ) -> Option<ScatterResult> {
        let reflected = reflect(ray_in.direction().unit(), rec.normal);
        let scattered_dir = reflected + self.fuzz * random_in_unit_sphere(rng);

        // Fuzz that pushes the ray below the surface absorbs it
        if scattered_dir.dot(rec.normal) > 0.0 {
            Some(ScatterResult {
                attenuation: self.albedo,
                scattered: Ray::new(rec.p, scattered_dir),
            })
        } else {
            None
        }
    }
}

/// Dielectric (glass) material.
#[derive(Debug, Clone)]
pub struct Dielectric {
    albedo: Color,
    /// Index of refraction
    ior: f64,
}

impl Dielectric {
    /// Create a clear dielectric.
    ///
    /// - `ior`: Index of refraction (1.0 = air, 1.5 = glass, 2.4 = diamond)
    pub fn new(ior: f64) -> Self {
        Self::tinted(Color::ONE, ior)
    }

    /// Create a dielectric that attenuates every pass through its surface.
    pub fn tinted(albedo: Color, ior: f64) -> Self {
        Self { albedo, ior }
    }

    pub fn ior(&self) -> f64 {
        self.ior
    }

    /// Schlick's approximation for reflectance
    fn reflectance(cosine: f64, ratio: f64) -> f64 {
        let r0 = ((1.0 - ratio) / (1.0 + ratio)).powi(2);
        r0 + (1.0 - r0) * (1.0 - cosine).powi(5)
    }
}

impl Material for Dielectric {
    fn scatter(
        &self,
        ray_in: &Ray,
        rec: &HitRecord,
        rng: &mut dyn RngCore,
    ) -> Option<ScatterResult> {
        let refraction_ratio = if rec.front_face {
            1.0 / self.ior
        } else {
            self.ior
        };

        let unit_direction = ray_in.direction().unit();
        let cos_theta = (-unit_direction).dot(rec.normal).min(1.0);
        let sin_theta = (1.0 - cos_theta * cos_theta).sqrt();

        // Check for total internal reflection
        let cannot_refract = refraction_ratio * sin_theta > 1.0;

        let direction = if cannot_refract
            || Self::reflectance(cos_theta, refraction_ratio) > rng.gen::<f64>()
        {
            reflect(unit_direction, rec.normal)
        } else {
            refract(unit_direction, rec.normal, refraction_ratio)
        };

        Some(ScatterResult {
            attenuation: self.albedo,
            scattered: Ray::new(rec.p, direction),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use halo_math::{Point3, Vec3};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn record(material: &dyn Material, normal: Vec3, front_face: bool) -> HitRecord<'_> {
        HitRecord {
            p: Point3::ZERO,
            normal,
            material,
            t: 1.0,
            front_face,
        }
    }

    #[test]
    fn test_diffusion_scatters_into_normal_hemisphere() {
        let mut rng = StdRng::seed_from_u64(42);
        let ray = Ray::new(Point3::new(0.0, 1.0, 0.0), Vec3::new(0.0, -1.0, 0.0));

        for kind in [DiffusionKind::Lambertian, DiffusionKind::Simple] {
            let mat = Diffusion::new(Color::new(0.8, 0.3, 0.3), kind);
            let rec = record(&mat, Vec3::Y, true);
            for _ in 0..500 {
                let scatter = mat.scatter(&ray, &rec, &mut rng).expect("diffuse always scatters");
                assert_eq!(scatter.attenuation, Color::new(0.8, 0.3, 0.3));
                assert_eq!(scatter.scattered.origin(), Point3::ZERO);
                assert!(scatter.scattered.direction().dot(Vec3::Y) >= 0.0);
                assert!(!scatter.scattered.direction().near_zero());
            }
        }
    }

    #[test]
    fn test_diffusion_offsets_from_normal() {
        let mut rng = StdRng::seed_from_u64(42);
        let ray = Ray::new(Point3::new(0.0, 1.0, 0.0), Vec3::new(0.0, -1.0, 0.0));

        let simple = Diffusion::simple(Color::ONE);
        let rec = record(&simple, Vec3::Y, true);
        for _ in 0..1000 {
            let scatter = simple.scatter(&ray, &rec, &mut rng).expect("diffuse always scatters");
            assert!(scatter.scattered.direction().dot(Vec3::Y) >= 1.0);
        }

        let lambertian = Diffusion::lambertian(Color::ONE);
        let rec = record(&lambertian, Vec3::Y, true);
        for _ in 0..1000 {
            let scatter = lambertian.scatter(&ray, &rec, &mut rng).expect("diffuse always scatters");
            let dir = scatter.scattered.direction();
            if dir == Vec3::Y {
                continue;
            }
            assert!(((dir - Vec3::Y).length() - 1.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_metal_mirror_reflection() {
        let mut rng = StdRng::seed_from_u64(42);
        let mat = Metal::new(Color::splat(0.9), 0.0);
        let rec = record(&mat, Vec3::Y, true);
        let ray = Ray::new(Point3::new(-1.0, 1.0, 0.0), Vec3::new(1.0, -1.0, 0.0));

        let scatter = mat.scatter(&ray, &rec, &mut rng).expect("mirror reflects");
        let expected = Vec3::new(1.0, 1.0, 0.0).normalize();
        assert!((scatter.scattered.direction() - expected).length() < 1e-12);
        assert_eq!(scatter.attenuation, Color::splat(0.9));
    }

    #[test]
    fn test_metal_fuzz_clamped() {
        assert_eq!(Metal::new(Color::ONE, 3.0).fuzz(), 1.0);
        assert_eq!(Metal::new(Color::ONE, -1.0).fuzz(), 0.0);
    }

    #[test]
    fn test_fuzzy_metal_never_scatters_below_surface() {
        let mut rng = StdRng::seed_from_u64(42);
        let mat = Metal::new(Color::ONE, 1.0);
        let rec = record(&mat, Vec3::Y, true);
        // Grazing incidence, so fuzz often pushes the ray under the surface
        let ray = Ray::new(Point3::new(-1.0, 0.01, 0.0), Vec3::new(1.0, -0.01, 0.0));

        let mut absorbed = 0;
        for _ in 0..500 {
            match mat.scatter(&ray, &rec, &mut rng) {
                Some(scatter) => assert!(scatter.scattered.direction().dot(Vec3::Y) > 0.0),
                None => absorbed += 1,
            }
        }
        assert!(absorbed > 0);
    }

    #[test]
    fn test_dielectric_total_internal_reflection() {
        let mut rng = StdRng::seed_from_u64(42);
        let mat = Dielectric::new(1.5);

        // Leaving the glass at 60 degrees: 1.5 * sin(60) > 1
        let (sin60, cos60) = (60f64.to_radians().sin(), 60f64.to_radians().cos());
        let dir = Vec3::new(sin60, 0.0, cos60);
        let ray = Ray::new(Point3::new(-sin60, 0.0, -cos60), dir);
        let rec = record(&mat, Vec3::new(0.0, 0.0, -1.0), false);

        let expected = Vec3::new(sin60, 0.0, -cos60);
        for _ in 0..100 {
            let scatter = mat.scatter(&ray, &rec, &mut rng).expect("glass never absorbs");
            assert!(scatter.scattered.direction().dot(expected) >= 0.999);
            assert_eq!(scatter.attenuation, Color::ONE);
        }
    }

    #[test]
    fn test_dielectric_normal_incidence_mostly_refracts() {
        let mut rng = StdRng::seed_from_u64(42);
        let mat = Dielectric::new(1.5);
        let ray = Ray::new(Point3::new(0.0, 1.0, 0.0), Vec3::new(0.0, -1.0, 0.0));
        let rec = record(&mat, Vec3::Y, true);

        let mut refracted = 0;
        for _ in 0..1000 {
            let scatter = mat.scatter(&ray, &rec, &mut rng).expect("glass never absorbs");
            let dir = scatter.scattered.direction();
            if dir.y < 0.0 {
                assert!((dir - Vec3::new(0.0, -1.0, 0.0)).length() < 1e-9);
                refracted += 1;
            } else {
                assert!((dir - Vec3::Y).length() < 1e-9);
            }
        }
        // Schlick gives 4% reflectance head-on
        assert!(refracted > 900, "refracted {refracted} of 1000");
    }

    #[test]
    fn test_tinted_dielectric_attenuates() {
        let mut rng = StdRng::seed_from_u64(42);
        let mat = Dielectric::tinted(Color::new(0.9, 1.0, 0.9), 1.5);
        let ray = Ray::new(Point3::new(0.0, 1.0, 0.0), Vec3::new(0.0, -1.0, 0.0));
        let rec = record(&mat, Vec3::Y, true);
        let scatter = mat.scatter(&ray, &rec, &mut rng).expect("glass never absorbs");
        assert_eq!(scatter.attenuation, Color::new(0.9, 1.0, 0.9));
    }

    #[test]
    fn test_reflectance_bounds() {
        let head_on = Dielectric::reflectance(1.0, 1.0 / 1.5);
        assert!((head_on - 0.04).abs() < 1e-9);
        let grazing = Dielectric::reflectance(0.0, 1.0 / 1.5);
        assert!((grazing - 1.0).abs() < 1e-9);
    }
}
