//! Render configuration.

use halo_math::{Color, Ray};
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Errors from loading or validating a [`RenderConfig`].
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// What a ray that escapes the scene sees.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Background {
    /// White at the horizon fading to sky blue overhead.
    #[default]
    Sky,
    /// A single flat color.
    Solid(Color),
}

impl Background {
    /// Radiance arriving along an escaped ray.
    pub fn color(&self, ray: &Ray) -> Color {
        match self {
            Background::Sky => sky_gradient(ray),
            Background::Solid(color) => *color,
        }
    }
}

/// Compute sky gradient background.
fn sky_gradient(ray: &Ray) -> Color {
    let unit_direction = ray.direction().normalize_or_zero();
    let a = 0.5 * (unit_direction.y + 1.0);
    let white = Color::new(1.0, 1.0, 1.0);
    let blue = Color::new(0.5, 0.7, 1.0);
    white * (1.0 - a) + blue * a
}

/// Render configuration.
///
/// Missing fields in a config file fall back to their defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Samples per pixel for anti-aliasing
    pub samples_per_pixel: u32,
    /// Maximum ray bounce depth
    pub max_depth: u32,
    /// Radiance for rays that escape the scene
    pub background: Background,
    /// Base seed for the per-pixel generators
    pub seed: u64,
    /// Worker threads, 0 = one per logical CPU
    pub workers: usize,
    /// Pixels handed to each worker per scheduling round
    pub chunk_size: usize,
    /// Log progress every N finished rows, 0 = never
    pub progress_every: u32,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            samples_per_pixel: 100,
            max_depth: 50,
            background: Background::Sky,
            seed: 0,
            workers: 0,
            chunk_size: 64,
            progress_every: 25,
        }
    }
}

impl RenderConfig {
    /// Load and validate a JSON config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path.as_ref())?;
        let config: RenderConfig = serde_json::from_str(&text)?;
        config.validate()?;
        log::debug!("Loaded render config from {}", path.as_ref().display());
        Ok(config)
    }

    /// Check settings that would make a render meaningless.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.samples_per_pixel == 0 {
            return Err(ConfigError::Invalid(
                "samples_per_pixel must be at least 1".into(),
            ));
        }
        Ok(())
    }

    /// Set quality settings.
    pub fn with_quality(mut self, samples_per_pixel: u32, max_depth: u32) -> Self {
        self.samples_per_pixel = samples_per_pixel;
        self.max_depth = max_depth;
        self
    }

    /// Set background.
    pub fn with_background(mut self, background: Background) -> Self {
        self.background = background;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Set worker count (0 = one per logical CPU).
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size;
        self
    }

    pub fn with_progress_every(mut self, rows: u32) -> Self {
        self.progress_every = rows;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use halo_math::{Point3, Vec3};
    use std::path::PathBuf;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("halo_config_{}_{}", std::process::id(), name))
    }

    #[test]
    fn test_defaults() {
        let config = RenderConfig::default();
        assert_eq!(config.samples_per_pixel, 100);
        assert_eq!(config.max_depth, 50);
        assert_eq!(config.background, Background::Sky);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder() {
        let config = RenderConfig::default()
            .with_quality(8, 4)
            .with_background(Background::Solid(Color::splat(0.2)))
            .with_seed(9)
            .with_workers(2)
            .with_chunk_size(16)
            .with_progress_every(0);
        assert_eq!(config.samples_per_pixel, 8);
        assert_eq!(config.max_depth, 4);
        assert_eq!(config.background, Background::Solid(Color::splat(0.2)));
        assert_eq!((config.seed, config.workers, config.chunk_size), (9, 2, 16));
        assert_eq!(config.progress_every, 0);
    }

    #[test]
    fn test_validate_rejects_zero_samples() {
        let config = RenderConfig::default().with_quality(0, 50);
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: RenderConfig =
            serde_json::from_str(r#"{ "samples_per_pixel": 16, "background": { "solid": [0.1, 0.2, 0.3] } }"#)
                .expect("valid json");
        assert_eq!(config.samples_per_pixel, 16);
        assert_eq!(config.max_depth, 50);
        assert_eq!(config.background, Background::Solid(Color::new(0.1, 0.2, 0.3)));
    }

    #[test]
    fn test_load_from_file() {
        let path = temp_path("load.json");
        std::fs::write(&path, r#"{ "max_depth": 12, "seed": 7, "background": "sky" }"#)
            .expect("write temp config");

        let config = RenderConfig::load(&path).expect("config loads");
        assert_eq!(config.max_depth, 12);
        assert_eq!(config.seed, 7);
        assert_eq!(config.background, Background::Sky);

        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_load_errors() {
        let missing = temp_path("missing.json");
        assert!(matches!(RenderConfig::load(&missing), Err(ConfigError::Io(_))));

        let bad = temp_path("bad.json");
        std::fs::write(&bad, "{ samples_per_pixel: }").expect("write temp config");
        assert!(matches!(RenderConfig::load(&bad), Err(ConfigError::Parse(_))));
        std::fs::remove_file(&bad).ok();

        let zero = temp_path("zero.json");
        std::fs::write(&zero, r#"{ "samples_per_pixel": 0 }"#).expect("write temp config");
        assert!(matches!(RenderConfig::load(&zero), Err(ConfigError::Invalid(_))));
        std::fs::remove_file(&zero).ok();
    }

    #[test]
    fn test_sky_gradient() {
        let up = Ray::new(Point3::ZERO, Vec3::new(0.0, 2.0, 0.0));
        assert!((Background::Sky.color(&up) - Color::new(0.5, 0.7, 1.0)).length() < 1e-12);

        let down = Ray::new(Point3::ZERO, Vec3::new(0.0, -1.0, 0.0));
        assert!((Background::Sky.color(&down) - Color::ONE).length() < 1e-12);

        let solid = Background::Solid(Color::splat(0.25));
        assert_eq!(solid.color(&up), Color::splat(0.25));
    }
}
