//! Image storage and writers.

use crate::PixelCoord;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;
use thiserror::Error;

/// Errors from writing an image.
#[derive(Error, Debug)]
pub enum OutputError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("image encoding error: {0}")]
    Image(#[from] image::ImageError),

    #[error("buffer of {len} bytes does not match a {width}x{height} RGB image")]
    Size { width: u32, height: u32, len: usize },
}

/// 8-bit RGB image, row-major with the top row first.
#[derive(Debug, Clone)]
pub struct ImageBuffer {
    pub width: u32,
    pub height: u32,
    pixels: Vec<[u8; 3]>,
}

impl ImageBuffer {
    /// Create a new image buffer filled with black.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![[0; 3]; width as usize * height as usize],
        }
    }

    /// Get the pixel at (x, y), where y = 0 is the top row.
    pub fn get(&self, x: u32, y: u32) -> [u8; 3] {
        self.pixels[self.index(x, y)]
    }

    /// Set the pixel at (x, y), where y = 0 is the top row.
    pub fn set(&mut self, x: u32, y: u32, rgb: [u8; 3]) {
        let index = self.index(x, y);
        self.pixels[index] = rgb;
    }

    /// Set a pixel addressed in camera coordinates (rows counted from
    /// the bottom).
    pub fn set_pixel(&mut self, coord: PixelCoord, rgb: [u8; 3]) {
        self.set(coord.i, self.height - 1 - coord.j, rgb);
    }

    /// Pixels in scan order.
    pub fn pixels(&self) -> &[[u8; 3]] {
        &self.pixels
    }

    /// Flatten to packed RGB bytes.
    pub fn to_rgb_bytes(&self) -> Vec<u8> {
        self.pixels.iter().flatten().copied().collect()
    }

    /// Save to `path`. A `.ppm` extension writes plain PPM, anything else
    /// is encoded by the `image` crate based on the extension.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), OutputError> {
        let path = path.as_ref();
        let is_ppm = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("ppm"));

        if is_ppm {
            let mut writer = BufWriter::new(File::create(path)?);
            write_ppm(&mut writer, self)?;
            writer.flush()?;
        } else {
            let bytes = self.to_rgb_bytes();
            let len = bytes.len();
            let rgb = image::RgbImage::from_raw(self.width, self.height, bytes).ok_or(
                OutputError::Size {
                    width: self.width,
                    height: self.height,
                    len,
                },
            )?;
            rgb.save(path)?;
        }

        log::info!("Saved {}x{} image to {}", self.width, self.height, path.display());
        Ok(())
    }

    fn index(&self, x: u32, y: u32) -> usize {
        y as usize * self.width as usize + x as usize
    }
}

/// Write `image` as plain-text PPM (`P3`).
pub fn write_ppm<W: Write>(mut writer: W, image: &ImageBuffer) -> io::Result<()> {
    writeln!(writer, "P3")?;
    writeln!(writer, "{} {}", image.width, image.height)?;
    writeln!(writer, "255")?;
    for [r, g, b] in image.pixels() {
        writeln!(writer, "{r} {g} {b}")?;
    }
    Ok(())
}
