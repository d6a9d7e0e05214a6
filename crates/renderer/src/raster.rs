//! The raster produced by a render call.

use image::RgbaImage;
use map_common::{MapError, MapResult};

/// Row-major RGBA pixels, origin top-left, straight (not premultiplied) alpha.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RasterImage {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl RasterImage {
    /// A fully transparent image.
    pub fn transparent(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![0; width as usize * height as usize * 4],
        }
    }

    /// Wrap an RGBA buffer of exactly `width * height * 4` bytes.
    pub fn from_raw(width: u32, height: u32, pixels: Vec<u8>) -> MapResult<Self> {
        let expected = width as usize * height as usize * 4;
        if pixels.len() != expected {
            return Err(MapError::Encode(format!(
                "{}x{} image needs {} bytes, got {}",
                width,
                height,
                expected,
                pixels.len()
            )));
        }
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Raw RGBA bytes.
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    pub fn into_pixels(self) -> Vec<u8> {
        self.pixels
    }

    /// RGBA value at `(x, y)`.
    ///
    /// # Panics
    ///
    /// If the coordinate is outside the image.
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        match self.get_pixel(x, y) {
            Some(px) => px,
            None => panic!(
                "pixel ({}, {}) out of bounds for {}x{} image",
                x, y, self.width, self.height
            ),
        }
    }

    /// RGBA value at `(x, y)`, `None` outside the image.
    pub fn get_pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let offset = (y as usize * self.width as usize + x as usize) * 4;
        let px = &self.pixels[offset..offset + 4];
        Some([px[0], px[1], px[2], px[3]])
    }

    /// Whether every pixel is exactly `(0, 0, 0, 0)`.
    pub fn is_transparent(&self) -> bool {
        self.pixels.iter().all(|&b| b == 0)
    }

    /// Number of pixels equal to `color`.
    pub fn count_pixels(&self, color: [u8; 4]) -> usize {
        self.pixels
            .chunks_exact(4)
            .filter(|px| *px == color.as_slice())
            .count()
    }

    /// Encode as PNG, indexed when the image has at most 256 colors.
    pub fn to_png(&self) -> MapResult<Vec<u8>> {
        crate::png::create_png_auto(&self.pixels, self.width, self.height)
    }

    pub fn into_rgba_image(self) -> RgbaImage {
        let (width, height) = (self.width, self.height);
        // Length is checked by every constructor
        RgbaImage::from_raw(width, height, self.pixels)
            .unwrap_or_else(|| RgbaImage::new(width, height))
    }
}

impl From<RgbaImage> for RasterImage {
    fn from(image: RgbaImage) -> Self {
        let (width, height) = image.dimensions();
        Self {
            width,
            height,
            pixels: image.into_raw(),
        }
    }
}
