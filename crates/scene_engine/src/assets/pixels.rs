//! CPU-side texel storage for perfect-pixel collision

use crate::render::Color;

/// Row-major texels of a texture
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelData {
    width: u32,
    height: u32,
    pixels: Vec<Color>,
}

impl PixelData {
    /// Wrap texels; returns `None` when the buffer does not match the size
    pub fn new(width: u32, height: u32, pixels: Vec<Color>) -> Option<Self> {
        if pixels.len() != width as usize * height as usize {
            return None;
        }
        Some(Self { width, height, pixels })
    }

    /// A texture filled with a single color
    pub fn filled(width: u32, height: u32, color: Color) -> Self {
        Self {
            width,
            height,
            pixels: vec![color; width as usize * height as usize],
        }
    }

    /// Width in texels
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in texels
    pub fn height(&self) -> u32 {
        self.height
    }

    /// All texels, row-major
    pub fn pixels(&self) -> &[Color] {
        &self.pixels
    }

    /// Texel at `(x, y)`, `None` outside the texture
    pub fn get(&self, x: u32, y: u32) -> Option<Color> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.pixels.get(y as usize * self.width as usize + x as usize).copied()
    }

    /// Overwrite a texel; ignored outside the texture
    pub fn set(&mut self, x: u32, y: u32, color: Color) {
        if x < self.width && y < self.height {
            let index = y as usize * self.width as usize + x as usize;
            self.pixels[index] = color;
        }
    }
}

impl From<&image::RgbaImage> for PixelData {
    fn from(image: &image::RgbaImage) -> Self {
        let pixels = image
            .pixels()
            .map(|pixel| {
                let [r, g, b, a] = pixel.0;
                Color::rgba(r, g, b, a)
            })
            .collect();
        Self {
            width: image.width(),
            height: image.height(),
            pixels,
        }
    }
}
