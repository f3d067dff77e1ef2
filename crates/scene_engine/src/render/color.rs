//! RGBA color type shared by sprites, groups and pixel data

use serde::{Deserialize, Serialize};

/// 8-bit RGBA color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Color {
    /// Red channel
    pub r: u8,
    /// Green channel
    pub g: u8,
    /// Blue channel
    pub b: u8,
    /// Alpha channel
    pub a: u8,
}

impl Default for Color {
    fn default() -> Self {
        Self::WHITE
    }
}

impl Color {
    /// Opaque white (the neutral tint)
    pub const WHITE: Self = Self::rgba(255, 255, 255, 255);
    /// Opaque black
    pub const BLACK: Self = Self::rgba(0, 0, 0, 255);
    /// Fully transparent
    pub const TRANSPARENT: Self = Self::rgba(0, 0, 0, 0);

    /// Create a color from its four channels
    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Create an opaque color
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::rgba(r, g, b, 255)
    }

    /// Premultiply every channel by `alpha` (clamped to 0..=1)
    pub fn with_alpha(self, alpha: f32) -> Self {
        let factor = alpha.clamp(0.0, 1.0);
        let scale = |channel: u8| (f32::from(channel) * factor).round() as u8;
        Self::rgba(scale(self.r), scale(self.g), scale(self.b), scale(self.a))
    }

    /// Whether the alpha channel is non-zero
    pub fn is_opaque_texel(&self) -> bool {
        self.a != 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_alpha_premultiplies() {
        let color = Color::rgba(200, 100, 50, 255).with_alpha(0.5);
        assert_eq!(color, Color::rgba(100, 50, 25, 128));
        assert_eq!(Color::WHITE.with_alpha(2.0), Color::WHITE);
        assert_eq!(Color::WHITE.with_alpha(0.0), Color::TRANSPARENT);
    }
}
