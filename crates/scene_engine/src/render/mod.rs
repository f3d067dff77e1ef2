//! Rendering contracts
//!
//! The scene never touches graphics-device state. Visible entities describe
//! what they want drawn and hand it to a host-implemented [`Renderer`] once per
//! draw pass. Sorting by layer depth is the renderer's job.

mod color;
mod recording;

pub use color::Color;
pub use recording::{DrawCommand, RecordingRenderer};

use crate::foundation::math::{Mat4, Rectangle, Vec2};
use bitflags::bitflags;

/// Opaque handle to a texture owned by the host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureHandle(pub u32);

/// Opaque handle to a font owned by the host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FontHandle(pub u32);

/// Opaque handle to a 3D model owned by the host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ModelHandle(pub u32);

bitflags! {
    /// Mirroring applied when drawing a sprite
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct SpriteEffects: u8 {
        /// Mirror around the vertical axis
        const FLIP_HORIZONTALLY = 1 << 0;
        /// Mirror around the horizontal axis
        const FLIP_VERTICALLY = 1 << 1;
    }
}

/// A single sprite draw request
#[derive(Debug, Clone, PartialEq)]
pub struct SpriteDraw {
    /// Texture to sample
    pub texture: TextureHandle,
    /// Destination rectangle in screen space
    pub destination: Rectangle,
    /// Optional sub-rectangle of the texture
    pub source: Option<Rectangle>,
    /// Tint (alpha already applied)
    pub color: Color,
    /// Rotation in radians around `origin`
    pub rotation: f32,
    /// Pivot in texture space
    pub origin: Vec2,
    /// Mirroring
    pub effects: SpriteEffects,
    /// Render layer, 0.0 (front) to 1.0 (back)
    pub layer_depth: f32,
}

/// A single text draw request
#[derive(Debug, Clone, PartialEq)]
pub struct TextDraw {
    /// Font to render with
    pub font: FontHandle,
    /// String to render
    pub text: String,
    /// Top-left position in screen space
    pub position: Vec2,
    /// Tint (alpha already applied)
    pub color: Color,
    /// Rotation in radians around `origin`
    pub rotation: f32,
    /// Pivot offset
    pub origin: Vec2,
    /// Scale factors
    pub scale: Vec2,
    /// Render layer
    pub layer_depth: f32,
}

/// Host rendering backend
pub trait Renderer {
    /// Queue a sprite
    fn draw_sprite(&mut self, sprite: &SpriteDraw);

    /// Queue a string of text
    fn draw_text(&mut self, text: &TextDraw);

    /// Queue a model with its world matrix
    fn draw_model(&mut self, model: ModelHandle, world: &Mat4);
}
