//! Content loading contracts
//!
//! Entities resolve named assets through a host-implemented [`ContentLoader`]
//! during `load_content`. The scene caches the returned handles and never
//! decodes asset files itself.

mod memory;
mod pixels;

pub use memory::MemoryContent;
pub use pixels::PixelData;

use crate::error::SceneError;
use crate::foundation::math::{Vec2, Vec3};
use crate::render::{FontHandle, ModelHandle, TextureHandle};
use std::rc::Rc;

/// A texture resolved by the content loader
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadedTexture {
    /// Host handle
    pub handle: TextureHandle,
    /// Width in texels
    pub width: u32,
    /// Height in texels
    pub height: u32,
}

impl LoadedTexture {
    /// Texture size as a vector
    pub fn size(&self) -> Vec2 {
        Vec2::new(self.width as f32, self.height as f32)
    }
}

/// A font resolved by the content loader
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadedFont {
    /// Host handle
    pub handle: FontHandle,
}

/// A model resolved by the content loader
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LoadedModel {
    /// Host handle
    pub handle: ModelHandle,
    /// Unscaled width/height/depth of the model's mesh bounds
    pub extents: Vec3,
}

/// Host content pipeline
pub trait ContentLoader {
    /// Resolve a texture by asset name
    fn load_texture(&mut self, name: &str) -> Result<LoadedTexture, SceneError>;

    /// Resolve a font by asset name
    fn load_font(&mut self, name: &str) -> Result<LoadedFont, SceneError>;

    /// Resolve a model by asset name
    fn load_model(&mut self, name: &str) -> Result<LoadedModel, SceneError>;

    /// Read back the texels of a texture
    ///
    /// Potentially expensive; callers fetch once and keep the result.
    fn texture_pixels(&mut self, texture: TextureHandle) -> Result<Rc<PixelData>, SceneError>;

    /// Size of `text` rendered with `font`
    fn measure_text(&self, font: FontHandle, text: &str) -> Vec2;
}

/// Reject empty asset names before they reach the host
pub(crate) fn require_name(kind: &'static str, name: &str) -> Result<(), SceneError> {
    if name.trim().is_empty() {
        return Err(SceneError::EmptyAssetName { kind });
    }
    Ok(())
}
