//! In-memory content loader
//!
//! Hosts that decode assets up front (or headless tools and tests) register
//! textures, fonts and models by name; entities then resolve them the same
//! way they would through a disk-backed pipeline.

use super::{require_name, ContentLoader, LoadedFont, LoadedModel, LoadedTexture, PixelData};
use crate::error::SceneError;
use crate::foundation::math::{Vec2, Vec3};
use crate::render::{FontHandle, ModelHandle, TextureHandle};
use std::collections::HashMap;
use std::rc::Rc;

#[derive(Debug, Clone, Copy)]
struct FontMetrics {
    glyph_width: f32,
    line_height: f32,
}

/// Content loader backed by registered in-memory assets
#[derive(Debug, Default)]
pub struct MemoryContent {
    textures: HashMap<String, LoadedTexture>,
    pixels: HashMap<TextureHandle, Rc<PixelData>>,
    fonts: HashMap<String, LoadedFont>,
    font_metrics: HashMap<FontHandle, FontMetrics>,
    models: HashMap<String, LoadedModel>,
    load_counts: HashMap<String, usize>,
    next_handle: u32,
}

impl MemoryContent {
    /// Create an empty loader
    pub fn new() -> Self {
        Self::default()
    }

    fn allocate(&mut self) -> u32 {
        let handle = self.next_handle;
        self.next_handle += 1;
        handle
    }

    /// Register a texture and its texels under `name`
    pub fn add_texture(&mut self, name: impl Into<String>, pixels: PixelData) -> TextureHandle {
        let handle = TextureHandle(self.allocate());
        let texture = LoadedTexture {
            handle,
            width: pixels.width(),
            height: pixels.height(),
        };
        self.textures.insert(name.into(), texture);
        self.pixels.insert(handle, Rc::new(pixels));
        handle
    }

    /// Register a monospaced font under `name`
    pub fn add_font(&mut self, name: impl Into<String>, glyph_width: f32, line_height: f32) -> FontHandle {
        let handle = FontHandle(self.allocate());
        self.fonts.insert(name.into(), LoadedFont { handle });
        self.font_metrics.insert(handle, FontMetrics { glyph_width, line_height });
        handle
    }

    /// Register a model with its unscaled extents under `name`
    pub fn add_model(&mut self, name: impl Into<String>, extents: Vec3) -> ModelHandle {
        let handle = ModelHandle(self.allocate());
        self.models.insert(name.into(), LoadedModel { handle, extents });
        handle
    }

    /// How many times an asset was requested by name
    pub fn load_count(&self, name: &str) -> usize {
        self.load_counts.get(name).copied().unwrap_or(0)
    }

    fn record(&mut self, name: &str) {
        *self.load_counts.entry(name.to_string()).or_default() += 1;
    }
}

impl ContentLoader for MemoryContent {
    fn load_texture(&mut self, name: &str) -> Result<LoadedTexture, SceneError> {
        require_name("texture", name)?;
        self.record(name);
        self.textures.get(name).copied().ok_or_else(|| SceneError::AssetNotFound {
            kind: "texture",
            name: name.to_string(),
        })
    }

    fn load_font(&mut self, name: &str) -> Result<LoadedFont, SceneError> {
        require_name("font", name)?;
        self.record(name);
        self.fonts.get(name).copied().ok_or_else(|| SceneError::AssetNotFound {
            kind: "font",
            name: name.to_string(),
        })
    }

    fn load_model(&mut self, name: &str) -> Result<LoadedModel, SceneError> {
        require_name("model", name)?;
        self.record(name);
        self.models.get(name).copied().ok_or_else(|| SceneError::AssetNotFound {
            kind: "model",
            name: name.to_string(),
        })
    }

    fn texture_pixels(&mut self, texture: TextureHandle) -> Result<Rc<PixelData>, SceneError> {
        self.pixels.get(&texture).cloned().ok_or_else(|| SceneError::AssetNotFound {
            kind: "texture",
            name: format!("{texture:?}"),
        })
    }

    fn measure_text(&self, font: FontHandle, text: &str) -> Vec2 {
        let Some(metrics) = self.font_metrics.get(&font) else {
            return Vec2::zeros();
        };
        let lines = text.lines().count().max(1);
        let widest = text.lines().map(|line| line.chars().count()).max().unwrap_or(0);
        Vec2::new(widest as f32 * metrics.glyph_width, lines as f32 * metrics.line_height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::Color;

    #[test]
    fn test_texture_lookup_and_counts() {
        let mut content = MemoryContent::new();
        let handle = content.add_texture("ship", PixelData::filled(8, 4, Color::WHITE));

        let texture = content.load_texture("ship").unwrap();
        assert_eq!(texture.handle, handle);
        assert_eq!((texture.width, texture.height), (8, 4));
        assert_eq!(content.load_count("ship"), 1);

        let pixels = content.texture_pixels(handle).unwrap();
        assert_eq!(pixels.width(), 8);
    }

    #[test]
    fn test_missing_and_empty_names() {
        let mut content = MemoryContent::new();
        assert!(matches!(
            content.load_texture("nope"),
            Err(SceneError::AssetNotFound { kind: "texture", .. })
        ));
        assert!(matches!(
            content.load_model("  "),
            Err(SceneError::EmptyAssetName { kind: "model" })
        ));
    }

    #[test]
    fn test_measure_text_monospaced() {
        let mut content = MemoryContent::new();
        let font = content.add_font("mono", 8.0, 16.0);
        assert_eq!(content.measure_text(font, "abc\nde"), Vec2::new(24.0, 32.0));
        assert_eq!(content.measure_text(font, ""), Vec2::new(0.0, 16.0));
    }
}
