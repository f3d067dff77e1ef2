//! Textured 2D entity

use super::components::Transform2D;
use super::core::{Entity, Entity2D, EntityCore};
use super::Shared;
use crate::assets::{ContentLoader, LoadedTexture, PixelData};
use crate::error::SceneError;
use crate::foundation::math::{Rectangle, Vec2};
use crate::foundation::time::GameTime;
use crate::physics::collision::PixelSurface;
use crate::render::{Renderer, SpriteDraw, SpriteEffects};
use std::rc::Rc;

/// A texture drawn at a transform
///
/// The texture is either resolved by asset name during `load_content` or
/// supplied up front with [`Sprite::from_texture`]. The transform size
/// follows the texture (or the source rectangle when one is set).
#[derive(Debug)]
pub struct Sprite {
    core: EntityCore,
    transform: Shared<Transform2D>,
    asset_name: String,
    texture: Option<LoadedTexture>,
    preloaded: bool,
    source: Option<Rectangle>,
    effects: SpriteEffects,
    perfect_pixel: bool,
    pixels: Option<Rc<PixelData>>,
}

impl Sprite {
    /// Sprite that loads `asset_name` through the content pipeline
    pub fn new(name: impl Into<String>, asset_name: impl Into<String>) -> Self {
        Self {
            core: EntityCore::new(name),
            transform: Transform2D::new().into_shared(),
            asset_name: asset_name.into(),
            texture: None,
            preloaded: false,
            source: None,
            effects: SpriteEffects::empty(),
            perfect_pixel: false,
            pixels: None,
        }
    }

    /// Sprite around a texture the host has already resolved
    pub fn from_texture(name: impl Into<String>, texture: LoadedTexture) -> Self {
        let mut sprite = Self::new(name, String::new());
        sprite.texture = Some(texture);
        sprite.preloaded = true;
        sprite.apply_texture_size();
        sprite
    }

    /// Builder pattern: Set position
    pub fn with_position(self, position: Vec2) -> Self {
        self.transform.borrow_mut().set_position(position);
        self
    }

    /// Builder pattern: Set source rectangle
    pub fn with_source(mut self, source: Rectangle) -> Self {
        self.set_source(Some(source));
        self
    }

    /// Builder pattern: Set mirroring
    pub fn with_effects(mut self, effects: SpriteEffects) -> Self {
        self.effects = effects;
        self
    }

    /// Builder pattern: Keep pixel data for perfect-pixel collision
    pub fn with_perfect_pixel(mut self, enabled: bool) -> Self {
        self.perfect_pixel = enabled;
        self
    }

    /// Asset the texture is loaded from (empty for preloaded sprites)
    pub fn asset_name(&self) -> &str {
        &self.asset_name
    }

    /// Switch to another texture asset
    ///
    /// Takes effect on the next `load_content`; call [`Sprite::reload`] to
    /// swap immediately.
    pub fn set_asset_name(&mut self, asset_name: impl Into<String>) {
        self.asset_name = asset_name.into();
        self.preloaded = false;
    }

    /// Resolved texture
    pub fn texture(&self) -> Option<LoadedTexture> {
        self.texture
    }

    /// Region of the texture that is drawn
    pub fn source(&self) -> Option<Rectangle> {
        self.source
    }

    /// Replace the source region and resize to match
    pub fn set_source(&mut self, source: Option<Rectangle>) {
        self.source = source;
        self.apply_texture_size();
    }

    /// Mirroring
    pub fn effects(&self) -> SpriteEffects {
        self.effects
    }

    /// Replace the mirroring
    pub fn set_effects(&mut self, effects: SpriteEffects) {
        self.effects = effects;
    }

    /// Whether pixel data is kept for perfect-pixel collision
    pub fn perfect_pixel(&self) -> bool {
        self.perfect_pixel
    }

    /// Enable or disable perfect-pixel collision
    ///
    /// Enabling after load needs a [`Sprite::reload`] before pixels are ready.
    pub fn set_perfect_pixel(&mut self, enabled: bool) {
        self.perfect_pixel = enabled;
        if !enabled {
            self.pixels = None;
        }
    }

    /// Cached texels, when perfect-pixel collision is enabled and loaded
    pub fn pixels(&self) -> Option<&PixelData> {
        self.pixels.as_deref()
    }

    /// Force the texture (and pixel data) to be fetched again
    pub fn reload(&mut self, content: &mut dyn ContentLoader) -> Result<(), SceneError> {
        if !self.preloaded {
            self.texture = None;
        }
        self.pixels = None;
        self.load_texture(content)
    }

    fn load_texture(&mut self, content: &mut dyn ContentLoader) -> Result<(), SceneError> {
        if self.texture.is_none() {
            let texture = content.load_texture(&self.asset_name)?;
            log::debug!(
                "Sprite {} loaded texture '{}' ({}x{})",
                self.core.id(),
                self.asset_name,
                texture.width,
                texture.height
            );
            self.texture = Some(texture);
        }

        if self.perfect_pixel && self.pixels.is_none() {
            if let Some(texture) = self.texture {
                self.pixels = Some(content.texture_pixels(texture.handle)?);
            }
        }

        self.apply_texture_size();
        Ok(())
    }

    fn apply_texture_size(&mut self) {
        let size = match (self.source, self.texture) {
            (Some(source), _) => source.size(),
            (None, Some(texture)) => texture.size(),
            (None, None) => return,
        };
        self.transform.borrow_mut().set_size(size);
    }
}

impl Entity for Sprite {
    fn core(&self) -> &EntityCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut EntityCore {
        &mut self.core
    }

    fn load_content(&mut self, content: &mut dyn ContentLoader) -> Result<(), SceneError> {
        self.load_texture(content)
    }

    fn unload_content(&mut self) {
        if !self.preloaded {
            self.texture = None;
        }
        self.pixels = None;
    }

    fn draw(&mut self, _time: &GameTime, renderer: &mut dyn Renderer) {
        let Some(texture) = self.texture else {
            return;
        };
        let transform = self.transform.borrow();
        renderer.draw_sprite(&SpriteDraw {
            texture: texture.handle,
            destination: Rectangle::from_location_size(transform.absolute_position(), transform.scaled_size()),
            source: self.source,
            color: self.core.draw_color(),
            rotation: transform.rotation(),
            origin: transform.origin(),
            effects: self.effects,
            layer_depth: self.core.layer_depth,
        });
    }
}

impl Entity2D for Sprite {
    fn transform(&self) -> &Shared<Transform2D> {
        &self.transform
    }

    fn pixel_surface(&self) -> Option<PixelSurface<'_>> {
        let pixels = self.pixels.as_deref()?;
        Some(
            PixelSurface::new(self.rectangle(), pixels)
                .with_source(self.source)
                .with_effects(self.effects),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::MemoryContent;
    use crate::entity::core::lifecycle;
    use crate::render::{Color, DrawCommand, RecordingRenderer, TextureHandle};
    use approx::assert_relative_eq;

    fn content() -> MemoryContent {
        let mut content = MemoryContent::new();
        content.add_texture("ship", PixelData::filled(32, 16, Color::WHITE));
        content
    }

    #[test]
    fn test_load_sizes_transform_from_texture() {
        let mut content = content();
        let mut sprite = Sprite::new("ship", "ship").with_position(Vec2::new(10.0, 20.0));
        lifecycle::load_content(&mut sprite, &mut content).unwrap();

        let rect = sprite.rectangle();
        assert_relative_eq!(rect.x, 10.0);
        assert_relative_eq!(rect.width, 32.0);
        assert_relative_eq!(rect.height, 16.0);
        assert!(sprite.pixel_surface().is_none());
    }

    #[test]
    fn test_empty_asset_name_is_an_error() {
        let mut content = content();
        let mut sprite = Sprite::new("nameless", "");
        let result = lifecycle::load_content(&mut sprite, &mut content);
        assert!(matches!(result, Err(SceneError::EmptyAssetName { kind: "texture" })));
        assert!(!sprite.core().is_assets_loaded());
    }

    #[test]
    fn test_missing_asset_is_an_error() {
        let mut content = content();
        let mut sprite = Sprite::new("ghost", "ghost");
        assert!(matches!(
            lifecycle::load_content(&mut sprite, &mut content),
            Err(SceneError::AssetNotFound { .. })
        ));
    }

    #[test]
    fn test_loaded_once_until_reload() {
        let mut content = content();
        let mut sprite = Sprite::new("ship", "ship").with_perfect_pixel(true);
        lifecycle::load_content(&mut sprite, &mut content).unwrap();
        lifecycle::load_content(&mut sprite, &mut content).unwrap();
        assert_eq!(content.load_count("ship"), 1);
        assert!(sprite.pixels().is_some());

        sprite.reload(&mut content).unwrap();
        assert_eq!(content.load_count("ship"), 2);
        assert!(sprite.pixel_surface().is_some());
    }

    #[test]
    fn test_source_rectangle_drives_size() {
        let texture = LoadedTexture { handle: TextureHandle(7), width: 64, height: 64 };
        let sprite = Sprite::from_texture("cell", texture).with_source(Rectangle::new(16.0, 0.0, 16.0, 8.0));
        let rect = sprite.rectangle();
        assert_relative_eq!(rect.width, 16.0);
        assert_relative_eq!(rect.height, 8.0);
    }

    #[test]
    fn test_draw_emits_sprite_with_alpha() {
        let mut content = content();
        let mut renderer = RecordingRenderer::new();
        let mut sprite = Sprite::new("ship", "ship").with_effects(SpriteEffects::FLIP_HORIZONTALLY);
        sprite.set_alpha(0.5);
        sprite.core_mut().layer_depth = 0.25;

        sprite.draw(&GameTime::default(), &mut renderer);
        assert!(renderer.commands().is_empty());

        lifecycle::load_content(&mut sprite, &mut content).unwrap();
        sprite.draw(&GameTime::default(), &mut renderer);

        let commands = renderer.commands();
        assert_eq!(commands.len(), 1);
        let DrawCommand::Sprite(draw) = &commands[0] else {
            panic!("expected a sprite draw");
        };
        assert_eq!(draw.effects, SpriteEffects::FLIP_HORIZONTALLY);
        assert_eq!(draw.color, Color::WHITE.with_alpha(0.5));
        assert_relative_eq!(draw.layer_depth, 0.25);
        assert_relative_eq!(draw.destination.width, 32.0);
    }

    #[test]
    fn test_unload_keeps_preloaded_texture() {
        let texture = LoadedTexture { handle: TextureHandle(1), width: 4, height: 4 };
        let mut sprite = Sprite::from_texture("pre", texture);
        sprite.unload_content();
        assert_eq!(sprite.texture(), Some(texture));

        let mut named = Sprite::new("ship", "ship");
        lifecycle::load_content(&mut named, &mut content()).unwrap();
        lifecycle::unload_content(&mut named);
        assert!(named.texture().is_none());
    }
}
