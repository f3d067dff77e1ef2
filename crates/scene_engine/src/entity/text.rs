//! Text entity

use super::components::Transform2D;
use super::core::{Entity, Entity2D, EntityCore};
use super::Shared;
use crate::assets::{ContentLoader, LoadedFont};
use crate::error::SceneError;
use crate::foundation::math::Vec2;
use crate::foundation::time::GameTime;
use crate::render::{Renderer, TextDraw};

/// A string rendered with a font asset
///
/// The transform size is the measured size of the string, refreshed on load
/// and whenever the string changes while the font is loaded.
#[derive(Debug)]
pub struct Text {
    core: EntityCore,
    transform: Shared<Transform2D>,
    font_name: String,
    font: Option<LoadedFont>,
    text: String,
}

impl Text {
    /// Text drawn with the font asset `font_name`
    pub fn new(name: impl Into<String>, font_name: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            core: EntityCore::new(name),
            transform: Transform2D::new().into_shared(),
            font_name: font_name.into(),
            font: None,
            text: text.into(),
        }
    }

    /// Builder pattern: Set position
    pub fn with_position(self, position: Vec2) -> Self {
        self.transform.borrow_mut().set_position(position);
        self
    }

    /// Current string
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Font asset name
    pub fn font_name(&self) -> &str {
        &self.font_name
    }

    /// Resolved font
    pub fn font(&self) -> Option<LoadedFont> {
        self.font
    }

    /// Replace the string, re-measuring when the font is loaded
    pub fn set_text(&mut self, text: impl Into<String>, content: &dyn ContentLoader) {
        self.text = text.into();
        self.measure(content);
    }

    fn measure(&mut self, content: &dyn ContentLoader) {
        if let Some(font) = self.font {
            let size = content.measure_text(font.handle, &self.text);
            self.transform.borrow_mut().set_size(size);
        }
    }
}

impl Entity for Text {
    fn core(&self) -> &EntityCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut EntityCore {
        &mut self.core
    }

    fn load_content(&mut self, content: &mut dyn ContentLoader) -> Result<(), SceneError> {
        if self.font.is_none() {
            self.font = Some(content.load_font(&self.font_name)?);
        }
        self.measure(content);
        Ok(())
    }

    fn unload_content(&mut self) {
        self.font = None;
    }

    fn draw(&mut self, _time: &GameTime, renderer: &mut dyn Renderer) {
        let Some(font) = self.font else {
            return;
        };
        let transform = self.transform.borrow();
        renderer.draw_text(&TextDraw {
            font: font.handle,
            text: self.text.clone(),
            position: transform.absolute_position(),
            color: self.core.draw_color(),
            rotation: transform.rotation(),
            origin: transform.origin(),
            scale: transform.scale(),
            layer_depth: self.core.layer_depth,
        });
    }
}

impl Entity2D for Text {
    fn transform(&self) -> &Shared<Transform2D> {
        &self.transform
    }
}
