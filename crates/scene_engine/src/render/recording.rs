//! Headless renderer that records every draw request
//!
//! Useful for servers, replays and tests that need to observe what a draw
//! pass produced without a graphics device.

use super::{ModelHandle, Renderer, SpriteDraw, TextDraw};
use crate::foundation::math::Mat4;

/// A recorded draw request
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    /// A sprite draw
    Sprite(SpriteDraw),
    /// A text draw
    Text(TextDraw),
    /// A model draw
    Model {
        /// Model handle
        model: ModelHandle,
        /// World matrix at draw time
        world: Mat4,
    },
}

/// Renderer that stores commands in submission order
#[derive(Debug, Default)]
pub struct RecordingRenderer {
    commands: Vec<DrawCommand>,
}

impl RecordingRenderer {
    /// Create an empty recorder
    pub fn new() -> Self {
        Self::default()
    }

    /// Commands recorded so far
    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    /// Sprite commands only
    pub fn sprites(&self) -> impl Iterator<Item = &SpriteDraw> {
        self.commands.iter().filter_map(|command| match command {
            DrawCommand::Sprite(sprite) => Some(sprite),
            _ => None,
        })
    }

    /// Drop everything recorded so far
    pub fn clear(&mut self) {
        self.commands.clear();
    }
}

impl Renderer for RecordingRenderer {
    fn draw_sprite(&mut self, sprite: &SpriteDraw) {
        self.commands.push(DrawCommand::Sprite(sprite.clone()));
    }

    fn draw_text(&mut self, text: &TextDraw) {
        self.commands.push(DrawCommand::Text(text.clone()));
    }

    fn draw_model(&mut self, model: ModelHandle, world: &Mat4) {
        self.commands.push(DrawCommand::Model { model, world: *world });
    }
}
