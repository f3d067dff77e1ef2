//! # Scene Engine
//!
//! A game-object scene framework: entity trees with parent-relative
//! transforms, mutation-safe entity collections, 2D/3D collision and quadtree
//! partitioning. Rendering, content loading and input polling stay with the
//! host, which plugs in through the [`render::Renderer`] and
//! [`assets::ContentLoader`] traits and drives the scene once per frame.
//!
//! ## Features
//!
//! - **Safe collections**: entities can remove themselves or siblings during
//!   an update pass without disturbing it
//! - **Composition**: groups aggregate sizes and broadcast rotation, scale,
//!   color and alpha to their children
//! - **Collision**: rectangles, circles, boxes, spheres, rays and
//!   perfect-pixel tests, plus entity/group algorithms
//! - **Spatial partitioning**: a quadtree for broad-phase 2D queries
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use scene_engine::prelude::*;
//!
//! fn main() -> Result<(), SceneError> {
//!     scene_engine::foundation::logging::init();
//!
//!     let mut content = MemoryContent::new();
//!     content.add_texture("ship", PixelData::filled(32, 32, Color::WHITE));
//!
//!     let mut scene = Scene::new(SceneConfig::default(), Box::new(content))?;
//!     scene.add_2d(shared(Sprite::new("player", "ship")))?;
//!     scene.initialize();
//!     scene.load_content()?;
//!
//!     let mut timer = Timer::new();
//!     let mut renderer = RecordingRenderer::new();
//!     let time = timer.tick();
//!     scene.update(&time);
//!     scene.draw(&time, &mut renderer);
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::too_many_arguments)]

pub mod assets;
pub mod config;
pub mod entity;
pub mod error;
pub mod foundation;
pub mod input;
pub mod physics;
pub mod render;
pub mod scene;
pub mod spatial;

pub use error::SceneError;
pub use scene::Scene;

/// Common imports for engine users
pub mod prelude {
    pub use crate::{
        assets::{ContentLoader, LoadedFont, LoadedModel, LoadedTexture, MemoryContent, PixelData},
        config::{CollectionConfig, Config, QuadTreeConfig, QuadTreePolicy, SceneConfig},
        entity::{
            lifecycle, shared, Entity, Entity2D, Entity3D, EntityCore, EntityId, Group2D, Group3D, Model,
            PositionType, SafeCollection, Shared, Sprite, Text, Transform2D, Transform3D,
        },
        foundation::{
            math::{Mat4, Rectangle, Vec2, Vec3},
            time::{GameTime, Timer},
        },
        input::{PointerState, PointerStatus},
        physics::{collider, BoundingBox, BoundingSphere, Circle, CollideInformation, CollisionTest, Ray},
        render::{Color, RecordingRenderer, Renderer, SpriteEffects},
        spatial::QuadTree,
        Scene, SceneError,
    };
}
