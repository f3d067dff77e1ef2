//! Entity identity, shared state and capability traits
//!
//! Every game object (sprite, text, model, group) owns an [`EntityCore`] and
//! implements [`Entity`]. Spatial behaviour comes from composition: 2D
//! entities expose a [`Transform2D`] through [`Entity2D`], 3D entities a
//! [`Transform3D`] through [`Entity3D`].

use super::collection::SafeCollection;
use super::components::{Transform2D, Transform3D};
use super::Shared;
use crate::assets::ContentLoader;
use crate::error::SceneError;
use crate::foundation::math::{Mat4, Rectangle, Vec2, Vec3};
use crate::foundation::time::GameTime;
use crate::input::PointerStatus;
use crate::physics::collision::{BoundingBox, BoundingSphere, PixelSurface};
use crate::render::{Color, Renderer};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_ENTITY_ID: AtomicU64 = AtomicU64::new(1);

/// Unique, monotonically increasing entity identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityId(u64);

impl EntityId {
    /// Allocate the next identifier
    pub fn next() -> Self {
        Self(NEXT_ENTITY_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// Raw numeric value
    pub fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// State shared by every entity kind
#[derive(Debug, Clone)]
pub struct EntityCore {
    id: EntityId,
    /// Display/debug name
    pub name: String,
    /// Receives update calls when true
    pub enabled: bool,
    /// Receives draw calls when true
    pub visible: bool,
    /// Considered by quadtree rebuilds and pointer hit tests when true
    pub collidable: bool,
    /// Render layer, 0.0 (front) to 1.0 (back)
    pub layer_depth: f32,
    /// Tint applied when drawing
    pub color: Color,
    /// Opacity multiplier, 0.0 to 1.0
    pub alpha: f32,
    /// Pointer state resolved by the host before the update pass
    pub pointer: PointerStatus,
    dirty: bool,
    initialized: bool,
    assets_loaded: bool,
}

impl EntityCore {
    /// Create the core for a new, detached entity
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: EntityId::next(),
            name: name.into(),
            enabled: true,
            visible: true,
            collidable: true,
            layer_depth: 0.0,
            color: Color::WHITE,
            alpha: 1.0,
            pointer: PointerStatus::default(),
            dirty: false,
            initialized: false,
            assets_loaded: false,
        }
    }

    /// Identifier
    pub fn id(&self) -> EntityId {
        self.id
    }

    /// Flag the entity for removal from its collection at the end of the
    /// current update pass. Loaded resources stay until `unload_content`.
    pub fn destroy(&mut self) {
        self.dirty = true;
    }

    /// Whether the entity has been destroyed
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Whether `initialize` has run
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Whether `load_content` has completed
    pub fn is_assets_loaded(&self) -> bool {
        self.assets_loaded
    }

    /// Tint with the alpha multiplier applied
    pub fn draw_color(&self) -> Color {
        self.color.with_alpha(self.alpha)
    }

    /// Whether update calls should reach the entity
    pub fn is_active(&self) -> bool {
        self.enabled && !self.dirty
    }

    /// Whether draw calls should reach the entity
    pub fn is_drawable(&self) -> bool {
        self.visible && !self.dirty
    }
}

/// Lifecycle and identity shared by every game object
///
/// Hooks are driven through [`lifecycle`], which guarantees each of them runs
/// at most once per load cycle.
pub trait Entity {
    /// Shared state
    fn core(&self) -> &EntityCore;

    /// Mutable shared state
    fn core_mut(&mut self) -> &mut EntityCore;

    /// Identifier
    fn id(&self) -> EntityId {
        self.core().id()
    }

    /// One-time setup that needs no assets
    fn initialize(&mut self) {}

    /// Resolve assets through the host content pipeline
    fn load_content(&mut self, _content: &mut dyn ContentLoader) -> Result<(), SceneError> {
        Ok(())
    }

    /// Release cached asset handles
    fn unload_content(&mut self) {}

    /// Admit children queued through collection handles during the last pass
    ///
    /// Only composites have anything to do here.
    fn apply_pending(&mut self, _content: &mut dyn ContentLoader) {}

    /// Per-frame logic
    fn update(&mut self, _time: &GameTime) {}

    /// Per-frame drawing
    fn draw(&mut self, _time: &GameTime, _renderer: &mut dyn Renderer) {}
}

/// A positioned entity in screen space
pub trait Entity2D: Entity {
    /// Transform component, shared with children that position relative to it
    fn transform(&self) -> &Shared<Transform2D>;

    /// Effective screen rectangle
    fn rectangle(&self) -> Rectangle {
        self.transform().borrow().rectangle()
    }

    /// Texels and placement for perfect-pixel collision, when loaded
    fn pixel_surface(&self) -> Option<PixelSurface<'_>> {
        None
    }

    /// Child entities, for composites
    fn children(&self) -> Option<&SafeCollection<dyn Entity2D>> {
        None
    }

    /// Current rotation in radians
    fn rotation(&self) -> f32 {
        self.transform().borrow().rotation()
    }

    /// Add `delta` radians to the rotation
    fn rotate_by(&mut self, delta: f32) {
        let mut transform = self.transform().borrow_mut();
        let rotation = transform.rotation();
        transform.set_rotation(rotation + delta);
    }

    /// Current scale factors
    fn scale(&self) -> Vec2 {
        self.transform().borrow().scale()
    }

    /// Add `delta` to the scale factors
    fn scale_by(&mut self, delta: Vec2) {
        let mut transform = self.transform().borrow_mut();
        let scale = transform.scale();
        transform.set_scale(scale + delta);
    }

    /// Replace the tint
    fn set_color(&mut self, color: Color) {
        self.core_mut().color = color;
    }

    /// Replace the opacity multiplier
    fn set_alpha(&mut self, alpha: f32) {
        self.core_mut().alpha = alpha.clamp(0.0, 1.0);
    }
}

/// A positioned entity in world space
pub trait Entity3D: Entity {
    /// Transform component, shared with children that position relative to it
    fn transform(&self) -> &Shared<Transform3D>;

    /// World matrix as of the last bounding-volume refresh
    fn world_matrix(&self) -> Mat4 {
        self.transform().borrow().world_matrix()
    }

    /// Axis-aligned bounding box
    fn bounding_box(&self) -> BoundingBox {
        self.transform().borrow().bounding_box()
    }

    /// Conservative bounding sphere
    fn bounding_sphere(&self) -> BoundingSphere {
        self.transform().borrow().bounding_sphere()
    }

    /// Recompute cached volumes when the transform is flagged dynamic
    fn refresh_bounds(&mut self) {
        self.transform().borrow_mut().refresh_if_dynamic();
    }

    /// Child entities, for composites
    fn children(&self) -> Option<&SafeCollection<dyn Entity3D>> {
        None
    }

    /// Add yaw/pitch/roll deltas (packed as `y`/`x`/`z`)
    fn rotate_by(&mut self, delta: Vec3) {
        let mut transform = self.transform().borrow_mut();
        let rotation = transform.rotation();
        transform.set_rotation(rotation + delta);
    }

    /// Add `delta` to the scale factors
    fn scale_by(&mut self, delta: Vec3) {
        let mut transform = self.transform().borrow_mut();
        let scale = transform.scale();
        transform.set_scale(scale + delta);
    }
}

/// Drivers that run lifecycle hooks exactly once and keep the core flags in sync
pub mod lifecycle {
    use super::Entity;
    use crate::assets::ContentLoader;
    use crate::error::SceneError;

    /// Run `initialize` unless it already ran
    pub fn initialize<T: Entity + ?Sized>(entity: &mut T) {
        if entity.core().initialized {
            return;
        }
        entity.initialize();
        entity.core_mut().initialized = true;
        log::trace!("Initialized entity {} ({})", entity.id(), entity.core().name);
    }

    /// Run `load_content` unless assets are already loaded
    pub fn load_content<T: Entity + ?Sized>(
        entity: &mut T,
        content: &mut dyn ContentLoader,
    ) -> Result<(), SceneError> {
        if entity.core().assets_loaded {
            return Ok(());
        }
        entity.load_content(content)?;
        entity.core_mut().assets_loaded = true;
        log::trace!("Loaded content for entity {} ({})", entity.id(), entity.core().name);
        Ok(())
    }

    /// Drop loaded assets so a later `load_content` resolves them again
    pub fn unload_content<T: Entity + ?Sized>(entity: &mut T) {
        if !entity.core().assets_loaded {
            return;
        }
        entity.unload_content();
        entity.core_mut().assets_loaded = false;
    }
}
