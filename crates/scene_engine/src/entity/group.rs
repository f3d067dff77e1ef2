//! 2D entity group
//!
//! A [`Group2D`] owns an ordered [`SafeCollection`] of children and forwards
//! lifecycle calls to it. Aggregates behave in two ways:
//!
//! - Size is recomputed from the children: width and height are the largest
//!   child width and height (not the union of their rectangles).
//! - Rotation, scale, color and alpha are broadcast. Rotation and scale
//!   changes reach the children as deltas, so `set_rotation(r)` adds
//!   `r - previous` to every child rather than overwriting theirs.

use super::collection::{CollectionHandle, SafeCollection};
use super::components::Transform2D;
use super::core::{Entity, Entity2D, EntityCore, EntityId};
use super::Shared;
use crate::assets::ContentLoader;
use crate::config::CollectionConfig;
use crate::error::SceneError;
use crate::foundation::math::{Rectangle, Vec2};
use crate::foundation::time::GameTime;
use crate::render::{Color, Renderer};
use std::rc::Rc;

/// Composite 2D entity
#[derive(Debug)]
pub struct Group2D {
    core: EntityCore,
    transform: Shared<Transform2D>,
    children: SafeCollection<dyn Entity2D>,
}

impl Group2D {
    /// Empty group with the secure cycle enabled
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_config(name, &CollectionConfig::default())
    }

    /// Empty group using collection settings from config
    pub fn with_config(name: impl Into<String>, config: &CollectionConfig) -> Self {
        Self {
            core: EntityCore::new(name),
            transform: Transform2D::new().into_shared(),
            children: SafeCollection::new(config.secure_cycle),
        }
    }

    /// Builder pattern: Set position
    pub fn with_position(self, position: Vec2) -> Self {
        self.transform.borrow_mut().set_position(position);
        self
    }

    /// Child collection
    pub fn members(&self) -> &SafeCollection<dyn Entity2D> {
        &self.children
    }

    /// Handle for removing children from inside their own update
    pub fn handle(&self) -> CollectionHandle<dyn Entity2D> {
        self.children.handle()
    }

    /// Number of children
    pub fn len(&self) -> usize {
        self.children.len()
    }

    /// Whether the group has no children
    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    /// Child at `index`
    pub fn get(&self, index: usize) -> Result<Shared<dyn Entity2D>, SceneError> {
        self.children.get(index)
    }

    /// Add a child and link its transform to the group's
    ///
    /// A child in relative mode is positioned from the group from now on.
    /// Returns `Ok(false)` if it was already a member.
    pub fn add(&mut self, child: Shared<dyn Entity2D>, content: &mut dyn ContentLoader) -> Result<bool, SceneError> {
        let child_transform = {
            let guard = child.try_borrow().map_err(|_| SceneError::CollectionBusy)?;
            Rc::clone(guard.transform())
        };

        let added = self.children.add(child, content)?;
        if added {
            self.adopt(&child_transform);
            self.update_sizes();
        }
        Ok(added)
    }

    fn adopt(&self, child_transform: &Shared<Transform2D>) {
        if !Transform2D::attach(child_transform, &self.transform) {
            log::warn!("Group {} cannot parent a child that contains it", self.core.id());
        }
    }

    /// Remove a child and unlink its transform
    pub fn remove(&mut self, id: EntityId) -> Result<bool, SceneError> {
        let Some(child) = self.children.find(id) else {
            return Ok(false);
        };
        let removed = self.children.remove(id)?;
        if removed {
            if let Ok(child) = child.try_borrow() {
                child.transform().borrow_mut().detach();
            }
            self.update_sizes();
        }
        Ok(removed)
    }

    /// Remove every child
    pub fn clear(&mut self) -> Result<(), SceneError> {
        let members = self.children.members();
        self.children.clear()?;
        for child in members {
            if let Ok(child) = child.try_borrow() {
                child.transform().borrow_mut().detach();
            }
        }
        self.update_sizes();
        Ok(())
    }

    /// Recompute the group size as the largest child width and height
    pub fn update_sizes(&mut self) {
        let mut size = Vec2::zeros();
        for child in self.children.members() {
            if let Ok(child) = child.try_borrow() {
                let rect = child.rectangle();
                size.x = size.x.max(rect.width);
                size.y = size.y.max(rect.height);
            }
        }
        self.transform.borrow_mut().set_size(size);
    }

    /// Set the group rotation, rotating every child by the change
    pub fn set_rotation(&mut self, rotation: f32) {
        let delta = rotation - self.rotation();
        self.rotate_by(delta);
    }

    /// Set the group scale, scaling every child by the change
    pub fn set_scale(&mut self, scale: Vec2) {
        let delta = scale - self.scale();
        self.scale_by(delta);
    }

    fn for_each_child(&self, mut apply: impl FnMut(&mut dyn Entity2D)) {
        for child in self.children.members() {
            match child.try_borrow_mut() {
                Ok(mut child) => apply(&mut *child),
                Err(_) => log::warn!("Group {} skipped a borrowed child", self.core.id()),
            }
        }
    }
}

impl Entity for Group2D {
    fn core(&self) -> &EntityCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut EntityCore {
        &mut self.core
    }

    fn initialize(&mut self) {
        self.children.initialize();
    }

    fn load_content(&mut self, content: &mut dyn ContentLoader) -> Result<(), SceneError> {
        self.children.load_content(content)?;
        self.update_sizes();
        Ok(())
    }

    fn unload_content(&mut self) {
        self.children.unload_content();
    }

    fn apply_pending(&mut self, content: &mut dyn ContentLoader) {
        let joined = self.children.apply_pending(content);
        if joined.is_empty() {
            return;
        }
        for child in &joined {
            if let Ok(child) = child.try_borrow() {
                self.adopt(child.transform());
            }
        }
        self.update_sizes();
    }

    fn update(&mut self, time: &GameTime) {
        for child in self.children.update(time) {
            if let Ok(child) = child.try_borrow() {
                child.transform().borrow_mut().detach();
            }
        }
        self.update_sizes();
    }

    fn draw(&mut self, time: &GameTime, renderer: &mut dyn Renderer) {
        self.children.draw(time, renderer);
    }
}

impl Entity2D for Group2D {
    fn transform(&self) -> &Shared<Transform2D> {
        &self.transform
    }

    /// Children are already scaled, so the group size is used as-is
    fn rectangle(&self) -> Rectangle {
        let transform = self.transform.borrow();
        Rectangle::from_location_size(transform.absolute_position() - transform.origin(), transform.size())
    }

    fn children(&self) -> Option<&SafeCollection<dyn Entity2D>> {
        Some(&self.children)
    }

    fn rotate_by(&mut self, delta: f32) {
        {
            let mut transform = self.transform.borrow_mut();
            let rotation = transform.rotation();
            transform.set_rotation(rotation + delta);
        }
        self.for_each_child(|child| child.rotate_by(delta));
    }

    fn scale_by(&mut self, delta: Vec2) {
        {
            let mut transform = self.transform.borrow_mut();
            let scale = transform.scale();
            transform.set_scale(scale + delta);
        }
        self.for_each_child(|child| child.scale_by(delta));
        self.update_sizes();
    }

    fn set_color(&mut self, color: Color) {
        self.core.color = color;
        self.for_each_child(|child| child.set_color(color));
    }

    fn set_alpha(&mut self, alpha: f32) {
        self.core.alpha = alpha.clamp(0.0, 1.0);
        self.for_each_child(|child| child.set_alpha(alpha));
    }
}
