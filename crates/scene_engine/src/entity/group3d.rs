//! 3D entity group
//!
//! Same composition rules as the 2D group: lifecycle calls are forwarded to
//! the children and rotation/scale changes are broadcast as deltas. The
//! group's bounding box is the union of the child boxes on every axis; the
//! bounding sphere is derived from that box.

use super::collection::{CollectionHandle, SafeCollection};
use super::components::Transform3D;
use super::core::{Entity, Entity3D, EntityCore, EntityId};
use super::Shared;
use crate::assets::ContentLoader;
use crate::config::CollectionConfig;
use crate::error::SceneError;
use crate::foundation::math::Vec3;
use crate::foundation::time::GameTime;
use crate::physics::collision::{BoundingBox, BoundingSphere};
use crate::render::Renderer;
use std::rc::Rc;

/// Composite 3D entity
#[derive(Debug)]
pub struct Group3D {
    core: EntityCore,
    transform: Shared<Transform3D>,
    children: SafeCollection<dyn Entity3D>,
}

impl Group3D {
    /// Empty group with the secure cycle enabled
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_config(name, &CollectionConfig::default())
    }

    /// Empty group using collection settings from config
    pub fn with_config(name: impl Into<String>, config: &CollectionConfig) -> Self {
        Self {
            core: EntityCore::new(name),
            transform: Transform3D::new().into_shared(),
            children: SafeCollection::new(config.secure_cycle),
        }
    }

    /// Builder pattern: Set position
    pub fn with_position(self, position: Vec3) -> Self {
        self.transform.borrow_mut().set_position(position);
        self
    }

    /// Child collection
    pub fn members(&self) -> &SafeCollection<dyn Entity3D> {
        &self.children
    }

    /// Handle for removing children from inside their own update
    pub fn handle(&self) -> CollectionHandle<dyn Entity3D> {
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
    pub fn get(&self, index: usize) -> Result<Shared<dyn Entity3D>, SceneError> {
        self.children.get(index)
    }

    /// Add a child and link its transform to the group's
    pub fn add(&mut self, child: Shared<dyn Entity3D>, content: &mut dyn ContentLoader) -> Result<bool, SceneError> {
        let child_transform = {
            let guard = child.try_borrow().map_err(|_| SceneError::CollectionBusy)?;
            Rc::clone(guard.transform())
        };

        let added = self.children.add(child, content)?;
        if added {
            self.adopt(&child_transform);
            self.update_bounding_volumes();
        }
        Ok(added)
    }

    fn adopt(&self, child_transform: &Shared<Transform3D>) {
        if !Transform3D::attach(child_transform, &self.transform) {
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
            self.update_bounding_volumes();
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
        self.update_bounding_volumes();
        Ok(())
    }

    /// Recompute the union box and its sphere from the children
    ///
    /// Dynamic children refresh their own volumes first. An empty group
    /// collapses to a point at its position.
    pub fn update_bounding_volumes(&mut self) {
        let mut union: Option<BoundingBox> = None;
        for child in self.children.members() {
            let Ok(mut child) = child.try_borrow_mut() else {
                continue;
            };
            child.refresh_bounds();
            let bounds = child.bounding_box();
            union = Some(union.map_or(bounds, |acc| acc.union(&bounds)));
        }

        let mut transform = self.transform.borrow_mut();
        match union {
            Some(bounds) => {
                transform.set_bounding_volumes(bounds, BoundingSphere::from_box(&bounds));
            }
            None => {
                let position = transform.world_position();
                transform.set_bounding_volumes(BoundingBox::new(position, position), BoundingSphere::new(position, 0.0));
            }
        }
    }

    /// Set yaw/pitch/roll (packed as `y`/`x`/`z`), rotating every child by the change
    pub fn set_rotation(&mut self, rotation: Vec3) {
        let delta = rotation - self.transform.borrow().rotation();
        self.rotate_by(delta);
    }

    /// Set the group scale, scaling every child by the change
    pub fn set_scale(&mut self, scale: Vec3) {
        let delta = scale - self.transform.borrow().scale();
        self.scale_by(delta);
    }

    fn for_each_child(&self, mut apply: impl FnMut(&mut dyn Entity3D)) {
        for child in self.children.members() {
            match child.try_borrow_mut() {
                Ok(mut child) => apply(&mut *child),
                Err(_) => log::warn!("Group {} skipped a borrowed child", self.core.id()),
            }
        }
    }
}

impl Entity for Group3D {
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
        self.update_bounding_volumes();
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
        self.update_bounding_volumes();
    }

    fn update(&mut self, time: &GameTime) {
        for child in self.children.update(time) {
            if let Ok(child) = child.try_borrow() {
                child.transform().borrow_mut().detach();
            }
        }
        self.update_bounding_volumes();
    }

    fn draw(&mut self, time: &GameTime, renderer: &mut dyn Renderer) {
        self.children.draw(time, renderer);
    }
}

impl Entity3D for Group3D {
    fn transform(&self) -> &Shared<Transform3D> {
        &self.transform
    }

    fn refresh_bounds(&mut self) {
        self.update_bounding_volumes();
    }

    fn children(&self) -> Option<&SafeCollection<dyn Entity3D>> {
        Some(&self.children)
    }

    fn rotate_by(&mut self, delta: Vec3) {
        {
            let mut transform = self.transform.borrow_mut();
            let rotation = transform.rotation();
            transform.set_rotation(rotation + delta);
        }
        self.for_each_child(|child| child.rotate_by(delta));
    }

    fn scale_by(&mut self, delta: Vec3) {
        {
            let mut transform = self.transform.borrow_mut();
            let scale = transform.scale();
            transform.set_scale(scale + delta);
        }
        self.for_each_child(|child| {
            child.scale_by(delta);
            child.transform().borrow_mut().update_bounding_volumes();
        });
        self.update_bounding_volumes();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::MemoryContent;
    use crate::entity::components::PositionType;
    use crate::entity::{lifecycle, shared, Model};
    use approx::assert_relative_eq;

    fn crate_at(content: &mut MemoryContent, name: &str, position: Vec3) -> Shared<Model> {
        content.add_model(name, Vec3::new(1.0, 1.0, 1.0));
        let mut model = Model::new(name, name).with_position(position);
        lifecycle::load_content(&mut model, content).unwrap();
        shared(model)
    }

    #[test]
    fn test_bounding_box_is_union_on_every_axis() {
        let mut content = MemoryContent::new();
        let mut group = Group3D::new("group");
        // Second child is smaller than the first on x but larger on y and z
        group.add(crate_at(&mut content, "a", Vec3::new(5.0, 0.0, 0.0)), &mut content).unwrap();
        group.add(crate_at(&mut content, "b", Vec3::new(0.0, 8.0, -4.0)), &mut content).unwrap();

        let bounds = group.bounding_box();
        assert_relative_eq!(bounds.min, Vec3::new(0.0, 0.0, -4.0));
        assert_relative_eq!(bounds.max, Vec3::new(6.0, 9.0, 1.0));

        let sphere = group.bounding_sphere();
        assert_relative_eq!(sphere.center, bounds.center());
        assert_relative_eq!(sphere.radius, bounds.extents().magnitude());
    }

    #[test]
    fn test_empty_group_collapses_to_position() {
        let mut group = Group3D::new("empty").with_position(Vec3::new(1.0, 2.0, 3.0));
        group.update_bounding_volumes();
        assert_relative_eq!(group.bounding_box().min, Vec3::new(1.0, 2.0, 3.0));
        assert_relative_eq!(group.bounding_sphere().radius, 0.0);
    }

    #[test]
    fn test_rotation_and_scale_broadcast_deltas() {
        let mut content = MemoryContent::new();
        let mut group = Group3D::new("group");
        let child = crate_at(&mut content, "a", Vec3::zeros());
        child.borrow_mut().rotate_by(Vec3::new(0.0, 1.0, 0.0));
        group.add(child.clone(), &mut content).unwrap();

        group.set_rotation(Vec3::new(0.0, 0.5, 0.0));
        group.set_scale(Vec3::new(3.0, 3.0, 3.0));

        let transform = child.borrow().transform().borrow().clone();
        assert_relative_eq!(transform.rotation(), Vec3::new(0.0, 1.5, 0.0));
        assert_relative_eq!(transform.scale(), Vec3::new(3.0, 3.0, 3.0));
        assert_relative_eq!(group.bounding_box().max, Vec3::new(3.0, 3.0, 3.0));
    }

    #[test]
    fn test_relative_children_follow_group() {
        let mut content = MemoryContent::new();
        let mut group = Group3D::new("group").with_position(Vec3::new(10.0, 0.0, 0.0));
        let child = crate_at(&mut content, "a", Vec3::zeros());
        child.borrow().transform().borrow_mut().set_position_type(PositionType::Relative);
        child.borrow().transform().borrow_mut().set_dynamic(true);
        group.add(child.clone(), &mut content).unwrap();

        assert_relative_eq!(group.bounding_box().min, Vec3::new(10.0, 0.0, 0.0));

        let id = child.borrow().id();
        assert!(group.remove(id).unwrap());
        assert!(group.is_empty());
    }
}
