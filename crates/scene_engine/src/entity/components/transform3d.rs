//! 3D transform component
//!
//! Holds position, yaw/pitch/roll rotation and scale together with the cached
//! world matrix and bounding volumes derived from them. Static transforms are
//! computed once at load; dynamic ones are refreshed every update tick.

use super::PositionType;
use crate::entity::Shared;
use crate::foundation::math::{utils, Mat4, Vec3};
use crate::physics::collision::{BoundingBox, BoundingSphere};
use std::cell::RefCell;
use std::rc::{Rc, Weak};

/// Parent-aware 3D transform with cached bounding volumes
#[derive(Debug, Clone)]
pub struct Transform3D {
    position: Vec3,
    /// Pitch (x), yaw (y), roll (z) in radians
    rotation: Vec3,
    scale: Vec3,
    extents: Vec3,
    position_type: PositionType,
    parent: Option<Weak<RefCell<Transform3D>>>,
    dynamic: bool,
    world: Mat4,
    bounding_box: BoundingBox,
    bounding_sphere: BoundingSphere,
}

impl Default for Transform3D {
    fn default() -> Self {
        Self {
            position: Vec3::zeros(),
            rotation: Vec3::zeros(),
            scale: Vec3::new(1.0, 1.0, 1.0),
            extents: Vec3::zeros(),
            position_type: PositionType::Absolute,
            parent: None,
            dynamic: false,
            world: Mat4::identity(),
            bounding_box: BoundingBox::new(Vec3::zeros(), Vec3::zeros()),
            bounding_sphere: BoundingSphere::new(Vec3::zeros(), 0.0),
        }
    }
}

impl Transform3D {
    /// Identity transform at the origin with zero extents
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder pattern: Set position
    pub fn with_position(mut self, position: Vec3) -> Self {
        self.position = position;
        self
    }

    /// Builder pattern: Set unscaled extents
    pub fn with_extents(mut self, extents: Vec3) -> Self {
        self.extents = extents;
        self
    }

    /// Builder pattern: Set scale
    pub fn with_scale(mut self, scale: Vec3) -> Self {
        self.scale = scale;
        self
    }

    /// Builder pattern: Mark as dynamic
    pub fn with_dynamic(mut self, dynamic: bool) -> Self {
        self.dynamic = dynamic;
        self
    }

    /// Wrap into a shareable handle with volumes computed
    pub fn into_shared(mut self) -> Shared<Self> {
        self.update_bounding_volumes();
        Rc::new(RefCell::new(self))
    }

    /// Stored position (an offset when relative)
    pub fn position(&self) -> Vec3 {
        self.position
    }

    /// Overwrite the stored position as-is
    pub fn set_position(&mut self, position: Vec3) {
        self.position = position;
    }

    fn parent_position(&self) -> Option<Vec3> {
        let parent = self.parent.as_ref()?.upgrade()?;
        let parent = parent.try_borrow().ok()?;
        Some(parent.world_position())
    }

    /// Position in world space
    pub fn world_position(&self) -> Vec3 {
        match (self.position_type, self.parent_position()) {
            (PositionType::Relative, Some(parent)) => parent + self.position,
            _ => self.position,
        }
    }

    /// Place the entity at a world-space position
    pub fn set_world_position(&mut self, position: Vec3) {
        self.position = match (self.position_type, self.parent_position()) {
            (PositionType::Relative, Some(parent)) => position - parent,
            _ => position,
        };
    }

    /// Current positioning mode
    pub fn position_type(&self) -> PositionType {
        self.position_type
    }

    /// Switch positioning mode, keeping the world position unchanged
    pub fn set_position_type(&mut self, position_type: PositionType) {
        if self.position_type == position_type {
            return;
        }
        let world = self.world_position();
        self.position_type = position_type;
        self.set_world_position(world);
    }

    /// Link `child` to `parent`; refuses cycles
    pub fn attach(child: &Shared<Self>, parent: &Shared<Self>) -> bool {
        let mut cursor = Some(Rc::clone(parent));
        while let Some(current) = cursor {
            if Rc::ptr_eq(&current, child) {
                log::warn!("Refusing to parent a 3D transform to itself or a descendant");
                return false;
            }
            cursor = current
                .try_borrow()
                .ok()
                .and_then(|transform| transform.parent.as_ref().and_then(Weak::upgrade));
        }
        child.borrow_mut().parent = Some(Rc::downgrade(parent));
        true
    }

    /// Remove the parent link, converting a relative position to world space
    pub fn detach(&mut self) {
        let world = self.world_position();
        self.parent = None;
        self.position = world;
    }

    /// Pitch (x), yaw (y), roll (z) in radians
    pub fn rotation(&self) -> Vec3 {
        self.rotation
    }

    /// Set pitch (x), yaw (y), roll (z) in radians
    pub fn set_rotation(&mut self, rotation: Vec3) {
        self.rotation = rotation;
    }

    /// Scale factors
    pub fn scale(&self) -> Vec3 {
        self.scale
    }

    /// Set scale factors
    pub fn set_scale(&mut self, scale: Vec3) {
        self.scale = scale;
    }

    /// Unscaled width/height/depth
    pub fn extents(&self) -> Vec3 {
        self.extents
    }

    /// Set unscaled width/height/depth
    pub fn set_extents(&mut self, extents: Vec3) {
        self.extents = extents;
    }

    /// Width/height/depth after scaling
    pub fn size(&self) -> Vec3 {
        self.extents.component_mul(&self.scale)
    }

    /// Whether volumes are refreshed every tick
    pub fn is_dynamic(&self) -> bool {
        self.dynamic
    }

    /// Toggle per-tick refresh
    pub fn set_dynamic(&mut self, dynamic: bool) {
        self.dynamic = dynamic;
    }

    /// Cached world matrix
    pub fn world_matrix(&self) -> Mat4 {
        self.world
    }

    /// Cached bounding box
    pub fn bounding_box(&self) -> BoundingBox {
        self.bounding_box
    }

    /// Cached bounding sphere
    pub fn bounding_sphere(&self) -> BoundingSphere {
        self.bounding_sphere
    }

    /// Overwrite the cached volumes (composites derive them from children)
    pub fn set_bounding_volumes(&mut self, bounding_box: BoundingBox, bounding_sphere: BoundingSphere) {
        self.bounding_box = bounding_box;
        self.bounding_sphere = bounding_sphere;
    }

    /// Recompute the world matrix and bounding volumes
    ///
    /// The box spans `position .. position + size`; the sphere sits at the
    /// box center with radius `max(size) / 2`, which is not a tight bound.
    pub fn update_bounding_volumes(&mut self) {
        let position = self.world_position();
        let size = self.size();

        self.world = utils::scale_rotate_translate(self.scale, self.rotation, position);
        self.bounding_box = BoundingBox::new(position, position + size);
        self.bounding_sphere = BoundingSphere::new(position + size * 0.5, size.max() * 0.5);
    }

    /// Recompute only when flagged dynamic
    pub fn refresh_if_dynamic(&mut self) {
        if self.dynamic {
            self.update_bounding_volumes();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use nalgebra::Point3;

    #[test]
    fn test_bounding_volumes_from_position_and_size() {
        let mut transform = Transform3D::new()
            .with_position(Vec3::new(1.0, 2.0, 3.0))
            .with_extents(Vec3::new(2.0, 4.0, 6.0))
            .with_scale(Vec3::new(1.0, 1.0, 0.5));
        transform.update_bounding_volumes();

        let bounds = transform.bounding_box();
        assert_relative_eq!(bounds.min, Vec3::new(1.0, 2.0, 3.0));
        assert_relative_eq!(bounds.max, Vec3::new(3.0, 6.0, 6.0));

        let sphere = transform.bounding_sphere();
        assert_relative_eq!(sphere.center, Vec3::new(2.0, 4.0, 4.5));
        assert_relative_eq!(sphere.radius, 2.0);
    }

    #[test]
    fn test_world_matrix_scales_before_translating() {
        let mut transform = Transform3D::new()
            .with_position(Vec3::new(10.0, 0.0, 0.0))
            .with_scale(Vec3::new(3.0, 3.0, 3.0));
        transform.update_bounding_volumes();

        let point = transform.world_matrix().transform_point(&Point3::new(1.0, 0.0, 0.0));
        assert_relative_eq!(point.coords, Vec3::new(13.0, 0.0, 0.0), epsilon = 1e-5);
    }

    #[test]
    fn test_static_transform_keeps_cached_volumes() {
        let mut transform = Transform3D::new().with_extents(Vec3::new(1.0, 1.0, 1.0));
        transform.update_bounding_volumes();

        transform.set_position(Vec3::new(50.0, 0.0, 0.0));
        transform.refresh_if_dynamic();
        assert_relative_eq!(transform.bounding_box().min, Vec3::zeros());

        transform.set_dynamic(true);
        transform.refresh_if_dynamic();
        assert_relative_eq!(transform.bounding_box().min, Vec3::new(50.0, 0.0, 0.0));
    }

    #[test]
    fn test_relative_world_position() {
        let parent = Transform3D::new().with_position(Vec3::new(5.0, 5.0, 5.0)).into_shared();
        let child = Transform3D::new().with_position(Vec3::new(6.0, 7.0, 8.0)).into_shared();
        assert!(Transform3D::attach(&child, &parent));

        child.borrow_mut().set_position_type(PositionType::Relative);
        assert_relative_eq!(child.borrow().position(), Vec3::new(1.0, 2.0, 3.0));

        parent.borrow_mut().set_position(Vec3::zeros());
        assert_relative_eq!(child.borrow().world_position(), Vec3::new(1.0, 2.0, 3.0));

        child.borrow_mut().set_position_type(PositionType::Absolute);
        assert_relative_eq!(child.borrow().position(), Vec3::new(1.0, 2.0, 3.0));
    }
}
