//! 2D transform component
//!
//! Resolves an entity's effective screen rectangle from its local position,
//! origin, scale and (in [`PositionType::Relative`] mode) its parent's
//! absolute position.

use crate::entity::Shared;
use crate::foundation::math::{Rectangle, Vec2};
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::rc::{Rc, Weak};

/// How the stored position is interpreted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PositionType {
    /// Position is in world/screen space
    #[default]
    Absolute,
    /// Position is an offset added to the parent's absolute position
    Relative,
}

/// Parent-aware 2D transform
///
/// `size` is the unscaled width/height (usually the texture size); the
/// effective rectangle is `(absolute - origin, size * scale)`.
#[derive(Debug, Clone)]
pub struct Transform2D {
    position: Vec2,
    rotation: f32,
    scale: Vec2,
    origin: Vec2,
    size: Vec2,
    position_type: PositionType,
    parent: Option<Weak<RefCell<Transform2D>>>,
}

impl Default for Transform2D {
    fn default() -> Self {
        Self {
            position: Vec2::zeros(),
            rotation: 0.0,
            scale: Vec2::new(1.0, 1.0),
            origin: Vec2::zeros(),
            size: Vec2::zeros(),
            position_type: PositionType::Absolute,
            parent: None,
        }
    }
}

impl Transform2D {
    /// Identity transform at the origin with zero size
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder pattern: Set position
    pub fn with_position(mut self, position: Vec2) -> Self {
        self.position = position;
        self
    }

    /// Builder pattern: Set unscaled size
    pub fn with_size(mut self, size: Vec2) -> Self {
        self.size = size;
        self
    }

    /// Builder pattern: Set scale
    pub fn with_scale(mut self, scale: Vec2) -> Self {
        self.scale = scale;
        self
    }

    /// Builder pattern: Set origin
    pub fn with_origin(mut self, origin: Vec2) -> Self {
        self.origin = origin;
        self
    }

    /// Wrap into a shareable handle
    pub fn into_shared(self) -> Shared<Self> {
        Rc::new(RefCell::new(self))
    }

    /// Stored position (an offset when relative)
    pub fn position(&self) -> Vec2 {
        self.position
    }

    /// Overwrite the stored position as-is
    pub fn set_position(&mut self, position: Vec2) {
        self.position = position;
    }

    /// Absolute position of the parent, if there is a live one
    ///
    /// A parent that has been dropped, or is mutably borrowed at the moment,
    /// counts as absent.
    pub fn parent_position(&self) -> Option<Vec2> {
        let parent = self.parent.as_ref()?.upgrade()?;
        let parent = parent.try_borrow().ok()?;
        Some(parent.absolute_position())
    }

    /// Position in screen space
    pub fn absolute_position(&self) -> Vec2 {
        match (self.position_type, self.parent_position()) {
            (PositionType::Relative, Some(parent)) => parent + self.position,
            _ => self.position,
        }
    }

    /// Place the entity at a screen-space position
    ///
    /// In relative mode the parent offset is removed first, so reading
    /// [`absolute_position`](Self::absolute_position) back returns `position`.
    pub fn set_absolute_position(&mut self, position: Vec2) {
        self.position = match (self.position_type, self.parent_position()) {
            (PositionType::Relative, Some(parent)) => position - parent,
            _ => position,
        };
    }

    /// Move by an offset in either mode
    pub fn translate(&mut self, delta: Vec2) {
        self.position += delta;
    }

    /// Current positioning mode
    pub fn position_type(&self) -> PositionType {
        self.position_type
    }

    /// Switch positioning mode, keeping the absolute position unchanged
    pub fn set_position_type(&mut self, position_type: PositionType) {
        if self.position_type == position_type {
            return;
        }
        let absolute = self.absolute_position();
        self.position_type = position_type;
        self.set_absolute_position(absolute);
    }

    /// Whether a live parent is attached
    pub fn has_parent(&self) -> bool {
        self.parent.as_ref().is_some_and(|parent| parent.strong_count() > 0)
    }

    /// Link `child` to `parent`
    ///
    /// Refuses (and returns false) when `parent` is `child` or one of its
    /// descendants, which would make position resolution loop forever.
    pub fn attach(child: &Shared<Self>, parent: &Shared<Self>) -> bool {
        let mut cursor = Some(Rc::clone(parent));
        while let Some(current) = cursor {
            if Rc::ptr_eq(&current, child) {
                log::warn!("Refusing to parent a transform to itself or a descendant");
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

    /// Remove the parent link, converting a relative position to absolute
    pub fn detach(&mut self) {
        let absolute = self.absolute_position();
        self.parent = None;
        self.position = absolute;
    }

    /// Rotation in radians
    pub fn rotation(&self) -> f32 {
        self.rotation
    }

    /// Set rotation in radians
    pub fn set_rotation(&mut self, rotation: f32) {
        self.rotation = rotation;
    }

    /// Scale factors
    pub fn scale(&self) -> Vec2 {
        self.scale
    }

    /// Set scale factors
    pub fn set_scale(&mut self, scale: Vec2) {
        self.scale = scale;
    }

    /// Pivot offset subtracted from the position
    pub fn origin(&self) -> Vec2 {
        self.origin
    }

    /// Set pivot offset
    pub fn set_origin(&mut self, origin: Vec2) {
        self.origin = origin;
    }

    /// Unscaled width/height
    pub fn size(&self) -> Vec2 {
        self.size
    }

    /// Set unscaled width/height
    pub fn set_size(&mut self, size: Vec2) {
        self.size = size;
    }

    /// Width/height after scaling
    pub fn scaled_size(&self) -> Vec2 {
        self.size.component_mul(&self.scale)
    }

    /// Effective screen rectangle
    pub fn rectangle(&self) -> Rectangle {
        let location = self.absolute_position() - self.origin;
        Rectangle::from_location_size(location, self.scaled_size())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn shared(position: Vec2) -> Shared<Transform2D> {
        Transform2D::new().with_position(position).into_shared()
    }

    #[test]
    fn test_rectangle_applies_origin_and_scale() {
        let transform = Transform2D::new()
            .with_position(Vec2::new(100.0, 50.0))
            .with_origin(Vec2::new(10.0, 5.0))
            .with_size(Vec2::new(32.0, 16.0))
            .with_scale(Vec2::new(2.0, 0.5));

        assert_eq!(transform.rectangle(), Rectangle::new(90.0, 45.0, 64.0, 8.0));
    }

    #[test]
    fn test_relative_position_adds_parent_offset() {
        let parent = shared(Vec2::new(200.0, 100.0));
        let child = shared(Vec2::new(10.0, 20.0));
        assert!(Transform2D::attach(&child, &parent));

        // Still absolute until switched: parent has no effect
        assert_eq!(child.borrow().absolute_position(), Vec2::new(10.0, 20.0));

        child.borrow_mut().set_position_type(PositionType::Relative);
        assert_eq!(child.borrow().absolute_position(), Vec2::new(10.0, 20.0));
        assert_eq!(child.borrow().position(), Vec2::new(-190.0, -80.0));

        // Moving the parent moves a relative child along
        parent.borrow_mut().set_position(Vec2::new(300.0, 100.0));
        assert_eq!(child.borrow().absolute_position(), Vec2::new(110.0, 20.0));
        assert_eq!(child.borrow().rectangle().location(), Vec2::new(110.0, 20.0));
    }

    #[test]
    fn test_relative_roundtrip_restores_absolute_position() {
        let parent = shared(Vec2::new(13.25, -7.5));
        let child = shared(Vec2::new(41.1, 99.9));
        Transform2D::attach(&child, &parent);

        let before = child.borrow().absolute_position();
        child.borrow_mut().set_position_type(PositionType::Relative);
        child.borrow_mut().set_position_type(PositionType::Absolute);
        let after = child.borrow().absolute_position();

        assert_relative_eq!(before, after, epsilon = 1e-4);
        assert_relative_eq!(child.borrow().position(), Vec2::new(41.1, 99.9), epsilon = 1e-4);
    }

    #[test]
    fn test_set_absolute_position_is_idempotent_under_parent() {
        let parent = shared(Vec2::new(50.0, 50.0));
        let child = shared(Vec2::zeros());
        Transform2D::attach(&child, &parent);
        child.borrow_mut().set_position_type(PositionType::Relative);

        child.borrow_mut().set_absolute_position(Vec2::new(70.0, 80.0));
        let first = child.borrow().absolute_position();
        let second = child.borrow().absolute_position();
        assert_eq!(first, Vec2::new(70.0, 80.0));
        assert_eq!(first, second);
        assert_eq!(child.borrow().position(), Vec2::new(20.0, 30.0));
    }

    #[test]
    fn test_nested_parents_accumulate() {
        let root = shared(Vec2::new(100.0, 0.0));
        let middle = shared(Vec2::new(10.0, 0.0));
        let leaf = shared(Vec2::new(1.0, 0.0));
        Transform2D::attach(&middle, &root);
        Transform2D::attach(&leaf, &middle);

        // Switch without preserving, by writing the offsets after the mode change
        middle.borrow_mut().set_position_type(PositionType::Relative);
        middle.borrow_mut().set_position(Vec2::new(10.0, 0.0));
        leaf.borrow_mut().set_position_type(PositionType::Relative);
        leaf.borrow_mut().set_position(Vec2::new(1.0, 0.0));

        assert_eq!(leaf.borrow().absolute_position(), Vec2::new(111.0, 0.0));
    }

    #[test]
    fn test_dropped_parent_falls_back_to_stored_position() {
        let child = shared(Vec2::new(5.0, 5.0));
        {
            let parent = shared(Vec2::new(100.0, 100.0));
            Transform2D::attach(&child, &parent);
            child.borrow_mut().set_position_type(PositionType::Relative);
            assert_eq!(child.borrow().absolute_position(), Vec2::new(5.0, 5.0));
        }
        assert!(!child.borrow().has_parent());
        // Offset is now read as-is
        assert_eq!(child.borrow().absolute_position(), Vec2::new(-95.0, -95.0));
    }

    #[test]
    fn test_attach_refuses_cycles() {
        let a = shared(Vec2::zeros());
        let b = shared(Vec2::zeros());
        assert!(Transform2D::attach(&b, &a));
        assert!(!Transform2D::attach(&a, &b));
        assert!(!Transform2D::attach(&a, &a));
    }

    #[test]
    fn test_zero_size_is_not_an_error() {
        let transform = Transform2D::new().with_position(Vec2::new(3.0, 4.0));
        let rect = transform.rectangle();
        assert!(rect.is_empty());
        assert_eq!(rect.location(), Vec2::new(3.0, 4.0));
    }
}
