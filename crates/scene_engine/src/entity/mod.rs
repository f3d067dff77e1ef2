//! Game objects
//!
//! Entities are shared as [`Shared`] handles so that groups, quadtrees and
//! collision queries can refer to the same object. Transforms live in their
//! own cell, which lets a child read its parent's position while the parent
//! itself is being updated.

pub mod collection;
pub mod components;
pub mod core;
pub mod group;
pub mod group3d;
pub mod model;
pub mod sprite;
pub mod text;

pub use self::collection::{CollectionHandle, SafeCollection};
pub use self::components::{PositionType, Transform2D, Transform3D};
pub use self::core::{lifecycle, Entity, Entity2D, Entity3D, EntityCore, EntityId};
pub use self::group::Group2D;
pub use self::group3d::Group3D;
pub use self::model::Model;
pub use self::sprite::Sprite;
pub use self::text::Text;

use std::cell::RefCell;
use std::rc::Rc;

/// Reference-counted, interior-mutable handle to an entity or component
pub type Shared<T> = Rc<RefCell<T>>;

/// Wrap a value into a [`Shared`] handle
pub fn shared<T>(value: T) -> Shared<T> {
    Rc::new(RefCell::new(value))
}
