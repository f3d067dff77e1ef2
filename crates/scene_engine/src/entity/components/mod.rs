//! Transform components
//!
//! Transforms live behind their own `Rc<RefCell<_>>` so a child can read its
//! parent's position while the parent entity itself is mid-update.

mod transform;
mod transform3d;

pub use transform::{PositionType, Transform2D};
pub use transform3d::Transform3D;
