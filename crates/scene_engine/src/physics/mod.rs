//! Collision detection for 2D and 3D entities
//!
//! [`collision`] holds the primitive shape tests; [`collider`] builds the
//! entity, group and ray-picking algorithms on top of them. Broad-phase
//! narrowing lives in [`crate::spatial`].

pub mod collider;
pub mod collision;

pub use collider::{CollideInformation, CollisionTest};
pub use collision::{BoundingBox, BoundingSphere, Circle, PixelSurface, Ray};
