//! Collision primitives
//!
//! # Module Organization
//!
//! - [`primitives`] - Rays, boxes, spheres and circles with their intersection tests
//! - [`pixel`] - Perfect-pixel overlap on texel alpha
//!
//! 2D rectangle overlap lives on [`Rectangle`](crate::foundation::math::Rectangle)
//! itself; shared edges do not count as overlap.

pub mod primitives;
pub mod pixel;

pub use primitives::{BoundingBox, BoundingSphere, Circle, Ray};
pub use pixel::{perfect_pixel_overlap, PixelSurface};
