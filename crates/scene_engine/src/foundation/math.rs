//! Math utilities and types
//!
//! Provides the vector/matrix aliases used by 2D and 3D entities and the
//! screen-space `Rectangle` that 2D collision and partitioning operate on.

use serde::{Deserialize, Serialize};

pub use nalgebra::{Matrix4, Unit, Vector2, Vector3, Vector4};

/// 2D vector type
pub type Vec2 = Vector2<f32>;

/// 3D vector type
pub type Vec3 = Vector3<f32>;

/// 4D vector type
pub type Vec4 = Vector4<f32>;

/// 4x4 matrix type
pub type Mat4 = Matrix4<f32>;

/// Axis-aligned screen rectangle (y grows downward)
///
/// Intersection follows the half-open convention: two rectangles that only
/// share an edge do not intersect.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rectangle {
    /// Left edge
    pub x: f32,
    /// Top edge
    pub y: f32,
    /// Width (never negative for well-formed rectangles)
    pub width: f32,
    /// Height (never negative for well-formed rectangles)
    pub height: f32,
}

impl Rectangle {
    /// An empty rectangle at the origin
    pub const EMPTY: Self = Self::new(0.0, 0.0, 0.0, 0.0);

    /// Create a rectangle from its top-left corner and size
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self { x, y, width, height }
    }

    /// Create a rectangle from a location and a size vector
    pub fn from_location_size(location: Vec2, size: Vec2) -> Self {
        Self::new(location.x, location.y, size.x, size.y)
    }

    /// Left edge
    pub fn left(&self) -> f32 {
        self.x
    }

    /// Right edge (exclusive)
    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    /// Top edge
    pub fn top(&self) -> f32 {
        self.y
    }

    /// Bottom edge (exclusive)
    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    /// Top-left corner
    pub fn location(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }

    /// Width and height as a vector
    pub fn size(&self) -> Vec2 {
        Vec2::new(self.width, self.height)
    }

    /// Center point
    pub fn center(&self) -> Vec2 {
        Vec2::new(self.x + self.width * 0.5, self.y + self.height * 0.5)
    }

    /// Whether the rectangle covers no area
    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }

    /// Check if a point lies inside (left/top inclusive, right/bottom exclusive)
    pub fn contains_point(&self, point: Vec2) -> bool {
        point.x >= self.left() && point.x < self.right()
            && point.y >= self.top() && point.y < self.bottom()
    }

    /// Check if another rectangle lies entirely inside this one
    pub fn contains(&self, other: &Self) -> bool {
        other.left() >= self.left() && other.right() <= self.right()
            && other.top() >= self.top() && other.bottom() <= self.bottom()
    }

    /// Check if this rectangle overlaps another; shared edges do not count
    pub fn intersects(&self, other: &Self) -> bool {
        other.left() < self.right() && self.left() < other.right()
            && other.top() < self.bottom() && self.top() < other.bottom()
    }

    /// Overlapping region of two rectangles, `None` when they do not intersect
    pub fn intersection(&self, other: &Self) -> Option<Self> {
        if !self.intersects(other) {
            return None;
        }
        let left = self.left().max(other.left());
        let top = self.top().max(other.top());
        let right = self.right().min(other.right());
        let bottom = self.bottom().min(other.bottom());
        Some(Self::new(left, top, right - left, bottom - top))
    }

    /// Smallest rectangle covering both
    pub fn union(&self, other: &Self) -> Self {
        let left = self.left().min(other.left());
        let top = self.top().min(other.top());
        let right = self.right().max(other.right());
        let bottom = self.bottom().max(other.bottom());
        Self::new(left, top, right - left, bottom - top)
    }

    /// Move the rectangle by an offset
    pub fn offset(&self, delta: Vec2) -> Self {
        Self::new(self.x + delta.x, self.y + delta.y, self.width, self.height)
    }
}

/// Math constants
pub mod constants {
    /// Pi constant
    pub const PI: f32 = std::f32::consts::PI;

    /// 2 * Pi
    pub const TAU: f32 = 2.0 * PI;

    /// Pi / 2
    pub const HALF_PI: f32 = PI * 0.5;

    /// Degrees to radians conversion factor
    pub const DEG_TO_RAD: f32 = PI / 180.0;

    /// Radians to degrees conversion factor
    pub const RAD_TO_DEG: f32 = 180.0 / PI;
}

/// Math utility functions
pub mod utils {
    use super::{constants, Mat4, Vec3};

    /// Convert degrees to radians
    pub fn deg_to_rad(degrees: f32) -> f32 {
        degrees * constants::DEG_TO_RAD
    }

    /// Convert radians to degrees
    pub fn rad_to_deg(radians: f32) -> f32 {
        radians * constants::RAD_TO_DEG
    }

    /// Linear interpolation
    pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
        a + (b - a) * t
    }

    /// Rotation matrix from yaw (Y axis), pitch (X axis) and roll (Z axis)
    ///
    /// Roll is applied first, then pitch, then yaw.
    pub fn yaw_pitch_roll(yaw: f32, pitch: f32, roll: f32) -> Mat4 {
        Mat4::from_axis_angle(&Vec3::y_axis(), yaw)
            * Mat4::from_axis_angle(&Vec3::x_axis(), pitch)
            * Mat4::from_axis_angle(&Vec3::z_axis(), roll)
    }

    /// Scale, then rotate (yaw/pitch/roll packed as `rotation.y/x/z`), then translate
    pub fn scale_rotate_translate(scale: Vec3, rotation: Vec3, position: Vec3) -> Mat4 {
        Mat4::new_translation(&position)
            * yaw_pitch_roll(rotation.y, rotation.x, rotation.z)
            * Mat4::new_nonuniform_scaling(&scale)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_rectangle_shared_edge_does_not_intersect() {
        let a = Rectangle::new(0.0, 0.0, 10.0, 10.0);
        let b = Rectangle::new(10.0, 0.0, 10.0, 10.0);
        assert!(!a.intersects(&b));
        assert!(!b.intersects(&a));

        let c = Rectangle::new(9.0, 9.0, 10.0, 10.0);
        assert!(a.intersects(&c));
        assert_eq!(a.intersection(&c), Some(Rectangle::new(9.0, 9.0, 1.0, 1.0)));
    }

    #[test]
    fn test_rectangle_contains() {
        let outer = Rectangle::new(0.0, 0.0, 100.0, 100.0);
        assert!(outer.contains(&Rectangle::new(10.0, 10.0, 20.0, 20.0)));
        assert!(!outer.contains(&Rectangle::new(90.0, 90.0, 20.0, 20.0)));
        assert!(outer.contains_point(Vec2::new(0.0, 0.0)));
        assert!(!outer.contains_point(Vec2::new(100.0, 50.0)));
    }

    #[test]
    fn test_rectangle_union() {
        let a = Rectangle::new(0.0, 0.0, 10.0, 10.0);
        let b = Rectangle::new(20.0, 5.0, 10.0, 10.0);
        assert_eq!(a.union(&b), Rectangle::new(0.0, 0.0, 30.0, 15.0));
    }

    #[test]
    fn test_scale_rotate_translate_order() {
        // Scale must happen before the translation, otherwise the offset gets scaled too
        let matrix = utils::scale_rotate_translate(
            Vec3::new(2.0, 2.0, 2.0),
            Vec3::zeros(),
            Vec3::new(10.0, 0.0, 0.0),
        );
        let point = matrix.transform_point(&nalgebra::Point3::new(1.0, 0.0, 0.0));
        assert_relative_eq!(point.x, 12.0, epsilon = 1e-5);
    }

    #[test]
    fn test_yaw_rotates_around_y() {
        let matrix = utils::yaw_pitch_roll(constants::HALF_PI, 0.0, 0.0);
        let rotated = matrix.transform_vector(&Vec3::new(1.0, 0.0, 0.0));
        assert_relative_eq!(rotated, Vec3::new(0.0, 0.0, -1.0), epsilon = 1e-5);
    }
}
