//! Primitive collision shapes and intersection algorithms
//!
//! Provides basic geometric primitives (rays, boxes, spheres, circles) with
//! intersection testing.

use crate::foundation::math::{Mat4, Vec2, Vec3, Vec4};

/// A ray for ray casting and picking
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    /// The origin point of the ray in world space
    pub origin: Vec3,
    /// The direction of the ray (normalized)
    pub direction: Vec3,
}

impl Ray {
    /// Creates a new ray with the given origin and direction
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self {
            origin,
            direction: direction.normalize(),
        }
    }

    /// Get a point along the ray at distance t
    pub fn point_at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }

    /// Build a picking ray through a screen point
    ///
    /// `viewport` is the screen size in pixels (y grows downward) and
    /// `view_projection` maps world space to clip space with depth in -1..1.
    /// Returns `None` when the matrix cannot be inverted.
    pub fn from_screen(point: Vec2, viewport: Vec2, view_projection: &Mat4) -> Option<Self> {
        if viewport.x <= 0.0 || viewport.y <= 0.0 {
            return None;
        }
        let inverse = view_projection.try_inverse()?;

        let ndc_x = point.x / viewport.x * 2.0 - 1.0;
        let ndc_y = 1.0 - point.y / viewport.y * 2.0;

        let unproject = |depth: f32| -> Option<Vec3> {
            let world = inverse * Vec4::new(ndc_x, ndc_y, depth, 1.0);
            if world.w.abs() <= f32::EPSILON {
                return None;
            }
            Some(Vec3::new(world.x / world.w, world.y / world.w, world.z / world.w))
        };

        let near = unproject(-1.0)?;
        let far = unproject(1.0)?;
        let direction = far - near;
        if direction.magnitude_squared() <= f32::EPSILON {
            return None;
        }
        Some(Self::new(near, direction))
    }
}

/// Axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    /// Minimum corner of the bounding box
    pub min: Vec3,
    /// Maximum corner of the bounding box
    pub max: Vec3,
}

impl BoundingBox {
    /// Create a new box from min and max points
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// Create a box centered at a point with given half-extents
    pub fn from_center_extents(center: Vec3, extents: Vec3) -> Self {
        Self {
            min: center - extents,
            max: center + extents,
        }
    }

    /// Get the center of the box
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    /// Get the extents (half-size) of the box
    pub fn extents(&self) -> Vec3 {
        (self.max - self.min) * 0.5
    }

    /// Full width/height/depth
    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }

    /// Check if this box contains a point (inclusive)
    pub fn contains_point(&self, point: Vec3) -> bool {
        point.x >= self.min.x && point.x <= self.max.x
            && point.y >= self.min.y && point.y <= self.max.y
            && point.z >= self.min.z && point.z <= self.max.z
    }

    /// Check if this box intersects another box (inclusive)
    pub fn intersects(&self, other: &Self) -> bool {
        self.min.x <= other.max.x && self.max.x >= other.min.x
            && self.min.y <= other.max.y && self.max.y >= other.min.y
            && self.min.z <= other.max.z && self.max.z >= other.min.z
    }

    /// Smallest box enclosing both, per axis
    pub fn union(&self, other: &Self) -> Self {
        Self {
            min: self.min.inf(&other.min),
            max: self.max.sup(&other.max),
        }
    }

    /// Test ray intersection with this box using the slab method
    ///
    /// Returns the distance to the entry point if the ray intersects (0 when
    /// the origin is inside), None otherwise.
    pub fn intersect_ray(&self, ray: &Ray) -> Option<f32> {
        let inv_dir = Vec3::new(
            if ray.direction.x != 0.0 { 1.0 / ray.direction.x } else { f32::INFINITY },
            if ray.direction.y != 0.0 { 1.0 / ray.direction.y } else { f32::INFINITY },
            if ray.direction.z != 0.0 { 1.0 / ray.direction.z } else { f32::INFINITY },
        );

        let slab = |min: f32, max: f32, origin: f32, inv: f32| -> (f32, f32) {
            let t1 = (min - origin) * inv;
            let t2 = (max - origin) * inv;
            // 0 * inf: the ray is parallel to the slab and starts on its plane
            let t1 = if t1.is_nan() { f32::NEG_INFINITY } else { t1 };
            let t2 = if t2.is_nan() { f32::INFINITY } else { t2 };
            (t1.min(t2), t1.max(t2))
        };

        let (x_near, x_far) = slab(self.min.x, self.max.x, ray.origin.x, inv_dir.x);
        let (y_near, y_far) = slab(self.min.y, self.max.y, ray.origin.y, inv_dir.y);
        let (z_near, z_far) = slab(self.min.z, self.max.z, ray.origin.z, inv_dir.z);

        let tmin = x_near.max(y_near).max(z_near);
        let tmax = x_far.min(y_far).min(z_far);

        if tmax >= tmin && tmax >= 0.0 {
            Some(tmin.max(0.0))
        } else {
            None
        }
    }
}

/// A bounding sphere for collision detection
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingSphere {
    /// The center position of the sphere in world space
    pub center: Vec3,
    /// The radius of the sphere
    pub radius: f32,
}

impl BoundingSphere {
    /// Creates a new bounding sphere with the given center and radius
    pub fn new(center: Vec3, radius: f32) -> Self {
        Self { center, radius }
    }

    /// Sphere around a box (center of the box, radius to its corner)
    pub fn from_box(bounds: &BoundingBox) -> Self {
        Self::new(bounds.center(), bounds.extents().magnitude())
    }

    /// Check if a point lies in the sphere (inclusive)
    pub fn contains_point(&self, point: Vec3) -> bool {
        (point - self.center).magnitude_squared() <= self.radius * self.radius
    }

    /// Check if this sphere intersects with another (inclusive)
    pub fn intersects(&self, other: &Self) -> bool {
        let distance_squared = (self.center - other.center).magnitude_squared();
        let radius_sum = self.radius + other.radius;
        distance_squared <= radius_sum * radius_sum
    }

    /// Test ray intersection with this sphere
    ///
    /// Returns the distance to the nearest hit in front of the origin.
    pub fn intersect_ray(&self, ray: &Ray) -> Option<f32> {
        let oc = ray.origin - self.center;

        // Solve: |origin + t*direction - center|^2 = radius^2
        let a = ray.direction.dot(&ray.direction);
        let b = 2.0 * oc.dot(&ray.direction);
        let c = oc.dot(&oc) - self.radius * self.radius;

        let discriminant = b * b - 4.0 * a * c;
        if discriminant < 0.0 {
            return None;
        }

        let sqrt_discriminant = discriminant.sqrt();
        let t1 = (-b - sqrt_discriminant) / (2.0 * a);
        let t2 = (-b + sqrt_discriminant) / (2.0 * a);

        if t1 >= 0.0 {
            Some(t1)
        } else if t2 >= 0.0 {
            // Origin inside the sphere
            Some(0.0)
        } else {
            None
        }
    }
}

/// A circle in screen space
///
/// Note the polarity of [`Circle::collide`] and [`Circle::collide_circle`]:
/// they answer "is it OUTSIDE", matching long-standing call sites. Use
/// [`Circle::contains`] and [`Circle::intersects`] for the conventional tests.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Circle {
    /// Center x
    pub x: f32,
    /// Center y
    pub y: f32,
    /// Radius
    pub radius: f32,
}

impl Circle {
    /// Create a circle
    pub const fn new(x: f32, y: f32, radius: f32) -> Self {
        Self { x, y, radius }
    }

    /// Center point
    pub fn center(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }

    fn distance_squared(&self, x: f32, y: f32) -> f32 {
        let dx = x - self.x;
        let dy = y - self.y;
        dx * dx + dy * dy
    }

    /// True when the point `(x, y)` lies OUTSIDE the circle
    pub fn collide(x: f32, y: f32, circle: &Self) -> bool {
        circle.distance_squared(x, y) > circle.radius * circle.radius
    }

    /// True when the circles are apart (center distance beyond the radius sum)
    pub fn collide_circle(a: &Self, b: &Self) -> bool {
        let radius_sum = a.radius + b.radius;
        a.distance_squared(b.x, b.y) > radius_sum * radius_sum
    }

    /// True when the point lies inside or on the circle
    pub fn contains(&self, point: Vec2) -> bool {
        !Self::collide(point.x, point.y, self)
    }

    /// True when the circles overlap or touch
    pub fn intersects(&self, other: &Self) -> bool {
        !Self::collide_circle(self, other)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_circle_collide_reports_outside() {
        let circle = Circle::new(10.0, 10.0, 5.0);
        // Named "collide" but true means outside: the exact center is inside
        assert!(!Circle::collide(10.0, 10.0, &circle));
        assert!(Circle::collide(100.0, 100.0, &circle));
        // On the edge counts as inside
        assert!(!Circle::collide(15.0, 10.0, &circle));

        assert!(circle.contains(Vec2::new(10.0, 10.0)));
        assert!(!circle.contains(Vec2::new(100.0, 100.0)));
    }

    #[test]
    fn test_circle_circle_polarity() {
        let a = Circle::new(0.0, 0.0, 5.0);
        let near = Circle::new(8.0, 0.0, 5.0);
        let far = Circle::new(20.0, 0.0, 5.0);

        assert!(!Circle::collide_circle(&a, &near));
        assert!(Circle::collide_circle(&a, &far));
        assert!(a.intersects(&near));
        assert!(!a.intersects(&far));
    }

    #[test]
    fn test_box_contains_and_intersects_inclusive() {
        let a = BoundingBox::new(Vec3::zeros(), Vec3::new(2.0, 2.0, 2.0));
        let touching = BoundingBox::new(Vec3::new(2.0, 0.0, 0.0), Vec3::new(4.0, 2.0, 2.0));
        let apart = BoundingBox::new(Vec3::new(5.0, 5.0, 5.0), Vec3::new(7.0, 7.0, 7.0));

        assert!(a.contains_point(Vec3::new(2.0, 2.0, 2.0)));
        assert!(!a.contains_point(Vec3::new(2.1, 0.0, 0.0)));
        assert!(a.intersects(&touching));
        assert!(!a.intersects(&apart));
    }

    #[test]
    fn test_box_union_uses_every_axis() {
        let a = BoundingBox::new(Vec3::new(0.0, 5.0, -3.0), Vec3::new(1.0, 6.0, 0.0));
        let b = BoundingBox::new(Vec3::new(-2.0, 1.0, -1.0), Vec3::new(0.5, 9.0, 4.0));
        let union = a.union(&b);
        assert_relative_eq!(union.min, Vec3::new(-2.0, 1.0, -3.0));
        assert_relative_eq!(union.max, Vec3::new(1.0, 9.0, 4.0));
    }

    #[test]
    fn test_ray_box_intersection() {
        let bounds = BoundingBox::new(Vec3::new(-1.0, -1.0, -1.0), Vec3::new(1.0, 1.0, 1.0));

        let hit = Ray::new(Vec3::new(0.0, 0.0, -5.0), Vec3::new(0.0, 0.0, 1.0));
        assert_relative_eq!(bounds.intersect_ray(&hit).unwrap(), 4.0, epsilon = 1e-5);

        let miss = Ray::new(Vec3::new(5.0, 0.0, -5.0), Vec3::new(0.0, 0.0, 1.0));
        assert!(bounds.intersect_ray(&miss).is_none());

        let behind = Ray::new(Vec3::new(0.0, 0.0, 5.0), Vec3::new(0.0, 0.0, 1.0));
        assert!(bounds.intersect_ray(&behind).is_none());

        let inside = Ray::new(Vec3::zeros(), Vec3::new(1.0, 0.0, 0.0));
        assert_relative_eq!(bounds.intersect_ray(&inside).unwrap(), 0.0);
    }

    #[test]
    fn test_ray_sphere_intersection() {
        let sphere = BoundingSphere::new(Vec3::new(0.0, 0.0, 10.0), 2.0);
        let ray = Ray::new(Vec3::zeros(), Vec3::new(0.0, 0.0, 1.0));
        assert_relative_eq!(sphere.intersect_ray(&ray).unwrap(), 8.0, epsilon = 1e-5);

        let away = Ray::new(Vec3::zeros(), Vec3::new(0.0, 0.0, -1.0));
        assert!(sphere.intersect_ray(&away).is_none());
    }

    #[test]
    fn test_sphere_tests() {
        let a = BoundingSphere::new(Vec3::zeros(), 1.0);
        let b = BoundingSphere::new(Vec3::new(2.0, 0.0, 0.0), 1.0);
        let c = BoundingSphere::new(Vec3::new(3.0, 0.0, 0.0), 1.0);
        assert!(a.intersects(&b));
        assert!(!a.intersects(&c));
        assert!(a.contains_point(Vec3::new(1.0, 0.0, 0.0)));
    }

    #[test]
    fn test_ray_from_screen_center_looks_forward() {
        // Identity view-projection: clip space is world space
        let ray = Ray::from_screen(Vec2::new(400.0, 300.0), Vec2::new(800.0, 600.0), &Mat4::identity())
            .unwrap();
        assert_relative_eq!(ray.origin, Vec3::new(0.0, 0.0, -1.0), epsilon = 1e-5);
        assert_relative_eq!(ray.direction, Vec3::new(0.0, 0.0, 1.0), epsilon = 1e-5);

        // Top-left corner maps to (-1, 1)
        let corner = Ray::from_screen(Vec2::zeros(), Vec2::new(800.0, 600.0), &Mat4::identity()).unwrap();
        assert_relative_eq!(corner.origin, Vec3::new(-1.0, 1.0, -1.0), epsilon = 1e-5);

        assert!(Ray::from_screen(Vec2::zeros(), Vec2::zeros(), &Mat4::identity()).is_none());
        assert!(Ray::from_screen(Vec2::zeros(), Vec2::new(1.0, 1.0), &Mat4::zeros()).is_none());
    }
}
