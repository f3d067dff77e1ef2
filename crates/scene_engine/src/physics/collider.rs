//! Entity and group collision algorithms
//!
//! 2D checks use rectangles, optionally refined by a perfect-pixel test. 3D
//! checks use bounding boxes or spheres. Group checks scan linearly and stop
//! at the first colliding pair; ray picking collects every hit instead.
//!
//! Entities that are not collidable, have been destroyed, or are currently
//! mutably borrowed (typically the caller itself, mid-update) are skipped, as
//! are pairs made of the same entity twice.

use crate::entity::{Entity, Entity2D, Entity3D, SafeCollection, Shared};
use crate::error::SceneError;
use crate::foundation::math::{Mat4, Vec2};
use crate::physics::collision::{perfect_pixel_overlap, Ray};
use std::cmp::Ordering;

/// Narrow-phase test used for 2D entity pairs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CollisionTest {
    /// Rectangle overlap only
    #[default]
    Rectangle,
    /// Rectangle overlap refined by texel alpha; both entities need pixel data
    PerfectPixel,
}

fn is_candidate<E: Entity + ?Sized>(entity: &E) -> bool {
    entity.core().collidable && !entity.core().is_dirty()
}

/// Rectangle overlap between two 2D entities
pub fn collide(a: &dyn Entity2D, b: &dyn Entity2D) -> bool {
    a.rectangle().intersects(&b.rectangle())
}

/// Rectangle overlap refined by a perfect-pixel test
///
/// Fails with [`SceneError::PixelsNotReady`] when the rectangles overlap but
/// either entity has no pixel data loaded.
pub fn collide_perfect_pixel(a: &dyn Entity2D, b: &dyn Entity2D) -> Result<bool, SceneError> {
    if !collide(a, b) {
        return Ok(false);
    }
    let surface_a = a.pixel_surface().ok_or(SceneError::PixelsNotReady { entity: a.id() })?;
    let surface_b = b.pixel_surface().ok_or(SceneError::PixelsNotReady { entity: b.id() })?;
    Ok(perfect_pixel_overlap(&surface_a, &surface_b))
}

/// Run the selected narrow-phase test
pub fn collide_with(test: CollisionTest, a: &dyn Entity2D, b: &dyn Entity2D) -> Result<bool, SceneError> {
    match test {
        CollisionTest::Rectangle => Ok(collide(a, b)),
        CollisionTest::PerfectPixel => collide_perfect_pixel(a, b),
    }
}

/// First member of `group` colliding with `entity`
pub fn first_collision_with_group(
    test: CollisionTest,
    entity: &dyn Entity2D,
    group: &SafeCollection<dyn Entity2D>,
) -> Result<Option<Shared<dyn Entity2D>>, SceneError> {
    if !is_candidate(entity) {
        return Ok(None);
    }
    for member in group.members() {
        let Ok(other) = member.try_borrow() else {
            continue;
        };
        if other.id() == entity.id() || !is_candidate(&*other) {
            continue;
        }
        if collide_with(test, entity, &*other)? {
            drop(other);
            return Ok(Some(member));
        }
    }
    Ok(None)
}

/// Whether `entity` collides with any member of `group`
pub fn collide_with_group(entity: &dyn Entity2D, group: &SafeCollection<dyn Entity2D>) -> bool {
    matches!(first_collision_with_group(CollisionTest::Rectangle, entity, group), Ok(Some(_)))
}

/// First colliding pair `(a, b)` with `a` from `group_a` and `b` from `group_b`
///
/// Every member of `group_a` is checked against every member of `group_b`.
pub fn first_collision_between_groups(
    test: CollisionTest,
    group_a: &SafeCollection<dyn Entity2D>,
    group_b: &SafeCollection<dyn Entity2D>,
) -> Result<Option<(Shared<dyn Entity2D>, Shared<dyn Entity2D>)>, SceneError> {
    for member in group_a.members() {
        let hit = {
            let Ok(entity) = member.try_borrow() else {
                continue;
            };
            first_collision_with_group(test, &*entity, group_b)?
        };
        if let Some(other) = hit {
            return Ok(Some((member, other)));
        }
    }
    Ok(None)
}

/// Whether any member of `group_a` collides with any member of `group_b`
pub fn collide_group_with_group(group_a: &SafeCollection<dyn Entity2D>, group_b: &SafeCollection<dyn Entity2D>) -> bool {
    matches!(
        first_collision_between_groups(CollisionTest::Rectangle, group_a, group_b),
        Ok(Some(_))
    )
}

/// Bounding box overlap between two 3D entities
pub fn collide_boxes(a: &dyn Entity3D, b: &dyn Entity3D) -> bool {
    a.bounding_box().intersects(&b.bounding_box())
}

/// Bounding sphere overlap between two 3D entities
pub fn collide_spheres(a: &dyn Entity3D, b: &dyn Entity3D) -> bool {
    a.bounding_sphere().intersects(&b.bounding_sphere())
}

/// First member of `group` whose bounding box overlaps `entity`'s
pub fn first_collision_with_group_3d(
    entity: &dyn Entity3D,
    group: &SafeCollection<dyn Entity3D>,
) -> Option<Shared<dyn Entity3D>> {
    if !is_candidate(entity) {
        return None;
    }
    group.members().into_iter().find(|member| {
        member.try_borrow().is_ok_and(|other| {
            other.id() != entity.id() && is_candidate(&*other) && collide_boxes(entity, &*other)
        })
    })
}

/// Whether `entity` overlaps any member of `group`
pub fn collide_with_group_3d(entity: &dyn Entity3D, group: &SafeCollection<dyn Entity3D>) -> bool {
    first_collision_with_group_3d(entity, group).is_some()
}

/// Whether any member of `group_a` overlaps any member of `group_b`
pub fn collide_group_with_group_3d(group_a: &SafeCollection<dyn Entity3D>, group_b: &SafeCollection<dyn Entity3D>) -> bool {
    group_a.members().iter().any(|member| {
        member
            .try_borrow()
            .is_ok_and(|entity| collide_with_group_3d(&*entity, group_b))
    })
}

/// A ray-picking hit
#[derive(Clone)]
pub struct CollideInformation {
    /// Entity that was hit
    pub entity: Shared<dyn Entity3D>,
    /// Distance along the ray to the bounding box
    pub distance: f32,
}

impl std::fmt::Debug for CollideInformation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let id = self.entity.try_borrow().map(|entity| entity.id()).ok();
        f.debug_struct("CollideInformation")
            .field("entity", &id)
            .field("distance", &self.distance)
            .finish()
    }
}

/// Every collidable member of `group` hit by `ray`, nearest first
///
/// Dynamic members refresh their bounding volumes before the test.
pub fn ray_cast(ray: &Ray, group: &SafeCollection<dyn Entity3D>) -> Vec<CollideInformation> {
    let mut hits: Vec<CollideInformation> = group
        .members()
        .into_iter()
        .filter_map(|member| {
            let distance = {
                let mut entity = member.try_borrow_mut().ok()?;
                if !is_candidate(&*entity) {
                    return None;
                }
                entity.refresh_bounds();
                entity.bounding_box().intersect_ray(ray)?
            };
            distance.is_finite().then_some(CollideInformation { entity: member, distance })
        })
        .collect();

    hits.sort_by(|a, b| a.distance.partial_cmp(&b.distance).unwrap_or(Ordering::Equal));
    log::trace!("Ray cast hit {} of {} entities", hits.len(), group.len());
    hits
}

/// Ray-pick `group` through a screen point
///
/// Returns no hits when the view-projection matrix cannot be inverted.
pub fn pick(
    point: Vec2,
    viewport: Vec2,
    view_projection: &Mat4,
    group: &SafeCollection<dyn Entity3D>,
) -> Vec<CollideInformation> {
    Ray::from_screen(point, viewport, view_projection)
        .map(|ray| ray_cast(&ray, group))
        .unwrap_or_default()
}
