//! Scene: the host-facing entry point
//!
//! A [`Scene`] owns a root [`Group2D`] and a root [`Group3D`], the host's
//! content loader and a [`QuadTree`] over the collidable 2D entities. The
//! host calls [`Scene::update`] and [`Scene::draw`] once per frame.
//!
//! With [`QuadTreePolicy::RebuildPerFrame`] the tree is rebuilt from the 2D
//! entities after every update pass; with [`QuadTreePolicy::Persistent`] the
//! caller maintains it through [`Scene::quadtree_mut`].

use crate::assets::ContentLoader;
use crate::config::{QuadTreePolicy, SceneConfig};
use crate::entity::{lifecycle, Entity, Entity2D, Entity3D, EntityId, Group2D, Group3D, SafeCollection, Shared};
use crate::error::SceneError;
use crate::foundation::math::{Mat4, Vec2};
use crate::foundation::time::GameTime;
use crate::input::{self, PointerState};
use crate::physics::collider::{self, CollideInformation, CollisionTest};
use crate::render::Renderer;
use crate::spatial::QuadTree;
use std::fmt;
use std::rc::Rc;

/// Top-level container driven by the host frame loop
pub struct Scene {
    config: SceneConfig,
    content: Box<dyn ContentLoader>,
    root_2d: Group2D,
    root_3d: Group3D,
    quadtree: QuadTree<Shared<dyn Entity2D>>,
}

impl Scene {
    /// Create an empty scene
    pub fn new(config: SceneConfig, content: Box<dyn ContentLoader>) -> Result<Self, SceneError> {
        config.validate()?;
        log::debug!(
            "Creating scene (quadtree {:?}, {} objects/node, {} levels, {:?})",
            config.quadtree.bounds,
            config.quadtree.max_objects_per_node,
            config.quadtree.max_levels,
            config.quadtree.policy
        );
        Ok(Self {
            root_2d: Group2D::with_config("root_2d", &config.collection),
            root_3d: Group3D::with_config("root_3d", &config.collection),
            quadtree: QuadTree::new(&config.quadtree),
            content,
            config,
        })
    }

    /// Active configuration
    pub fn config(&self) -> &SceneConfig {
        &self.config
    }

    /// Host content loader
    pub fn content(&self) -> &dyn ContentLoader {
        &*self.content
    }

    /// Host content loader, mutably
    pub fn content_mut(&mut self) -> &mut dyn ContentLoader {
        &mut *self.content
    }

    /// Root of the 2D entity tree
    pub fn root_2d(&self) -> &Group2D {
        &self.root_2d
    }

    /// Root of the 2D entity tree, mutably
    pub fn root_2d_mut(&mut self) -> &mut Group2D {
        &mut self.root_2d
    }

    /// Root of the 3D entity tree
    pub fn root_3d(&self) -> &Group3D {
        &self.root_3d
    }

    /// Root of the 3D entity tree, mutably
    pub fn root_3d_mut(&mut self) -> &mut Group3D {
        &mut self.root_3d
    }

    /// Add a top-level 2D entity, bringing it up to the scene's lifecycle stage
    pub fn add_2d(&mut self, entity: Shared<dyn Entity2D>) -> Result<bool, SceneError> {
        self.root_2d.add(entity, &mut *self.content)
    }

    /// Remove a top-level 2D entity
    pub fn remove_2d(&mut self, id: EntityId) -> Result<bool, SceneError> {
        let removed = self.root_2d.remove(id)?;
        if removed {
            self.quadtree
                .remove_by(|entry| entry.try_borrow().is_ok_and(|entity| entity.id() == id));
        }
        Ok(removed)
    }

    /// Add a top-level 3D entity, bringing it up to the scene's lifecycle stage
    pub fn add_3d(&mut self, entity: Shared<dyn Entity3D>) -> Result<bool, SceneError> {
        self.root_3d.add(entity, &mut *self.content)
    }

    /// Remove a top-level 3D entity
    pub fn remove_3d(&mut self, id: EntityId) -> Result<bool, SceneError> {
        self.root_3d.remove(id)
    }

    /// Initialize every entity
    pub fn initialize(&mut self) {
        lifecycle::initialize(&mut self.root_2d);
        lifecycle::initialize(&mut self.root_3d);
    }

    /// Load assets for every entity
    pub fn load_content(&mut self) -> Result<(), SceneError> {
        lifecycle::load_content(&mut self.root_2d, &mut *self.content)?;
        lifecycle::load_content(&mut self.root_3d, &mut *self.content)?;
        log::info!(
            "Scene content loaded ({} 2D, {} 3D top-level entities)",
            self.root_2d.len(),
            self.root_3d.len()
        );
        Ok(())
    }

    /// Release assets of every entity
    pub fn unload_content(&mut self) {
        lifecycle::unload_content(&mut self.root_2d);
        lifecycle::unload_content(&mut self.root_3d);
    }

    /// Resolve pointer interaction for the 2D entities
    ///
    /// Call before [`Scene::update`] so entities see this frame's results.
    pub fn apply_pointer(&mut self, pointer: &PointerState) {
        input::apply_pointer(pointer, self.root_2d.members());
    }

    /// Run one update pass
    ///
    /// Entities queued through collection handles during the previous pass
    /// are admitted first, with their content loaded.
    pub fn update(&mut self, time: &GameTime) {
        self.root_2d.apply_pending(&mut *self.content);
        self.root_3d.apply_pending(&mut *self.content);
        if self.root_2d.core().is_active() {
            self.root_2d.update(time);
        }
        if self.root_3d.core().is_active() {
            self.root_3d.update(time);
        }
        if self.config.quadtree.policy == QuadTreePolicy::RebuildPerFrame {
            self.rebuild_quadtree();
        }
    }

    /// Run one draw pass
    pub fn draw(&mut self, time: &GameTime, renderer: &mut dyn Renderer) {
        if self.root_2d.core().is_drawable() {
            self.root_2d.draw(time, renderer);
        }
        if self.root_3d.core().is_drawable() {
            self.root_3d.draw(time, renderer);
        }
    }

    /// Spatial index over collidable 2D entities
    pub fn quadtree(&self) -> &QuadTree<Shared<dyn Entity2D>> {
        &self.quadtree
    }

    /// Spatial index, for callers maintaining it themselves
    pub fn quadtree_mut(&mut self) -> &mut QuadTree<Shared<dyn Entity2D>> {
        &mut self.quadtree
    }

    /// Clear the quadtree and insert every collidable, active 2D leaf entity
    ///
    /// Groups are descended into rather than inserted themselves.
    pub fn rebuild_quadtree(&mut self) {
        self.quadtree.clear();
        insert_leaves(&mut self.quadtree, self.root_2d.members());
        log::trace!(
            "QuadTree rebuilt: {} entries in {} nodes",
            self.quadtree.len(),
            self.quadtree.node_count()
        );
    }

    /// Entities stored near `entity`, excluding `entity` itself
    pub fn candidates(&self, entity: &dyn Entity2D) -> Vec<Shared<dyn Entity2D>> {
        let id = entity.id();
        self.quadtree
            .candidates(&entity.rectangle())
            .into_iter()
            .filter(|candidate| candidate.try_borrow().map_or(true, |other| other.id() != id))
            .collect()
    }

    /// Entities actually colliding with `entity`, found through the quadtree
    pub fn collisions(&self, entity: &dyn Entity2D, test: CollisionTest) -> Result<Vec<Shared<dyn Entity2D>>, SceneError> {
        let mut hits = Vec::new();
        for candidate in self.candidates(entity) {
            let collides = {
                let Ok(other) = candidate.try_borrow() else {
                    continue;
                };
                other.core().collidable && collider::collide_with(test, entity, &*other)?
            };
            if collides {
                hits.push(candidate);
            }
        }
        Ok(hits)
    }

    /// Ray-pick the 3D entities through a screen point, nearest first
    pub fn pick(&self, point: Vec2, viewport: Vec2, view_projection: &Mat4) -> Vec<CollideInformation> {
        collider::pick(point, viewport, view_projection, self.root_3d.members())
    }
}

fn insert_leaves(tree: &mut QuadTree<Shared<dyn Entity2D>>, collection: &SafeCollection<dyn Entity2D>) {
    for member in collection.members() {
        let Ok(entity) = member.try_borrow() else {
            continue;
        };
        if !entity.core().is_active() {
            continue;
        }
        if let Some(children) = entity.children() {
            insert_leaves(tree, children);
        } else if entity.core().collidable {
            let rectangle = entity.rectangle();
            drop(entity);
            tree.insert(rectangle, Rc::clone(&member));
        }
    }
}

impl fmt::Debug for Scene {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scene")
            .field("config", &self.config)
            .field("root_2d", &self.root_2d)
            .field("root_3d", &self.root_3d)
            .field("quadtree_entries", &self.quadtree.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::{MemoryContent, PixelData};
    use crate::config::QuadTreeConfig;
    use crate::entity::{shared, Model, Sprite};
    use crate::foundation::math::{Rectangle, Vec3};
    use crate::render::{Color, RecordingRenderer};

    fn content() -> Box<MemoryContent> {
        let mut content = MemoryContent::new();
        content.add_texture("block", PixelData::filled(10, 10, Color::WHITE));
        content.add_model("unit", Vec3::new(1.0, 1.0, 1.0));
        Box::new(content)
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let mut config = SceneConfig::default();
        config.quadtree.bounds = Rectangle::EMPTY;
        assert!(matches!(Scene::new(config, content()), Err(SceneError::Config(_))));
    }

    #[test]
    fn test_tick_loads_updates_and_draws() {
        let mut scene = Scene::new(SceneConfig::default(), content()).unwrap();
        let sprite = shared(Sprite::new("a", "block"));
        let model = shared(Model::new("m", "unit"));
        scene.add_2d(sprite.clone()).unwrap();
        scene.add_3d(model.clone()).unwrap();

        scene.initialize();
        scene.load_content().unwrap();
        assert!(sprite.borrow().core().is_assets_loaded());
        assert!(model.borrow().core().is_assets_loaded());

        let time = GameTime::new(16.0, 16.0, 0);
        let mut renderer = RecordingRenderer::new();
        scene.update(&time);
        scene.draw(&time, &mut renderer);

        assert_eq!(renderer.commands().len(), 2);
        assert_eq!(scene.quadtree().len(), 1);
    }

    #[test]
    fn test_entities_added_after_load_are_ready() {
        let mut scene = Scene::new(SceneConfig::default(), content()).unwrap();
        scene.initialize();
        scene.load_content().unwrap();

        let late = shared(Sprite::new("late", "block"));
        scene.add_2d(late.clone()).unwrap();
        assert!(late.borrow().core().is_initialized());
        assert!(late.borrow().core().is_assets_loaded());
    }

    #[test]
    fn test_collisions_through_quadtree() {
        let mut scene = Scene::new(SceneConfig::default(), content()).unwrap();
        let a = shared(Sprite::new("a", "block").with_position(Vec2::new(0.0, 0.0)));
        let b = shared(Sprite::new("b", "block").with_position(Vec2::new(5.0, 5.0)));
        let c = shared(Sprite::new("c", "block").with_position(Vec2::new(700.0, 500.0)));
        for sprite in [&a, &b, &c] {
            scene.add_2d(sprite.clone()).unwrap();
        }
        scene.load_content().unwrap();
        scene.update(&GameTime::default());

        let hits = scene.collisions(&*a.borrow(), CollisionTest::Rectangle).unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].borrow().id(), b.borrow().id());

        let id = b.borrow().id();
        assert!(scene.remove_2d(id).unwrap());
        assert!(scene.collisions(&*a.borrow(), CollisionTest::Rectangle).unwrap().is_empty());
    }

    #[test]
    fn test_persistent_policy_leaves_tree_alone() {
        let config = SceneConfig {
            quadtree: QuadTreeConfig {
                policy: QuadTreePolicy::Persistent,
                ..QuadTreeConfig::default()
            },
            ..SceneConfig::default()
        };
        let mut scene = Scene::new(config, content()).unwrap();
        let sprite = shared(Sprite::new("a", "block"));
        scene.add_2d(sprite.clone()).unwrap();
        scene.load_content().unwrap();

        scene.update(&GameTime::default());
        assert!(scene.quadtree().is_empty());

        let rectangle = sprite.borrow().rectangle();
        scene.quadtree_mut().insert(rectangle, sprite.clone());
        scene.update(&GameTime::default());
        assert_eq!(scene.quadtree().len(), 1);
    }

    #[test]
    fn test_destroyed_entities_leave_scene() {
        let mut scene = Scene::new(SceneConfig::default(), content()).unwrap();
        let sprite = shared(Sprite::new("a", "block"));
        scene.add_2d(sprite.clone()).unwrap();
        scene.load_content().unwrap();

        sprite.borrow_mut().core_mut().destroy();
        scene.update(&GameTime::default());

        assert!(scene.root_2d().is_empty());
        assert!(scene.quadtree().is_empty());
    }
}
