//! Model entity

use super::components::Transform3D;
use super::core::{Entity, Entity3D, EntityCore};
use super::Shared;
use crate::assets::{ContentLoader, LoadedModel};
use crate::error::SceneError;
use crate::foundation::math::Vec3;
use crate::foundation::time::GameTime;
use crate::render::Renderer;

/// A mesh asset placed in world space
///
/// The loaded model's extents size the transform, so the bounding volumes
/// match the mesh after `load_content`.
#[derive(Debug)]
pub struct Model {
    core: EntityCore,
    transform: Shared<Transform3D>,
    asset_name: String,
    model: Option<LoadedModel>,
}

impl Model {
    /// Model loaded from `asset_name`
    pub fn new(name: impl Into<String>, asset_name: impl Into<String>) -> Self {
        Self {
            core: EntityCore::new(name),
            transform: Transform3D::new().into_shared(),
            asset_name: asset_name.into(),
            model: None,
        }
    }

    /// Builder pattern: Set position
    pub fn with_position(self, position: Vec3) -> Self {
        {
            let mut transform = self.transform.borrow_mut();
            transform.set_position(position);
            transform.update_bounding_volumes();
        }
        self
    }

    /// Builder pattern: Recompute bounding volumes every update
    pub fn with_dynamic(self, dynamic: bool) -> Self {
        self.transform.borrow_mut().set_dynamic(dynamic);
        self
    }

    /// Asset the model is loaded from
    pub fn asset_name(&self) -> &str {
        &self.asset_name
    }

    /// Resolved model
    pub fn model(&self) -> Option<LoadedModel> {
        self.model
    }
}

impl Entity for Model {
    fn core(&self) -> &EntityCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut EntityCore {
        &mut self.core
    }

    fn load_content(&mut self, content: &mut dyn ContentLoader) -> Result<(), SceneError> {
        let model = match self.model {
            Some(model) => model,
            None => content.load_model(&self.asset_name)?,
        };
        self.model = Some(model);

        let mut transform = self.transform.borrow_mut();
        transform.set_extents(model.extents);
        transform.update_bounding_volumes();
        Ok(())
    }

    fn unload_content(&mut self) {
        self.model = None;
    }

    fn update(&mut self, _time: &GameTime) {
        self.refresh_bounds();
    }

    fn draw(&mut self, _time: &GameTime, renderer: &mut dyn Renderer) {
        if let Some(model) = self.model {
            renderer.draw_model(model.handle, &self.world_matrix());
        }
    }
}

impl Entity3D for Model {
    fn transform(&self) -> &Shared<Transform3D> {
        &self.transform
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::MemoryContent;
    use crate::entity::core::lifecycle;
    use crate::render::{DrawCommand, RecordingRenderer};
    use approx::assert_relative_eq;

    #[test]
    fn test_load_sizes_bounding_volumes() {
        let mut content = MemoryContent::new();
        content.add_model("crate", Vec3::new(2.0, 4.0, 6.0));
        let mut model = Model::new("crate", "crate").with_position(Vec3::new(1.0, 1.0, 1.0));

        lifecycle::load_content(&mut model, &mut content).unwrap();

        let bounds = model.bounding_box();
        assert_relative_eq!(bounds.min, Vec3::new(1.0, 1.0, 1.0));
        assert_relative_eq!(bounds.max, Vec3::new(3.0, 5.0, 7.0));
        let sphere = model.bounding_sphere();
        assert_relative_eq!(sphere.center, Vec3::new(2.0, 3.0, 4.0));
        assert_relative_eq!(sphere.radius, 3.0);
    }

    #[test]
    fn test_static_model_keeps_bounds_until_refreshed() {
        let mut content = MemoryContent::new();
        content.add_model("crate", Vec3::new(1.0, 1.0, 1.0));
        let mut still = Model::new("still", "crate");
        let mut moving = Model::new("moving", "crate").with_dynamic(true);
        lifecycle::load_content(&mut still, &mut content).unwrap();
        lifecycle::load_content(&mut moving, &mut content).unwrap();

        for model in [&mut still, &mut moving] {
            model.transform().borrow_mut().set_position(Vec3::new(10.0, 0.0, 0.0));
            model.update(&GameTime::default());
        }

        assert_relative_eq!(still.bounding_box().min.x, 0.0);
        assert_relative_eq!(moving.bounding_box().min.x, 10.0);
    }

    #[test]
    fn test_draw_submits_world_matrix() {
        let mut content = MemoryContent::new();
        let handle = content.add_model("crate", Vec3::new(1.0, 1.0, 1.0));
        let mut renderer = RecordingRenderer::new();
        let mut model = Model::new("crate", "crate").with_position(Vec3::new(0.0, 2.0, 0.0));
        lifecycle::load_content(&mut model, &mut content).unwrap();

        model.draw(&GameTime::default(), &mut renderer);

        let DrawCommand::Model { model: drawn, world } = &renderer.commands()[0] else {
            panic!("expected a model draw");
        };
        assert_eq!(*drawn, handle);
        assert_relative_eq!(world[(1, 3)], 2.0);
    }
}
