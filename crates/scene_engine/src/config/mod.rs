//! Configuration system
//!
//! Scene-wide settings for the quadtree and for entity collections. Any
//! configuration type can be loaded from and saved to TOML or RON files.

pub use serde::{Deserialize, Serialize};

use crate::foundation::math::Rectangle;

/// Configuration trait
pub trait Config: Serialize + for<'de> Deserialize<'de> + Default {
    /// Load configuration from file
    fn load_from_file(path: &str) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(ConfigError::Io)?;

        // Format follows the file extension
        if path.ends_with(".toml") {
            Self::from_toml_str(&contents)
        } else if path.ends_with(".ron") {
            Self::from_ron_str(&contents)
        } else {
            Err(ConfigError::UnsupportedFormat(path.to_string()))
        }
    }

    /// Save configuration to file
    fn save_to_file(&self, path: &str) -> Result<(), ConfigError> {
        let contents = if path.ends_with(".toml") {
            toml::to_string_pretty(self).map_err(|e| ConfigError::Serialize(e.to_string()))?
        } else if path.ends_with(".ron") {
            ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
                .map_err(|e| ConfigError::Serialize(e.to_string()))?
        } else {
            return Err(ConfigError::UnsupportedFormat(path.to_string()));
        };

        std::fs::write(path, contents).map_err(ConfigError::Io)
    }

    /// Parse configuration from a TOML document
    fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        toml::from_str(contents).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Parse configuration from a RON document
    fn from_ron_str(contents: &str) -> Result<Self, ConfigError> {
        ron::from_str(contents).map_err(|e| ConfigError::Parse(e.to_string()))
    }
}

/// Configuration errors
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Parse error
    #[error("Parse error: {0}")]
    Parse(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialize(String),

    /// Unsupported format
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    /// Values that parse but cannot be used
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// How the scene keeps its quadtree in sync with moving entities
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum QuadTreePolicy {
    /// Clear and re-insert every collidable 2D entity after each update pass
    #[default]
    RebuildPerFrame,
    /// The caller inserts, removes and clears entries itself
    Persistent,
}

/// Quadtree partitioning parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuadTreeConfig {
    /// Area covered by the root node
    pub bounds: Rectangle,
    /// Entities a node holds before it splits
    pub max_objects_per_node: usize,
    /// Deepest level a node may reach (root is level 0)
    pub max_levels: u32,
    /// Maintenance policy used by the scene
    pub policy: QuadTreePolicy,
}

impl Default for QuadTreeConfig {
    fn default() -> Self {
        Self {
            bounds: Rectangle::new(0.0, 0.0, 800.0, 600.0),
            max_objects_per_node: 10,
            max_levels: 5,
            policy: QuadTreePolicy::default(),
        }
    }
}

impl QuadTreeConfig {
    /// Check the values describe a usable tree
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.bounds.is_empty() {
            return Err(ConfigError::Invalid(format!(
                "quadtree bounds must have a positive area, got {:?}",
                self.bounds
            )));
        }
        if self.max_objects_per_node == 0 {
            return Err(ConfigError::Invalid(
                "max_objects_per_node must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Defaults applied to every entity collection a scene creates
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CollectionConfig {
    /// Snapshot members before each update/draw pass
    pub secure_cycle: bool,
}

impl Default for CollectionConfig {
    fn default() -> Self {
        Self { secure_cycle: true }
    }
}

/// Top-level scene configuration
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    /// Spatial partitioning
    pub quadtree: QuadTreeConfig,
    /// Entity collections
    pub collection: CollectionConfig,
}

impl Config for SceneConfig {}

impl SceneConfig {
    /// Check every section
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.quadtree.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scene_config_from_toml_with_defaults() {
        let config = SceneConfig::from_toml_str(
            r#"
            [quadtree]
            max_objects_per_node = 2
            max_levels = 4
            policy = "Persistent"

            [quadtree.bounds]
            x = 0.0
            y = 0.0
            width = 1024.0
            height = 768.0
            "#,
        )
        .unwrap();

        assert_eq!(config.quadtree.max_objects_per_node, 2);
        assert_eq!(config.quadtree.max_levels, 4);
        assert_eq!(config.quadtree.policy, QuadTreePolicy::Persistent);
        assert_eq!(config.quadtree.bounds, Rectangle::new(0.0, 0.0, 1024.0, 768.0));
        // Missing section falls back to defaults
        assert!(config.collection.secure_cycle);
    }

    #[test]
    fn test_scene_config_from_ron() {
        let config = SceneConfig::from_ron_str("(collection: (secure_cycle: false))").unwrap();
        assert!(!config.collection.secure_cycle);
        assert_eq!(config.quadtree, QuadTreeConfig::default());
    }

    #[test]
    fn test_config_file_roundtrip() {
        let path = std::env::temp_dir().join(format!("scene_engine_config_{}.toml", std::process::id()));
        let path = path.to_string_lossy().to_string();

        let mut config = SceneConfig::default();
        config.quadtree.max_levels = 7;
        config.save_to_file(&path).unwrap();

        let loaded = SceneConfig::load_from_file(&path).unwrap();
        assert_eq!(loaded.quadtree.max_levels, 7);
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_unsupported_format() {
        let err = SceneConfig::default().save_to_file("scene.json").unwrap_err();
        assert!(matches!(err, ConfigError::UnsupportedFormat(_)));
    }

    #[test]
    fn test_validate_rejects_empty_bounds() {
        let mut config = SceneConfig::default();
        config.quadtree.bounds = Rectangle::EMPTY;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }
}
