//! Scene error type
//!
//! Every error is scoped to a single entity or operation; none of them is
//! fatal to the host.

use crate::config::ConfigError;
use crate::entity::EntityId;
use thiserror::Error;

/// Errors raised by entities, collections and collision queries
#[derive(Error, Debug)]
pub enum SceneError {
    /// An entity was asked to load an asset without a name
    #[error("Cannot load {kind}: asset name is empty")]
    EmptyAssetName {
        /// Asset kind ("texture", "font", "model")
        kind: &'static str,
    },

    /// The content loader has no asset under that name
    #[error("{kind} asset not found: {name}")]
    AssetNotFound {
        /// Asset kind ("texture", "font", "model")
        kind: &'static str,
        /// Requested asset name
        name: String,
    },

    /// Indexed access past the end of a collection
    #[error("Index {index} out of range for collection of length {len}")]
    IndexOutOfRange {
        /// Requested index
        index: usize,
        /// Current length
        len: usize,
    },

    /// Perfect-pixel test on an entity whose pixel data has not been loaded
    #[error("Pixel data for entity {entity} is not ready")]
    PixelsNotReady {
        /// Entity lacking pixel data
        entity: EntityId,
    },

    /// Mutation attempted while a pass iterates the live member list
    #[error("Collection is being iterated without secure cycle; mutation refused")]
    CollectionBusy,

    /// Configuration failure
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
}
