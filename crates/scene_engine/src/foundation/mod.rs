//! Shared building blocks for the scene types
//!
//! Vector aliases and the 2D `Rectangle` live in [`math`], per-frame timing
//! in [`time`] and `env_logger` setup in [`logging`].

pub mod logging;
pub mod math;
pub mod time;
