//! Spatial partitioning data structures
//!
//! Provides broad-phase narrowing for 2D collision queries.

mod quadtree;

pub use quadtree::{QuadTree, QuadTreeEntry, QuadTreeNode, Quadrant};
