//! Scene data structures.
//!
//! - `scene_graph` holds the node arena and its traversal utilities
//! - `transform` is the per-node position, rotation and scale
//! - `material` is the PBR base material customized by the pass

pub mod material;
pub mod scene_graph;
pub mod transform;
