//! Engine data structures: geometry, models, textures, scene graphs, and instances.
//!
//! This module contains the core data types for scene representation:
//!
//! - `geometry` generates primitive meshes (cylinder, box, torus) on the CPU
//! - `model` contains vertex, mesh and material definitions
//! - `texture` contains GPU texture wrapper and render target creation
//! - `instance` holds local transforms and per-instance GPU data
//! - `scene_graph` enables hierarchical scene organization
//! - `batch` groups scene nodes into instanced draw calls
//! - `layers` and `colour` are small helpers shared by all of the above

pub mod batch;
pub mod colour;
pub mod geometry;
pub mod instance;
pub mod layers;
pub mod model;
pub mod scene_graph;
pub mod texture;
