//! Render pipelines and their GPU resources.
//!
//! - `basic` lit opaque meshes, plus the shared `mk_render_pipeline` helper
//! - `transparent` lit meshes blended by their alpha
//! - `lines` unlit line lists
//! - `light` light and fog uniforms
//! - `dot_screen` the halftone post-process

pub mod basic;
pub mod dot_screen;
pub mod light;
pub mod lines;
pub mod transparent;
