//! senpuki
//!
//! A field of electric fans rendered with wgpu. One fan figure is built as a
//! scene graph, copied onto a 10x10 grid with random placement, and drawn
//! through a dot-screen filter on top of a plain background pass. Space
//! switches the fans on and off; they spin up linearly and ease back to rest.
//!
//! High-level modules
//! - `animation`: speed ramps and the per-frame wing and neck motion
//! - `app`: the senpuki flow and the entry points
//! - `camera`: camera, projection, uniforms and the orbit controller
//! - `compositor`: ordered scene and post-process passes
//! - `context`: central GPU and window context that owns device/queue/pipelines
//! - `data_structures`: scene graph, geometry, instances and GPU batches
//! - `flow`: high level flow control and the event loop
//! - `pipelines`: render pipelines (basic, transparent, lines, dot screen)
//! - `render`: render composition for efficient pipeline reuse
//! - `scene`: the fan figure, its grid of copies and scene constants
//!

pub mod animation;
pub mod app;
pub mod camera;
pub mod compositor;
pub mod context;
pub mod data_structures;
pub mod flow;
pub mod pipelines;
pub mod render;
pub mod scene;

// Re-exports commonly used types for convenience in downstream code.
pub use cgmath;
pub use winit::event::WindowEvent;
