//! WebGPU rendering module
//!
//! Sprites are drawn as flat-colored quads, back to front.

pub mod pipeline;
pub mod shapes;
pub mod vertex;

pub use pipeline::{RenderInitError, RenderState};
pub use shapes::{letterbox, scene_to_ndc, scene_vertices, sprite_quad};
pub use vertex::{Vertex, texture_color};
