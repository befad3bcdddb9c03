//! wgpu render backend for the sample.
//!
//! Draws a floor grid, one lit box per static or animated model, and the
//! debug geometry requested for the frame. The shader parameters pushed by
//! the debug panel feed the ambient obscurance term.
//!
//! # Invariants
//! - The renderer never mutates scene or component state.
//! - A debug request is consumed by the frame that draws it.

mod frame;
mod gpu;
mod shaders;

pub use gpu::WgpuRenderer;
