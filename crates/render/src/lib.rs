//! Renderer-facing services.
//!
//! Sample logic talks to the renderer only through [`RenderService`]: it can
//! push named scalar shader parameters and ask for debug geometry to be drawn
//! this frame. Concrete backends read the resulting [`FrameRenderer`] state.
//!
//! # Invariants
//! - Renderers never mutate the scene or its components.
//! - A debug geometry request covers exactly one frame.

mod debug;
mod params;
mod renderer;
mod service;

pub use debug::{collect_debug_geometry, DebugLine};
pub use params::{ShaderParam, ShaderParameters, UnknownShaderParam};
pub use renderer::{DebugTextRenderer, RenderView, Renderer};
pub use service::{DebugRequest, FrameRenderer, RenderService};

pub fn crate_info() -> &'static str {
    "crowdwalk-render v0.1.0"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crate_loads() {
        assert!(crate_info().contains("render"));
    }
}
