use crate::params::{ShaderParam, ShaderParameters};

/// The renderer operations sample logic is allowed to call.
pub trait RenderService {
    /// Set a named scalar shader parameter.
    fn set_shader_parameter(&mut self, param: ShaderParam, value: f32);

    /// Current value of a shader parameter, if it was ever set.
    fn shader_parameter(&self, param: ShaderParam) -> Option<f32>;

    /// Ask for debug geometry (bounding boxes, skeletons) to be drawn this
    /// frame. With `depth_test` false the overlay shows through solid geometry.
    fn draw_debug_geometry(&mut self, depth_test: bool);
}

/// A one-frame request to draw debug geometry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DebugRequest {
    pub depth_test: bool,
}

/// Backend-independent renderer state written by the sample each frame.
#[derive(Debug, Clone, Default)]
pub struct FrameRenderer {
    params: ShaderParameters,
    debug: Option<DebugRequest>,
}

impl FrameRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn params(&self) -> &ShaderParameters {
        &self.params
    }

    /// Pending debug request for the frame being built, if any.
    pub fn debug_request(&self) -> Option<DebugRequest> {
        self.debug
    }

    /// Consume the debug request once the backend has drawn the frame.
    pub fn take_debug_request(&mut self) -> Option<DebugRequest> {
        self.debug.take()
    }
}

impl RenderService for FrameRenderer {
    fn set_shader_parameter(&mut self, param: ShaderParam, value: f32) {
        tracing::trace!(%param, value, "shader parameter set");
        self.params.set(param, value);
    }

    fn shader_parameter(&self, param: ShaderParam) -> Option<f32> {
        self.params.get(param)
    }

    fn draw_debug_geometry(&mut self, depth_test: bool) {
        self.debug = Some(DebugRequest { depth_test });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_request_is_one_shot() {
        let mut r = FrameRenderer::new();
        assert!(r.debug_request().is_none());
        r.draw_debug_geometry(false);
        assert_eq!(r.take_debug_request(), Some(DebugRequest { depth_test: false }));
        assert!(r.take_debug_request().is_none());
    }

    #[test]
    fn parameters_round_trip_through_service() {
        let mut r = FrameRenderer::new();
        r.set_shader_parameter(ShaderParam::SampleRadius, 1.01);
        assert_eq!(r.shader_parameter(ShaderParam::SampleRadius), Some(1.01));
        assert_eq!(r.params().get(ShaderParam::SampleRadius), Some(1.01));
    }
}
