use crate::service::FrameRenderer;
use crowdwalk_common::EntityId;
use crowdwalk_ecs::ComponentStore;
use crowdwalk_scene::Scene;
use std::fmt::Write;

/// Everything a renderer reads to draw one frame.
#[derive(Debug, Clone, Copy)]
pub struct RenderView<'a> {
    pub scene: &'a Scene,
    pub components: &'a ComponentStore,
    /// Node carrying the active camera.
    pub camera: EntityId,
}

/// Renderer-agnostic interface. All renderers implement this trait.
///
/// The renderer reads the scene, its components and the frame's service
/// state, then produces output. It never mutates any of them.
pub trait Renderer {
    /// The output type produced by this renderer.
    type Output;

    /// Render one frame.
    fn render(&self, view: &RenderView<'_>, frame: &FrameRenderer) -> Self::Output;
}

/// Produces a human-readable dump of the scene. Used by the CLI and tests.
#[derive(Debug)]
pub struct DebugTextRenderer {
    /// Maximum number of actors listed individually.
    pub max_actors: usize,
}

impl DebugTextRenderer {
    pub fn new() -> Self {
        Self { max_actors: 10 }
    }
}

impl Default for DebugTextRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl Renderer for DebugTextRenderer {
    type Output = String;

    fn render(&self, view: &RenderView<'_>, frame: &FrameRenderer) -> String {
        let mut out = String::new();
        let scene = view.scene;
        let _ = writeln!(
            out,
            "=== Scene (frame={}, nodes={}) ===",
            scene.frame(),
            scene.node_count()
        );

        if let Some(t) = scene.transform(view.camera) {
            let p = t.position;
            let far = view
                .components
                .get_camera(view.camera)
                .map(|c| c.far_clip)
                .unwrap_or_default();
            let _ = writeln!(
                out,
                "Camera: pos=({:.2}, {:.2}, {:.2}) far={far:.0}",
                p.x, p.y, p.z
            );
        }

        let params: Vec<String> = frame
            .params()
            .iter()
            .map(|(p, v)| format!("{p}={v}"))
            .collect();
        let _ = writeln!(out, "Shader: {}", params.join(" "));
        let _ = writeln!(
            out,
            "Debug geometry: {}",
            match frame.debug_request() {
                Some(r) if r.depth_test => "on (depth tested)",
                Some(_) => "on",
                None => "off",
            }
        );

        let actors = view.components.animated_models();
        let _ = writeln!(out, "Actors: {}", actors.len());
        for (id, model) in actors.iter().take(self.max_actors) {
            let Some(t) = scene.transform(*id) else {
                continue;
            };
            let p = t.position;
            let anim = model
                .animation_states()
                .first()
                .map(|s| format!("{} t={:.2}/{:.2}", s.name, s.time(), s.length()))
                .unwrap_or_else(|| "no animation".to_string());
            let _ = writeln!(
                out,
                "  [{}] pos=({:.2}, {:.2}, {:.2}) {anim}",
                id.short(),
                p.x,
                p.y,
                p.z
            );
        }
        if actors.len() > self.max_actors {
            let _ = writeln!(out, "  ... {} more", actors.len() - self.max_actors);
        }

        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::ShaderParam;
    use crate::service::RenderService;
    use crowdwalk_common::{Aabb, Color, Transform};
    use crowdwalk_ecs::{AnimatedModel, AnimationHandle, Camera, MaterialHandle, ModelHandle};
    use glam::Vec3;

    #[test]
    fn empty_scene_dump() {
        let scene = Scene::new();
        let components = ComponentStore::new();
        let view = RenderView {
            scene: &scene,
            components: &components,
            camera: EntityId::new(),
        };
        let out = DebugTextRenderer::new().render(&view, &FrameRenderer::new());
        assert!(out.contains("frame=0"));
        assert!(out.contains("Actors: 0"));
        assert!(out.contains("Debug geometry: off"));
    }

    #[test]
    fn dump_lists_camera_params_and_actors() {
        let mut scene = Scene::new();
        let mut components = ComponentStore::new();
        let camera = scene.create_child("Camera", Transform::from_position(Vec3::new(0.0, 5.0, 0.0)));
        components.set_camera(
            camera,
            Camera {
                far_clip: 50.0,
                ..Camera::default()
            },
        );
        let jill = scene.create_child("Jill", Transform::default());
        let mut model = AnimatedModel::new(
            ModelHandle(0),
            MaterialHandle(0),
            Aabb::uniform(-0.5, 0.5),
            Color::WHITE,
        );
        model.add_animation_state(AnimationHandle(1), "Walk", 1.1);
        components.set_animated_model(jill, model);

        let mut frame = FrameRenderer::new();
        frame.set_shader_parameter(ShaderParam::Beta, 0.005);
        frame.draw_debug_geometry(false);

        let view = RenderView {
            scene: &scene,
            components: &components,
            camera,
        };
        let out = DebugTextRenderer::new().render(&view, &frame);
        assert!(out.contains("pos=(0.00, 5.00, 0.00) far=50"));
        assert!(out.contains("Beta=0.005"));
        assert!(out.contains("Debug geometry: on"));
        assert!(out.contains("Walk t=0.00/1.10"));
    }
}
