use crate::camera::CameraController;
use crate::config::{ConfigError, SampleConfig};
use crate::events::{EventQueue, FrameContext, SampleEvent, UiEvent};
use crate::spawner::{create_scene, ActorSpawn};
use crowdwalk_assets::{AssetError, ResourceCache};
use crowdwalk_common::EntityId;
use crowdwalk_ecs::{update_movers, ComponentStore};
use crowdwalk_render::{RenderService, RenderView};
use crowdwalk_scene::Scene;
use crowdwalk_tools::{ButtonId, DebugPanel};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::path::Path;

#[derive(Debug, thiserror::Error)]
pub enum SampleError {
    #[error("asset: {0}")]
    Asset(#[from] AssetError),
    #[error("config: {0}")]
    Config(#[from] ConfigError),
}

/// Built-in resources, optionally extended or overridden by a JSON manifest.
pub fn load_resources(manifest: Option<&Path>) -> Result<ResourceCache, SampleError> {
    let mut cache = ResourceCache::builtin();
    if let Some(path) = manifest {
        cache.load_manifest(path)?;
    }
    Ok(cache)
}

/// The running sample: scene, camera controller and debug panel.
///
/// Services are passed in per call rather than looked up, so the same sample
/// runs under the desktop window, the CLI and tests.
pub struct SkeletalSample {
    seed: u64,
    scene: Scene,
    components: ComponentStore,
    camera: EntityId,
    actors: Vec<ActorSpawn>,
    controller: CameraController,
    panel: DebugPanel,
}

impl SkeletalSample {
    /// Build the scene and panel and push the initial shader parameters.
    pub fn start(
        config: &SampleConfig,
        cache: &ResourceCache,
        renderer: &mut dyn RenderService,
    ) -> Result<Self, SampleError> {
        cache.get_font(&config.panel.font)?;
        cache.get_style(&config.panel.style)?;

        let seed = config.seed.unwrap_or_else(rand::random);
        tracing::info!(seed, actors = config.actors.count, "starting sample");
        let mut rng = StdRng::seed_from_u64(seed);
        let spawned = create_scene(config, cache, &mut rng)?;

        let panel = DebugPanel::new(config.panel.initial_values(), config.panel.step, renderer);
        let controller = CameraController::new(&config.camera, config.keys.clone());

        Ok(Self {
            seed,
            scene: spawned.scene,
            components: spawned.components,
            camera: spawned.camera,
            actors: spawned.actors,
            controller,
            panel,
        })
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn components(&self) -> &ComponentStore {
        &self.components
    }

    pub fn camera_node(&self) -> EntityId {
        self.camera
    }

    pub fn actors(&self) -> &[ActorSpawn] {
        &self.actors
    }

    pub fn controller(&self) -> &CameraController {
        &self.controller
    }

    pub fn panel(&self) -> &DebugPanel {
        &self.panel
    }

    pub fn draw_debug(&self) -> bool {
        self.controller.draw_debug()
    }

    /// What a renderer needs to draw the current state.
    pub fn render_view(&self) -> RenderView<'_> {
        RenderView {
            scene: &self.scene,
            components: &self.components,
            camera: self.camera,
        }
    }

    pub fn handle_event(&mut self, event: SampleEvent, ctx: &mut FrameContext<'_>) {
        match event {
            SampleEvent::Ui(UiEvent::Pressed(button)) => {
                self.handle_pressed(button, ctx);
            }
            SampleEvent::Update { time_step } => self.handle_update(time_step, ctx),
            SampleEvent::PostRenderUpdate => self.handle_post_render_update(ctx),
        }
    }

    /// Per-frame update: only moves the camera.
    pub fn handle_update(&mut self, time_step: f32, ctx: &mut FrameContext<'_>) {
        let Some(node) = self.scene.transform_mut(self.camera) else {
            return;
        };
        self.controller.update(node, ctx.input, ctx.ui_focus, time_step);
    }

    /// Request debug geometry, drawn without depth test, if enabled.
    pub fn handle_post_render_update(&mut self, ctx: &mut FrameContext<'_>) {
        if self.controller.draw_debug() {
            ctx.renderer.draw_debug_geometry(false);
        }
    }

    /// Apply one panel button press. Returns the value pushed to the renderer.
    pub fn handle_pressed(&mut self, button: ButtonId, ctx: &mut FrameContext<'_>) -> f32 {
        self.panel.press(button, ctx.renderer)
    }

    /// Run the scene's own update: every mover and its walk cycle.
    pub fn update_scene(&mut self, time_step: f32) -> usize {
        update_movers(&mut self.scene, &mut self.components, time_step)
    }

    /// Run one whole frame: UI presses, the general update, the scene update,
    /// then the post-render hook. Returns the number of actors moved.
    pub fn run_frame(
        &mut self,
        time_step: f32,
        ui_events: impl IntoIterator<Item = UiEvent>,
        ctx: &mut FrameContext<'_>,
    ) -> usize {
        let mut queue = EventQueue::new();
        for event in ui_events {
            queue.push(event);
        }
        queue.push(SampleEvent::Update { time_step });
        while let Some(event) = queue.pop() {
            self.handle_event(event, ctx);
        }

        let moved = self.update_scene(time_step);
        self.handle_event(SampleEvent::PostRenderUpdate, ctx);
        moved
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crowdwalk_assets::paths;
    use crowdwalk_input::{InputSource, InputState, Key};
    use crowdwalk_render::{FrameRenderer, ShaderParam};
    use glam::{Vec2, Vec3};

    const NO_UI: [UiEvent; 0] = [];

    fn config() -> SampleConfig {
        SampleConfig {
            seed: Some(11),
            ..SampleConfig::default()
        }
    }

    fn start(renderer: &mut FrameRenderer) -> SkeletalSample {
        SkeletalSample::start(&config(), &ResourceCache::builtin(), renderer).unwrap()
    }

    /// Records every renderer call in order.
    #[derive(Default)]
    struct RecordingRenderer {
        inner: FrameRenderer,
        calls: Vec<String>,
    }

    impl RenderService for RecordingRenderer {
        fn set_shader_parameter(&mut self, param: ShaderParam, value: f32) {
            self.calls.push(format!("set {param}={value}"));
            self.inner.set_shader_parameter(param, value);
        }

        fn shader_parameter(&self, param: ShaderParam) -> Option<f32> {
            self.inner.shader_parameter(param)
        }

        fn draw_debug_geometry(&mut self, depth_test: bool) {
            self.calls.push(format!("debug depth_test={depth_test}"));
            self.inner.draw_debug_geometry(depth_test);
        }
    }

    struct NoInput;

    impl InputSource for NoInput {
        fn key_down(&self, _: Key) -> bool {
            false
        }
        fn key_pressed(&self, _: Key) -> bool {
            false
        }
        fn mouse_move(&self) -> Vec2 {
            Vec2::ZERO
        }
    }

    #[test]
    fn start_pushes_initial_parameters() {
        let mut renderer = RecordingRenderer::default();
        let sample =
            SkeletalSample::start(&config(), &ResourceCache::builtin(), &mut renderer).unwrap();
        assert_eq!(
            renderer.calls,
            vec![
                "set SampleRadius=1",
                "set Beta=0.005",
                "set Eps=0.003",
                "set Sigma=0.09",
            ]
        );
        assert_eq!(sample.seed(), 11);
        assert_eq!(sample.actors().len(), 30);
        assert!(!sample.draw_debug());
    }

    #[test]
    fn missing_font_or_style_is_fatal() {
        for path in [paths::UI_FONT, paths::UI_STYLE] {
            let mut cache = ResourceCache::builtin();
            cache.remove(path);
            let mut renderer = FrameRenderer::new();
            let err = SkeletalSample::start(&config(), &cache, &mut renderer)
                .err()
                .unwrap();
            assert!(matches!(err, SampleError::Asset(AssetError::NotFound(_))));
        }
    }

    #[test]
    fn update_moves_only_the_camera() {
        let mut renderer = FrameRenderer::new();
        let mut sample = start(&mut renderer);
        let before: Vec<Vec3> = sample
            .actors()
            .iter()
            .map(|a| sample.scene().transform(a.id).unwrap().position)
            .collect();

        let mut input = InputState::new();
        input.set_key(Key::W, true);
        let mut ctx = FrameContext::new(&input, &mut renderer);
        sample.handle_event(SampleEvent::Update { time_step: 0.5 }, &mut ctx);

        let cam = sample.scene().transform(sample.camera_node()).unwrap();
        assert!((cam.position - Vec3::new(0.0, 5.0, 10.0)).length() < 1e-4);
        for (actor, pos) in sample.actors().iter().zip(before) {
            assert_eq!(sample.scene().transform(actor.id).unwrap().position, pos);
        }
    }

    #[test]
    fn frame_runs_movers_and_walk_cycles() {
        let mut renderer = FrameRenderer::new();
        let mut sample = start(&mut renderer);
        let actor = sample.actors()[0];
        let mut ctx = FrameContext::new(&NoInput, &mut renderer);
        let moved = sample.run_frame(0.1, NO_UI, &mut ctx);
        assert_eq!(moved, 30);
        assert_eq!(sample.scene().frame(), 1);

        let pos = sample.scene().transform(actor.id).unwrap().position;
        assert!((pos - actor.position).length() > 0.1);
        let model = sample.components().get_animated_model(actor.id).unwrap();
        let time = model.animation_states()[0].time();
        assert_ne!(Some(time), actor.animation_time);
    }

    #[test]
    fn debug_geometry_requested_after_update_in_same_frame() {
        let mut renderer = RecordingRenderer::default();
        let mut sample =
            SkeletalSample::start(&config(), &ResourceCache::builtin(), &mut renderer).unwrap();
        renderer.calls.clear();

        let mut input = InputState::new();

        // Frame without the toggle: no request.
        {
            let mut ctx = FrameContext::new(&input, &mut renderer);
            sample.run_frame(0.016, NO_UI, &mut ctx);
        }
        assert!(renderer.calls.is_empty());

        // Toggle pressed: the update flips the flag before the post-render hook.
        input.set_key(Key::Space, true);
        {
            let mut ctx = FrameContext::new(&input, &mut renderer);
            sample.run_frame(0.016, NO_UI, &mut ctx);
        }
        input.end_frame();
        assert_eq!(renderer.calls, vec!["debug depth_test=false"]);

        // Still held: flag stays on, request repeats every frame.
        {
            let mut ctx = FrameContext::new(&input, &mut renderer);
            sample.run_frame(0.016, NO_UI, &mut ctx);
        }
        assert_eq!(renderer.calls.len(), 2);
        assert!(sample.draw_debug());
    }

    #[test]
    fn ui_focus_blocks_toggle_but_not_panel() {
        let mut renderer = FrameRenderer::new();
        let mut sample = start(&mut renderer);
        let mut input = InputState::new();
        input.set_key(Key::Space, true);

        let press = UiEvent::Pressed(ButtonId::increase(ShaderParam::SampleRadius));
        let mut ctx = FrameContext::new(&input, &mut renderer).with_ui_focus(true);
        sample.run_frame(0.016, [press], &mut ctx);

        assert!(!sample.draw_debug());
        assert_eq!(renderer.debug_request(), None);
        assert_eq!(renderer.shader_parameter(ShaderParam::SampleRadius), Some(1.01));
        assert_eq!(
            sample.panel().label(ShaderParam::SampleRadius),
            "SampleRadius: 1.01"
        );
    }

    #[test]
    fn presses_apply_in_order_before_update() {
        let mut renderer = FrameRenderer::new();
        let mut sample = start(&mut renderer);
        let beta_down = UiEvent::Pressed(ButtonId::decrease(ShaderParam::Beta));
        let mut ctx = FrameContext::new(&NoInput, &mut renderer);
        sample.run_frame(0.016, [beta_down, beta_down], &mut ctx);
        assert_eq!(renderer.shader_parameter(ShaderParam::Beta), Some(-0.015));
        assert_eq!(sample.panel().label(ShaderParam::Beta), "Beta: -0.015");
    }

    #[test]
    fn manifest_errors_surface_as_asset_errors() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.json");
        let err = load_resources(Some(missing.as_path())).err().unwrap();
        assert!(matches!(err, SampleError::Asset(AssetError::Io(_))));
        assert_eq!(load_resources(None).unwrap().len(), ResourceCache::builtin().len());
    }

    #[test]
    fn render_view_points_at_camera() {
        let mut renderer = FrameRenderer::new();
        let sample = start(&mut renderer);
        let view = sample.render_view();
        assert_eq!(view.camera, sample.camera_node());
        assert!(view.components.get_camera(view.camera).is_some());
    }
}
