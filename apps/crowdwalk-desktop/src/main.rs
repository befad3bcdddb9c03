use anyhow::{Context as _, Result};
use clap::Parser;
use crowdwalk_input::{InputState, Key};
use crowdwalk_render::FrameRenderer;
use crowdwalk_render_wgpu::WgpuRenderer;
use crowdwalk_sample::{load_resources, FrameContext, SampleConfig, SkeletalSample, UiEvent};
use crowdwalk_tools::SceneInspector;
use egui::Context as EguiContext;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tracing_subscriber::EnvFilter;
use winit::application::ApplicationHandler;
use winit::dpi::PhysicalSize;
use winit::event::{DeviceEvent, ElementState, KeyEvent, MouseButton, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Window, WindowId};

#[derive(Parser)]
#[command(name = "crowdwalk-desktop", about = "Crowd-walk sample in a window")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Sample configuration (YAML)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Resource manifest (JSON) merged over the built-in resources
    #[arg(long)]
    assets: Option<PathBuf>,

    /// Seed for actor placement
    #[arg(long)]
    seed: Option<u64>,

    /// Number of walking actors
    #[arg(long)]
    actors: Option<usize>,
}

fn map_key(code: KeyCode) -> Option<Key> {
    Some(match code {
        KeyCode::KeyW => Key::W,
        KeyCode::KeyA => Key::A,
        KeyCode::KeyS => Key::S,
        KeyCode::KeyD => Key::D,
        KeyCode::KeyQ => Key::Q,
        KeyCode::KeyE => Key::E,
        KeyCode::Space => Key::Space,
        KeyCode::ArrowUp => Key::Up,
        KeyCode::ArrowDown => Key::Down,
        KeyCode::ArrowLeft => Key::Left,
        KeyCode::ArrowRight => Key::Right,
        KeyCode::F1 => Key::F1,
        KeyCode::F2 => Key::F2,
        KeyCode::Escape => Key::Escape,
        _ => return None,
    })
}

/// Application state.
struct AppState {
    sample: SkeletalSample,
    frame_state: FrameRenderer,
    input: InputState,
    /// Panel presses collected while drawing the UI, applied next frame.
    pending_ui: Vec<UiEvent>,
    ui_focus: bool,
    show_panel: bool,
    mouse_captured: bool,
    last_frame: Instant,
}

impl AppState {
    fn new(cli: &Cli) -> Result<Self> {
        let mut config = SampleConfig::load_optional(cli.config.as_deref())?;
        if cli.seed.is_some() {
            config.seed = cli.seed;
        }
        if let Some(count) = cli.actors {
            config.actors.count = count;
        }
        let cache = load_resources(cli.assets.as_deref())?;

        let mut frame_state = FrameRenderer::new();
        let sample = SkeletalSample::start(&config, &cache, &mut frame_state)
            .context("failed to start sample")?;

        Ok(Self {
            sample,
            frame_state,
            input: InputState::new(),
            pending_ui: Vec::new(),
            ui_focus: false,
            show_panel: true,
            mouse_captured: false,
            last_frame: Instant::now(),
        })
    }

    fn step(&mut self, dt: f32) {
        let ui_events = std::mem::take(&mut self.pending_ui);
        let mut ctx =
            FrameContext::new(&self.input, &mut self.frame_state).with_ui_focus(self.ui_focus);
        self.sample.run_frame(dt, ui_events, &mut ctx);
        // Presses and mouse motion belong to exactly one frame, even when
        // that frame never reaches the screen.
        self.input.end_frame();
    }

    /// Start or stop right-button mouse look. Returns whether the cursor
    /// should be visible.
    fn set_mouse_look(&mut self, on: bool) -> bool {
        self.mouse_captured = on;
        !on
    }

    /// Apply releases that must never be swallowed by the UI, so a drag or
    /// key held across the panel cannot stay stuck on.
    fn handle_release(&mut self, event: &WindowEvent) -> Option<bool> {
        match event {
            WindowEvent::MouseInput {
                button: MouseButton::Right,
                state: ElementState::Released,
                ..
            } => Some(self.set_mouse_look(false)),
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(code),
                        state: ElementState::Released,
                        ..
                    },
                ..
            } => {
                self.handle_key(*code, false);
                None
            }
            _ => None,
        }
    }

    fn handle_key(&mut self, code: KeyCode, pressed: bool) {
        if pressed && code == KeyCode::F1 {
            self.show_panel = !self.show_panel;
        }
        if let Some(key) = map_key(code) {
            self.input.set_key(key, pressed);
        }
    }

    fn draw_ui(&mut self, ctx: &EguiContext) {
        if !self.show_panel {
            return;
        }

        let summary = SceneInspector::summary(self.sample.scene(), self.sample.components());
        let camera = self
            .sample
            .scene()
            .transform(self.sample.camera_node())
            .map(|t| t.position)
            .unwrap_or_default();

        egui::SidePanel::left("debug_panel")
            .default_width(260.0)
            .show(ctx, |ui| {
                ui.heading("Crowd Walk");
                ui.separator();
                ui.label(format!("Frame: {}  Seed: {}", summary.frame, self.sample.seed()));
                ui.label(format!(
                    "Actors: {}  Nodes: {}",
                    summary.animated_models, summary.node_count
                ));
                ui.label(format!(
                    "Camera: ({:.1}, {:.1}, {:.1})  yaw {:.0} pitch {:.0}",
                    camera.x,
                    camera.y,
                    camera.z,
                    self.sample.controller().yaw(),
                    self.sample.controller().pitch()
                ));
                ui.label(format!(
                    "Debug geometry: {}",
                    if self.sample.draw_debug() { "on" } else { "off" }
                ));
                ui.separator();

                ui.heading("Shader parameters");
                for row in self.sample.panel().rows() {
                    ui.horizontal(|ui| {
                        for button in [row.increase(), row.decrease()] {
                            let widget =
                                egui::Button::new(button.caption()).min_size(egui::vec2(30.0, 0.0));
                            if ui.add(widget).clicked() {
                                self.pending_ui.push(UiEvent::Pressed(button));
                            }
                        }
                        ui.monospace(row.label());
                    });
                }

                ui.separator();
                ui.small("WASD: Move | RMB: Look | Space: Debug geometry | F1: Panel | Esc: Quit");
            });
    }
}

/// Window, surface, device and the scene renderer.
struct Gpu {
    window: Arc<Window>,
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    renderer: WgpuRenderer,
}

impl Gpu {
    fn new(window: Arc<Window>) -> Result<Self> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });
        let surface = instance.create_surface(window.clone())?;

        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::HighPerformance,
            compatible_surface: Some(&surface),
            force_fallback_adapter: false,
        }))
        .context("no suitable GPU adapter")?;

        let (device, queue) = pollster::block_on(adapter.request_device(
            &wgpu::DeviceDescriptor {
                label: Some("crowdwalk_device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                memory_hints: Default::default(),
            },
            None,
        ))?;

        let caps = surface.get_capabilities(&adapter);
        let format = caps
            .formats
            .iter()
            .copied()
            .find(|f| f.is_srgb())
            .or_else(|| caps.formats.first().copied())
            .context("surface reports no formats")?;

        let size = window.inner_size();
        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode: caps.alpha_modes.first().copied().unwrap_or_default(),
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);
        let renderer = WgpuRenderer::new(&device, format, config.width, config.height);

        tracing::info!(
            backend = adapter.get_info().backend.to_str(),
            "GPU initialized"
        );
        Ok(Self {
            window,
            surface,
            device,
            queue,
            config,
            renderer,
        })
    }

    fn resize(&mut self, size: PhysicalSize<u32>) {
        self.config.width = size.width.max(1);
        self.config.height = size.height.max(1);
        self.surface.configure(&self.device, &self.config);
        self.renderer
            .resize(&self.device, self.config.width, self.config.height);
    }

    /// Next frame to draw into. Reconfigures and skips the frame when the
    /// surface went stale.
    fn acquire(&self) -> Option<wgpu::SurfaceTexture> {
        match self.surface.get_current_texture() {
            Ok(frame) => Some(frame),
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                self.surface.configure(&self.device, &self.config);
                None
            }
            Err(e) => {
                tracing::error!("surface error: {e}");
                None
            }
        }
    }
}

/// egui state and its wgpu painter, drawn over the scene.
struct Overlay {
    ctx: EguiContext,
    winit: egui_winit::State,
    painter: egui_wgpu::Renderer,
}

impl Overlay {
    fn new(gpu: &Gpu) -> Self {
        let ctx = EguiContext::default();
        let winit = egui_winit::State::new(
            ctx.clone(),
            egui::ViewportId::ROOT,
            &gpu.window,
            Some(gpu.window.scale_factor() as f32),
            None,
            None,
        );
        let painter = egui_wgpu::Renderer::new(&gpu.device, gpu.config.format, None, 1, false);
        Self {
            ctx,
            winit,
            painter,
        }
    }

    /// Feed a window event to egui. Returns true when egui consumed it.
    fn consumes(&mut self, window: &Window, event: &WindowEvent) -> bool {
        self.winit.on_window_event(window, event).consumed
    }

    fn paint(&mut self, gpu: &Gpu, target: &wgpu::TextureView, state: &mut AppState) {
        let raw_input = self.winit.take_egui_input(&gpu.window);
        let output = self.ctx.run(raw_input, |ctx| state.draw_ui(ctx));
        state.ui_focus = self.ctx.wants_keyboard_input() || self.ctx.is_using_pointer();
        self.winit
            .handle_platform_output(&gpu.window, output.platform_output);

        let jobs = self.ctx.tessellate(output.shapes, output.pixels_per_point);
        let screen = egui_wgpu::ScreenDescriptor {
            size_in_pixels: [gpu.config.width, gpu.config.height],
            pixels_per_point: output.pixels_per_point,
        };
        for (id, delta) in &output.textures_delta.set {
            self.painter
                .update_texture(&gpu.device, &gpu.queue, *id, delta);
        }

        let mut encoder = gpu
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("overlay_encoder"),
            });
        self.painter
            .update_buffers(&gpu.device, &gpu.queue, &mut encoder, &jobs, &screen);
        {
            let mut pass = encoder
                .begin_render_pass(&wgpu::RenderPassDescriptor {
                    label: Some("overlay_pass"),
                    color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                        view: target,
                        resolve_target: None,
                        ops: wgpu::Operations {
                            load: wgpu::LoadOp::Load,
                            store: wgpu::StoreOp::Store,
                        },
                    })],
                    ..Default::default()
                })
                .forget_lifetime();
            self.painter.render(&mut pass, &jobs, &screen);
        }
        gpu.queue.submit(std::iter::once(encoder.finish()));

        for id in &output.textures_delta.free {
            self.painter.free_texture(id);
        }
    }
}

struct CrowdApp {
    state: AppState,
    gpu: Option<Gpu>,
    overlay: Option<Overlay>,
}

impl CrowdApp {
    fn redraw(&mut self) {
        let now = Instant::now();
        let dt = (now - self.state.last_frame).as_secs_f32().min(0.1);
        self.state.last_frame = now;
        self.state.step(dt);

        let Some(gpu) = &self.gpu else {
            return;
        };
        let Some(frame) = gpu.acquire() else {
            return;
        };
        let target = frame.texture.create_view(&Default::default());

        let state = &mut self.state;
        gpu.renderer.render(
            &gpu.device,
            &gpu.queue,
            &target,
            &state.sample.render_view(),
            &mut state.frame_state,
        );
        if let Some(overlay) = &mut self.overlay {
            overlay.paint(gpu, &target, state);
        }

        frame.present();
        gpu.window.request_redraw();
    }
}

impl ApplicationHandler for CrowdApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.gpu.is_some() {
            return;
        }

        let attrs = Window::default_attributes()
            .with_title("Crowd Walk")
            .with_inner_size(PhysicalSize::new(1280u32, 720));
        let gpu = event_loop
            .create_window(attrs)
            .map_err(anyhow::Error::from)
            .and_then(|window| Gpu::new(Arc::new(window)));
        match gpu {
            Ok(gpu) => {
                self.overlay = Some(Overlay::new(&gpu));
                self.gpu = Some(gpu);
            }
            Err(e) => {
                tracing::error!("failed to set up the window: {e:#}");
                event_loop.exit();
            }
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        if let Some(cursor_visible) = self.state.handle_release(&event) {
            if let Some(gpu) = &self.gpu {
                gpu.window.set_cursor_visible(cursor_visible);
            }
        }
        if let (Some(gpu), Some(overlay)) = (&self.gpu, &mut self.overlay) {
            if overlay.consumes(&gpu.window, &event) {
                return;
            }
        }

        match event {
            WindowEvent::CloseRequested => event_loop.exit(),
            WindowEvent::Focused(false) => self.state.input.reset(),
            WindowEvent::Resized(size) => {
                if let Some(gpu) = &mut self.gpu {
                    gpu.resize(size);
                }
            }
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(code),
                        state: key_state,
                        ..
                    },
                ..
            } => {
                let pressed = key_state == ElementState::Pressed;
                if pressed && code == KeyCode::Escape {
                    event_loop.exit();
                    return;
                }
                self.state.handle_key(code, pressed);
            }
            WindowEvent::MouseInput {
                button: MouseButton::Right,
                state: button_state,
                ..
            } => {
                let visible = self
                    .state
                    .set_mouse_look(button_state == ElementState::Pressed);
                if let Some(gpu) = &self.gpu {
                    gpu.window.set_cursor_visible(visible);
                }
            }
            WindowEvent::RedrawRequested => self.redraw(),
            _ => {}
        }
    }

    fn device_event(
        &mut self,
        _event_loop: &ActiveEventLoop,
        _device_id: winit::event::DeviceId,
        event: DeviceEvent,
    ) {
        if let DeviceEvent::MouseMotion { delta: (dx, dy) } = event {
            if self.state.mouse_captured {
                self.state.input.add_mouse_move(dx as f32, dy as f32);
            }
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(gpu) = &self.gpu {
            gpu.window.request_redraw();
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    tracing::info!("crowdwalk-desktop starting");

    let state = AppState::new(&cli)?;

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = CrowdApp {
        state,
        gpu: None,
        overlay: None,
    };
    event_loop.run_app(&mut app)?;

    Ok(())
}
