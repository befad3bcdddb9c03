use crate::frame::{self, InstanceData, LineVertex, Uniforms, Vertex};
use crate::shaders;
use bytemuck::{Pod, Zeroable};
use crowdwalk_render::{collect_debug_geometry, DebugRequest, FrameRenderer, RenderView};
use wgpu::util::DeviceExt;

const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;
const GRID_HALF_EXTENT: i32 = 25;
const MAX_INSTANCES: u32 = 4_096;
const MAX_DEBUG_VERTICES: u32 = 65_536;

/// Everything that differs between the renderer's pipelines.
struct PipelineSpec<'a> {
    label: &'a str,
    shader: &'a wgpu::ShaderModule,
    vs_entry: &'a str,
    fs_entry: &'a str,
    buffers: &'a [wgpu::VertexBufferLayout<'a>],
    topology: wgpu::PrimitiveTopology,
    depth_compare: wgpu::CompareFunction,
    depth_write: bool,
}

fn create_pipeline(
    device: &wgpu::Device,
    layout: &wgpu::PipelineLayout,
    surface_format: wgpu::TextureFormat,
    spec: &PipelineSpec<'_>,
) -> wgpu::RenderPipeline {
    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(spec.label),
        layout: Some(layout),
        vertex: wgpu::VertexState {
            module: spec.shader,
            entry_point: Some(spec.vs_entry),
            compilation_options: Default::default(),
            buffers: spec.buffers,
        },
        fragment: Some(wgpu::FragmentState {
            module: spec.shader,
            entry_point: Some(spec.fs_entry),
            compilation_options: Default::default(),
            targets: &[Some(wgpu::ColorTargetState {
                format: surface_format,
                blend: Some(wgpu::BlendState::REPLACE),
                write_mask: wgpu::ColorWrites::ALL,
            })],
        }),
        primitive: wgpu::PrimitiveState {
            topology: spec.topology,
            ..Default::default()
        },
        depth_stencil: Some(wgpu::DepthStencilState {
            format: DEPTH_FORMAT,
            depth_write_enabled: spec.depth_write,
            depth_compare: spec.depth_compare,
            stencil: Default::default(),
            bias: Default::default(),
        }),
        multisample: Default::default(),
        multiview: None,
        cache: None,
    })
}

fn static_buffer<T: Pod>(
    device: &wgpu::Device,
    label: &str,
    data: &[T],
    usage: wgpu::BufferUsages,
) -> wgpu::Buffer {
    device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some(label),
        contents: bytemuck::cast_slice(data),
        usage,
    })
}

/// Vertex buffer rewritten every frame, sized for `capacity` elements.
fn streaming_buffer<T>(device: &wgpu::Device, label: &str, capacity: u32) -> wgpu::Buffer {
    device.create_buffer(&wgpu::BufferDescriptor {
        label: Some(label),
        size: capacity as u64 * std::mem::size_of::<T>() as u64,
        usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    })
}

fn create_depth_view(device: &wgpu::Device, width: u32, height: u32) -> wgpu::TextureView {
    device
        .create_texture(&wgpu::TextureDescriptor {
            label: Some("scene_depth"),
            size: wgpu::Extent3d {
                width: width.max(1),
                height: height.max(1),
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: DEPTH_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        })
        .create_view(&Default::default())
}

struct DebugPipelines {
    depth_tested: wgpu::RenderPipeline,
    overlay: wgpu::RenderPipeline,
}

impl DebugPipelines {
    fn select(&self, request: DebugRequest) -> &wgpu::RenderPipeline {
        if request.depth_test {
            &self.depth_tested
        } else {
            &self.overlay
        }
    }
}

/// wgpu-based scene renderer: floor grid, one box per model, debug lines.
pub struct WgpuRenderer {
    scene_pipeline: wgpu::RenderPipeline,
    grid_pipeline: wgpu::RenderPipeline,
    debug_pipelines: DebugPipelines,
    uniform_buffer: wgpu::Buffer,
    uniform_bind_group: wgpu::BindGroup,
    cube_vertices: wgpu::Buffer,
    cube_indices: wgpu::Buffer,
    cube_index_count: u32,
    grid_vertices: wgpu::Buffer,
    grid_vertex_count: u32,
    instances: wgpu::Buffer,
    debug_vertices: wgpu::Buffer,
    depth_view: wgpu::TextureView,
    surface_format: wgpu::TextureFormat,
    size: (u32, u32),
}

impl WgpuRenderer {
    pub fn new(
        device: &wgpu::Device,
        surface_format: wgpu::TextureFormat,
        width: u32,
        height: u32,
    ) -> Self {
        let uniform_buffer = static_buffer(
            device,
            "frame_uniforms",
            &[Uniforms::zeroed()],
            wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        );

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("frame_uniforms_layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });
        let uniform_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("frame_uniforms_group"),
            layout: &bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });
        let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("crowdwalk_layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let scene_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("scene_shader"),
            source: wgpu::ShaderSource::Wgsl(shaders::scene_shader().into()),
        });
        let line_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("line_shader"),
            source: wgpu::ShaderSource::Wgsl(shaders::line_shader().into()),
        });

        let scene_pipeline = create_pipeline(
            device,
            &layout,
            surface_format,
            &PipelineSpec {
                label: "scene_pipeline",
                shader: &scene_shader,
                vs_entry: "vs_main",
                fs_entry: "fs_main",
                buffers: &[Vertex::layout(), InstanceData::layout()],
                topology: wgpu::PrimitiveTopology::TriangleList,
                depth_compare: wgpu::CompareFunction::Less,
                depth_write: true,
            },
        );
        let line_pipeline =
            |label: &str, depth_compare: wgpu::CompareFunction, depth_write: bool| {
                create_pipeline(
                    device,
                    &layout,
                    surface_format,
                    &PipelineSpec {
                        label,
                        shader: &line_shader,
                        vs_entry: "vs_line",
                        fs_entry: "fs_line",
                        buffers: &[LineVertex::layout()],
                        topology: wgpu::PrimitiveTopology::LineList,
                        depth_compare,
                        depth_write,
                    },
                )
            };
        let grid_pipeline = line_pipeline("grid_pipeline", wgpu::CompareFunction::Less, true);
        let debug_pipelines = DebugPipelines {
            depth_tested: line_pipeline(
                "debug_depth_pipeline",
                wgpu::CompareFunction::LessEqual,
                false,
            ),
            overlay: line_pipeline("debug_overlay_pipeline", wgpu::CompareFunction::Always, false),
        };

        let (cube_verts, cube_idx) = frame::cube_mesh();
        let grid = frame::grid_vertices(GRID_HALF_EXTENT, 1.0);
        let usage = wgpu::BufferUsages::VERTEX;

        tracing::info!(?surface_format, width, height, "wgpu renderer ready");
        Self {
            scene_pipeline,
            grid_pipeline,
            debug_pipelines,
            uniform_buffer,
            uniform_bind_group,
            cube_vertices: static_buffer(device, "cube_vertices", &cube_verts, usage),
            cube_indices: static_buffer(
                device,
                "cube_indices",
                &cube_idx,
                wgpu::BufferUsages::INDEX,
            ),
            cube_index_count: cube_idx.len() as u32,
            grid_vertices: static_buffer(device, "grid_vertices", &grid, usage),
            grid_vertex_count: grid.len() as u32,
            instances: streaming_buffer::<InstanceData>(device, "model_instances", MAX_INSTANCES),
            debug_vertices: streaming_buffer::<LineVertex>(
                device,
                "debug_vertices",
                MAX_DEBUG_VERTICES,
            ),
            depth_view: create_depth_view(device, width, height),
            surface_format,
            size: (width.max(1), height.max(1)),
        }
    }

    pub fn resize(&mut self, device: &wgpu::Device, width: u32, height: u32) {
        self.depth_view = create_depth_view(device, width, height);
        self.size = (width.max(1), height.max(1));
    }

    pub fn surface_format(&self) -> wgpu::TextureFormat {
        self.surface_format
    }

    /// Render one frame into `target`. Consumes the frame's debug request,
    /// if any, and draws the debug geometry with or without depth testing as
    /// requested.
    pub fn render(
        &self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        target: &wgpu::TextureView,
        view: &RenderView<'_>,
        frame_state: &mut FrameRenderer,
    ) {
        let aspect = self.size.0 as f32 / self.size.1 as f32;
        let uniforms = frame::build_uniforms(view, frame_state, aspect);
        queue.write_buffer(&self.uniform_buffer, 0, bytemuck::bytes_of(&uniforms));

        let instances = frame::build_instances(view, MAX_INSTANCES as usize);
        if !instances.is_empty() {
            queue.write_buffer(&self.instances, 0, bytemuck::cast_slice(&instances));
        }

        // Lines are only collected when a request is pending.
        let debug = frame_state.take_debug_request().and_then(|request| {
            let lines = collect_debug_geometry(view.scene, view.components);
            let verts =
                frame::cap_line_vertices(frame::line_vertices(&lines), MAX_DEBUG_VERTICES as usize);
            if verts.is_empty() {
                return None;
            }
            queue.write_buffer(&self.debug_vertices, 0, bytemuck::cast_slice(&verts));
            Some((request, verts.len() as u32))
        });

        let zone = frame::active_zone(view);
        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("frame_encoder"),
        });
        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("scene_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: target,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(frame::clear_color(&zone)),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                ..Default::default()
            });
            pass.set_bind_group(0, &self.uniform_bind_group, &[]);

            if !instances.is_empty() {
                pass.set_pipeline(&self.scene_pipeline);
                pass.set_vertex_buffer(0, self.cube_vertices.slice(..));
                pass.set_vertex_buffer(1, self.instances.slice(..));
                pass.set_index_buffer(self.cube_indices.slice(..), wgpu::IndexFormat::Uint16);
                pass.draw_indexed(0..self.cube_index_count, 0, 0..instances.len() as u32);
            }

            pass.set_pipeline(&self.grid_pipeline);
            pass.set_vertex_buffer(0, self.grid_vertices.slice(..));
            pass.draw(0..self.grid_vertex_count, 0..1);

            if let Some((request, count)) = debug {
                pass.set_pipeline(self.debug_pipelines.select(request));
                pass.set_vertex_buffer(0, self.debug_vertices.slice(..));
                pass.draw(0..count, 0..1);
            }
        }
        queue.submit(std::iter::once(encoder.finish()));
    }
}
