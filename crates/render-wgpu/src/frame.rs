//! CPU-side frame preparation: uniforms, per-instance boxes and line vertices.

use bytemuck::{Pod, Zeroable};
use crowdwalk_common::{Aabb, Color, Transform};
use crowdwalk_ecs::{Camera, Zone};
use crowdwalk_render::{DebugLine, FrameRenderer, RenderView};
use glam::{Mat4, Vec3};

/// Boxes never collapse below this thickness on any axis.
const MIN_BOX_EXTENT: f32 = 0.02;
/// Vertical bob of a walking actor, as a fraction of its height.
const WALK_BOB: f32 = 0.03;

#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub(crate) struct Uniforms {
    pub view_proj: [[f32; 4]; 4],
    /// SampleRadius, Beta, Eps, Sigma.
    pub params: [f32; 4],
    pub ambient: [f32; 4],
    /// Direction towards the light.
    pub light_dir: [f32; 4],
    pub light_color: [f32; 4],
    pub fog_color: [f32; 4],
    /// x = start, y = end.
    pub fog_range: [f32; 4],
    pub camera_pos: [f32; 4],
}

#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub(crate) struct Vertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
}

#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub(crate) struct InstanceData {
    pub model_0: [f32; 4],
    pub model_1: [f32; 4],
    pub model_2: [f32; 4],
    pub model_3: [f32; 4],
    pub color: [f32; 4],
}

impl Vertex {
    const ATTRIBUTES: [wgpu::VertexAttribute; 2] =
        wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x3];

    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Self>() as u64,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBUTES,
        }
    }
}

impl InstanceData {
    const ATTRIBUTES: [wgpu::VertexAttribute; 5] = wgpu::vertex_attr_array![
        2 => Float32x4,
        3 => Float32x4,
        4 => Float32x4,
        5 => Float32x4,
        6 => Float32x4,
    ];

    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Self>() as u64,
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &Self::ATTRIBUTES,
        }
    }

    fn new(model: Mat4, color: Color) -> Self {
        let cols = model.to_cols_array_2d();
        Self {
            model_0: cols[0],
            model_1: cols[1],
            model_2: cols[2],
            model_3: cols[3],
            color: color.to_array(),
        }
    }
}

#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub(crate) struct LineVertex {
    pub position: [f32; 3],
    pub color: [f32; 4],
}

impl LineVertex {
    const ATTRIBUTES: [wgpu::VertexAttribute; 2] =
        wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x4];

    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Self>() as u64,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBUTES,
        }
    }
}

fn camera_of(view: &RenderView<'_>) -> (Transform, Camera) {
    let transform = view.scene.transform(view.camera).copied().unwrap_or_default();
    let camera = view
        .components
        .get_camera(view.camera)
        .copied()
        .unwrap_or_default();
    (transform, camera)
}

/// The zone around the camera, or the default zone.
pub(crate) fn active_zone(view: &RenderView<'_>) -> Zone {
    let (transform, _) = camera_of(view);
    view.components
        .zone_at(transform.position)
        .copied()
        .unwrap_or_default()
}

pub(crate) fn build_uniforms(view: &RenderView<'_>, frame: &FrameRenderer, aspect: f32) -> Uniforms {
    let (cam_transform, camera) = camera_of(view);
    let zone = active_zone(view);

    let (light_dir, light_color) = view
        .components
        .lights()
        .iter()
        .find_map(|(id, light)| {
            let t = view.scene.transform(*id)?;
            Some((-t.forward(), light.color))
        })
        .unwrap_or((Vec3::Y, Color::BLACK));

    let p = cam_transform.position;
    Uniforms {
        view_proj: camera
            .view_projection(&cam_transform, aspect)
            .to_cols_array_2d(),
        params: frame.params().to_array(),
        ambient: zone.ambient_color.to_array(),
        light_dir: light_dir.extend(0.0).to_array(),
        light_color: light_color.to_array(),
        fog_color: zone.fog_color.to_array(),
        fog_range: [zone.fog_start, zone.fog_end, 0.0, 0.0],
        camera_pos: [p.x, p.y, p.z, 1.0],
    }
}

/// Model matrix mapping the unit cube onto `bounds` in the node's space.
fn box_matrix(node: &Transform, bounds: &Aabb, lift: f32) -> Mat4 {
    let size = bounds.size().max(Vec3::splat(MIN_BOX_EXTENT));
    let center = bounds.center() + Vec3::Y * lift;
    node.matrix() * Mat4::from_scale_rotation_translation(size, glam::Quat::IDENTITY, center)
}

/// One box per static and animated model, at most `max` of them.
pub(crate) fn build_instances(view: &RenderView<'_>, max: usize) -> Vec<InstanceData> {
    let scene = view.scene;
    let components = view.components;

    let statics = components.static_models().iter().filter_map(|(id, model)| {
        let t = scene.transform(*id)?;
        Some(InstanceData::new(box_matrix(t, &model.bounds, 0.0), model.color))
    });

    let animated = components.animated_models().iter().filter_map(|(id, model)| {
        let t = scene.transform(*id)?;
        let lift = model
            .animation_states()
            .first()
            .map(|s| (s.phase() * std::f32::consts::TAU).sin().abs() * WALK_BOB * model.bounds.size().y)
            .unwrap_or(0.0);
        Some(InstanceData::new(box_matrix(t, &model.bounds, lift), model.color))
    });

    statics.chain(animated).take(max).collect()
}

/// Unit cube centred on the origin, four vertices per face so each face
/// carries its own normal. Faces wind counter-clockwise seen from outside.
pub(crate) fn cube_mesh() -> (Vec<Vertex>, Vec<u16>) {
    let normals = [Vec3::Z, Vec3::NEG_Z, Vec3::X, Vec3::NEG_X, Vec3::Y, Vec3::NEG_Y];
    let corners = [(-1.0, -1.0), (1.0, -1.0), (1.0, 1.0), (-1.0, 1.0)];

    let mut vertices = Vec::with_capacity(24);
    let mut indices = Vec::with_capacity(36);
    for n in normals {
        let u = if n.y.abs() > 0.5 { Vec3::X } else { Vec3::Y.cross(n) };
        let v = n.cross(u);
        let base = vertices.len() as u16;
        for (s, t) in corners {
            vertices.push(Vertex {
                position: ((n + u * s + v * t) * 0.5).to_array(),
                normal: n.to_array(),
            });
        }
        indices.extend([0, 1, 2, 2, 3, 0].map(|i| base + i));
    }
    (vertices, indices)
}

/// Floor grid on the XZ plane, lifted slightly above the ground plane.
pub(crate) fn grid_vertices(half_extent: i32, spacing: f32) -> Vec<LineVertex> {
    let color = [0.35, 0.35, 0.4, 1.0];
    let extent = half_extent as f32 * spacing;
    let y = MIN_BOX_EXTENT;
    let mut verts = Vec::with_capacity((half_extent as usize * 2 + 1) * 4);
    for i in -half_extent..=half_extent {
        let offset = i as f32 * spacing;
        verts.push(LineVertex { position: [-extent, y, offset], color });
        verts.push(LineVertex { position: [extent, y, offset], color });
        verts.push(LineVertex { position: [offset, y, -extent], color });
        verts.push(LineVertex { position: [offset, y, extent], color });
    }
    verts
}

pub(crate) fn line_vertices(lines: &[DebugLine]) -> Vec<LineVertex> {
    lines
        .iter()
        .flat_map(|l| {
            let color = l.color.to_array();
            [
                LineVertex { position: l.start.to_array(), color },
                LineVertex { position: l.end.to_array(), color },
            ]
        })
        .collect()
}

/// Keep at most `max` vertices, dropping whole lines past the cap.
pub(crate) fn cap_line_vertices(mut verts: Vec<LineVertex>, max: usize) -> Vec<LineVertex> {
    if verts.len() > max {
        let kept = max - max % 2;
        tracing::warn!(
            lines = verts.len() / 2,
            drawn = kept / 2,
            "debug line buffer full, dropping lines"
        );
        verts.truncate(kept);
    }
    verts
}

pub(crate) fn clear_color(zone: &Zone) -> wgpu::Color {
    wgpu::Color {
        r: zone.fog_color.r as f64,
        g: zone.fog_color.g as f64,
        b: zone.fog_color.b as f64,
        a: 1.0,
    }
}
