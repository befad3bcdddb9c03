/// Shared uniform block. Must match `frame::Uniforms`.
const UNIFORMS: &str = r#"
struct Uniforms {
    view_proj: mat4x4<f32>,
    params: vec4<f32>,
    ambient: vec4<f32>,
    light_dir: vec4<f32>,
    light_color: vec4<f32>,
    fog_color: vec4<f32>,
    fog_range: vec4<f32>,
    camera_pos: vec4<f32>,
};

@group(0) @binding(0)
var<uniform> uniforms: Uniforms;

fn fog_factor(world_pos: vec3<f32>) -> f32 {
    let d = distance(world_pos, uniforms.camera_pos.xyz);
    let span = max(uniforms.fog_range.y - uniforms.fog_range.x, 0.0001);
    return clamp((d - uniforms.fog_range.x) / span, 0.0, 1.0);
}
"#;

/// Instanced boxes for static and animated models.
///
/// The ambient term is darkened by a height-based obscurance estimate driven
/// by the tunable parameters: x = sample radius, y = beta, z = eps, w = sigma.
const SCENE_BODY: &str = r#"
struct VertexInput {
    @location(0) position: vec3<f32>,
    @location(1) normal: vec3<f32>,
};

struct InstanceInput {
    @location(2) model_0: vec4<f32>,
    @location(3) model_1: vec4<f32>,
    @location(4) model_2: vec4<f32>,
    @location(5) model_3: vec4<f32>,
    @location(6) color: vec4<f32>,
};

struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) world_normal: vec3<f32>,
    @location(1) world_pos: vec3<f32>,
    @location(2) color: vec4<f32>,
};

@vertex
fn vs_main(vertex: VertexInput, instance: InstanceInput) -> VertexOutput {
    let model = mat4x4<f32>(
        instance.model_0,
        instance.model_1,
        instance.model_2,
        instance.model_3,
    );
    let world_pos = model * vec4<f32>(vertex.position, 1.0);
    let world_normal = (model * vec4<f32>(vertex.normal, 0.0)).xyz;

    var out: VertexOutput;
    out.clip_position = uniforms.view_proj * world_pos;
    out.world_normal = normalize(world_normal);
    out.world_pos = world_pos.xyz;
    out.color = instance.color;
    return out;
}

fn obscurance(world_pos: vec3<f32>) -> f32 {
    let radius = max(uniforms.params.x, 0.0001);
    let beta = uniforms.params.y;
    let eps = uniforms.params.z;
    let sigma = uniforms.params.w;
    let h = max(world_pos.y, 0.0);
    let v_dot_n = max(radius - h, 0.0);
    let occlusion = 2.0 * sigma * max(v_dot_n + h * beta, 0.0) / (radius * radius + eps);
    return clamp(1.0 - occlusion, 0.0, 1.0);
}

@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
    let diffuse = max(dot(in.world_normal, normalize(uniforms.light_dir.xyz)), 0.0);
    let ambient = uniforms.ambient.rgb * obscurance(in.world_pos);
    let lit = in.color.rgb * (ambient + uniforms.light_color.rgb * diffuse);
    let rgb = mix(lit, uniforms.fog_color.rgb, fog_factor(in.world_pos));
    return vec4<f32>(rgb, in.color.a);
}
"#;

/// Unlit coloured lines: the floor grid and debug geometry.
const LINE_BODY: &str = r#"
struct LineVertex {
    @location(0) position: vec3<f32>,
    @location(1) color: vec4<f32>,
};

struct LineOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) color: vec4<f32>,
};

@vertex
fn vs_line(vertex: LineVertex) -> LineOutput {
    var out: LineOutput;
    out.clip_position = uniforms.view_proj * vec4<f32>(vertex.position, 1.0);
    out.color = vertex.color;
    return out;
}

@fragment
fn fs_line(in: LineOutput) -> @location(0) vec4<f32> {
    return in.color;
}
"#;

pub fn scene_shader() -> String {
    format!("{UNIFORMS}{SCENE_BODY}")
}

pub fn line_shader() -> String {
    format!("{UNIFORMS}{LINE_BODY}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shaders_share_the_uniform_block() {
        for src in [scene_shader(), line_shader()] {
            assert!(src.contains("struct Uniforms"));
            assert!(src.contains("camera_pos: vec4<f32>"));
        }
        assert!(scene_shader().contains("fn fs_main"));
        assert!(line_shader().contains("fn vs_line"));
    }
}
