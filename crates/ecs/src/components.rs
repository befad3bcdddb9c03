use crate::animation::AnimationState;
use crowdwalk_common::{Aabb, Color, Transform};
use glam::Mat4;
use serde::{Deserialize, Serialize};

/// A handle referencing a model asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ModelHandle(pub u64);

/// A handle referencing a material asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MaterialHandle(pub u64);

/// A handle referencing an animation asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AnimationHandle(pub u64);

/// Non-skinned drawable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StaticModel {
    pub model: ModelHandle,
    pub material: MaterialHandle,
    /// Model-space bounds, copied from the model resource.
    pub bounds: Aabb,
    /// Base colour, copied from the material resource.
    pub color: Color,
    pub cast_shadows: bool,
}

/// Skinned drawable with zero or more animation states.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnimatedModel {
    pub model: ModelHandle,
    pub material: MaterialHandle,
    pub bounds: Aabb,
    pub color: Color,
    pub cast_shadows: bool,
    states: Vec<AnimationState>,
}

impl AnimatedModel {
    pub fn new(model: ModelHandle, material: MaterialHandle, bounds: Aabb, color: Color) -> Self {
        Self {
            model,
            material,
            bounds,
            color,
            cast_shadows: false,
            states: Vec::new(),
        }
    }

    /// Add a playback state for `animation` and return it for configuration.
    pub fn add_animation_state(
        &mut self,
        animation: AnimationHandle,
        name: impl Into<String>,
        length: f32,
    ) -> &mut AnimationState {
        self.states.push(AnimationState::new(animation, name, length));
        let last = self.states.len() - 1;
        &mut self.states[last]
    }

    pub fn animation_states(&self) -> &[AnimationState] {
        &self.states
    }

    pub fn num_animation_states(&self) -> usize {
        self.states.len()
    }

    pub fn first_state_mut(&mut self) -> Option<&mut AnimationState> {
        self.states.first_mut()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LightKind {
    Directional,
    Point,
    Spot,
}

/// Depth bias used when rendering shadow maps.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BiasParameters {
    pub constant: f32,
    pub slope_scaled: f32,
}

impl Default for BiasParameters {
    fn default() -> Self {
        Self {
            constant: 0.0002,
            slope_scaled: 0.5,
        }
    }
}

/// Cascade split distances for directional light shadows.
///
/// Splits of zero are unused. Shadows fade out from `fade_start` (a fraction
/// of the furthest split) to the furthest split.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CascadeParameters {
    pub splits: [f32; 4],
    pub fade_start: f32,
}

impl CascadeParameters {
    pub fn new(split1: f32, split2: f32, split3: f32, split4: f32, fade_start: f32) -> Self {
        Self {
            splits: [split1, split2, split3, split4],
            fade_start: fade_start.clamp(0.0, 1.0),
        }
    }

    /// Number of cascades actually in use.
    pub fn cascade_count(&self) -> usize {
        self.splits.iter().take_while(|s| **s > 0.0).count()
    }

    /// Distance at which shadows end.
    pub fn shadow_range(&self) -> f32 {
        self.splits[..self.cascade_count()]
            .last()
            .copied()
            .unwrap_or(0.0)
    }
}

impl Default for CascadeParameters {
    fn default() -> Self {
        Self::new(1000.0, 0.0, 0.0, 0.0, 0.8)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Light {
    pub kind: LightKind,
    pub color: Color,
    pub cast_shadows: bool,
    pub shadow_bias: BiasParameters,
    pub shadow_cascade: CascadeParameters,
}

impl Light {
    pub fn directional(color: Color) -> Self {
        Self {
            kind: LightKind::Directional,
            color,
            cast_shadows: false,
            shadow_bias: BiasParameters::default(),
            shadow_cascade: CascadeParameters::default(),
        }
    }
}

/// Ambient lighting and fog for everything inside `bounds`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Zone {
    pub bounds: Aabb,
    pub ambient_color: Color,
    pub fog_color: Color,
    pub fog_start: f32,
    pub fog_end: f32,
}

impl Default for Zone {
    fn default() -> Self {
        Self {
            bounds: Aabb::uniform(-10.0, 10.0),
            ambient_color: Color::grey(0.1),
            fog_color: Color::BLACK,
            fog_start: 250.0,
            fog_end: 1000.0,
        }
    }
}

/// Perspective camera attached to a node.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Camera {
    pub fov_degrees: f32,
    pub near_clip: f32,
    pub far_clip: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            fov_degrees: 45.0,
            near_clip: 0.1,
            far_clip: 1000.0,
        }
    }
}

impl Camera {
    /// View matrix for a camera placed at `node`. Left-handed, looking down +Z.
    pub fn view_matrix(&self, node: &Transform) -> Mat4 {
        Mat4::look_to_lh(node.position, node.forward(), node.up())
    }

    pub fn projection_matrix(&self, aspect: f32) -> Mat4 {
        Mat4::perspective_lh(
            self.fov_degrees.to_radians(),
            aspect.max(1e-3),
            self.near_clip,
            self.far_clip,
        )
    }

    pub fn view_projection(&self, node: &Transform, aspect: f32) -> Mat4 {
        self.projection_matrix(aspect) * self.view_matrix(node)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::{Vec3, Vec4Swizzles};

    #[test]
    fn add_animation_state_returns_new_state() {
        let mut model = AnimatedModel::new(
            ModelHandle(1),
            MaterialHandle(2),
            Aabb::uniform(-1.0, 1.0),
            Color::WHITE,
        );
        let state = model.add_animation_state(AnimationHandle(3), "Walk", 1.5);
        state.set_weight(1.0);
        assert_eq!(model.num_animation_states(), 1);
        assert_eq!(model.animation_states()[0].weight(), 1.0);
        assert!(model.first_state_mut().is_some());
    }

    #[test]
    fn cascade_range_uses_last_active_split() {
        let c = CascadeParameters::new(10.0, 50.0, 200.0, 0.0, 0.8);
        assert_eq!(c.cascade_count(), 3);
        assert_eq!(c.shadow_range(), 200.0);
        assert_eq!(CascadeParameters::new(0.0, 0.0, 0.0, 0.0, 0.5).shadow_range(), 0.0);
    }

    #[test]
    fn camera_projects_point_ahead_into_clip_volume() {
        let cam = Camera {
            far_clip: 50.0,
            ..Camera::default()
        };
        let node = Transform::from_position(Vec3::new(0.0, 5.0, 0.0));
        let vp = cam.view_projection(&node, 16.0 / 9.0);
        let clip = vp * Vec3::new(0.0, 5.0, 10.0).extend(1.0);
        let ndc = clip.xyz() / clip.w;
        assert!(ndc.x.abs() < 1e-4);
        assert!(ndc.z > 0.0 && ndc.z < 1.0);
    }
}
