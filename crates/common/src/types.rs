use glam::{Mat3, Mat4, Quat, Vec3};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a node in the scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityId(pub Uuid);

impl EntityId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// First eight hex digits, used in logs and text dumps.
    pub fn short(&self) -> String {
        self.0.to_string()[..8].to_string()
    }
}

impl Default for EntityId {
    fn default() -> Self {
        Self::new()
    }
}

/// Build a rotation from Euler angles in degrees.
///
/// Yaw is applied about world up, then pitch about the local right axis, then
/// roll about the local forward axis. Forward is +Z, right is +X, up is +Y.
pub fn rotation_from_euler_degrees(pitch: f32, yaw: f32, roll: f32) -> Quat {
    Quat::from_euler(
        glam::EulerRot::YXZ,
        yaw.to_radians(),
        pitch.to_radians(),
        roll.to_radians(),
    )
}

/// Spatial transform: position, rotation, scale.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
        }
    }
}

impl Transform {
    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            ..Self::default()
        }
    }

    pub fn with_rotation(mut self, rotation: Quat) -> Self {
        self.rotation = rotation;
        self
    }

    pub fn with_scale(mut self, scale: Vec3) -> Self {
        self.scale = scale;
        self
    }

    /// Local +Z in world space.
    pub fn forward(&self) -> Vec3 {
        self.rotation * Vec3::Z
    }

    /// Local +X in world space.
    pub fn right(&self) -> Vec3 {
        self.rotation * Vec3::X
    }

    /// Local +Y in world space.
    pub fn up(&self) -> Vec3 {
        self.rotation * Vec3::Y
    }

    /// Move by `delta` expressed in the local frame. Scale is not applied.
    pub fn translate_local(&mut self, delta: Vec3) {
        self.position += self.rotation * delta;
    }

    /// Rotate about the local up axis.
    pub fn yaw_local(&mut self, degrees: f32) {
        self.rotation = (self.rotation * Quat::from_rotation_y(degrees.to_radians())).normalize();
    }

    /// Point local +Z along `direction`, keeping local up as close to world up
    /// as possible. A zero direction leaves the rotation untouched.
    pub fn set_direction(&mut self, direction: Vec3) {
        let forward = direction.normalize_or_zero();
        if forward == Vec3::ZERO {
            return;
        }
        let right = Vec3::Y.cross(forward);
        if right.length_squared() < 1e-8 {
            self.rotation = Quat::from_rotation_arc(Vec3::Z, forward);
            return;
        }
        let right = right.normalize();
        let up = forward.cross(right);
        self.rotation = Quat::from_mat3(&Mat3::from_cols(right, up, forward)).normalize();
    }

    pub fn matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.position)
    }
}

/// Axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self {
            min: min.min(max),
            max: min.max(max),
        }
    }

    /// Cube spanning `[min, max]` on every axis.
    pub fn uniform(min: f32, max: f32) -> Self {
        Self::new(Vec3::splat(min), Vec3::splat(max))
    }

    /// Flat square on the ground plane, `half_extent` each side of the origin.
    pub fn planar(half_extent: f32) -> Self {
        Self::new(
            Vec3::new(-half_extent, 0.0, -half_extent),
            Vec3::new(half_extent, 0.0, half_extent),
        )
    }

    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }

    /// True if `point` lies inside the box on the X and Z axes. Y is ignored.
    pub fn contains_planar(&self, point: Vec3) -> bool {
        point.x >= self.min.x
            && point.x <= self.max.x
            && point.z >= self.min.z
            && point.z <= self.max.z
    }

    pub fn corners(&self) -> [Vec3; 8] {
        let (a, b) = (self.min, self.max);
        [
            Vec3::new(a.x, a.y, a.z),
            Vec3::new(b.x, a.y, a.z),
            Vec3::new(b.x, a.y, b.z),
            Vec3::new(a.x, a.y, b.z),
            Vec3::new(a.x, b.y, a.z),
            Vec3::new(b.x, b.y, a.z),
            Vec3::new(b.x, b.y, b.z),
            Vec3::new(a.x, b.y, b.z),
        ]
    }

    /// World-space box enclosing this box after `matrix` is applied.
    pub fn transformed(&self, matrix: &Mat4) -> Self {
        let corners = self.corners().map(|c| matrix.transform_point3(c));
        let mut min = corners[0];
        let mut max = corners[0];
        for c in &corners[1..] {
            min = min.min(*c);
            max = max.max(*c);
        }
        Self { min, max }
    }
}

/// Linear RGBA colour.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const WHITE: Self = Self::rgb(1.0, 1.0, 1.0);
    pub const BLACK: Self = Self::rgb(0.0, 0.0, 0.0);

    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    pub const fn grey(v: f32) -> Self {
        Self::rgb(v, v, v)
    }

    pub fn to_array(self) -> [f32; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::WHITE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: Vec3, b: Vec3) -> bool {
        (a - b).length() < 1e-5
    }

    #[test]
    fn entity_id_uniqueness() {
        let a = EntityId::new();
        let b = EntityId::new();
        assert_ne!(a, b);
        assert_eq!(a.short().len(), 8);
    }

    #[test]
    fn transform_default_is_identity() {
        let t = Transform::default();
        assert_eq!(t.position, Vec3::ZERO);
        assert_eq!(t.rotation, Quat::IDENTITY);
        assert_eq!(t.scale, Vec3::ONE);
    }

    #[test]
    fn positive_yaw_turns_forward_toward_right() {
        let q = rotation_from_euler_degrees(0.0, 90.0, 0.0);
        assert!(approx(q * Vec3::Z, Vec3::X));
    }

    #[test]
    fn positive_pitch_looks_down() {
        let q = rotation_from_euler_degrees(90.0, 0.0, 0.0);
        assert!(approx(q * Vec3::Z, Vec3::NEG_Y));
    }

    #[test]
    fn translate_local_follows_rotation() {
        let mut t = Transform::default().with_rotation(rotation_from_euler_degrees(0.0, 90.0, 0.0));
        t.translate_local(Vec3::Z * 2.0);
        assert!(approx(t.position, Vec3::new(2.0, 0.0, 0.0)));
    }

    #[test]
    fn yaw_local_accumulates() {
        let mut t = Transform::default();
        t.yaw_local(45.0);
        t.yaw_local(45.0);
        assert!(approx(t.forward(), Vec3::X));
    }

    #[test]
    fn set_direction_points_forward() {
        let mut t = Transform::default();
        let dir = Vec3::new(0.6, -1.0, 0.8);
        t.set_direction(dir);
        assert!(approx(t.forward(), dir.normalize()));

        t.set_direction(Vec3::NEG_Y);
        assert!(approx(t.forward(), Vec3::NEG_Y));

        let before = t.rotation;
        t.set_direction(Vec3::ZERO);
        assert_eq!(t.rotation, before);
    }

    #[test]
    fn planar_containment_ignores_height() {
        let b = Aabb::planar(20.0);
        assert!(b.contains_planar(Vec3::new(19.9, 100.0, -20.0)));
        assert!(!b.contains_planar(Vec3::new(20.1, 0.0, 0.0)));
    }

    #[test]
    fn transformed_box_encloses_translated_corners() {
        let b = Aabb::uniform(-1.0, 1.0);
        let m = Mat4::from_translation(Vec3::new(5.0, 0.0, 0.0));
        let t = b.transformed(&m);
        assert!(approx(t.min, Vec3::new(4.0, -1.0, -1.0)));
        assert!(approx(t.max, Vec3::new(6.0, 1.0, 1.0)));
    }
}
