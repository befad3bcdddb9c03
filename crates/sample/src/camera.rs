use crate::config::CameraConfig;
use crowdwalk_common::{rotation_from_euler_degrees, Transform};
use crowdwalk_input::{Action, InputSource, KeyBindings};
use glam::Vec3;

const PITCH_LIMIT: f32 = 90.0;

/// Free-fly camera driven by mouse look and held movement keys.
///
/// Owns yaw and pitch; the camera node's transform holds the position. Also
/// owns the debug geometry toggle, which shares the camera's input gating.
#[derive(Debug, Clone)]
pub struct CameraController {
    yaw: f32,
    pitch: f32,
    move_speed: f32,
    sensitivity: f32,
    bindings: KeyBindings,
    draw_debug: bool,
}

impl CameraController {
    pub fn new(config: &CameraConfig, bindings: KeyBindings) -> Self {
        Self {
            yaw: 0.0,
            pitch: 0.0,
            move_speed: config.move_speed,
            sensitivity: config.sensitivity,
            bindings,
            draw_debug: false,
        }
    }

    pub fn yaw(&self) -> f32 {
        self.yaw
    }

    pub fn pitch(&self) -> f32 {
        self.pitch
    }

    pub fn draw_debug(&self) -> bool {
        self.draw_debug
    }

    /// Advance one frame.
    ///
    /// Does nothing while the UI holds input focus. Otherwise applies mouse
    /// look, then translates along the new local axes for each held movement
    /// key (unnormalized, so diagonals are faster), then flips the debug flag
    /// on a fresh toggle press.
    pub fn update(
        &mut self,
        node: &mut Transform,
        input: &dyn InputSource,
        ui_focus: bool,
        time_step: f32,
    ) {
        if ui_focus {
            return;
        }

        let mouse = input.mouse_move();
        self.yaw += self.sensitivity * mouse.x;
        self.pitch = (self.pitch + self.sensitivity * mouse.y).clamp(-PITCH_LIMIT, PITCH_LIMIT);
        node.rotation = rotation_from_euler_degrees(self.pitch, self.yaw, 0.0);

        let distance = self.move_speed * time_step;
        let moves = [
            (Action::MoveForward, Vec3::Z),
            (Action::MoveBack, Vec3::NEG_Z),
            (Action::MoveLeft, Vec3::NEG_X),
            (Action::MoveRight, Vec3::X),
        ];
        for (action, axis) in moves {
            if self.bindings.held(input, action) {
                node.translate_local(axis * distance);
            }
        }

        if self.bindings.pressed(input, Action::ToggleDebugGeometry) {
            self.draw_debug = !self.draw_debug;
            tracing::debug!(draw_debug = self.draw_debug, "debug geometry toggled");
        }
    }
}
