use crate::state::{InputSource, Key};
use serde::{Deserialize, Serialize};

/// A camera or sample action that can be bound to a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    MoveForward,
    MoveBack,
    MoveLeft,
    MoveRight,
    ToggleDebugGeometry,
}

/// Key assignment for each [`Action`]. Defaults to WASD and Space.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeyBindings {
    pub forward: Key,
    pub back: Key,
    pub left: Key,
    pub right: Key,
    pub toggle_debug: Key,
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self {
            forward: Key::W,
            back: Key::S,
            left: Key::A,
            right: Key::D,
            toggle_debug: Key::Space,
        }
    }
}

impl KeyBindings {
    pub fn key_for(&self, action: Action) -> Key {
        match action {
            Action::MoveForward => self.forward,
            Action::MoveBack => self.back,
            Action::MoveLeft => self.left,
            Action::MoveRight => self.right,
            Action::ToggleDebugGeometry => self.toggle_debug,
        }
    }

    /// True while the key bound to `action` is held.
    pub fn held(&self, input: &dyn InputSource, action: Action) -> bool {
        input.key_down(self.key_for(action))
    }

    /// True in the frame the key bound to `action` went down.
    pub fn pressed(&self, input: &dyn InputSource, action: Action) -> bool {
        input.key_pressed(self.key_for(action))
    }
}
