use glam::Vec2;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Keys the sample can bind. The front-end maps window-system key codes here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Key {
    W,
    A,
    S,
    D,
    Q,
    E,
    Space,
    Up,
    Down,
    Left,
    Right,
    F1,
    F2,
    Escape,
}

/// Read-only view of this frame's input.
pub trait InputSource {
    /// True while the key is held.
    fn key_down(&self, key: Key) -> bool;
    /// True only in the frame the key went down.
    fn key_pressed(&self, key: Key) -> bool;
    /// Mouse motion in pixels accumulated since the last frame.
    fn mouse_move(&self) -> Vec2;
}

/// Polled keyboard and mouse state.
#[derive(Debug, Clone, Default)]
pub struct InputState {
    keys_down: HashSet<Key>,
    keys_pressed: HashSet<Key>,
    mouse_move: Vec2,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a key transition. Repeated "down" events while the key is held
    /// (auto-repeat) do not count as new presses.
    pub fn set_key(&mut self, key: Key, down: bool) {
        if down {
            if self.keys_down.insert(key) {
                self.keys_pressed.insert(key);
            }
        } else {
            self.keys_down.remove(&key);
        }
    }

    /// Add relative mouse motion in pixels.
    pub fn add_mouse_move(&mut self, dx: f32, dy: f32) {
        self.mouse_move += Vec2::new(dx, dy);
    }

    /// Clear per-frame state: presses and accumulated mouse motion.
    pub fn end_frame(&mut self) {
        self.keys_pressed.clear();
        self.mouse_move = Vec2::ZERO;
    }

    /// Release everything, e.g. when the window loses focus.
    pub fn reset(&mut self) {
        self.keys_down.clear();
        self.end_frame();
    }
}

impl InputSource for InputState {
    fn key_down(&self, key: Key) -> bool {
        self.keys_down.contains(&key)
    }

    fn key_pressed(&self, key: Key) -> bool {
        self.keys_pressed.contains(&key)
    }

    fn mouse_move(&self) -> Vec2 {
        self.mouse_move
    }
}
