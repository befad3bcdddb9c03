use crate::components::AnimationHandle;
use serde::{Deserialize, Serialize};

/// Playback cursor for one animation on an animated model.
///
/// Time is kept in `[0, length]`. Looped states wrap on `add_time`,
/// non-looped states stop at either end.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnimationState {
    pub animation: AnimationHandle,
    pub name: String,
    length: f32,
    time: f32,
    weight: f32,
    looped: bool,
}

impl AnimationState {
    /// New state at time zero, weight zero, not looped.
    pub fn new(animation: AnimationHandle, name: impl Into<String>, length: f32) -> Self {
        Self {
            animation,
            name: name.into(),
            length: length.max(0.0),
            time: 0.0,
            weight: 0.0,
            looped: false,
        }
    }

    pub fn length(&self) -> f32 {
        self.length
    }

    pub fn time(&self) -> f32 {
        self.time
    }

    pub fn weight(&self) -> f32 {
        self.weight
    }

    pub fn is_looped(&self) -> bool {
        self.looped
    }

    pub fn set_weight(&mut self, weight: f32) {
        self.weight = weight.clamp(0.0, 1.0);
    }

    pub fn set_looped(&mut self, looped: bool) {
        self.looped = looped;
    }

    pub fn set_time(&mut self, time: f32) {
        self.time = time.clamp(0.0, self.length);
    }

    /// Advance the cursor by `delta` seconds (may be negative).
    pub fn add_time(&mut self, delta: f32) {
        if delta == 0.0 || self.length <= 0.0 {
            return;
        }
        let mut time = self.time + delta;
        if self.looped {
            time = time.rem_euclid(self.length);
            if time >= self.length {
                time = 0.0;
            }
        }
        self.set_time(time);
    }

    /// Position in the cycle as a fraction in `[0, 1]`.
    pub fn phase(&self) -> f32 {
        if self.length > 0.0 {
            self.time / self.length
        } else {
            0.0
        }
    }
}
