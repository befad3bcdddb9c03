//! The crowd-walk sample: a field of walking actors, a free-fly camera and a
//! debug panel of live-tunable shader parameters.
//!
//! # Invariants
//! - Within a frame, UI presses run first, then the general update (camera),
//!   then the scene update (movers), then the post-render hook.
//! - A missing walk animation degrades to a still actor; every other missing
//!   resource fails `SkeletalSample::start`.

pub mod camera;
pub mod config;
pub mod events;
pub mod sample;
pub mod spawner;

pub use camera::CameraController;
pub use config::{ActorConfig, CameraConfig, ConfigError, PanelConfig, SampleConfig};
pub use events::{EventQueue, FrameContext, SampleEvent, UiEvent};
pub use sample::{load_resources, SampleError, SkeletalSample};
pub use spawner::{create_scene, spawn_actors, ActorSpawn, SpawnedScene, ACTOR_NAME, CAMERA_NAME};

pub fn crate_info() -> &'static str {
    "crowdwalk-sample v0.1.0"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crate_loads() {
        assert!(crate_info().contains("sample"));
    }
}
