//! Shared types used across the crowdwalk workspace.

mod types;

pub use types::{rotation_from_euler_degrees, Aabb, Color, EntityId, Transform};
