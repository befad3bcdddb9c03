//! Per-actor movement: walk forward, steer back inside bounds, advance the walk cycle.

use crate::ComponentStore;
use crowdwalk_common::{Aabb, Transform};
use crowdwalk_scene::Scene;
use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Moves a node along its facing direction and turns it while it is outside
/// `bounds` on the ground plane.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Mover {
    /// World units per second.
    pub move_speed: f32,
    /// Degrees per second, applied only while out of bounds.
    pub rotation_speed: f32,
    pub bounds: Aabb,
}

impl Mover {
    pub fn new(move_speed: f32, rotation_speed: f32, bounds: Aabb) -> Self {
        Self {
            move_speed,
            rotation_speed,
            bounds,
        }
    }

    /// Advance `transform` by one time step. Returns true if the node had to turn.
    pub fn step(&self, transform: &mut Transform, time_step: f32) -> bool {
        transform.translate_local(Vec3::Z * self.move_speed * time_step);
        if self.bounds.contains_planar(transform.position) {
            return false;
        }
        transform.yaw_local(self.rotation_speed * time_step);
        true
    }
}

/// Run every mover in the store for one scene update.
///
/// Each moved node's first animation state (if any) is advanced by the same
/// time step. Returns the number of nodes moved.
pub fn update_movers(scene: &mut Scene, components: &mut ComponentStore, time_step: f32) -> usize {
    let (movers, models) = components.movers_and_models_mut();
    let mut moved = 0;
    for (id, mover) in movers.iter() {
        let Some(transform) = scene.transform_mut(*id) else {
            continue;
        };
        mover.step(transform, time_step);
        moved += 1;

        if let Some(state) = models.get_mut(id).and_then(|m| m.first_state_mut()) {
            state.add_time(time_step);
        }
    }
    scene.advance_frame();
    tracing::trace!(frame = scene.frame(), moved, time_step, "movers updated");
    moved
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{AnimatedModel, AnimationHandle, MaterialHandle, ModelHandle};
    use crowdwalk_common::{rotation_from_euler_degrees, Color, EntityId};

    fn mover() -> Mover {
        Mover::new(2.0, 100.0, Aabb::planar(20.0))
    }

    #[test]
    fn inside_bounds_walks_straight() {
        let mut t = Transform::default();
        let turned = mover().step(&mut t, 0.5);
        assert!(!turned);
        assert!((t.position - Vec3::new(0.0, 0.0, 1.0)).length() < 1e-5);
        assert!((t.forward() - Vec3::Z).length() < 1e-5);
    }

    #[test]
    fn outside_bounds_turns_at_rotation_speed() {
        let mut t = Transform::from_position(Vec3::new(0.0, 0.0, 20.5));
        let turned = mover().step(&mut t, 0.9);
        assert!(turned);
        // 100 deg/s for 0.9 s = 90 degrees to the right.
        assert!((t.forward() - Vec3::X).length() < 1e-4);
    }

    #[test]
    fn keeps_walking_while_steering_back() {
        let mut t = Transform::from_position(Vec3::new(0.0, 0.0, 19.9))
            .with_rotation(rotation_from_euler_degrees(0.0, 0.0, 0.0));
        let m = mover();
        let mut turned_frames = 0;
        for _ in 0..600 {
            if m.step(&mut t, 1.0 / 60.0) {
                turned_frames += 1;
            }
        }
        assert!(turned_frames > 0);
        // Never wanders far beyond the bounds.
        assert!(t.position.x.abs() < 25.0 && t.position.z.abs() < 25.0);
    }

    #[test]
    fn update_movers_advances_animation() {
        let mut scene = Scene::new();
        let mut store = ComponentStore::new();

        let id = scene.create_child("Jill", Transform::default());
        let mut model = AnimatedModel::new(
            ModelHandle(0),
            MaterialHandle(0),
            Aabb::uniform(-0.5, 0.5),
            Color::WHITE,
        );
        let state = model.add_animation_state(AnimationHandle(1), "Walk", 1.0);
        state.set_looped(true);
        state.set_time(0.75);
        store.set_animated_model(id, model);
        store.set_mover(id, mover());

        let moved = update_movers(&mut scene, &mut store, 0.5);
        assert_eq!(moved, 1);
        assert_eq!(scene.frame(), 1);
        let time = store.get_animated_model(id).unwrap().animation_states()[0].time();
        assert!((time - 0.25).abs() < 1e-6);
        assert!((scene.transform(id).unwrap().position.z - 1.0).abs() < 1e-5);
    }

    #[test]
    fn mover_without_animation_still_moves() {
        let mut scene = Scene::new();
        let mut store = ComponentStore::new();
        let id = scene.create_child("Jill", Transform::default());
        store.set_animated_model(
            id,
            AnimatedModel::new(
                ModelHandle(0),
                MaterialHandle(0),
                Aabb::uniform(-0.5, 0.5),
                Color::WHITE,
            ),
        );
        store.set_mover(id, mover());

        update_movers(&mut scene, &mut store, 1.0);
        assert!((scene.transform(id).unwrap().position.z - 2.0).abs() < 1e-5);
    }

    #[test]
    fn movers_without_a_node_are_skipped() {
        let mut scene = Scene::new();
        let mut store = ComponentStore::new();
        let id = scene.create_child("Jill", Transform::default());
        store.set_mover(id, mover());
        store.set_mover(EntityId::new(), mover());

        assert_eq!(update_movers(&mut scene, &mut store, 0.5), 1);
        assert_eq!(scene.frame(), 1);
    }
}
