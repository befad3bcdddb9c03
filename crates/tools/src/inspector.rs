use crowdwalk_common::EntityId;
use crowdwalk_ecs::ComponentStore;
use crowdwalk_scene::Scene;

/// Scene inspector for developer tooling.
///
/// Read-only queries against the scene and its components, used by the CLI
/// dumps and the desktop overlay.
pub struct SceneInspector;

impl SceneInspector {
    /// Produce a summary of the scene state.
    pub fn summary(scene: &Scene, components: &ComponentStore) -> SceneSummary {
        SceneSummary {
            frame: scene.frame(),
            node_count: scene.node_count(),
            animated_models: components.animated_models().len(),
            movers: components.movers().len(),
            lights: components.lights().len(),
        }
    }

    /// Position, heading and walk-cycle time of one node.
    pub fn inspect_entity(
        scene: &Scene,
        components: &ComponentStore,
        id: EntityId,
    ) -> Option<EntityInfo> {
        let node = scene.get(id)?;
        let p = node.transform.position;
        let f = node.transform.forward();
        let animation_time = components
            .get_animated_model(id)
            .and_then(|m| m.animation_states().first())
            .map(|s| s.time());
        Some(EntityInfo {
            id,
            name: node.name.clone(),
            position: [p.x, p.y, p.z],
            yaw_degrees: f.x.atan2(f.z).to_degrees(),
            animation_time,
        })
    }

    /// All nodes with the given name, in creation order.
    pub fn list_named(scene: &Scene, name: &str) -> Vec<EntityId> {
        scene.find_by_name(name).collect()
    }
}

/// Summary of scene state for the inspector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SceneSummary {
    pub frame: u64,
    pub node_count: usize,
    pub animated_models: usize,
    pub movers: usize,
    pub lights: usize,
}

impl std::fmt::Display for SceneSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Scene: frame={} nodes={} animated={} movers={} lights={}",
            self.frame, self.node_count, self.animated_models, self.movers, self.lights
        )
    }
}

/// Detailed info about a single node.
#[derive(Debug, Clone)]
pub struct EntityInfo {
    pub id: EntityId,
    pub name: String,
    pub position: [f32; 3],
    /// Heading around +Y; 0 faces +Z, 90 faces +X.
    pub yaw_degrees: f32,
    pub animation_time: Option<f32>,
}

impl std::fmt::Display for EntityInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} [{}] pos=({:.2}, {:.2}, {:.2}) yaw={:.1}",
            self.name,
            self.id.short(),
            self.position[0],
            self.position[1],
            self.position[2],
            self.yaw_degrees,
        )?;
        if let Some(t) = self.animation_time {
            write!(f, " anim={t:.3}s")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crowdwalk_common::{rotation_from_euler_degrees, Aabb, Color, Transform};
    use crowdwalk_ecs::{AnimatedModel, AnimationHandle, MaterialHandle, ModelHandle, Mover};
    use glam::Vec3;

    fn walker(scene: &mut Scene, components: &mut ComponentStore, yaw: f32) -> EntityId {
        let id = scene.create_child(
            "Jill",
            Transform::from_position(Vec3::new(3.0, 0.0, -4.0))
                .with_rotation(rotation_from_euler_degrees(0.0, yaw, 0.0)),
        );
        let mut model = AnimatedModel::new(
            ModelHandle(1),
            MaterialHandle(2),
            Aabb::uniform(-1.0, 1.0),
            Color::WHITE,
        );
        let state = model.add_animation_state(AnimationHandle(3), "Walk", 2.0);
        state.set_looped(true);
        state.set_time(0.5);
        components.set_animated_model(id, model);
        components.set_mover(id, Mover::new(2.0, 100.0, Aabb::planar(20.0)));
        id
    }

    #[test]
    fn summary_counts_components() {
        let mut scene = Scene::new();
        let mut components = ComponentStore::new();
        walker(&mut scene, &mut components, 0.0);
        walker(&mut scene, &mut components, 0.0);
        scene.create_child("Camera", Transform::default());

        let summary = SceneInspector::summary(&scene, &components);
        assert_eq!(summary.node_count, 3);
        assert_eq!(summary.animated_models, 2);
        assert_eq!(summary.movers, 2);
        assert_eq!(summary.lights, 0);
        assert!(summary.to_string().starts_with("Scene: frame=0 nodes=3"));
    }

    #[test]
    fn inspect_reports_heading_and_animation() {
        let mut scene = Scene::new();
        let mut components = ComponentStore::new();
        let id = walker(&mut scene, &mut components, 90.0);

        let info = SceneInspector::inspect_entity(&scene, &components, id).unwrap();
        assert_eq!(info.name, "Jill");
        assert_eq!(info.position, [3.0, 0.0, -4.0]);
        assert!((info.yaw_degrees - 90.0).abs() < 1e-3);
        assert_eq!(info.animation_time, Some(0.5));
        assert!(info.to_string().contains("anim=0.500s"));
    }

    #[test]
    fn inspect_missing_node() {
        let scene = Scene::new();
        let components = ComponentStore::new();
        assert!(SceneInspector::inspect_entity(&scene, &components, EntityId::new()).is_none());
    }

    #[test]
    fn list_named_filters() {
        let mut scene = Scene::new();
        let mut components = ComponentStore::new();
        let a = walker(&mut scene, &mut components, 0.0);
        scene.create_child("Mushroom", Transform::default());
        let b = walker(&mut scene, &mut components, 0.0);
        assert_eq!(SceneInspector::list_named(&scene, "Jill"), vec![a, b]);
    }
}
