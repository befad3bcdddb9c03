use crowdwalk_common::{Aabb, Color};
use crowdwalk_ecs::ComponentStore;
use crowdwalk_scene::Scene;
use glam::Vec3;

const STATIC_BOX_COLOR: Color = Color::rgb(0.0, 1.0, 0.0);
const ANIMATED_BOX_COLOR: Color = Color::rgb(0.0, 1.0, 1.0);
const BONE_COLOR: Color = Color::rgb(1.0, 1.0, 0.0);

/// A single world-space debug line.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DebugLine {
    pub start: Vec3,
    pub end: Vec3,
    pub color: Color,
}

/// Debug geometry for every drawable: world-space bounding boxes, and for
/// animated models a spine from feet to head plus a facing marker.
pub fn collect_debug_geometry(scene: &Scene, components: &ComponentStore) -> Vec<DebugLine> {
    let mut lines = Vec::new();

    for (id, model) in components.static_models() {
        if let Some(t) = scene.transform(*id) {
            push_box(&mut lines, model.bounds.transformed(&t.matrix()), STATIC_BOX_COLOR);
        }
    }

    for (id, model) in components.animated_models() {
        let Some(t) = scene.transform(*id) else {
            continue;
        };
        let world = model.bounds.transformed(&t.matrix());
        push_box(&mut lines, world, ANIMATED_BOX_COLOR);

        let foot = t.position;
        let head = t.matrix().transform_point3(Vec3::new(0.0, model.bounds.max.y, 0.0));
        lines.push(DebugLine {
            start: foot,
            end: head,
            color: BONE_COLOR,
        });
        let chest = foot.lerp(head, 0.75);
        lines.push(DebugLine {
            start: chest,
            end: chest + t.forward() * 0.5,
            color: BONE_COLOR,
        });
    }

    lines
}

fn push_box(lines: &mut Vec<DebugLine>, aabb: Aabb, color: Color) {
    const EDGES: [(usize, usize); 12] = [
        (0, 1),
        (1, 2),
        (2, 3),
        (3, 0),
        (4, 5),
        (5, 6),
        (6, 7),
        (7, 4),
        (0, 4),
        (1, 5),
        (2, 6),
        (3, 7),
    ];
    let c = aabb.corners();
    for (a, b) in EDGES {
        lines.push(DebugLine {
            start: c[a],
            end: c[b],
            color,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crowdwalk_common::Transform;
    use crowdwalk_ecs::{AnimatedModel, MaterialHandle, ModelHandle, StaticModel};

    #[test]
    fn empty_scene_has_no_lines() {
        assert!(collect_debug_geometry(&Scene::new(), &ComponentStore::new()).is_empty());
    }

    #[test]
    fn static_model_gets_a_box() {
        let mut scene = Scene::new();
        let mut store = ComponentStore::new();
        let id = scene.create_child("Mushroom", Transform::from_position(Vec3::X * 3.0));
        store.set_static_model(
            id,
            StaticModel {
                model: ModelHandle(0),
                material: MaterialHandle(0),
                bounds: Aabb::uniform(-1.0, 1.0),
                color: Color::WHITE,
                cast_shadows: false,
            },
        );
        let lines = collect_debug_geometry(&scene, &store);
        assert_eq!(lines.len(), 12);
        assert!(lines.iter().all(|l| l.start.x >= 2.0 - 1e-5 && l.end.x <= 4.0 + 1e-5));
    }

    #[test]
    fn animated_model_gets_box_and_bones() {
        let mut scene = Scene::new();
        let mut store = ComponentStore::new();
        let id = scene.create_child("Jill", Transform::default());
        store.set_animated_model(
            id,
            AnimatedModel::new(
                ModelHandle(0),
                MaterialHandle(0),
                Aabb::new(Vec3::new(-0.3, 0.0, -0.3), Vec3::new(0.3, 1.7, 0.3)),
                Color::WHITE,
            ),
        );
        let lines = collect_debug_geometry(&scene, &store);
        assert_eq!(lines.len(), 14);
        let spine = lines[12];
        assert_eq!(spine.start, Vec3::ZERO);
        assert!((spine.end.y - 1.7).abs() < 1e-5);
    }
}
