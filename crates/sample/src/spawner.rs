//! Builds the sample scene: ground plane, zone, shadowed directional light,
//! the walking crowd, the camera and a mushroom prop.

use crate::config::{ActorConfig, SampleConfig};
use crowdwalk_assets::{paths, AssetError, AssetId, ResourceCache};
use crowdwalk_common::{rotation_from_euler_degrees, Aabb, Color, EntityId, Transform};
use crowdwalk_ecs::{
    AnimatedModel, AnimationHandle, BiasParameters, Camera, CascadeParameters, ComponentStore,
    Light, MaterialHandle, ModelHandle, Mover, StaticModel, Zone,
};
use crowdwalk_scene::Scene;
use glam::Vec3;
use rand::Rng;

pub const ACTOR_NAME: &str = "Jill";
pub const CAMERA_NAME: &str = "Camera";

/// Where and how one actor started.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ActorSpawn {
    pub id: EntityId,
    pub position: Vec3,
    /// Initial heading in `[0, 360)`.
    pub yaw_degrees: f32,
    /// Initial walk-cycle time, or `None` when the animation was unavailable.
    pub animation_time: Option<f32>,
}

/// A freshly built scene and the ids the sample holds on to.
#[derive(Debug)]
pub struct SpawnedScene {
    pub scene: Scene,
    pub components: ComponentStore,
    pub camera: EntityId,
    pub actors: Vec<ActorSpawn>,
}

fn model_handle(path: &str) -> ModelHandle {
    ModelHandle(AssetId::from_path(path).0)
}

fn material_handle(path: &str) -> MaterialHandle {
    MaterialHandle(AssetId::from_path(path).0)
}

fn static_model(
    cache: &ResourceCache,
    model_path: &str,
    material_path: &str,
) -> Result<StaticModel, AssetError> {
    let model = cache.get_model(model_path)?;
    let material = cache.get_material(material_path)?;
    Ok(StaticModel {
        model: model_handle(model_path),
        material: material_handle(material_path),
        bounds: model.bounds,
        color: material.base_color,
        cast_shadows: false,
    })
}

/// Build the whole scene. Fails only on a missing model or material.
pub fn create_scene(
    config: &SampleConfig,
    cache: &ResourceCache,
    rng: &mut impl Rng,
) -> Result<SpawnedScene, AssetError> {
    let mut scene = Scene::new();
    let mut components = ComponentStore::new();

    let plane = scene.create_child(
        "Plane",
        Transform::default().with_scale(Vec3::new(50.0, 1.0, 50.0)),
    );
    components.set_static_model(
        plane,
        static_model(cache, paths::PLANE_MODEL, paths::PLANE_MATERIAL)?,
    );

    let zone = scene.create_child("Zone", Transform::default());
    components.set_zone(
        zone,
        Zone {
            bounds: Aabb::uniform(-1000.0, 1000.0),
            ambient_color: Color::grey(0.5),
            fog_color: Color::rgb(0.4, 0.5, 0.8),
            fog_start: 100.0,
            fog_end: 300.0,
        },
    );

    let mut light_transform = Transform::default();
    light_transform.set_direction(Vec3::new(0.6, -1.0, 0.8));
    let light = scene.create_child("DirectionalLight", light_transform);
    components.set_light(
        light,
        Light {
            cast_shadows: true,
            shadow_bias: BiasParameters {
                constant: 0.00025,
                slope_scaled: 0.5,
            },
            shadow_cascade: CascadeParameters::new(10.0, 50.0, 200.0, 0.0, 0.8),
            ..Light::directional(Color::grey(0.5))
        },
    );

    let actors = spawn_actors(&mut scene, &mut components, cache, &config.actors, rng)?;

    let camera = scene.create_child(
        CAMERA_NAME,
        Transform::from_position(config.camera.start_position),
    );
    components.set_camera(
        camera,
        Camera {
            far_clip: config.camera.far_clip,
            ..Camera::default()
        },
    );

    let mushroom = scene.create_child("Mushroom", Transform::default().with_scale(Vec3::splat(2.0)));
    components.set_static_model(
        mushroom,
        static_model(cache, paths::MUSHROOM_MODEL, paths::MUSHROOM_MATERIAL)?,
    );

    tracing::info!(
        nodes = scene.node_count(),
        actors = actors.len(),
        "scene created"
    );
    Ok(SpawnedScene {
        scene,
        components,
        camera,
        actors,
    })
}

/// Spawn `config.count` walking actors at random positions and headings
/// inside the planar square of half size `config.half_extent`.
///
/// A missing walk animation is tolerated: the actor is created without an
/// animation state and a warning is logged once.
pub fn spawn_actors(
    scene: &mut Scene,
    components: &mut ComponentStore,
    cache: &ResourceCache,
    config: &ActorConfig,
    rng: &mut impl Rng,
) -> Result<Vec<ActorSpawn>, AssetError> {
    let model = cache.get_model(&config.model)?;
    let material = cache.get_material(&config.material)?;
    let walk = match cache.get_animation(&config.walk_animation) {
        Ok(animation) => Some(animation),
        Err(err) => {
            tracing::warn!(%err, "walk animation unavailable, actors will not animate");
            None
        }
    };

    let half = config.half_extent.max(0.0);
    let bounds = Aabb::planar(half);
    let mut spawned = Vec::with_capacity(config.count);

    for _ in 0..config.count {
        let position = Vec3::new(
            rng.random_range(-half..=half),
            0.0,
            rng.random_range(-half..=half),
        );
        let yaw_degrees = rng.random_range(0.0..360.0);
        let id = scene.create_child(
            ACTOR_NAME,
            Transform::from_position(position)
                .with_rotation(rotation_from_euler_degrees(0.0, yaw_degrees, 0.0)),
        );

        let mut animated = AnimatedModel::new(
            model_handle(&config.model),
            material_handle(&config.material),
            model.bounds,
            material.base_color,
        );
        animated.cast_shadows = true;

        let animation_time = walk.map(|animation| {
            let time = if animation.length > 0.0 {
                rng.random_range(0.0..animation.length)
            } else {
                0.0
            };
            let state = animated.add_animation_state(
                AnimationHandle(AssetId::from_path(&config.walk_animation).0),
                animation.name.clone(),
                animation.length,
            );
            state.set_weight(1.0);
            state.set_looped(true);
            state.set_time(time);
            time
        });

        components.set_animated_model(id, animated);
        components.set_mover(
            id,
            Mover::new(config.move_speed, config.rotation_speed, bounds),
        );
        spawned.push(ActorSpawn {
            id,
            position,
            yaw_degrees,
            animation_time,
        });
    }

    tracing::debug!(count = spawned.len(), half_extent = half, "actors spawned");
    Ok(spawned)
}
