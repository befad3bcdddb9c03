//! Typed component storage for scene nodes.
//!
//! Components are plain values attached by explicit construction; there is no
//! runtime type registry. Each component type has its own storage keyed by
//! `EntityId`.
//!
//! # Invariants
//! - Iteration order is deterministic (BTreeMap).
//! - A node has at most one component of each type.

pub mod animation;
pub mod components;
pub mod mover;

pub use animation::AnimationState;
pub use components::{
    AnimatedModel, AnimationHandle, BiasParameters, Camera, CascadeParameters, Light, LightKind,
    MaterialHandle, ModelHandle, StaticModel, Zone,
};
pub use mover::{update_movers, Mover};

use crowdwalk_common::EntityId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Component storage for every component type the sample uses.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ComponentStore {
    static_models: BTreeMap<EntityId, StaticModel>,
    animated_models: BTreeMap<EntityId, AnimatedModel>,
    lights: BTreeMap<EntityId, Light>,
    zones: BTreeMap<EntityId, Zone>,
    cameras: BTreeMap<EntityId, Camera>,
    movers: BTreeMap<EntityId, Mover>,
}

impl ComponentStore {
    pub fn new() -> Self {
        Self::default()
    }

    // --- StaticModel ---
    pub fn set_static_model(&mut self, entity: EntityId, model: StaticModel) {
        self.static_models.insert(entity, model);
    }

    pub fn get_static_model(&self, entity: EntityId) -> Option<&StaticModel> {
        self.static_models.get(&entity)
    }

    pub fn static_models(&self) -> &BTreeMap<EntityId, StaticModel> {
        &self.static_models
    }

    // --- AnimatedModel ---
    pub fn set_animated_model(&mut self, entity: EntityId, model: AnimatedModel) {
        self.animated_models.insert(entity, model);
    }

    pub fn get_animated_model(&self, entity: EntityId) -> Option<&AnimatedModel> {
        self.animated_models.get(&entity)
    }

    pub fn get_animated_model_mut(&mut self, entity: EntityId) -> Option<&mut AnimatedModel> {
        self.animated_models.get_mut(&entity)
    }

    pub fn animated_models(&self) -> &BTreeMap<EntityId, AnimatedModel> {
        &self.animated_models
    }

    // --- Light ---
    pub fn set_light(&mut self, entity: EntityId, light: Light) {
        self.lights.insert(entity, light);
    }

    pub fn get_light(&self, entity: EntityId) -> Option<&Light> {
        self.lights.get(&entity)
    }

    pub fn lights(&self) -> &BTreeMap<EntityId, Light> {
        &self.lights
    }

    // --- Zone ---
    pub fn set_zone(&mut self, entity: EntityId, zone: Zone) {
        self.zones.insert(entity, zone);
    }

    pub fn get_zone(&self, entity: EntityId) -> Option<&Zone> {
        self.zones.get(&entity)
    }

    pub fn zones(&self) -> &BTreeMap<EntityId, Zone> {
        &self.zones
    }

    // --- Camera ---
    pub fn set_camera(&mut self, entity: EntityId, camera: Camera) {
        self.cameras.insert(entity, camera);
    }

    pub fn get_camera(&self, entity: EntityId) -> Option<&Camera> {
        self.cameras.get(&entity)
    }

    // --- Mover ---
    pub fn set_mover(&mut self, entity: EntityId, mover: Mover) {
        self.movers.insert(entity, mover);
    }

    pub fn get_mover(&self, entity: EntityId) -> Option<&Mover> {
        self.movers.get(&entity)
    }

    pub fn movers(&self) -> &BTreeMap<EntityId, Mover> {
        &self.movers
    }

    /// Split borrow used by the mover system.
    pub(crate) fn movers_and_models_mut(
        &mut self,
    ) -> (&BTreeMap<EntityId, Mover>, &mut BTreeMap<EntityId, AnimatedModel>) {
        (&self.movers, &mut self.animated_models)
    }

    /// The zone whose bounds contain `point`, if any.
    pub fn zone_at(&self, point: glam::Vec3) -> Option<&Zone> {
        self.zones.values().find(|z| {
            let b = z.bounds;
            point.cmpge(b.min).all() && point.cmple(b.max).all()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crowdwalk_common::{Aabb, Color};
    use glam::Vec3;

    #[test]
    fn animated_model_add_get() {
        let mut store = ComponentStore::new();
        let id = EntityId::new();
        let model = AnimatedModel::new(
            ModelHandle(1),
            MaterialHandle(2),
            Aabb::uniform(-1.0, 1.0),
            Color::WHITE,
        );
        store.set_animated_model(id, model.clone());
        assert_eq!(store.get_animated_model(id), Some(&model));
        assert!(store.get_static_model(id).is_none());
    }

    #[test]
    fn replacing_a_component_keeps_one() {
        let mut store = ComponentStore::new();
        let id = EntityId::new();
        store.set_mover(id, Mover::new(1.0, 10.0, Aabb::planar(5.0)));
        store.set_mover(id, Mover::new(2.0, 20.0, Aabb::planar(5.0)));
        assert_eq!(store.movers().len(), 1);
        assert_eq!(store.get_mover(id).unwrap().move_speed, 2.0);
    }

    #[test]
    fn deterministic_iteration_order() {
        let mut store = ComponentStore::new();
        let mut ids: Vec<EntityId> = (0..50).map(|_| EntityId::new()).collect();
        for id in &ids {
            store.set_light(*id, Light::directional(Color::WHITE));
        }
        ids.sort();
        let stored: Vec<EntityId> = store.lights().keys().copied().collect();
        assert_eq!(stored, ids);
    }

    #[test]
    fn zone_lookup_by_point() {
        let mut store = ComponentStore::new();
        let id = EntityId::new();
        store.set_zone(
            id,
            Zone {
                bounds: Aabb::uniform(-1000.0, 1000.0),
                ..Zone::default()
            },
        );
        assert!(store.zone_at(Vec3::new(0.0, 5.0, 0.0)).is_some());
        assert!(store.zone_at(Vec3::new(2000.0, 0.0, 0.0)).is_none());
    }
}
