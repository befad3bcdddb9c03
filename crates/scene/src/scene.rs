use crowdwalk_common::{EntityId, Transform};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A named node in the scene.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Node {
    pub name: String,
    pub transform: Transform,
}

/// The root container of the sample.
///
/// Owns every node (plane, zone, light, actors, camera, props). Components
/// attached to nodes live in a separate store keyed by the same ids, so the
/// scene itself only tracks names and transforms.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Scene {
    nodes: BTreeMap<EntityId, Node>,
    /// Creation order, for stable listings and reproducible iteration.
    order: Vec<EntityId>,
    frame: u64,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of scene updates run so far.
    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// Mark the end of one scene update.
    pub fn advance_frame(&mut self) {
        self.frame += 1;
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Create a child node of the root with the given name and transform.
    pub fn create_child(&mut self, name: impl Into<String>, transform: Transform) -> EntityId {
        let id = EntityId::new();
        let name = name.into();
        tracing::trace!(id = %id.short(), %name, "node created");
        self.nodes.insert(id, Node { name, transform });
        self.order.push(id);
        id
    }

    pub fn get(&self, id: EntityId) -> Option<&Node> {
        self.nodes.get(&id)
    }

    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut Node> {
        self.nodes.get_mut(&id)
    }

    pub fn transform(&self, id: EntityId) -> Option<&Transform> {
        self.nodes.get(&id).map(|n| &n.transform)
    }

    pub fn transform_mut(&mut self, id: EntityId) -> Option<&mut Transform> {
        self.nodes.get_mut(&id).map(|n| &mut n.transform)
    }

    /// Replace a node's transform. Returns false if the node does not exist.
    pub fn set_transform(&mut self, id: EntityId, transform: Transform) -> bool {
        match self.nodes.get_mut(&id) {
            Some(node) => {
                node.transform = transform;
                true
            }
            None => false,
        }
    }

    /// Read-only access to all nodes, keyed by id.
    pub fn nodes(&self) -> &BTreeMap<EntityId, Node> {
        &self.nodes
    }

    /// Node ids in creation order.
    pub fn ids(&self) -> &[EntityId] {
        &self.order
    }

    /// All nodes with the given name, in creation order.
    pub fn find_by_name<'a>(&'a self, name: &'a str) -> impl Iterator<Item = EntityId> + 'a {
        self.order
            .iter()
            .copied()
            .filter(move |id| self.nodes.get(id).is_some_and(|n| n.name == name))
    }

    /// First node with the given name.
    pub fn find_first(&self, name: &str) -> Option<EntityId> {
        self.find_by_name(name).next()
    }
}
