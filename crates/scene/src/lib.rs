//! Scene graph: the root container owning every node of the sample.
//!
//! # Invariants
//! - Nodes live for the lifetime of the scene; the sample never removes them.
//! - Iteration order is stable for the lifetime of the scene (BTreeMap keyed by `EntityId`).

pub mod scene;

pub use scene::{Node, Scene};
