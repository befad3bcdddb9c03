//! Developer tooling: the shader parameter debug panel and a scene inspector.
//!
//! # Invariants
//! - A panel label always shows the value last pushed to the renderer.
//! - The inspector is read-only.

pub mod inspector;
pub mod panel;

pub use inspector::{EntityInfo, SceneInspector, SceneSummary};
pub use panel::{format_label, ButtonId, DebugPanel, ParamRow, StepDirection};

pub fn crate_info() -> &'static str {
    "crowdwalk-tools v0.1.0"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crate_loads() {
        assert!(crate_info().contains("tools"));
    }
}
