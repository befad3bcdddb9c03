//! Sample configuration, loaded from YAML. Every field has a default, so an
//! empty document is a valid config.

use crowdwalk_assets::paths;
use crowdwalk_input::KeyBindings;
use glam::Vec3;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("config io: {0}")]
    Io(#[from] std::io::Error),
    #[error("config yaml: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SampleConfig {
    /// Seed for actor placement. A random seed is drawn and logged when unset.
    pub seed: Option<u64>,
    pub actors: ActorConfig,
    pub camera: CameraConfig,
    pub panel: PanelConfig,
    pub keys: KeyBindings,
}

impl SampleConfig {
    pub fn from_yaml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(text)?)
    }

    pub fn to_yaml(&self) -> Result<String, ConfigError> {
        Ok(serde_yaml::to_string(self)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path.as_ref())?;
        let config = Self::from_yaml_str(&text)?;
        tracing::info!(path = %path.as_ref().display(), "config loaded");
        Ok(config)
    }

    /// Load from `path`, or fall back to the defaults when no path is given.
    pub fn load_optional(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        std::fs::write(path, self.to_yaml()?)?;
        Ok(())
    }
}

/// The walking crowd.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ActorConfig {
    pub count: usize,
    /// World units per second.
    pub move_speed: f32,
    /// Degrees per second while steering back into bounds.
    pub rotation_speed: f32,
    /// Actors spawn and walk within `[-half_extent, half_extent]` on X and Z.
    pub half_extent: f32,
    pub model: String,
    pub material: String,
    pub walk_animation: String,
}

impl Default for ActorConfig {
    fn default() -> Self {
        Self {
            count: 30,
            move_speed: 2.0,
            rotation_speed: 100.0,
            half_extent: 20.0,
            model: paths::JILL_MODEL.to_string(),
            material: paths::JILL_MATERIAL.to_string(),
            walk_animation: paths::JILL_WALK.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    /// World units per second.
    pub move_speed: f32,
    /// Degrees per pixel of mouse motion.
    pub sensitivity: f32,
    pub start_position: Vec3,
    pub far_clip: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            move_speed: 20.0,
            sensitivity: 0.1,
            start_position: Vec3::new(0.0, 5.0, 0.0),
            far_clip: 50.0,
        }
    }
}

/// Debug panel: step size, starting shader values and UI resources.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PanelConfig {
    pub step: f32,
    pub sample_radius: f32,
    pub beta: f32,
    pub eps: f32,
    pub sigma: f32,
    pub font: String,
    pub style: String,
}

impl Default for PanelConfig {
    fn default() -> Self {
        Self {
            step: 0.01,
            sample_radius: 1.0,
            beta: 0.005,
            eps: 0.003,
            sigma: 0.09,
            font: paths::UI_FONT.to_string(),
            style: paths::UI_STYLE.to_string(),
        }
    }
}

impl PanelConfig {
    /// Initial values in `ShaderParam` order.
    pub fn initial_values(&self) -> [f32; 4] {
        [self.sample_radius, self.beta, self.eps, self.sigma]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crowdwalk_input::Key;

    #[test]
    fn empty_document_gives_defaults() {
        let config = SampleConfig::from_yaml_str("{}").unwrap();
        assert_eq!(config, SampleConfig::default());
        assert_eq!(config.actors.count, 30);
        assert_eq!(config.panel.initial_values(), [1.0, 0.005, 0.003, 0.09]);
    }

    #[test]
    fn partial_document_overrides_only_named_fields() {
        let yaml = "seed: 7\nactors:\n  count: 5\ncamera:\n  start_position: [1.0, 2.0, 3.0]\nkeys:\n  toggle_debug: F1\n";
        let config = SampleConfig::from_yaml_str(yaml).unwrap();
        assert_eq!(config.seed, Some(7));
        assert_eq!(config.actors.count, 5);
        assert_eq!(config.actors.move_speed, 2.0);
        assert_eq!(config.camera.start_position, Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(config.camera.far_clip, 50.0);
        assert_eq!(config.keys.toggle_debug, Key::F1);
        assert_eq!(config.keys.forward, Key::W);
    }

    #[test]
    fn malformed_yaml_is_an_error() {
        let err = SampleConfig::from_yaml_str("actors: [1, 2").unwrap_err();
        assert!(matches!(err, ConfigError::Yaml(_)));
    }

    #[test]
    fn save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sample.yaml");
        let mut config = SampleConfig::default();
        config.seed = Some(42);
        config.panel.step = 0.05;
        config.save(&path).unwrap();
        assert_eq!(SampleConfig::load(&path).unwrap(), config);
    }

    #[test]
    fn no_path_means_defaults() {
        assert_eq!(SampleConfig::load_optional(None).unwrap(), SampleConfig::default());
    }

    #[test]
    fn missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = SampleConfig::load(dir.path().join("nope.yaml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
