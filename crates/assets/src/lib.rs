//! Resource cache: typed resources looked up by path.
//!
//! Every lookup returns a `Result`; callers decide which failures are fatal.
//! Resource ids are derived from the path, so the same path always maps to the
//! same id across runs.
//!
//! # Layout
//! The cache can be persisted to and loaded from a JSON manifest.

use crowdwalk_common::{Aabb, Color};
use glam::Vec3;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

/// Resource paths used by the skeletal animation sample.
pub mod paths {
    pub const PLANE_MODEL: &str = "Models/Plane.mdl";
    pub const PLANE_MATERIAL: &str = "Materials/NoTextureWithSSR.xml";
    pub const JILL_MODEL: &str = "Models/Kachujin/Kachujin.mdl";
    pub const JILL_MATERIAL: &str = "Models/Kachujin/Materials/Kachujin.xml";
    pub const JILL_WALK: &str = "Models/Kachujin/Kachujin_Walk.ani";
    pub const MUSHROOM_MODEL: &str = "Models/Mushroom.mdl";
    pub const MUSHROOM_MATERIAL: &str = "Materials/Mushroom.xml";
    pub const UI_FONT: &str = "Fonts/Anonymous Pro.ttf";
    pub const UI_STYLE: &str = "UI/DefaultStyle.xml";
}

/// Path-derived resource id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AssetId(pub u64);

impl AssetId {
    pub fn from_path(path: &str) -> Self {
        let digest = Sha256::digest(path.as_bytes());
        let mut bytes = [0u8; 8];
        bytes.copy_from_slice(&digest[..8]);
        Self(u64::from_le_bytes(bytes))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Model {
    pub name: String,
    /// Model-space bounding box.
    pub bounds: Aabb,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Material {
    pub name: String,
    pub base_color: Color,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Animation {
    pub name: String,
    /// Length in seconds.
    pub length: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Font {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StyleSheet {
    pub name: String,
}

/// A resource entry in the cache.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Resource {
    Model(Model),
    Material(Material),
    Animation(Animation),
    Font(Font),
    Style(StyleSheet),
}

impl Resource {
    pub fn kind(&self) -> ResourceKind {
        match self {
            Self::Model(_) => ResourceKind::Model,
            Self::Material(_) => ResourceKind::Material,
            Self::Animation(_) => ResourceKind::Animation,
            Self::Font(_) => ResourceKind::Font,
            Self::Style(_) => ResourceKind::Style,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    Model,
    Material,
    Animation,
    Font,
    Style,
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Model => "model",
            Self::Material => "material",
            Self::Animation => "animation",
            Self::Font => "font",
            Self::Style => "style",
        };
        f.write_str(s)
    }
}

/// Errors from resource lookups and manifest IO.
#[derive(Debug, thiserror::Error)]
pub enum AssetError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("resource not found: {0}")]
    NotFound(String),
    #[error("resource {path} is a {found}, expected a {expected}")]
    WrongKind {
        path: String,
        expected: ResourceKind,
        found: ResourceKind,
    },
}

/// Typed resource registry keyed by path.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResourceCache {
    resources: BTreeMap<String, Resource>,
}

macro_rules! typed_getter {
    ($fn_name:ident, $variant:ident, $ty:ty) => {
        pub fn $fn_name(&self, path: &str) -> Result<&$ty, AssetError> {
            match self.lookup(path)? {
                Resource::$variant(r) => Ok(r),
                other => Err(AssetError::WrongKind {
                    path: path.to_string(),
                    expected: ResourceKind::$variant,
                    found: other.kind(),
                }),
            }
        }
    };
}

impl ResourceCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// A cache pre-populated with every resource the sample asks for.
    pub fn builtin() -> Self {
        let mut cache = Self::new();
        cache.insert(
            paths::PLANE_MODEL,
            Resource::Model(Model {
                name: "Plane".into(),
                bounds: Aabb::new(Vec3::new(-0.5, 0.0, -0.5), Vec3::new(0.5, 0.0, 0.5)),
            }),
        );
        cache.insert(
            paths::PLANE_MATERIAL,
            Resource::Material(Material {
                name: "NoTextureWithSSR".into(),
                base_color: Color::grey(0.6),
            }),
        );
        cache.insert(
            paths::JILL_MODEL,
            Resource::Model(Model {
                name: "Kachujin".into(),
                bounds: Aabb::new(Vec3::new(-0.35, 0.0, -0.25), Vec3::new(0.35, 1.7, 0.25)),
            }),
        );
        cache.insert(
            paths::JILL_MATERIAL,
            Resource::Material(Material {
                name: "Kachujin".into(),
                base_color: Color::rgb(0.85, 0.55, 0.4),
            }),
        );
        cache.insert(
            paths::JILL_WALK,
            Resource::Animation(Animation {
                name: "Kachujin_Walk".into(),
                length: 1.1,
            }),
        );
        cache.insert(
            paths::MUSHROOM_MODEL,
            Resource::Model(Model {
                name: "Mushroom".into(),
                bounds: Aabb::new(Vec3::new(-0.6, 0.0, -0.6), Vec3::new(0.6, 1.3, 0.6)),
            }),
        );
        cache.insert(
            paths::MUSHROOM_MATERIAL,
            Resource::Material(Material {
                name: "Mushroom".into(),
                base_color: Color::rgb(0.8, 0.2, 0.2),
            }),
        );
        cache.insert(
            paths::UI_FONT,
            Resource::Font(Font {
                name: "Anonymous Pro".into(),
            }),
        );
        cache.insert(
            paths::UI_STYLE,
            Resource::Style(StyleSheet {
                name: "DefaultStyle".into(),
            }),
        );
        cache
    }

    /// Register or replace a resource. Returns its id.
    pub fn insert(&mut self, path: impl Into<String>, resource: Resource) -> AssetId {
        let path = path.into();
        let id = AssetId::from_path(&path);
        self.resources.insert(path, resource);
        id
    }

    /// Remove a resource, returning it if present.
    pub fn remove(&mut self, path: &str) -> Option<Resource> {
        self.resources.remove(path)
    }

    pub fn get(&self, path: &str) -> Option<&Resource> {
        self.resources.get(path)
    }

    typed_getter!(get_model, Model, Model);
    typed_getter!(get_material, Material, Material);
    typed_getter!(get_animation, Animation, Animation);
    typed_getter!(get_font, Font, Font);
    typed_getter!(get_style, Style, StyleSheet);

    /// Number of registered resources.
    pub fn len(&self) -> usize {
        self.resources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }

    /// Registered paths in sorted order.
    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.resources.keys().map(String::as_str)
    }

    /// Merge every entry of a JSON manifest into this cache, replacing
    /// entries with the same path. Returns how many entries were read.
    pub fn load_manifest(&mut self, path: impl AsRef<Path>) -> Result<usize, AssetError> {
        let other = Self::load(path.as_ref())?;
        let count = other.len();
        self.resources.extend(other.resources);
        tracing::info!(count, path = %path.as_ref().display(), "resource manifest loaded");
        Ok(count)
    }

    /// Save the cache to a JSON manifest.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), AssetError> {
        let file = std::fs::File::create(path)?;
        serde_json::to_writer_pretty(file, self)?;
        Ok(())
    }

    /// Load a cache from a JSON manifest.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, AssetError> {
        let file = std::fs::File::open(path)?;
        let cache: Self = serde_json::from_reader(file)?;
        Ok(cache)
    }

    fn lookup(&self, path: &str) -> Result<&Resource, AssetError> {
        self.resources
            .get(path)
            .ok_or_else(|| AssetError::NotFound(path.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_has_every_sample_resource() {
        let cache = ResourceCache::builtin();
        assert!(cache.get_model(paths::PLANE_MODEL).is_ok());
        assert!(cache.get_material(paths::JILL_MATERIAL).is_ok());
        assert!(cache.get_animation(paths::JILL_WALK).unwrap().length > 0.0);
        assert!(cache.get_font(paths::UI_FONT).is_ok());
        assert!(cache.get_style(paths::UI_STYLE).is_ok());
        assert_eq!(cache.len(), 9);
    }

    #[test]
    fn missing_resource_is_not_found() {
        let cache = ResourceCache::new();
        let err = cache.get_animation("Models/Nope.ani").unwrap_err();
        assert!(matches!(err, AssetError::NotFound(p) if p == "Models/Nope.ani"));
    }

    #[test]
    fn wrong_kind_is_reported() {
        let cache = ResourceCache::builtin();
        let err = cache.get_animation(paths::JILL_MODEL).unwrap_err();
        assert!(matches!(
            err,
            AssetError::WrongKind {
                expected: ResourceKind::Animation,
                found: ResourceKind::Model,
                ..
            }
        ));
        assert!(err.to_string().contains("expected a animation"));
    }

    #[test]
    fn ids_are_path_derived() {
        let mut cache = ResourceCache::new();
        let a = cache.insert("Fonts/A.ttf", Resource::Font(Font { name: "A".into() }));
        assert_eq!(a, AssetId::from_path("Fonts/A.ttf"));
        assert_ne!(a, AssetId::from_path("Fonts/B.ttf"));
    }

    #[test]
    fn remove_makes_lookup_fail() {
        let mut cache = ResourceCache::builtin();
        assert!(cache.remove(paths::JILL_WALK).is_some());
        assert!(cache.get_animation(paths::JILL_WALK).is_err());
    }

    #[test]
    fn save_and_load() {
        let tmp = tempfile::NamedTempFile::new().unwrap();
        let cache = ResourceCache::builtin();
        cache.save(tmp.path()).unwrap();

        let loaded = ResourceCache::load(tmp.path()).unwrap();
        assert_eq!(loaded.len(), cache.len());
        assert_eq!(
            loaded.get_animation(paths::JILL_WALK).unwrap(),
            cache.get_animation(paths::JILL_WALK).unwrap()
        );
    }

    #[test]
    fn manifest_overrides_builtin_entries() {
        let tmp = tempfile::NamedTempFile::new().unwrap();
        let mut overrides = ResourceCache::new();
        overrides.insert(
            paths::JILL_WALK,
            Resource::Animation(Animation {
                name: "SlowWalk".into(),
                length: 3.0,
            }),
        );
        overrides.save(tmp.path()).unwrap();

        let mut cache = ResourceCache::builtin();
        let read = cache.load_manifest(tmp.path()).unwrap();
        assert_eq!(read, 1);
        assert_eq!(cache.get_animation(paths::JILL_WALK).unwrap().length, 3.0);
        assert_eq!(cache.len(), 9);
    }
}
