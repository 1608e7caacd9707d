//! Declarative route metadata attached to controllers.
//!
//! # Responsibilities
//! - Define the reader seam discovery consumes
//! - Provide an in-memory reader and a manifest-file reader
//!
//! # Manifest format
//! One `<Name>Controller.toml` file per controller:
//! ```toml
//! prefix = "/admin"
//!
//! [routes]
//! about = "/about"
//! index = { rule = "/page/{slug}", name = "homepage", priority = 1, requirements = { slug = "[a-z-]+" } }
//! ```

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use indexmap::IndexMap;
use serde::Deserialize;
use serde_json::Value;

use crate::routing::discovery::controller_units;

/// Class-level annotation holding the rule prefix.
pub const ROUTE_PREFIX: &str = "RoutePrefix";

/// Method-level annotation holding the route descriptor.
pub const ROUTE: &str = "Route";

/// Source of annotations for controllers and their actions.
pub trait MetadataReader: Send + Sync {
    /// Value of `annotation` on `controller`, or on one of its actions.
    fn get(&self, annotation: &str, controller: &str, action: Option<&str>) -> Option<Value>;
}

type MetadataKey = (String, String, Option<String>);

/// In-memory metadata, filled through builder calls.
#[derive(Debug, Clone, Default)]
pub struct StaticMetadata {
    entries: HashMap<MetadataKey, Value>,
}

impl StaticMetadata {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(
        mut self,
        annotation: impl Into<String>,
        controller: impl Into<String>,
        action: Option<&str>,
        value: impl Into<Value>,
    ) -> Self {
        self.entries.insert(
            (annotation.into(), controller.into(), action.map(str::to_string)),
            value.into(),
        );
        self
    }

    pub fn prefix(self, controller: impl Into<String>, prefix: impl Into<String>) -> Self {
        self.set(ROUTE_PREFIX, controller, None, prefix.into())
    }

    pub fn route(self, controller: impl Into<String>, action: &str, descriptor: impl Into<Value>) -> Self {
        self.set(ROUTE, controller, Some(action), descriptor)
    }
}

impl MetadataReader for StaticMetadata {
    fn get(&self, annotation: &str, controller: &str, action: Option<&str>) -> Option<Value> {
        self.entries
            .get(&(annotation.to_string(), controller.to_string(), action.map(str::to_string)))
            .cloned()
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
struct ControllerManifest {
    #[serde(default)]
    prefix: Option<String>,
    #[serde(default)]
    routes: IndexMap<String, Value>,
}

/// Reads metadata from `*Controller.toml` manifests under a directory.
#[derive(Debug, Clone, Default)]
pub struct ManifestReader {
    manifests: HashMap<String, ControllerManifest>,
}

impl ManifestReader {
    /// Parse every manifest below `dir`. Unreadable or malformed files are skipped.
    ///
    /// When several manifests share a controller name, the first in walk order wins.
    pub fn from_dir(dir: &Path) -> Self {
        let mut manifests = HashMap::new();

        for (controller, path) in controller_units(dir) {
            let content = match fs::read_to_string(&path) {
                Ok(content) => content,
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "Cannot read controller manifest");
                    continue;
                }
            };
            match toml::from_str::<ControllerManifest>(&content) {
                Ok(manifest) => {
                    manifests.insert(controller, manifest);
                }
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "Malformed controller manifest");
                }
            }
        }

        tracing::debug!(dir = %dir.display(), manifests = manifests.len(), "Controller manifests loaded");
        Self { manifests }
    }

    /// Number of manifests parsed.
    pub fn len(&self) -> usize {
        self.manifests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.manifests.is_empty()
    }
}

impl MetadataReader for ManifestReader {
    fn get(&self, annotation: &str, controller: &str, action: Option<&str>) -> Option<Value> {
        let manifest = self.manifests.get(controller)?;
        match (annotation, action) {
            (ROUTE_PREFIX, None) => manifest.prefix.clone().map(Value::String),
            (ROUTE, Some(action)) => manifest.routes.get(action).cloned(),
            _ => None,
        }
    }
}
