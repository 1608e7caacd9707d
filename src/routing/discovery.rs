//! Route discovery from controller metadata.
//!
//! # Responsibilities
//! - Walk a directory for controller units (`*Controller.toml`)
//! - Resolve each unit to a registered controller
//! - Build one route per annotated action
//!
//! # Design Decisions
//! - Missing or malformed descriptors skip the action, never the whole scan
//! - Units without a registered controller are logged and skipped
//! - Default route name is `lowercase("{controller}_{action}")`

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use indexmap::IndexMap;
use serde::Deserialize;
use serde_json::Value;
use walkdir::WalkDir;

use crate::routing::collection::RouteCollection;
use crate::routing::error::{RoutingError, RoutingResult};
use crate::routing::metadata::{MetadataReader, ROUTE, ROUTE_PREFIX};
use crate::routing::registry::ControllerRegistry;
use crate::routing::route::Route;

/// Suffix marking a controller identifier.
pub const CONTROLLER_SUFFIX: &str = "Controller";

/// File-name suffix of a controller unit on disk.
pub const UNIT_SUFFIX: &str = "Controller.toml";

/// Controller units under `dir`, as `(controller id, path)` in walk order.
///
/// Each controller id appears once. A later unit with an id already seen is
/// logged and ignored.
pub fn controller_units(dir: &Path) -> Vec<(String, PathBuf)> {
    let mut units = Vec::new();
    let mut seen = HashSet::new();

    for entry in WalkDir::new(dir)
        .follow_links(true)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
    {
        if !entry.file_type().is_file() {
            continue;
        }
        let Some(file_name) = entry.file_name().to_str() else {
            continue;
        };
        if file_name.len() > UNIT_SUFFIX.len() && file_name.ends_with(UNIT_SUFFIX) {
            let id = file_name.trim_end_matches(".toml").to_string();
            if !seen.insert(id.clone()) {
                tracing::warn!(
                    controller = %id,
                    path = %entry.path().display(),
                    "Duplicate controller unit, ignoring"
                );
                continue;
            }
            units.push((id, entry.path().to_path_buf()));
        }
    }

    units
}

/// Route descriptor attached to an action: a bare rule or a record.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum RouteDescriptor {
    Rule(String),
    Record {
        #[serde(default)]
        rule: Option<String>,
        #[serde(default)]
        name: Option<String>,
        #[serde(default)]
        priority: Option<i32>,
        #[serde(default)]
        requirements: Option<IndexMap<String, String>>,
    },
}

impl RouteDescriptor {
    /// Interpret an annotation value. `None` when it is not a usable descriptor.
    pub fn from_value(value: Value) -> Option<Self> {
        if !matches!(value, Value::String(_) | Value::Object(_)) {
            return None;
        }
        let descriptor: Self = serde_json::from_value(value).ok()?;
        match &descriptor {
            RouteDescriptor::Rule(rule) if rule.is_empty() => None,
            RouteDescriptor::Record { rule, .. } if rule.as_deref().unwrap_or_default().is_empty() => {
                None
            }
            _ => Some(descriptor),
        }
    }

    fn rule(&self) -> &str {
        match self {
            RouteDescriptor::Rule(rule) => rule,
            RouteDescriptor::Record { rule, .. } => rule.as_deref().unwrap_or_default(),
        }
    }
}

/// Builds routes from controller metadata.
#[derive(Clone)]
pub struct RouteLoader {
    reader: Arc<dyn MetadataReader>,
    registry: Arc<ControllerRegistry>,
}

impl RouteLoader {
    pub fn new(reader: Arc<dyn MetadataReader>, registry: Arc<ControllerRegistry>) -> Self {
        Self { reader, registry }
    }

    /// Discover routes for every registered controller with a unit under `dir`.
    pub fn load_routes_from_controllers(&self, dir: &Path) -> RoutingResult<RouteCollection> {
        if !dir.is_dir() {
            return Err(RoutingError::Router(format!(
                "'{}' is not directory.",
                dir.display()
            )));
        }

        let mut routes = RouteCollection::new();

        for (controller_id, path) in controller_units(dir) {
            if !controller_id.ends_with(CONTROLLER_SUFFIX) {
                continue;
            }
            let Some(controller) = self.registry.get(&controller_id) else {
                tracing::debug!(
                    controller = %controller_id,
                    path = %path.display(),
                    "Controller unit has no registered controller, skipping"
                );
                continue;
            };

            for action in controller.actions() {
                let Some(route) = self.route_from_metadata(controller.id(), action.name()) else {
                    continue;
                };
                if let Err(e) = route.compiled_pattern() {
                    tracing::warn!(
                        controller = %controller.id(),
                        action = %action.name(),
                        error = %e,
                        "Dropping discovered route with invalid pattern"
                    );
                    continue;
                }
                if let Err(e) = routes.add(route) {
                    tracing::warn!(
                        controller = %controller.id(),
                        action = %action.name(),
                        error = %e,
                        "Dropping discovered route"
                    );
                }
            }
        }

        tracing::info!(dir = %dir.display(), routes = routes.len(), "Route discovery finished");
        Ok(routes)
    }

    /// Build the route for one action, or `None` when it carries no usable descriptor.
    pub fn route_from_metadata(&self, controller: &str, action: &str) -> Option<Route> {
        let prefix = match self.reader.get(ROUTE_PREFIX, controller, None) {
            Some(Value::String(prefix)) => prefix,
            Some(other) => {
                tracing::warn!(controller = %controller, value = %other, "Ignoring non-string route prefix");
                String::new()
            }
            None => String::new(),
        };

        let value = self.reader.get(ROUTE, controller, Some(action))?;
        let Some(descriptor) = RouteDescriptor::from_value(value) else {
            tracing::debug!(controller = %controller, action = %action, "Action has no valid route descriptor");
            return None;
        };

        let mut route = Route::default()
            .with_name(format!("{}_{}", controller, action).to_lowercase())
            .with_controller(controller)
            .with_action(action)
            .with_rule(format!("{}{}", prefix, descriptor.rule()));

        if let RouteDescriptor::Record {
            name,
            priority,
            requirements,
            ..
        } = descriptor
        {
            if let Some(name) = name.filter(|n| !n.is_empty()) {
                route = route.with_name(name);
            }
            if let Some(priority) = priority {
                route = route.with_priority(priority);
            }
            if let Some(requirements) = requirements {
                route = route.with_requirements(requirements);
            }
        }

        tracing::debug!(
            route = %route.name(),
            rule = %route.rule(),
            controller = %controller,
            action = %action,
            "Route discovered"
        );
        Some(route)
    }
}
