//! Configuration schema definitions.
//!
//! All types derive Serde traits for deserialization from config files.

use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::routing::Route;

/// Root configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct AppConfig {
    /// Route registration and discovery.
    pub routing: RoutingConfig,

    /// HTTP front end.
    pub server: ServerConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    /// Directory relative paths are resolved against (set by the loader).
    #[serde(skip)]
    pub root: PathBuf,
}

/// The `[routing]` section.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct RoutingConfig {
    /// Directory scanned for controller units, relative to the config root.
    pub autoload: Option<String>,

    /// Explicitly registered routes.
    pub routes: Vec<RouteConfig>,
}

impl RoutingConfig {
    /// Absolute autoload directory, if one is configured.
    pub fn autoload_dir(&self, root: &Path) -> Option<PathBuf> {
        self.autoload
            .as_deref()
            .filter(|dir| !dir.is_empty())
            .map(|dir| root.join(dir))
    }
}

/// An explicitly configured route.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RouteConfig {
    /// Route name, used for URL generation.
    pub name: String,

    /// Rule with `{name}` placeholders.
    pub rule: String,

    /// Controller identifier.
    pub controller: String,

    /// Action on the controller.
    pub action: String,

    /// Route priority (higher = checked first).
    #[serde(default)]
    pub priority: i32,

    /// Per-parameter sub-patterns.
    #[serde(default)]
    pub requirements: IndexMap<String, String>,
}

impl RouteConfig {
    pub fn to_route(&self) -> Route {
        Route::new(&self.name, &self.rule, &self.controller, &self.action)
            .with_priority(self.priority)
            .with_requirements(self.requirements.clone())
    }
}

/// HTTP server configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,

    /// Request timeout in seconds.
    pub request_timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
            request_timeout_secs: 30,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert!(config.routing.autoload.is_none());
        assert!(config.routing.routes.is_empty());
        assert_eq!(config.server.request_timeout_secs, 30);
        assert_eq!(config.observability.log_level, "info");
    }

    #[test]
    fn test_parse_routes() {
        let config: AppConfig = toml::from_str(
            r#"
[routing]
autoload = "controllers"

[[routing.routes]]
name = "homepage"
rule = "/page/{slug}"
controller = "PageController"
action = "show"
priority = 2
requirements = { slug = "[a-z-]+" }
"#,
        )
        .unwrap();

        assert_eq!(
            config.routing.autoload_dir(Path::new("/etc/app")),
            Some(PathBuf::from("/etc/app/controllers"))
        );

        let route = config.routing.routes[0].to_route();
        assert!(route.is_valid());
        assert_eq!(route.priority(), 2);
        assert!(route.is_match("/page/hello-world"));
        assert!(!route.is_match("/page/Hello"));
    }

    #[test]
    fn test_empty_autoload_is_disabled() {
        let config = RoutingConfig {
            autoload: Some(String::new()),
            routes: Vec::new(),
        };
        assert!(config.autoload_dir(Path::new("/")).is_none());
    }
}
