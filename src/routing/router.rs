//! Route lookup and dispatch.
//!
//! # Responsibilities
//! - Own the route collection and discover routes once
//! - Match a route token against routes in priority order
//! - Bind matched values to handler parameters by name and invoke the handler
//! - Generate URLs for named routes
//!
//! # Design Decisions
//! - Discovery is memoized per router; repeated runs never re-append routes
//! - Request state is passed in explicitly, never read from globals
//! - A matched route that yields no values despite declaring placeholders
//!   cannot serve the token; scanning continues with the next route
//! - One router serves one dispatch at a time; concurrent servers clone a
//!   sealed prototype per request

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use indexmap::IndexMap;

use crate::config::RoutingConfig;
use crate::http::{RequestContext, Response};
use crate::observability::metrics;
use crate::routing::collection::RouteCollection;
use crate::routing::discovery::RouteLoader;
use crate::routing::error::{RouteLookup, RoutingError, RoutingResult};
use crate::routing::events::{EventDispatcher, EventListener, RouterEvent};
use crate::routing::generator::UrlGenerator;
use crate::routing::metadata::{ManifestReader, MetadataReader, StaticMetadata};
use crate::routing::registry::ControllerRegistry;
use crate::routing::route::Route;

/// Where a router is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouterState {
    /// No routes loaded yet.
    Uninitialized,
    /// Routes registered, no dispatch yet.
    Ready,
    /// Inside `run`.
    Dispatching,
    /// Last dispatch returned a response.
    Done,
    /// Last dispatch failed.
    Failed,
}

/// Dispatches route tokens to controller actions.
#[derive(Clone)]
pub struct Router {
    registry: Arc<ControllerRegistry>,
    reader: Arc<dyn MetadataReader>,
    read_manifests: bool,
    autoload: Option<PathBuf>,
    routes: RouteCollection,
    events: EventDispatcher,
    generator: UrlGenerator,
    discovered: bool,
    state: RouterState,
    actual_route: Option<Route>,
}

impl Router {
    /// Create a router over `registry` with no metadata and no autoload directory.
    pub fn new(registry: Arc<ControllerRegistry>) -> Self {
        Self {
            registry,
            reader: Arc::new(StaticMetadata::new()),
            read_manifests: false,
            autoload: None,
            routes: RouteCollection::new(),
            events: EventDispatcher::new(),
            generator: UrlGenerator::new(),
            discovered: false,
            state: RouterState::Uninitialized,
            actual_route: None,
        }
    }

    /// Create a router from the `[routing]` configuration section.
    ///
    /// `root` is the configuration root the autoload directory is relative to.
    /// Autoloaded controllers read their metadata from manifests in that
    /// directory. Manifests are parsed when discovery runs, not here.
    pub fn from_config(
        config: &RoutingConfig,
        root: &Path,
        registry: Arc<ControllerRegistry>,
    ) -> RoutingResult<Self> {
        let mut router = Self::new(registry);

        if let Some(dir) = config.autoload_dir(root) {
            router.read_manifests = true;
            router.autoload = Some(dir);
        }

        for route in &config.routes {
            router.add_route(route.to_route())?;
        }

        Ok(router)
    }

    pub fn with_metadata(mut self, reader: Arc<dyn MetadataReader>) -> Self {
        self.reader = reader;
        self.read_manifests = false;
        self
    }

    /// Directory scanned for controller units on first dispatch.
    pub fn with_autoload(mut self, dir: impl Into<PathBuf>) -> Self {
        self.autoload = Some(dir.into());
        self.discovered = false;
        self
    }

    pub fn subscribe(&mut self, listener: Arc<dyn EventListener>) {
        self.events.subscribe(listener);
    }

    /// Register a route explicitly.
    pub fn add_route(&mut self, route: Route) -> RoutingResult<()> {
        self.routes.add(route)?;
        self.mark_ready();
        Ok(())
    }

    /// Register several routes; nothing is added if one is invalid.
    pub fn collect<I>(&mut self, routes: I) -> RoutingResult<()>
    where
        I: IntoIterator<Item = Route>,
    {
        self.routes.collect(routes)?;
        self.mark_ready();
        Ok(())
    }

    /// Run discovery if an autoload directory is configured and it has not run yet.
    pub fn load_routes(&mut self) -> RoutingResult<()> {
        if self.discovered {
            return Ok(());
        }
        let Some(dir) = self.autoload.clone() else {
            return Ok(());
        };

        let reader: Arc<dyn MetadataReader> = if self.read_manifests && dir.is_dir() {
            Arc::new(ManifestReader::from_dir(&dir))
        } else {
            self.reader.clone()
        };
        let loader = RouteLoader::new(reader, self.registry.clone());
        let discovered = loader.load_routes_from_controllers(&dir)?;
        self.routes.collect(discovered)?;
        self.discovered = true;
        self.mark_ready();
        Ok(())
    }

    /// Dispatch the request's route token and return the handler's response.
    pub fn run(&mut self, request: &RequestContext) -> RoutingResult<Response> {
        let started = Instant::now();
        let token = request.route_token();
        self.state = RouterState::Dispatching;

        let result = self.dispatch(&token);
        let route = self
            .actual_route
            .as_ref()
            .map(|r| r.name().to_string())
            .unwrap_or_else(|| "none".to_string());

        match &result {
            Ok(response) => {
                self.state = RouterState::Done;
                tracing::debug!(token = %token, route = %route, status = %response.status(), "Dispatched");
                metrics::record_dispatch("ok", &route, started);
            }
            Err(e) => {
                self.state = RouterState::Failed;
                tracing::warn!(token = %token, route = %route, error = %e, "Dispatch failed");
                let outcome = if e.is_not_found() { "not_found" } else { "error" };
                metrics::record_dispatch(outcome, &route, started);
            }
        }

        result
    }

    fn dispatch(&mut self, token: &str) -> RoutingResult<Response> {
        self.actual_route = None;
        self.events.trigger(&mut RouterEvent::Start { token });

        self.load_routes()?;

        let (route, values) = {
            let (route, values) = self.match_route(token)?;
            (route.clone(), values)
        };
        self.actual_route = Some(route.clone());

        self.events.trigger(&mut RouterEvent::BeforeCall {
            controller: route.controller(),
            action: route.action(),
        });

        let controller = self.registry.get(route.controller()).ok_or_else(|| {
            RoutingError::Router(format!("Controller '{}' is not registered", route.controller()))
        })?;
        let action = controller.get(route.action()).ok_or_else(|| {
            RoutingError::Router(format!(
                "Controller '{}' has no action '{}'",
                route.controller(),
                route.action()
            ))
        })?;

        let args = bind_arguments(&values, action.params(), &route)?;

        tracing::debug!(
            route = %route.name(),
            controller = %route.controller(),
            action = %route.action(),
            "Calling action"
        );
        let output = action.call(&args);

        let mut response = output.downcast::<Response>().map(|r| *r).map_err(|_| {
            RoutingError::Router(format!(
                "{}::{} did not return a response",
                route.controller(),
                route.action()
            ))
        })?;

        self.events.trigger(&mut RouterEvent::Response {
            route: route.name(),
            response: &mut response,
        });

        Ok(response)
    }

    /// First route, by priority, that matches `token`, with its extracted values.
    pub fn match_route(&self, token: &str) -> RoutingResult<(&Route, IndexMap<String, String>)> {
        for route in self.routes.by_priority() {
            if !route.is_match(token) {
                continue;
            }
            let values = route.values_by_match(token);
            if values.is_empty() && route.has_placeholders() {
                tracing::warn!(
                    route = %route.name(),
                    token = %token,
                    "Route matched but no values could be extracted, trying next route"
                );
                continue;
            }
            return Ok((route, values));
        }

        Err(RoutingError::NotFoundRoute(RouteLookup::Token(token.to_string())))
    }

    /// Registered route named `name`.
    pub fn route(&self, name: &str) -> RoutingResult<&Route> {
        self.routes
            .get(name)
            .ok_or_else(|| RoutingError::NotFoundRoute(RouteLookup::Name(name.to_string())))
    }

    /// URL for a named route, prefixed with the request's base path.
    pub fn generate_url<I, K, V>(
        &self,
        name: &str,
        parameters: I,
        request: &RequestContext,
    ) -> RoutingResult<String>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: ToString,
    {
        let path = self.generator.generate(self.route(name)?, parameters)?;
        Ok(format!("{}{}", request.base_path(), path))
    }

    /// Like `generate_url`, prefixed with scheme and host when the request has one.
    pub fn generate_absolute_url<I, K, V>(
        &self,
        name: &str,
        parameters: I,
        request: &RequestContext,
    ) -> RoutingResult<String>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: ToString,
    {
        let path = self.generator.generate(self.route(name)?, parameters)?;
        Ok(format!("{}{}", request.absolute_base(), path))
    }

    /// Route matched by the most recent `run`.
    pub fn actual_route(&self) -> Option<&Route> {
        self.actual_route.as_ref()
    }

    /// All routes in registration order.
    pub fn routes(&self) -> &RouteCollection {
        &self.routes
    }

    pub fn state(&self) -> RouterState {
        self.state
    }

    pub fn is_discovered(&self) -> bool {
        self.discovered
    }

    fn mark_ready(&mut self) {
        if self.state == RouterState::Uninitialized {
            self.state = RouterState::Ready;
        }
    }
}

impl std::fmt::Debug for Router {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Router")
            .field("routes", &self.routes.len())
            .field("autoload", &self.autoload)
            .field("discovered", &self.discovered)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

/// Positional handler arguments, looked up by parameter name.
fn bind_arguments(
    values: &IndexMap<String, String>,
    params: &[String],
    route: &Route,
) -> RoutingResult<Vec<String>> {
    params
        .iter()
        .map(|param| {
            values
                .get(param)
                .filter(|v| !v.is_empty())
                .cloned()
                .ok_or_else(|| RoutingError::UnknownParameter {
                    parameter: param.clone(),
                    controller: route.controller().to_string(),
                    action: route.action().to_string(),
                })
        })
        .collect()
}
