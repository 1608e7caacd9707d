//! Request-routing core: match a route token to the best registered route,
//! bind its typed parameters to a controller action, and generate URLs back
//! from route names.

pub mod config;
pub mod http;
pub mod observability;
pub mod routing;

pub use config::AppConfig;
pub use http::{DispatchServer, RequestContext, Response};
pub use routing::{
    Controller, ControllerRegistry, Route, RouteCollection, Router, RoutingError, RoutingResult,
    UrlGenerator,
};
