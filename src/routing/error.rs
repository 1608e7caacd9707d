//! Routing error taxonomy.

use std::fmt;

use thiserror::Error;

/// What a failed route lookup was looking for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteLookup {
    /// No registered rule matched the route token.
    Token(String),
    /// No route is registered under this name.
    Name(String),
}

impl fmt::Display for RouteLookup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RouteLookup::Token(token) => write!(f, "no route matches '{}'", token),
            RouteLookup::Name(name) => write!(f, "no route named '{}'", name),
        }
    }
}

/// Errors that can occur while registering, matching or generating routes.
#[derive(Debug, Error)]
pub enum RoutingError {
    /// A route is missing one of rule, name, controller or action.
    #[error("Route is not valid: {0}")]
    InvalidRoute(String),

    /// No route matched a token, or no route exists under a name.
    #[error("Not found route: {0}")]
    NotFoundRoute(RouteLookup),

    /// URL generation lacks a value for a placeholder.
    #[error("Route '{route}' needed '{parameter}'")]
    MissingParameter { route: String, parameter: String },

    /// Dispatch could not bind a handler parameter from the matched values.
    #[error("Unknown parameter '{parameter}' for {controller}::{action}")]
    UnknownParameter {
        parameter: String,
        controller: String,
        action: String,
    },

    /// The rule plus requirements do not form a valid regular expression.
    #[error("Route '{route}' has an invalid pattern: {source}")]
    InvalidPattern {
        route: String,
        #[source]
        source: regex::Error,
    },

    /// Configuration or environment problem (missing autoload directory,
    /// unregistered controller, handler returned something that is not a response).
    #[error("Router: {0}")]
    Router(String),
}

impl RoutingError {
    /// HTTP status an embedding server should answer with.
    pub fn status_code(&self) -> u16 {
        match self {
            RoutingError::NotFoundRoute(_) => 404,
            _ => 500,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, RoutingError::NotFoundRoute(_))
    }
}

/// Result type for routing operations.
pub type RoutingResult<T> = Result<T, RoutingError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = RoutingError::MissingParameter {
            route: "admin".into(),
            parameter: "action".into(),
        };
        assert_eq!(err.to_string(), "Route 'admin' needed 'action'");

        let err = RoutingError::NotFoundRoute(RouteLookup::Name("homepage".into()));
        assert_eq!(err.to_string(), "Not found route: no route named 'homepage'");
    }

    #[test]
    fn test_status_code() {
        let err = RoutingError::NotFoundRoute(RouteLookup::Token("/x".into()));
        assert_eq!(err.status_code(), 404);
        assert!(err.is_not_found());

        let err = RoutingError::Router("boom".into());
        assert_eq!(err.status_code(), 500);
        assert!(!err.is_not_found());
    }
}
