//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Reject incomplete or duplicate route definitions
//! - Compile requirement sub-patterns before any route is registered
//! - Validate value ranges (timeouts > 0)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: AppConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::collections::HashSet;

use indexmap::IndexMap;
use thiserror::Error;

use crate::config::schema::{AppConfig, RouteConfig};
use crate::routing::pattern::{self, CompiledPattern};

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("route #{index} has an empty '{field}'")]
    EmptyField { index: usize, field: &'static str },

    #[error("route name '{0}' is defined more than once")]
    DuplicateName(String),

    #[error("route '{route}' requirement for '{parameter}' is not a valid pattern: {message}")]
    InvalidRequirement {
        route: String,
        parameter: String,
        message: String,
    },

    #[error("route '{route}' has a requirement for unknown parameter '{parameter}'")]
    UnknownRequirement { route: String, parameter: String },

    #[error("server.request_timeout_secs must be greater than zero")]
    ZeroTimeout,
}

/// Check the whole configuration, collecting every error.
pub fn validate_config(config: &AppConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();
    let mut names = HashSet::new();

    for (index, route) in config.routing.routes.iter().enumerate() {
        validate_route(index, route, &mut errors);

        if !route.name.is_empty() && !names.insert(route.name.as_str()) {
            errors.push(ValidationError::DuplicateName(route.name.clone()));
        }
    }

    if config.server.request_timeout_secs == 0 {
        errors.push(ValidationError::ZeroTimeout);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn validate_route(index: usize, route: &RouteConfig, errors: &mut Vec<ValidationError>) {
    for (field, value) in [
        ("name", &route.name),
        ("rule", &route.rule),
        ("controller", &route.controller),
        ("action", &route.action),
    ] {
        if value.is_empty() {
            errors.push(ValidationError::EmptyField { index, field });
        }
    }

    let placeholders: HashSet<&str> = pattern::placeholders(&route.rule).map(|p| p.name).collect();

    for (parameter, requirement) in &route.requirements {
        if !placeholders.contains(parameter.as_str()) {
            errors.push(ValidationError::UnknownRequirement {
                route: route.name.clone(),
                parameter: parameter.clone(),
            });
            continue;
        }

        // each requirement on its own, so the error names the culprit
        let single = IndexMap::from([(parameter.clone(), requirement.clone())]);
        let sample = format!("{{{}}}", parameter);
        if let Err(e) = CompiledPattern::compile(&sample, &single) {
            errors.push(ValidationError::InvalidRequirement {
                route: route.name.clone(),
                parameter: parameter.clone(),
                message: e.to_string(),
            });
        }
    }
}
