//! A single routing rule and its lazily compiled matcher.
//!
//! # Responsibilities
//! - Hold rule, name, controller, action, requirements and priority
//! - Report structural validity
//! - Match a route token and extract named values
//!
//! # Design Decisions
//! - Built with consuming `with_*` setters; every setter that feeds the
//!   pattern resets the compiled cache, so a stored route never goes stale
//! - Compilation happens on first use and is cached, broken patterns included

use std::sync::OnceLock;

use indexmap::IndexMap;

use crate::routing::error::{RoutingError, RoutingResult};
use crate::routing::pattern::{self, CompiledPattern};

/// A routing rule bound to a controller action.
#[derive(Debug, Clone, Default)]
pub struct Route {
    rule: Option<String>,
    name: Option<String>,
    controller: Option<String>,
    action: Option<String>,
    requirements: IndexMap<String, String>,
    priority: i32,
    compiled: OnceLock<Result<CompiledPattern, regex::Error>>,
}

impl Route {
    /// Create a fully specified route with default priority and no requirements.
    pub fn new(
        name: impl Into<String>,
        rule: impl Into<String>,
        controller: impl Into<String>,
        action: impl Into<String>,
    ) -> Self {
        Self::default()
            .with_name(name)
            .with_rule(rule)
            .with_controller(controller)
            .with_action(action)
    }

    pub fn with_rule(mut self, rule: impl Into<String>) -> Self {
        self.rule = Some(rule.into());
        self.compiled = OnceLock::new();
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_controller(mut self, controller: impl Into<String>) -> Self {
        self.controller = Some(controller.into());
        self
    }

    pub fn with_action(mut self, action: impl Into<String>) -> Self {
        self.action = Some(action.into());
        self
    }

    /// Replace all requirements.
    pub fn with_requirements<I, K, V>(mut self, requirements: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.requirements = requirements
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        self.compiled = OnceLock::new();
        self
    }

    /// Constrain a single parameter.
    pub fn with_requirement(mut self, name: impl Into<String>, pattern: impl Into<String>) -> Self {
        self.requirements.insert(name.into(), pattern.into());
        self.compiled = OnceLock::new();
        self
    }

    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    /// A route is valid when rule, name, controller and action are all set.
    pub fn is_valid(&self) -> bool {
        self.rule.is_some() && self.name.is_some() && self.controller.is_some() && self.action.is_some()
    }

    pub fn rule(&self) -> &str {
        self.rule.as_deref().unwrap_or_default()
    }

    pub fn name(&self) -> &str {
        self.name.as_deref().unwrap_or_default()
    }

    pub fn controller(&self) -> &str {
        self.controller.as_deref().unwrap_or_default()
    }

    pub fn action(&self) -> &str {
        self.action.as_deref().unwrap_or_default()
    }

    pub fn requirements(&self) -> &IndexMap<String, String> {
        &self.requirements
    }

    pub fn priority(&self) -> i32 {
        self.priority
    }

    /// Placeholder names of the rule, left to right.
    pub fn placeholders(&self) -> Vec<&str> {
        pattern::placeholders(self.rule()).map(|p| p.name).collect()
    }

    pub fn has_placeholders(&self) -> bool {
        pattern::placeholders(self.rule()).next().is_some()
    }

    /// The compiled matcher, built on first access.
    pub fn compiled_pattern(&self) -> RoutingResult<&CompiledPattern> {
        self.compiled
            .get_or_init(|| CompiledPattern::compile(self.rule(), &self.requirements))
            .as_ref()
            .map_err(|e| RoutingError::InvalidPattern {
                route: self.name().to_string(),
                source: e.clone(),
            })
    }

    /// True when the whole token matches the compiled rule.
    pub fn is_match(&self, token: &str) -> bool {
        match self.compiled_pattern() {
            Ok(pattern) => pattern.is_match(token),
            Err(e) => {
                tracing::warn!(route = %self.name(), error = %e, "Skipping route with broken pattern");
                false
            }
        }
    }

    /// Named values captured from `token`.
    ///
    /// Empty when the token does not match, or when the capture count differs
    /// from the placeholder count (requirements with their own groups).
    pub fn values_by_match(&self, token: &str) -> IndexMap<String, String> {
        let Ok(pattern) = self.compiled_pattern() else {
            return IndexMap::new();
        };
        let Some(values) = pattern.captures(token) else {
            return IndexMap::new();
        };
        if values.len() != pattern.param_names().len() {
            return IndexMap::new();
        }

        pattern.param_names().iter().cloned().zip(values).collect()
    }
}
