//! URL generation, the inverse of rule compilation.
//!
//! # Responsibilities
//! - Substitute placeholders with parameter values, left to right
//! - Fail on missing or empty values
//! - Append unused parameters as a query string
//!
//! # Design Decisions
//! - Shares the placeholder scanner with `pattern`, so a URL generated from
//!   a route's rule is matched by the same route
//! - Query order is the insertion order of the remaining parameters
//! - Query values are form-urlencoded; path values are inserted as given

use indexmap::IndexMap;
use url::form_urlencoded;

use crate::routing::error::{RoutingError, RoutingResult};
use crate::routing::pattern;
use crate::routing::route::Route;

/// Insertion-ordered parameter set used for URL generation.
pub type Parameters = IndexMap<String, String>;

/// Builds URLs from route rules.
#[derive(Debug, Clone, Copy, Default)]
pub struct UrlGenerator;

impl UrlGenerator {
    pub fn new() -> Self {
        Self
    }

    /// Generate the path (plus query string) for `route`.
    pub fn generate<I, K, V>(&self, route: &Route, parameters: I) -> RoutingResult<String>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: ToString,
    {
        let mut remaining: Parameters = parameters
            .into_iter()
            .map(|(k, v)| (k.into(), v.to_string()))
            .collect();

        let rule = route.rule();
        let mut url = String::with_capacity(rule.len());
        let mut last = 0;

        for placeholder in pattern::placeholders(rule) {
            url.push_str(&rule[last..placeholder.range.start]);

            let value = remaining
                .shift_remove(placeholder.name)
                .filter(|v| !v.is_empty())
                .ok_or_else(|| RoutingError::MissingParameter {
                    route: route.name().to_string(),
                    parameter: placeholder.name.to_string(),
                })?;
            url.push_str(&value);

            last = placeholder.range.end;
        }
        url.push_str(&rule[last..]);

        if remaining.is_empty() {
            return Ok(url);
        }

        let query = form_urlencoded::Serializer::new(String::new())
            .extend_pairs(remaining.iter())
            .finish();
        url.push('?');
        url.push_str(&query);

        Ok(url)
    }
}
