//! Ordered, validated set of routes.

use crate::routing::error::{RoutingError, RoutingResult};
use crate::routing::route::Route;

/// Routes in insertion order. Every member is valid.
#[derive(Debug, Clone, Default)]
pub struct RouteCollection {
    routes: Vec<Route>,
}

impl RouteCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a route, rejecting it when it is not valid.
    pub fn add(&mut self, route: Route) -> RoutingResult<()> {
        if !route.is_valid() {
            return Err(RoutingError::InvalidRoute(describe_invalid(&route)));
        }
        self.routes.push(route);
        Ok(())
    }

    /// Append many routes.
    ///
    /// All-or-nothing: every route is validated before any is appended.
    pub fn collect<I>(&mut self, routes: I) -> RoutingResult<()>
    where
        I: IntoIterator<Item = Route>,
    {
        let routes: Vec<Route> = routes.into_iter().collect();
        if let Some(invalid) = routes.iter().find(|r| !r.is_valid()) {
            return Err(RoutingError::InvalidRoute(describe_invalid(invalid)));
        }
        self.routes.extend(routes);
        Ok(())
    }

    /// Routes ordered by priority, highest first. Ties keep insertion order.
    pub fn sort_routes(&self) -> RouteCollection {
        Self {
            routes: self.by_priority().into_iter().cloned().collect(),
        }
    }

    /// Borrowed priority-ordered view.
    pub(crate) fn by_priority(&self) -> Vec<&Route> {
        let mut sorted: Vec<&Route> = self.routes.iter().collect();
        // slice::sort_by is stable
        sorted.sort_by(|a, b| b.priority().cmp(&a.priority()));
        sorted
    }

    /// Routes satisfying `predicate`, in their current order.
    pub fn filter<P>(&self, mut predicate: P) -> RouteCollection
    where
        P: FnMut(&Route) -> bool,
    {
        Self {
            routes: self.routes.iter().filter(|r| predicate(r)).cloned().collect(),
        }
    }

    /// First route registered under `name`.
    pub fn get(&self, name: &str) -> Option<&Route> {
        self.routes.iter().find(|r| r.name() == name)
    }

    /// Compile every pattern up front, failing on the first broken one.
    pub fn compile_all(&self) -> RoutingResult<()> {
        for route in &self.routes {
            route.compiled_pattern()?;
        }
        Ok(())
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Route> {
        self.routes.iter()
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

impl<'a> IntoIterator for &'a RouteCollection {
    type Item = &'a Route;
    type IntoIter = std::slice::Iter<'a, Route>;

    fn into_iter(self) -> Self::IntoIter {
        self.routes.iter()
    }
}

impl IntoIterator for RouteCollection {
    type Item = Route;
    type IntoIter = std::vec::IntoIter<Route>;

    fn into_iter(self) -> Self::IntoIter {
        self.routes.into_iter()
    }
}

fn describe_invalid(route: &Route) -> String {
    let missing: Vec<&str> = [
        ("rule", route.rule()),
        ("name", route.name()),
        ("controller", route.controller()),
        ("action", route.action()),
    ]
    .into_iter()
    .filter(|(_, value)| value.is_empty())
    .map(|(field, _)| field)
    .collect();

    if missing.is_empty() {
        "incomplete route".to_string()
    } else {
        format!("missing {}", missing.join(", "))
    }
}
