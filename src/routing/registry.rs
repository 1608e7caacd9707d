//! Controller registry.
//!
//! # Responsibilities
//! - Resolve a controller identifier to its registered actions
//! - Record, per action, the ordered parameter names the handler expects
//! - Type-erase handler results so the router can check them
//!
//! # Design Decisions
//! - Parameter lists are declared at registration time instead of being
//!   discovered by introspection
//! - Handlers receive arguments positionally, in declaration order
//! - Registration is append-only; re-registering a controller replaces it

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;

/// Type-erased handler result.
pub type Output = Box<dyn Any + Send>;

/// Type-erased handler.
pub type Handler = Arc<dyn Fn(&[String]) -> Output + Send + Sync>;

/// A controller operation with its declared parameters.
#[derive(Clone)]
pub struct Action {
    name: String,
    params: Vec<String>,
    handler: Handler,
}

impl Action {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Parameter names in the order the handler receives them.
    pub fn params(&self) -> &[String] {
        &self.params
    }

    pub fn call(&self, args: &[String]) -> Output {
        (self.handler)(args)
    }
}

impl fmt::Debug for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Action")
            .field("name", &self.name)
            .field("params", &self.params)
            .finish_non_exhaustive()
    }
}

/// A registered controller and its public actions.
#[derive(Debug, Clone)]
pub struct Controller {
    id: String,
    actions: IndexMap<String, Action>,
}

impl Controller {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            actions: IndexMap::new(),
        }
    }

    /// Register an action taking `params` positionally.
    pub fn action<F, R>(mut self, name: impl Into<String>, params: &[&str], handler: F) -> Self
    where
        F: Fn(&[String]) -> R + Send + Sync + 'static,
        R: Any + Send,
    {
        let name = name.into();
        let action = Action {
            name: name.clone(),
            params: params.iter().map(|p| p.to_string()).collect(),
            handler: Arc::new(move |args: &[String]| -> Output { Box::new(handler(args)) }),
        };
        self.actions.insert(name, action);
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn get(&self, action: &str) -> Option<&Action> {
        self.actions.get(action)
    }

    /// Actions in registration order.
    pub fn actions(&self) -> impl Iterator<Item = &Action> {
        self.actions.values()
    }
}

/// Object container for controllers.
#[derive(Debug, Clone, Default)]
pub struct ControllerRegistry {
    controllers: IndexMap<String, Controller>,
}

impl ControllerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(mut self, controller: Controller) -> Self {
        self.insert(controller);
        self
    }

    pub fn insert(&mut self, controller: Controller) {
        tracing::debug!(
            controller = %controller.id,
            actions = controller.actions.len(),
            "Controller registered"
        );
        self.controllers.insert(controller.id.clone(), controller);
    }

    pub fn get(&self, id: &str) -> Option<&Controller> {
        self.controllers.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.controllers.contains_key(id)
    }

    /// Controllers in registration order.
    pub fn controllers(&self) -> impl Iterator<Item = &Controller> {
        self.controllers.values()
    }

    pub fn len(&self) -> usize {
        self.controllers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.controllers.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_receives_positional_arguments() {
        let controller = Controller::new("TestController").action(
            "index",
            &["limit", "offset"],
            |args: &[String]| args.join("-"),
        );

        let action = controller.get("index").unwrap();
        assert_eq!(action.params(), &["limit", "offset"]);

        let output = action.call(&["10".to_string(), "20".to_string()]);
        assert_eq!(*output.downcast::<String>().unwrap(), "10-20");
    }

    #[test]
    fn test_registry_lookup() {
        let registry = ControllerRegistry::new()
            .register(Controller::new("AController").action("a", &[], |_: &[String]| ()))
            .register(Controller::new("BController"));

        assert_eq!(registry.len(), 2);
        assert!(registry.contains("AController"));
        assert!(registry.get("AController").unwrap().get("a").is_some());
        assert!(registry.get("CController").is_none());

        let ids: Vec<_> = registry.controllers().map(Controller::id).collect();
        assert_eq!(ids, vec!["AController", "BController"]);
    }
}
