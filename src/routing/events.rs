//! Router lifecycle events.
//!
//! Listeners see every event in subscription order. The response event hands
//! out a mutable reference; whatever the listeners leave there is what the
//! router returns.

use std::sync::Arc;

use crate::http::Response;

/// Events emitted while dispatching one route token.
#[derive(Debug)]
pub enum RouterEvent<'a> {
    /// Dispatch started.
    Start { token: &'a str },
    /// A route matched; the handler is about to run.
    BeforeCall { controller: &'a str, action: &'a str },
    /// The handler produced a response.
    Response {
        route: &'a str,
        response: &'a mut Response,
    },
}

impl RouterEvent<'_> {
    /// Stable event name.
    pub fn name(&self) -> &'static str {
        match self {
            RouterEvent::Start { .. } => "router.start",
            RouterEvent::BeforeCall { .. } => "router.before_call",
            RouterEvent::Response { .. } => "router.response",
        }
    }
}

/// Receives router events.
pub trait EventListener: Send + Sync {
    fn handle(&self, event: &mut RouterEvent<'_>);
}

impl<F> EventListener for F
where
    F: Fn(&mut RouterEvent<'_>) + Send + Sync,
{
    fn handle(&self, event: &mut RouterEvent<'_>) {
        self(event)
    }
}

/// Fans events out to subscribed listeners.
#[derive(Clone, Default)]
pub struct EventDispatcher {
    listeners: Vec<Arc<dyn EventListener>>,
}

impl EventDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self, listener: Arc<dyn EventListener>) {
        self.listeners.push(listener);
    }

    pub fn trigger(&self, event: &mut RouterEvent<'_>) {
        tracing::trace!(event = event.name(), listeners = self.listeners.len(), "Router event");
        for listener in &self.listeners {
            listener.handle(event);
        }
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }
}

impl std::fmt::Debug for EventDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventDispatcher")
            .field("listeners", &self.listeners.len())
            .finish()
    }
}
