//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Startup:
//!     explicit routes (config / add_route)
//!     + discovery.rs (controller units + metadata.rs descriptors)
//!     → collection.rs (validated, insertion ordered)
//!
//! Dispatch (router.rs):
//!     RequestContext → route token
//!     → collection sorted by priority
//!     → route.rs / pattern.rs (first full-token match, named values)
//!     → registry.rs (controller action + declared parameter order)
//!     → handler → Response (events.rs hooks around the call)
//!
//! Generation (generator.rs):
//!     route name + parameters → substituted rule [+ ?query]
//! ```
//!
//! # Design Decisions
//! - First match wins, ordered by priority (stable on ties)
//! - Match and generate share one placeholder grammar
//! - Handler parameters are declared at registration, not introspected
//! - Typed errors propagate to the caller; nothing is retried

pub mod collection;
pub mod discovery;
pub mod error;
pub mod events;
pub mod generator;
pub mod metadata;
pub mod pattern;
pub mod registry;
pub mod route;
pub mod router;

pub use collection::RouteCollection;
pub use discovery::{RouteDescriptor, RouteLoader};
pub use error::{RouteLookup, RoutingError, RoutingResult};
pub use events::{EventDispatcher, EventListener, RouterEvent};
pub use generator::{Parameters, UrlGenerator};
pub use metadata::{ManifestReader, MetadataReader, StaticMetadata};
pub use registry::{Action, Controller, ControllerRegistry};
pub use route::Route;
pub use router::{Router, RouterState};
