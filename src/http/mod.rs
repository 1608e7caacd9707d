//! HTTP transport subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (axum app, request ID, trace, timeout)
//!     → request.rs (RequestContext: `_route` token, host, base path)
//!     → routing::Router::run
//!     → response.rs (handler Response → axum response)
//!     → Send to client
//! ```

pub mod request;
pub mod response;
pub mod server;

pub use request::{RequestContext, ROUTE_PARAM};
pub use response::Response;
pub use server::DispatchServer;
