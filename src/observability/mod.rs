//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! routing / http / config produce:
//!     → logging.rs (structured log events via tracing)
//!     → metrics.rs (dispatch counters and latencies)
//! ```

pub mod logging;
pub mod metrics;
