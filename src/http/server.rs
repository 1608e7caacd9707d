//! HTTP server embedding the router.
//!
//! # Responsibilities
//! - Create the axum app with catch-all dispatch routes
//! - Wire up middleware (request ID, tracing, timeout)
//! - Seal the router at startup (discovery + pattern compilation)
//! - Dispatch every request through a per-request router clone
//! - Map routing errors to HTTP status codes

use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    extract::State,
    http::{Request, StatusCode},
    response::{IntoResponse, Response},
    routing::any,
};
use tokio::net::TcpListener;
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::ServerConfig;
use crate::http::request::RequestContext;
use crate::http::response::into_axum;
use crate::routing::{Router, RoutingResult};

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    /// Sealed prototype; cloned for each request.
    pub router: Arc<Router>,
}

/// HTTP front end dispatching requests through a [`Router`].
pub struct DispatchServer {
    app: axum::Router,
    config: ServerConfig,
}

impl DispatchServer {
    /// Seal `router` and build the app.
    ///
    /// Discovery runs here, once; a missing autoload directory or a route
    /// with a broken pattern fails startup instead of a request.
    pub fn new(mut router: Router, config: ServerConfig) -> RoutingResult<Self> {
        router.load_routes()?;
        router.routes().compile_all()?;

        tracing::info!(routes = router.routes().len(), "Router sealed");

        let state = AppState {
            router: Arc::new(router),
        };
        let app = Self::build_app(&config, state);
        Ok(Self { app, config })
    }

    /// Build the axum app with all middleware layers.
    #[allow(deprecated)]
    fn build_app(config: &ServerConfig, state: AppState) -> axum::Router {
        axum::Router::new()
            .route("/{*path}", any(dispatch_handler))
            .route("/", any(dispatch_handler))
            .with_state(state)
            .layer(TimeoutLayer::new(Duration::from_secs(config.request_timeout_secs)))
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(TraceLayer::new_for_http())
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
    }

    /// The app, for embedding or in-process testing.
    pub fn into_app(self) -> axum::Router {
        self.app
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Serve on `listener` until Ctrl+C.
    pub async fn run(self, listener: TcpListener) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Resolve the route token and run the matching action.
async fn dispatch_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
        .to_string();

    let ctx = RequestContext::from_http(&request);
    let mut router = (*state.router).clone();

    match router.run(&ctx) {
        Ok(response) => into_axum(response),
        Err(e) => {
            tracing::warn!(
                request_id = %request_id,
                token = %ctx.route_token(),
                error = %e,
                "Request not dispatched"
            );
            let status =
                StatusCode::from_u16(e.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
            let body = if e.is_not_found() {
                "No matching route found"
            } else {
                "Internal routing error"
            };
            (status, body).into_response()
        }
    }
}

/// Wait for shutdown signal (Ctrl+C).
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to install Ctrl+C handler");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
