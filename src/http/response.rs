//! Renderable responses produced by controller actions.
//!
//! # Design Decisions
//! - A response is a plain `http::Response<String>`; handlers returning any
//!   other type are rejected by the router
//! - Conversion to an axum response happens only at the server edge

use axum::body::Body;
use axum::http::{header, HeaderValue, StatusCode};

/// Response type controller actions must return.
pub type Response = axum::http::Response<String>;

/// 200 response with a plain-text body.
pub fn text(body: impl Into<String>) -> Response {
    with_status(StatusCode::OK, body)
}

/// Plain-text response with the given status.
pub fn with_status(status: StatusCode, body: impl Into<String>) -> Response {
    let mut response = Response::new(body.into());
    *response.status_mut() = status;
    response.headers_mut().insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("text/plain; charset=utf-8"),
    );
    response
}

/// Convert into the server's response type.
pub fn into_axum(response: Response) -> axum::response::Response {
    response.map(Body::from)
}
