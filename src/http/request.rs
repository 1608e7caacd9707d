//! Request context handed to the router.
//!
//! # Responsibilities
//! - Carry query parameters, host, script name and scheme explicitly
//! - Normalize the `_route` token
//! - Derive the base path/URI used for generated URLs
//!
//! # Design Decisions
//! - Built by the transport (see `server.rs`) or by hand in tests; the router
//!   never reads ambient request state
//! - A token without a leading `/` gets one; a missing token is `/`

use std::collections::HashMap;

use axum::http::{header, Request};
use percent_encoding::percent_decode_str;
use url::form_urlencoded;

/// Query key holding the route token.
pub const ROUTE_PARAM: &str = "_route";

/// Request state the router needs for one dispatch.
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    query: HashMap<String, String>,
    host: Option<String>,
    script_name: String,
    secure: bool,
}

impl RequestContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse an `a=1&b=2` query string.
    pub fn from_query_str(query: &str) -> Self {
        Self {
            query: form_urlencoded::parse(query.as_bytes()).into_owned().collect(),
            ..Self::default()
        }
    }

    /// Build a context from an HTTP request.
    ///
    /// When the query carries no `_route`, the percent-decoded URI path is
    /// used as the token.
    pub fn from_http<B>(request: &Request<B>) -> Self {
        let mut ctx = Self::from_query_str(request.uri().query().unwrap_or_default());
        if !ctx.query.contains_key(ROUTE_PARAM) {
            let path = percent_decode_str(request.uri().path()).decode_utf8_lossy();
            ctx.query.insert(ROUTE_PARAM.to_string(), path.into_owned());
        }

        ctx.host = request
            .headers()
            .get(header::HOST)
            .and_then(|h| h.to_str().ok())
            .map(str::to_string)
            .or_else(|| request.uri().authority().map(|a| a.to_string()));
        ctx.secure = request.uri().scheme_str() == Some("https");
        ctx
    }

    pub fn with_query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.insert(key.into(), value.into());
        self
    }

    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }

    /// Path of the front script, e.g. `/app/index.php`.
    pub fn with_script_name(mut self, script_name: impl Into<String>) -> Self {
        self.script_name = script_name.into();
        self
    }

    pub fn with_secure(mut self, secure: bool) -> Self {
        self.secure = secure;
        self
    }

    pub fn query(&self, key: &str) -> Option<&str> {
        self.query.get(key).map(String::as_str)
    }

    pub fn host(&self) -> Option<&str> {
        self.host.as_deref()
    }

    /// Normalized route token.
    pub fn route_token(&self) -> String {
        match self.query(ROUTE_PARAM).filter(|t| !t.is_empty()) {
            Some(token) if token.starts_with('/') => token.to_string(),
            Some(token) => format!("/{}", token),
            None => "/".to_string(),
        }
    }

    /// Directory of the script name, without a trailing slash.
    pub fn base_path(&self) -> String {
        match self.script_name.rsplit_once('/') {
            Some((dir, _)) => dir.trim_end_matches('/').to_string(),
            None => String::new(),
        }
    }

    /// `scheme://host` followed by the base path, or just the base path without a host.
    pub fn absolute_base(&self) -> String {
        match &self.host {
            Some(host) => {
                let scheme = if self.secure { "https" } else { "http" };
                format!("{}://{}{}", scheme, host, self.base_path())
            }
            None => self.base_path(),
        }
    }
}
