//! Dispatcher core module - request/response values and the middleware chain.
//!
//! The CORS middleware runs on every request, so the types here keep headers in
//! a `SmallVec` and avoid allocating on lookups.

#![deny(clippy::inefficient_to_string)]
#![deny(clippy::unnecessary_to_owned)]

use http::{HeaderValue, Method};
use serde_json::Value;
use smallvec::SmallVec;
use std::sync::Arc;
use tracing::{debug, info};

use crate::middleware::{Flow, Middleware};

/// Maximum inline headers before heap allocation
pub const MAX_INLINE_HEADERS: usize = 16;

/// Stack-allocated header storage
///
/// Header names use `Arc<str>` so that repeated names (the CORS headers are
/// written on every response) clone in O(1).
pub type HeaderVec = SmallVec<[(Arc<str>, String); MAX_INLINE_HEADERS]>;

/// Read-only view of an incoming request
///
/// Only the parts the middleware chain needs: method, path and headers.
/// Header lookups are case-insensitive per RFC 7230.
#[derive(Debug, Clone)]
pub struct HandlerRequest {
    /// HTTP method (GET, POST, etc.)
    pub method: Method,
    /// Request path
    pub path: String,
    /// HTTP headers (stack-allocated for ≤16 headers)
    pub headers: HeaderVec,
}

impl HandlerRequest {
    /// Create a request with no headers
    #[must_use]
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            headers: HeaderVec::new(),
        }
    }

    /// Add a header, keeping any existing value with the same name
    #[must_use]
    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.push((Arc::from(name), value.into()));
        self
    }

    /// Get a header by name (case-insensitive per RFC 7230)
    #[inline]
    #[must_use]
    pub fn get_header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

impl From<&http::request::Parts> for HandlerRequest {
    /// Build a request view from `http` request parts
    ///
    /// Header values that are not visible ASCII are skipped.
    fn from(parts: &http::request::Parts) -> Self {
        let headers = parts
            .headers
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (Arc::from(name.as_str()), v.to_string()))
            })
            .collect();
        Self {
            method: parts.method.clone(),
            path: parts.uri.path().to_string(),
            headers,
        }
    }
}

/// Mutable response being assembled for a request
///
/// Middleware writes headers into it; a handler (or a middleware that
/// short-circuits) sets the status and body. Once [`HandlerResponse::end`] is
/// called the response is finished and the chain stops.
#[derive(Debug, Clone)]
pub struct HandlerResponse {
    /// HTTP status code (200, 404, 500, etc.)
    pub status: u16,
    /// HTTP response headers (stack-allocated for ≤16 headers)
    pub headers: HeaderVec,
    /// Response body as JSON, `Null` for an empty body
    pub body: Value,
    finished: bool,
}

impl Default for HandlerResponse {
    fn default() -> Self {
        Self::new(200, HeaderVec::new(), Value::Null)
    }
}

impl HandlerResponse {
    /// Create a new response with the given status, headers, and body
    #[must_use]
    pub fn new(status: u16, headers: HeaderVec, body: Value) -> Self {
        Self {
            status,
            headers,
            body,
            finished: false,
        }
    }

    /// Get a header by name
    #[inline]
    #[must_use]
    pub fn get_header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Add or update a header
    pub fn set_header(&mut self, name: &str, value: String) {
        // Remove existing header with same name (case-insensitive)
        self.headers.retain(|(k, _)| !k.eq_ignore_ascii_case(name));
        self.headers.push((Arc::from(name), value));
    }

    /// Set a list-valued header, joined with `", "` for the wire
    pub fn set_header_list<S: AsRef<str>>(&mut self, name: &str, values: &[S]) {
        let joined = values
            .iter()
            .map(AsRef::as_ref)
            .collect::<Vec<_>>()
            .join(", ");
        self.set_header(name, joined);
    }

    /// Add `field` to the `Vary` header without dropping existing entries
    pub fn append_vary(&mut self, field: &str) {
        let merged = super::vary::merge(self.get_header("vary"), field);
        if let Some(value) = merged {
            self.set_header("Vary", value);
        }
    }

    /// Set `Content-Length`
    pub fn set_content_length(&mut self, len: usize) {
        self.set_header("Content-Length", len.to_string());
    }

    /// Finish the response; no further stage may run
    pub fn end(&mut self) {
        self.finished = true;
    }

    /// Whether the response has been terminated
    #[inline]
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Convert into an `http::Response` with a text body
    ///
    /// A `Null` body becomes empty, a string body is sent as-is, anything else
    /// is serialized as JSON.
    pub fn into_http(self) -> Result<http::Response<String>, http::Error> {
        let body = match self.body {
            Value::Null => String::new(),
            Value::String(s) => s,
            other => other.to_string(),
        };
        let mut builder = http::Response::builder().status(self.status);
        for (name, value) in &self.headers {
            builder = builder.header(&**name, HeaderValue::from_str(value)?);
        }
        builder.body(body)
    }
}

/// Terminal handler run after every middleware has passed control on
pub type Handler = Arc<dyn Fn(&HandlerRequest, &mut HandlerResponse) + Send + Sync>;

/// Runs a request through an ordered list of middleware and a terminal handler
///
/// Each middleware receives a continuation to the rest of the chain. A
/// middleware that ends the response (a preflight short-circuit, for example)
/// stops the chain: the handler never runs.
#[derive(Clone)]
pub struct Dispatcher {
    /// Ordered list of middleware to apply to requests/responses
    pub middlewares: Vec<Arc<dyn Middleware>>,
    handler: Handler,
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new(|_req: &HandlerRequest, _res: &mut HandlerResponse| {})
    }
}

impl Dispatcher {
    /// Create a dispatcher with no middleware around `handler`
    #[must_use]
    pub fn new<F>(handler: F) -> Self
    where
        F: Fn(&HandlerRequest, &mut HandlerResponse) + Send + Sync + 'static,
    {
        Self {
            middlewares: Vec::new(),
            handler: Arc::new(handler),
        }
    }

    /// Append a middleware to the end of the chain
    pub fn add_middleware(&mut self, mw: Arc<dyn Middleware>) {
        self.middlewares.push(mw);
        info!(
            total_middlewares = self.middlewares.len(),
            "Middleware registered"
        );
    }

    /// Run `req` through the chain and return the finished response
    #[must_use]
    pub fn dispatch(&self, req: &HandlerRequest) -> HandlerResponse {
        let mut res = HandlerResponse::default();
        self.run_from(0, req, &mut res);
        res
    }

    fn run_from(&self, idx: usize, req: &HandlerRequest, res: &mut HandlerResponse) {
        if res.is_finished() {
            return;
        }
        let Some(mw) = self.middlewares.get(idx) else {
            (self.handler)(req, res);
            return;
        };
        let mut next = |r: &HandlerRequest, s: &mut HandlerResponse| self.run_from(idx + 1, r, s);
        if let Flow::Handled = mw.handle(req, res, Some(&mut next)) {
            debug!(
                middleware_index = idx,
                status = res.status,
                "Middleware ended the response"
            );
        }
    }
}
