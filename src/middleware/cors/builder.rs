use tracing::info;

use super::{CorsConfigError, CorsMiddleware, OriginDecision, OriginSpec};

/// Methods allowed when none are configured
pub const DEFAULT_METHODS: [&str; 6] = ["GET", "HEAD", "PUT", "PATCH", "POST", "DELETE"];

/// Request headers allowed when none are configured
pub const DEFAULT_ALLOWED_HEADERS: [&str; 1] = ["content-type"];

/// Status sent for a terminated preflight request when none is configured
pub const DEFAULT_OPTIONS_SUCCESS_STATUS: u16 = 204;

/// Builder for creating `CorsMiddleware` with a fluent API
///
/// # Example
///
/// ```rust
/// use brrtrouter_cors::middleware::CorsMiddlewareBuilder;
///
/// let cors = CorsMiddlewareBuilder::new()
///     .origin(["https://example.com", "https://api.example.com"])
///     .allowed_methods(["get", "post", "put"])
///     .allowed_headers(["Content-Type", "Authorization", "X-Custom-Header"])
///     .credentials(true)
///     .exposed_headers(["X-Total-Count", "X-Page-Number"])
///     .max_age(3600) // Cache preflight for 1 hour
///     .build()
///     .expect("Invalid CORS configuration");
/// ```
#[derive(Debug, Clone)]
pub struct CorsMiddlewareBuilder {
    origin: OriginSpec,
    methods: Vec<String>,
    allowed_headers: Vec<String>,
    exposed_headers: Option<Vec<String>>,
    credentials: bool,
    max_age: Option<u64>,
    options_success_status: u16,
    preflight_continue: bool,
}

impl CorsMiddlewareBuilder {
    /// Create a new builder with the default policy
    ///
    /// Default configuration:
    /// - Origin: `*`
    /// - Methods: `GET, HEAD, PUT, PATCH, POST, DELETE`
    /// - Allowed headers: `["content-type"]`
    /// - Exposed headers: unset
    /// - Credentials: `false`
    /// - Max age: unset
    /// - Preflight status: `204`, preflight requests are not passed on
    #[must_use]
    pub fn new() -> Self {
        Self {
            origin: OriginSpec::default(),
            methods: DEFAULT_METHODS.iter().map(|m| m.to_string()).collect(),
            allowed_headers: DEFAULT_ALLOWED_HEADERS
                .iter()
                .map(|h| h.to_string())
                .collect(),
            exposed_headers: None,
            credentials: false,
            max_age: None,
            options_success_status: DEFAULT_OPTIONS_SUCCESS_STATUS,
            preflight_continue: false,
        }
    }

    /// Set the origin policy
    ///
    /// Accepts anything convertible into an [`OriginSpec`]: `bool`, `&str` /
    /// `String`, arrays, vectors and sets of strings, a compiled
    /// `regex::Regex`, or a `serde_json::Value` (validated in `build()`).
    #[must_use]
    pub fn origin(mut self, origin: impl Into<OriginSpec>) -> Self {
        self.origin = origin.into();
        self
    }

    /// Resolve the origin with a callback on every request
    ///
    /// The returned string is written verbatim. A value that is not a valid
    /// header value (control characters, non-ASCII) is logged with `warn!`
    /// and later makes [`HandlerResponse::into_http`](crate::dispatcher::HandlerResponse::into_http)
    /// fail with `InvalidHeaderValue`.
    ///
    /// # Example
    ///
    /// ```rust
    /// use brrtrouter_cors::middleware::CorsMiddlewareBuilder;
    ///
    /// let cors = CorsMiddlewareBuilder::new()
    ///     .origin_fn(|req, _res| {
    ///         req.get_header("x-tenant-origin").unwrap_or("null").to_string()
    ///     })
    ///     .build()
    ///     .unwrap();
    /// ```
    #[must_use]
    pub fn origin_fn<F>(self, f: F) -> Self
    where
        F: Fn(&crate::dispatcher::HandlerRequest, &mut crate::dispatcher::HandlerResponse) -> String
            + Send
            + Sync
            + 'static,
    {
        self.origin(OriginSpec::callback(f))
    }

    /// Set allowed HTTP methods
    ///
    /// Names are upper-cased on the wire, so `["get"]` and `[Method::GET]`
    /// produce the same header.
    #[must_use]
    pub fn allowed_methods<I, S>(mut self, methods: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.methods = methods.into_iter().map(|m| m.as_ref().to_string()).collect();
        self
    }

    /// Set allowed request headers
    ///
    /// An empty list suppresses `Access-Control-Allow-Headers`.
    #[must_use]
    pub fn allowed_headers<I, S>(mut self, headers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.allowed_headers = headers.into_iter().map(Into::into).collect();
        self
    }

    /// Set headers to expose to JavaScript
    ///
    /// An empty list writes no `Access-Control-Expose-Headers`.
    #[must_use]
    pub fn exposed_headers<I, S>(mut self, headers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.exposed_headers = Some(headers.into_iter().map(Into::into).collect());
        self
    }

    /// Enable or disable `Access-Control-Allow-Credentials: true`
    #[must_use]
    pub fn credentials(mut self, allow: bool) -> Self {
        self.credentials = allow;
        self
    }

    /// Set preflight cache duration in seconds
    ///
    /// `0` is written as-is and tells browsers not to cache the preflight.
    #[must_use]
    pub fn max_age(mut self, seconds: u64) -> Self {
        self.max_age = Some(seconds);
        self
    }

    /// Status code for terminated preflight requests
    #[must_use]
    pub fn options_success_status(mut self, status: u16) -> Self {
        self.options_success_status = status;
        self
    }

    /// Pass `OPTIONS` requests on to the next stage instead of ending them
    #[must_use]
    pub fn preflight_continue(mut self, enabled: bool) -> Self {
        self.preflight_continue = enabled;
        self
    }

    /// Build the CORS middleware
    ///
    /// The origin decision is resolved here, once.
    ///
    /// # Errors
    ///
    /// Returns `CorsConfigError::InvalidOriginSpec` if the origin came from a
    /// configuration value of an unsupported shape, and
    /// `CorsConfigError::InvalidOriginPattern` if its regex does not compile.
    pub fn build(self) -> Result<CorsMiddleware, CorsConfigError> {
        let origin = OriginDecision::build(self.origin)?;

        let allow_methods = self.methods.join(", ").to_uppercase();
        let allowed_headers = (!self.allowed_headers.is_empty()).then(|| self.allowed_headers.join(", "));
        let exposed_headers = self
            .exposed_headers
            .filter(|h| !h.is_empty())
            .map(|h| h.join(", "));

        info!(
            origin = origin.kind(),
            methods = %allow_methods,
            credentials = self.credentials,
            preflight_continue = self.preflight_continue,
            "CORS middleware configured"
        );

        Ok(CorsMiddleware {
            origin,
            allow_methods,
            allowed_headers,
            exposed_headers,
            credentials: self.credentials,
            max_age: self.max_age.map(|s| s.to_string()),
            options_success_status: self.options_success_status,
            preflight_continue: self.preflight_continue,
        })
    }
}

impl Default for CorsMiddlewareBuilder {
    fn default() -> Self {
        Self::new()
    }
}
