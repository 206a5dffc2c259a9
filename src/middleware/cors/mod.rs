mod builder;
mod config;
mod error;
mod origin;

pub use builder::{
    CorsMiddlewareBuilder, DEFAULT_ALLOWED_HEADERS, DEFAULT_METHODS,
    DEFAULT_OPTIONS_SUCCESS_STATUS,
};
pub use config::CorsConfig;
pub use error::{CorsConfigError, INVALID_ORIGIN_SPEC_MESSAGE};
pub use origin::{OriginCallback, OriginDecision, OriginSpec};

use tracing::debug;

use super::{Flow, Middleware, Next};
use crate::dispatcher::{HandlerRequest, HandlerResponse};

pub const ALLOW_ORIGIN: &str = "Access-Control-Allow-Origin";
pub const ALLOW_METHODS: &str = "Access-Control-Allow-Methods";
pub const ALLOW_HEADERS: &str = "Access-Control-Allow-Headers";
pub const EXPOSE_HEADERS: &str = "Access-Control-Expose-Headers";
pub const ALLOW_CREDENTIALS: &str = "Access-Control-Allow-Credentials";
pub const MAX_AGE: &str = "Access-Control-Max-Age";

/// CORS (Cross-Origin Resource Sharing) middleware
///
/// Writes the CORS response headers for every request and ends preflight
/// (`OPTIONS`) requests unless configured to pass them on.
///
/// All configuration is resolved when the middleware is built: header values
/// are pre-joined and the origin policy is turned into a single
/// [`OriginDecision`]. Handling a request only reads that state, so one
/// instance can be shared behind an `Arc` by every worker.
///
/// # Usage
///
/// ```rust
/// use brrtrouter_cors::dispatcher::{HandlerRequest, HandlerResponse};
/// use brrtrouter_cors::middleware::{CorsMiddleware, Flow};
/// use http::Method;
///
/// let cors = CorsMiddleware::builder()
///     .origin(["https://example.com"])
///     .credentials(true)
///     .build()
///     .expect("Invalid CORS configuration");
///
/// let req = HandlerRequest::new(Method::OPTIONS, "/pets")
///     .with_header("Origin", "https://example.com");
/// let mut res = HandlerResponse::default();
/// let flow = cors.handle(&req, &mut res, None);
///
/// assert_eq!(flow, Flow::Handled);
/// assert_eq!(res.status, 204);
/// assert_eq!(
///     res.get_header("access-control-allow-origin"),
///     Some("https://example.com")
/// );
/// ```
#[derive(Debug, Clone)]
pub struct CorsMiddleware {
    pub(crate) origin: OriginDecision,
    pub(crate) allow_methods: String,
    pub(crate) allowed_headers: Option<String>,
    pub(crate) exposed_headers: Option<String>,
    pub(crate) credentials: bool,
    pub(crate) max_age: Option<String>,
    pub(crate) options_success_status: u16,
    pub(crate) preflight_continue: bool,
}

/// CORS middleware with the default policy
///
/// Allows every origin (`*`), methods `GET, HEAD, PUT, PATCH, POST, DELETE`,
/// request header `content-type`, and answers preflight requests with 204.
#[must_use]
pub fn cors() -> CorsMiddleware {
    CorsMiddleware::default()
}

impl CorsMiddleware {
    /// Start configuring a CORS middleware
    #[must_use]
    pub fn builder() -> CorsMiddlewareBuilder {
        CorsMiddlewareBuilder::new()
    }

    /// Origin decision this middleware was built with
    #[must_use]
    pub fn origin_decision(&self) -> &OriginDecision {
        &self.origin
    }

    /// Write the CORS headers for `req` into `res`
    ///
    /// The origin decision runs first since it may write `Vary` as well as
    /// `Access-Control-Allow-Origin`.
    pub fn write_headers(&self, req: &HandlerRequest, res: &mut HandlerResponse) {
        self.origin.apply(req, res);

        res.set_header(ALLOW_METHODS, self.allow_methods.clone());

        if let Some(headers) = &self.allowed_headers {
            res.set_header(ALLOW_HEADERS, headers.clone());
        }

        if let Some(exposed) = &self.exposed_headers {
            res.set_header(EXPOSE_HEADERS, exposed.clone());
        }

        if self.credentials {
            res.set_header(ALLOW_CREDENTIALS, "true".to_string());
        }

        if let Some(age) = &self.max_age {
            res.set_header(MAX_AGE, age.clone());
        }
    }

    /// Handle one request
    ///
    /// Writes the CORS headers, then either ends a preflight request or calls
    /// `next`. `next` is called at most once and never after the response has
    /// been ended.
    ///
    /// # Returns
    ///
    /// - `Flow::Handled` - preflight request answered here
    /// - `Flow::Continue` - control passed to `next` (if one was given)
    pub fn handle(
        &self,
        req: &HandlerRequest,
        res: &mut HandlerResponse,
        next: Option<Next<'_>>,
    ) -> Flow {
        self.write_headers(req, res);

        let is_preflight = req.method.as_str().eq_ignore_ascii_case("OPTIONS");
        if is_preflight && !self.preflight_continue {
            res.status = self.options_success_status;
            res.set_content_length(0);
            res.body = serde_json::Value::Null;
            res.end();
            debug!(
                path = %req.path,
                status = self.options_success_status,
                "CORS: preflight answered"
            );
            return Flow::Handled;
        }

        if let Some(next) = next {
            next(req, res);
        }
        Flow::Continue
    }
}

impl Default for CorsMiddleware {
    fn default() -> Self {
        Self {
            origin: OriginDecision::exact("*".to_string()),
            allow_methods: DEFAULT_METHODS.join(", "),
            allowed_headers: Some(DEFAULT_ALLOWED_HEADERS.join(", ")),
            exposed_headers: None,
            credentials: false,
            max_age: None,
            options_success_status: DEFAULT_OPTIONS_SUCCESS_STATUS,
            preflight_continue: false,
        }
    }
}

impl Middleware for CorsMiddleware {
    fn handle(
        &self,
        req: &HandlerRequest,
        res: &mut HandlerResponse,
        next: Option<Next<'_>>,
    ) -> Flow {
        CorsMiddleware::handle(self, req, res, next)
    }
}
