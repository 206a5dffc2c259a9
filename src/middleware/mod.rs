mod core;
mod cors;
mod tracing;

pub use self::core::{Flow, Middleware, Next};
pub use cors::{
    cors, CorsConfig, CorsConfigError, CorsMiddleware, CorsMiddlewareBuilder, OriginCallback,
    OriginDecision, OriginSpec, ALLOW_CREDENTIALS, ALLOW_HEADERS, ALLOW_METHODS, ALLOW_ORIGIN,
    DEFAULT_ALLOWED_HEADERS, DEFAULT_METHODS, DEFAULT_OPTIONS_SUCCESS_STATUS, EXPOSE_HEADERS,
    INVALID_ORIGIN_SPEC_MESSAGE, MAX_AGE,
};
pub use self::tracing::TracingMiddleware;
