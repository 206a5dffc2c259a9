use std::fmt;

/// Message carried by [`CorsConfigError::InvalidOriginSpec`]
pub const INVALID_ORIGIN_SPEC_MESSAGE: &str =
    "No other objects allowed. Allowed types is array of strings or RegExp";

/// CORS configuration error
///
/// Returned when building a `CorsMiddleware` from a configuration whose
/// `origin` setting has an unsupported shape. Raised once at build time, never
/// while handling a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CorsConfigError {
    /// The origin setting is not a boolean, string, callback, list of strings
    /// or regular expression (or a list contains a non-string element)
    InvalidOriginSpec,
    /// A regular expression given in configuration failed to compile
    InvalidOriginPattern {
        /// The pattern as written in the configuration
        pattern: String,
        /// Compiler error from the `regex` crate
        reason: String,
    },
}

impl fmt::Display for CorsConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CorsConfigError::InvalidOriginSpec => f.write_str(INVALID_ORIGIN_SPEC_MESSAGE),
            CorsConfigError::InvalidOriginPattern { pattern, reason } => {
                write!(
                    f,
                    "CORS configuration error: Invalid origin pattern '{}': {}",
                    pattern, reason
                )
            }
        }
    }
}

impl std::error::Error for CorsConfigError {}
