use std::collections::{BTreeSet, HashSet};
use std::fmt;
use std::sync::Arc;

use http::HeaderValue;
use regex::Regex;
use serde_json::Value;
use tracing::{debug, warn};

use super::{CorsConfigError, ALLOW_ORIGIN};
use crate::dispatcher::{HandlerRequest, HandlerResponse};

/// User-supplied origin resolver, called with the live request and response
pub type OriginCallback =
    Arc<dyn Fn(&HandlerRequest, &mut HandlerResponse) -> String + Send + Sync>;

type DecisionFn = dyn Fn(&HandlerRequest, &mut HandlerResponse) + Send + Sync;

/// How the `origin` option was configured
///
/// Resolved once into an [`OriginDecision`] when the middleware is built.
#[derive(Clone)]
pub enum OriginSpec {
    /// `true` allows every origin (`*`), `false` disables the header
    Bool(bool),
    /// Always send this literal value
    Exact(String),
    /// Ask a callback for the value on every request
    Callback(OriginCallback),
    /// Reflect the request origin when it is one of these
    List(Vec<String>),
    /// Reflect the request origin when it matches
    Pattern(Regex),
    /// Unvalidated value from a configuration file
    ///
    /// Accepted shapes: boolean, string, array of strings, or
    /// `{ "regex": "<pattern>" }`.
    Dynamic(Value),
}

impl OriginSpec {
    /// Allow-list from any iterable of strings (array, set, iterator)
    pub fn list<I, S>(origins: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        OriginSpec::List(origins.into_iter().map(Into::into).collect())
    }

    /// Resolve the origin with a callback
    pub fn callback<F>(f: F) -> Self
    where
        F: Fn(&HandlerRequest, &mut HandlerResponse) -> String + Send + Sync + 'static,
    {
        OriginSpec::Callback(Arc::new(f))
    }

    /// Turn a configuration value into a typed spec
    ///
    /// # Errors
    ///
    /// [`CorsConfigError::InvalidOriginSpec`] for objects other than the
    /// `{ "regex": ... }` form, arrays with non-string elements, numbers and
    /// null. [`CorsConfigError::InvalidOriginPattern`] when the regex does not
    /// compile.
    pub fn from_value(value: &Value) -> Result<Self, CorsConfigError> {
        match value {
            Value::Bool(b) => Ok(OriginSpec::Bool(*b)),
            Value::String(s) => Ok(OriginSpec::Exact(s.clone())),
            Value::Array(items) => items
                .iter()
                .map(|v| v.as_str().map(str::to_string))
                .collect::<Option<Vec<_>>>()
                .map(OriginSpec::List)
                .ok_or(CorsConfigError::InvalidOriginSpec),
            Value::Object(obj) => match (obj.len(), obj.get("regex").and_then(Value::as_str)) {
                (1, Some(pattern)) => Regex::new(pattern).map(OriginSpec::Pattern).map_err(|e| {
                    CorsConfigError::InvalidOriginPattern {
                        pattern: pattern.to_string(),
                        reason: e.to_string(),
                    }
                }),
                _ => Err(CorsConfigError::InvalidOriginSpec),
            },
            Value::Null | Value::Number(_) => Err(CorsConfigError::InvalidOriginSpec),
        }
    }
}

impl Default for OriginSpec {
    fn default() -> Self {
        OriginSpec::Exact("*".to_string())
    }
}

impl fmt::Debug for OriginSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OriginSpec::Bool(b) => f.debug_tuple("Bool").field(b).finish(),
            OriginSpec::Exact(origin) => f.debug_tuple("Exact").field(origin).finish(),
            OriginSpec::Callback(_) => write!(f, "Callback(<function>)"),
            OriginSpec::List(origins) => f.debug_tuple("List").field(origins).finish(),
            OriginSpec::Pattern(re) => f.debug_tuple("Pattern").field(&re.as_str()).finish(),
            OriginSpec::Dynamic(value) => f.debug_tuple("Dynamic").field(value).finish(),
        }
    }
}

impl From<bool> for OriginSpec {
    fn from(allow: bool) -> Self {
        OriginSpec::Bool(allow)
    }
}

impl From<&str> for OriginSpec {
    fn from(origin: &str) -> Self {
        OriginSpec::Exact(origin.to_string())
    }
}

impl From<String> for OriginSpec {
    fn from(origin: String) -> Self {
        OriginSpec::Exact(origin)
    }
}

impl From<Vec<String>> for OriginSpec {
    fn from(origins: Vec<String>) -> Self {
        OriginSpec::List(origins)
    }
}

impl From<Vec<&str>> for OriginSpec {
    fn from(origins: Vec<&str>) -> Self {
        OriginSpec::list(origins)
    }
}

impl From<&[&str]> for OriginSpec {
    fn from(origins: &[&str]) -> Self {
        OriginSpec::list(origins.iter().copied())
    }
}

impl<const N: usize> From<[&str; N]> for OriginSpec {
    fn from(origins: [&str; N]) -> Self {
        OriginSpec::list(origins)
    }
}

impl From<HashSet<String>> for OriginSpec {
    fn from(origins: HashSet<String>) -> Self {
        OriginSpec::list(origins)
    }
}

impl From<BTreeSet<String>> for OriginSpec {
    fn from(origins: BTreeSet<String>) -> Self {
        OriginSpec::list(origins)
    }
}

impl From<Regex> for OriginSpec {
    fn from(pattern: Regex) -> Self {
        OriginSpec::Pattern(pattern)
    }
}

impl From<Value> for OriginSpec {
    fn from(value: Value) -> Self {
        OriginSpec::Dynamic(value)
    }
}

/// Origin decision built once from an [`OriginSpec`]
///
/// Wraps a single shared closure that writes `Access-Control-Allow-Origin`
/// (and `Vary: Origin` for request-dependent specs). The closure holds only
/// immutable data, so one decision serves any number of concurrent requests.
#[derive(Clone)]
pub struct OriginDecision {
    kind: &'static str,
    apply: Arc<DecisionFn>,
}

impl fmt::Debug for OriginDecision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OriginDecision")
            .field("kind", &self.kind)
            .finish()
    }
}

impl OriginDecision {
    /// Resolve `spec` into a decision
    ///
    /// # Errors
    ///
    /// Fails for [`OriginSpec::Dynamic`] values of an unsupported shape; see
    /// [`OriginSpec::from_value`].
    pub fn build(spec: OriginSpec) -> Result<Self, CorsConfigError> {
        let decision = match spec {
            OriginSpec::Bool(true) => Self::wildcard(),
            OriginSpec::Bool(false) => Self::new("disabled", |_, _| {}),
            OriginSpec::Exact(origin) => Self::exact(origin),
            OriginSpec::Callback(callback) => Self::new("callback", move |req, res| {
                res.append_vary("Origin");
                let origin = callback(req, res);
                if HeaderValue::from_str(&origin).is_err() {
                    warn!(
                        origin = %origin.escape_debug(),
                        "CORS: origin callback returned a value that is not a valid header value"
                    );
                }
                res.set_header(ALLOW_ORIGIN, origin);
            }),
            OriginSpec::List(origins) => {
                let allowed: HashSet<String> = origins.into_iter().collect();
                if allowed.contains("*") {
                    Self::wildcard()
                } else {
                    Self::new("list", move |req, res| {
                        reflect(req, res, |origin| allowed.contains(origin));
                    })
                }
            }
            OriginSpec::Pattern(pattern) => Self::new("pattern", move |req, res| {
                reflect(req, res, |origin| pattern.is_match(origin));
            }),
            OriginSpec::Dynamic(value) => {
                let spec = OriginSpec::from_value(&value).inspect_err(|e| {
                    warn!(origin = %value, error = %e, "CORS: rejected origin configuration");
                })?;
                return Self::build(spec);
            }
        };
        Ok(decision)
    }

    fn new<F>(kind: &'static str, f: F) -> Self
    where
        F: Fn(&HandlerRequest, &mut HandlerResponse) + Send + Sync + 'static,
    {
        Self {
            kind,
            apply: Arc::new(f),
        }
    }

    pub(crate) fn exact(origin: String) -> Self {
        Self::new("exact", move |_, res| {
            res.set_header(ALLOW_ORIGIN, origin.clone());
        })
    }

    fn wildcard() -> Self {
        Self::new("wildcard", |_, res| {
            res.set_header(ALLOW_ORIGIN, "*".to_string());
        })
    }

    /// Short label for logs: `wildcard`, `disabled`, `exact`, `callback`,
    /// `list` or `pattern`
    #[must_use]
    pub fn kind(&self) -> &'static str {
        self.kind
    }

    /// Write the origin headers for this request
    pub fn apply(&self, req: &HandlerRequest, res: &mut HandlerResponse) {
        (self.apply)(req, res);
    }
}

/// Echo the request's `Origin` back when `allowed` accepts it
fn reflect<F>(req: &HandlerRequest, res: &mut HandlerResponse, allowed: F)
where
    F: Fn(&str) -> bool,
{
    res.append_vary("Origin");
    let Some(origin) = req.get_header("origin") else {
        return;
    };
    if allowed(origin) {
        res.set_header(ALLOW_ORIGIN, origin.to_string());
    } else {
        debug!(origin = %origin, "CORS: origin not allowed");
    }
}
