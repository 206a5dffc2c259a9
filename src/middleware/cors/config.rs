use std::path::Path;

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{CorsConfigError, CorsMiddleware, CorsMiddlewareBuilder, OriginSpec};

/// CORS policy as written in a configuration file
///
/// Keys mirror the builder options in camelCase. Every key is optional;
/// missing keys keep the builder defaults.
///
/// ```yaml
/// cors:
///   origin: ["https://example.com", "https://admin.example.com"]
///   methods: [GET, POST]
///   allowedHeaders: [Content-Type, Authorization]
///   exposedHeaders: [X-Total-Count]
///   credentials: true
///   maxAge: 86400
/// ```
///
/// The `origin` key accepts `true`/`false`, a single string, a list of
/// strings, or `{ regex: "<pattern>" }`. Anything else is rejected by
/// [`CorsConfig::build`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CorsConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub origin: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub methods: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allowed_headers: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exposed_headers: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credentials: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_age: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options_success_status: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preflight_continue: Option<bool>,
}

impl CorsConfig {
    /// The default policy spelled out, for printing
    #[must_use]
    pub fn defaults() -> Self {
        Self {
            origin: Some(Value::String("*".to_string())),
            methods: Some(super::DEFAULT_METHODS.iter().map(|m| m.to_string()).collect()),
            allowed_headers: Some(
                super::DEFAULT_ALLOWED_HEADERS
                    .iter()
                    .map(|h| h.to_string())
                    .collect(),
            ),
            exposed_headers: None,
            credentials: Some(false),
            max_age: None,
            options_success_status: Some(super::DEFAULT_OPTIONS_SUCCESS_STATUS),
            preflight_continue: Some(false),
        }
    }

    /// Parse a YAML document
    pub fn from_yaml_str(s: &str) -> Result<Self> {
        let doc: Value = serde_yaml::from_str(s).context("Failed to parse CORS config as YAML")?;
        Self::from_document(doc)
    }

    /// Parse a JSON document
    pub fn from_json_str(s: &str) -> Result<Self> {
        let doc: Value = serde_json::from_str(s).context("Failed to parse CORS config as JSON")?;
        Self::from_document(doc)
    }

    /// The policy sits either at the top level or alone under a `cors:` key
    fn from_document(doc: Value) -> Result<Self> {
        let policy = match doc {
            Value::Object(mut map) => match map.remove("cors") {
                Some(cors) => {
                    if let Some(extra) = map.keys().next() {
                        bail!("Unexpected top-level key `{extra}` next to `cors`");
                    }
                    cors
                }
                None => Value::Object(map),
            },
            other => other,
        };
        // empty document, or `cors:` with nothing under it
        if policy.is_null() {
            return Ok(Self::default());
        }
        serde_json::from_value(policy).context("Invalid CORS policy")
    }

    /// Load from disk; `.json` files are read as JSON, everything else as YAML
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read CORS config {}", path.display()))?;
        let is_json = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("json"));
        let parsed = if is_json {
            Self::from_json_str(&raw)
        } else {
            Self::from_yaml_str(&raw)
        };
        parsed.with_context(|| format!("Invalid CORS config {}", path.display()))
    }

    /// Apply this configuration on top of the builder defaults
    #[must_use]
    pub fn into_builder(self) -> CorsMiddlewareBuilder {
        let mut builder = CorsMiddlewareBuilder::new();
        if let Some(origin) = self.origin {
            builder = builder.origin(OriginSpec::Dynamic(origin));
        }
        if let Some(methods) = self.methods {
            builder = builder.allowed_methods(methods);
        }
        if let Some(headers) = self.allowed_headers {
            builder = builder.allowed_headers(headers);
        }
        if let Some(headers) = self.exposed_headers {
            builder = builder.exposed_headers(headers);
        }
        if let Some(credentials) = self.credentials {
            builder = builder.credentials(credentials);
        }
        if let Some(age) = self.max_age {
            builder = builder.max_age(age);
        }
        if let Some(status) = self.options_success_status {
            builder = builder.options_success_status(status);
        }
        if let Some(enabled) = self.preflight_continue {
            builder = builder.preflight_continue(enabled);
        }
        builder
    }

    /// Validate the origin setting and build the middleware
    pub fn build(self) -> Result<CorsMiddleware, CorsConfigError> {
        self.into_builder().build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_yaml_nested_and_flat() {
        let nested = CorsConfig::from_yaml_str("cors:\n  credentials: true\n").unwrap();
        let flat = CorsConfig::from_yaml_str("credentials: true\n").unwrap();
        assert_eq!(nested, flat);
        assert_eq!(flat.credentials, Some(true));
    }

    #[test]
    fn test_json_camel_case_keys() {
        let cfg = CorsConfig::from_json_str(
            r#"{"origin": ["http://a.com"], "maxAge": 0, "preflightContinue": true}"#,
        )
        .unwrap();
        assert_eq!(cfg.origin, Some(json!(["http://a.com"])));
        assert_eq!(cfg.max_age, Some(0));
        assert_eq!(cfg.preflight_continue, Some(true));
    }

    #[test]
    fn test_unknown_key_rejected() {
        assert!(CorsConfig::from_yaml_str("allowOrigins: [x]\n").is_err());
    }

    #[test]
    fn test_unknown_nested_key_is_named() {
        let err = CorsConfig::from_yaml_str("cors:\n  credentials: true\n  bogus: 1\n")
            .unwrap_err();
        assert!(format!("{err:#}").contains("unknown field `bogus`"), "{err:#}");
    }

    #[test]
    fn test_top_level_key_next_to_cors_rejected() {
        let err = CorsConfig::from_yaml_str("cors:\n  credentials: true\nbogus: 1\n")
            .unwrap_err();
        assert!(format!("{err:#}").contains("`bogus`"), "{err:#}");

        let err = CorsConfig::from_json_str(r#"{"cors": {}, "server": {"port": 8080}}"#)
            .unwrap_err();
        assert!(format!("{err:#}").contains("`server`"), "{err:#}");
    }

    #[test]
    fn test_empty_cors_section_is_default() {
        let cfg = CorsConfig::from_yaml_str("cors:\n").unwrap();
        assert_eq!(cfg, CorsConfig::default());
    }

    #[test]
    fn test_empty_document_is_default() {
        let cfg = CorsConfig::from_yaml_str("{}").unwrap();
        assert_eq!(cfg, CorsConfig::default());
        assert!(cfg.build().is_ok());
    }

    #[test]
    fn test_defaults_round_trip_through_builder() {
        let mw = CorsConfig::defaults().build().unwrap();
        let default = CorsMiddleware::default();
        assert_eq!(mw.allow_methods, default.allow_methods);
        assert_eq!(mw.allowed_headers, default.allowed_headers);
        assert_eq!(mw.options_success_status, 204);
    }

    #[test]
    fn test_object_origin_fails_at_build() {
        let cfg = CorsConfig::from_yaml_str("origin:\n  site: http://example.com\n").unwrap();
        assert_eq!(cfg.build().unwrap_err(), CorsConfigError::InvalidOriginSpec);
    }
}
