use brrtrouter_cors::dispatcher::{HandlerRequest, HandlerResponse};
use brrtrouter_cors::middleware::{CorsConfig, CorsConfigError, CorsMiddleware, Flow};
use http::Method;
use std::io::Write;
use tempfile::NamedTempFile;

fn write_temp(contents: &str, suffix: &str) -> NamedTempFile {
    let mut file = tempfile::Builder::new()
        .suffix(suffix)
        .tempfile()
        .expect("create temp file");
    file.write_all(contents.as_bytes()).expect("write temp file");
    file
}

fn handle(mw: &CorsMiddleware, method: Method, origin: Option<&str>) -> (HandlerResponse, Flow) {
    let mut req = HandlerRequest::new(method, "/");
    if let Some(origin) = origin {
        req = req.with_header("Origin", origin);
    }
    let mut res = HandlerResponse::default();
    let flow = mw.handle(&req, &mut res, None);
    (res, flow)
}

#[test]
fn test_full_yaml_policy() {
    let file = write_temp(
        r#"
cors:
  origin:
    - https://example.com
    - https://admin.example.com
  methods: [get, post]
  allowedHeaders: [Content-Type, Authorization]
  exposedHeaders: [X-Total-Count]
  credentials: true
  maxAge: 600
  optionsSuccessStatus: 200
"#,
        ".yaml",
    );
    let mw = CorsConfig::from_path(file.path())
        .expect("load config")
        .build()
        .expect("valid policy");

    let (res, flow) = handle(&mw, Method::OPTIONS, Some("https://admin.example.com"));
    assert_eq!(flow, Flow::Handled);
    assert_eq!(res.status, 200);
    assert_eq!(
        res.get_header("access-control-allow-origin"),
        Some("https://admin.example.com")
    );
    assert_eq!(res.get_header("access-control-allow-methods"), Some("GET, POST"));
    assert_eq!(
        res.get_header("access-control-allow-headers"),
        Some("Content-Type, Authorization")
    );
    assert_eq!(
        res.get_header("access-control-expose-headers"),
        Some("X-Total-Count")
    );
    assert_eq!(res.get_header("access-control-allow-credentials"), Some("true"));
    assert_eq!(res.get_header("access-control-max-age"), Some("600"));
    assert_eq!(res.get_header("vary"), Some("Origin"));
}

#[test]
fn test_json_regex_policy() {
    let file = write_temp(
        r#"{"origin": {"regex": "^https://[a-z]+\\.example\\.com$"}, "preflightContinue": true}"#,
        ".json",
    );
    let mw = CorsConfig::from_path(file.path())
        .unwrap()
        .build()
        .unwrap();

    let (res, flow) = handle(&mw, Method::OPTIONS, Some("https://app.example.com"));
    assert_eq!(flow, Flow::Continue);
    assert_eq!(
        res.get_header("access-control-allow-origin"),
        Some("https://app.example.com")
    );

    let (res, _) = handle(&mw, Method::GET, Some("https://app.example.com.evil.org"));
    assert_eq!(res.get_header("access-control-allow-origin"), None);
}

#[test]
fn test_boolean_and_string_origins() {
    let mw = CorsConfig::from_yaml_str("origin: false\n").unwrap().build().unwrap();
    let (res, _) = handle(&mw, Method::GET, Some("https://a.example"));
    assert_eq!(res.get_header("access-control-allow-origin"), None);

    let mw = CorsConfig::from_yaml_str("origin: https://fixed.example\n")
        .unwrap()
        .build()
        .unwrap();
    let (res, _) = handle(&mw, Method::GET, None);
    assert_eq!(
        res.get_header("access-control-allow-origin"),
        Some("https://fixed.example")
    );
}

#[test]
fn test_max_age_zero_from_config() {
    let mw = CorsConfig::from_yaml_str("maxAge: 0\n").unwrap().build().unwrap();
    let (res, _) = handle(&mw, Method::GET, None);
    assert_eq!(res.get_header("access-control-max-age"), Some("0"));
}

#[test]
fn test_invalid_origin_shapes() {
    for doc in [
        "origin: [{}, 3, abc]\n",
        "origin:\n  site: http://example.com\n",
        "origin: 42\n",
    ] {
        let cfg = CorsConfig::from_yaml_str(doc).expect("document parses");
        assert_eq!(
            cfg.build().unwrap_err(),
            CorsConfigError::InvalidOriginSpec,
            "{doc}"
        );
    }
}

#[test]
fn test_invalid_regex_reported() {
    let cfg = CorsConfig::from_yaml_str("origin:\n  regex: \"[unclosed\"\n").unwrap();
    match cfg.build().unwrap_err() {
        CorsConfigError::InvalidOriginPattern { pattern, reason } => {
            assert_eq!(pattern, "[unclosed");
            assert!(!reason.is_empty());
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn test_missing_file_has_context() {
    let err = CorsConfig::from_path("/definitely/not/here/cors.yaml").unwrap_err();
    assert!(err.to_string().contains("Failed to read CORS config"));
}

#[test]
fn test_malformed_yaml_has_context() {
    let file = write_temp("origin: [unterminated\n", ".yml");
    let err = CorsConfig::from_path(file.path()).unwrap_err();
    assert!(format!("{err:#}").contains("Invalid CORS config"));
}
