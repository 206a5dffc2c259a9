//! Unit tests for CLI commands

use crate::cli::{run_cli, Cli, Commands};
use clap::Parser;
use std::io::Write;

fn run(args: &[&str]) -> anyhow::Result<String> {
    let cli = Cli::try_parse_from(args).unwrap();
    let mut out = Vec::new();
    run_cli(&cli, &mut out)?;
    Ok(String::from_utf8(out).unwrap())
}

fn write_config(contents: &str, suffix: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

#[test]
fn test_check_command_with_headers() {
    let cli = Cli::try_parse_from([
        "brrtrouter-cors",
        "check",
        "--method",
        "OPTIONS",
        "--origin",
        "https://example.com",
        "--header",
        "Access-Control-Request-Method: PUT",
    ])
    .unwrap();

    match cli.command {
        Commands::Check {
            config,
            method,
            origin,
            headers,
        } => {
            assert!(config.is_none());
            assert_eq!(method, "OPTIONS");
            assert_eq!(origin.as_deref(), Some("https://example.com"));
            assert_eq!(
                headers,
                vec![(
                    "Access-Control-Request-Method".to_string(),
                    "PUT".to_string()
                )]
            );
        }
        _ => panic!("Expected Check command"),
    }
}

#[test]
fn test_malformed_header_rejected() {
    assert!(Cli::try_parse_from(["brrtrouter-cors", "check", "--header", "no-colon"]).is_err());
    assert!(Cli::try_parse_from(["brrtrouter-cors", "check", "--header", ": v"]).is_err());
}

#[test]
fn test_validate_requires_config() {
    assert!(Cli::try_parse_from(["brrtrouter-cors", "validate"]).is_err());
}

#[test]
fn test_check_default_policy_preflight() {
    let out = run(&["brrtrouter-cors", "check", "--method", "OPTIONS"]).unwrap();
    assert!(out.contains("status: 204"), "{out}");
    assert!(out.contains("continued: false"), "{out}");
    assert!(out.contains("Access-Control-Allow-Origin: *"), "{out}");
    assert!(out.contains("Content-Length: 0"), "{out}");
}

#[test]
fn test_check_reflects_allowed_origin() {
    let file = write_config(
        "cors:\n  origin: [\"https://a.example\", \"https://b.example\"]\n",
        ".yaml",
    );
    let path = file.path().to_str().unwrap();
    let out = run(&[
        "brrtrouter-cors",
        "check",
        "--config",
        path,
        "--origin",
        "https://b.example",
    ])
    .unwrap();
    assert!(out.contains("status: 200"), "{out}");
    assert!(out.contains("continued: true"), "{out}");
    assert!(
        out.contains("Access-Control-Allow-Origin: https://b.example"),
        "{out}"
    );
    assert!(out.contains("Vary: Origin"), "{out}");
}

#[test]
fn test_validate_reports_kind() {
    let file = write_config(r#"{"origin": {"regex": "^https://"}}"#, ".json");
    let path = file.path().to_str().unwrap();
    let out = run(&["brrtrouter-cors", "validate", "--config", path]).unwrap();
    assert!(out.ends_with("ok (origin: pattern)\n"), "{out}");
}

#[test]
fn test_validate_rejects_object_origin() {
    let file = write_config("origin:\n  site: http://example.com\n", ".yaml");
    let path = file.path().to_str().unwrap();
    let err = run(&["brrtrouter-cors", "validate", "--config", path]).unwrap_err();
    assert!(
        format!("{err:#}").contains(crate::middleware::INVALID_ORIGIN_SPEC_MESSAGE),
        "{err:#}"
    );
}

#[test]
fn test_defaults_output_parses_back() {
    let out = run(&["brrtrouter-cors", "defaults"]).unwrap();
    let cfg = crate::middleware::CorsConfig::from_yaml_str(&out).unwrap();
    assert_eq!(cfg, crate::middleware::CorsConfig::defaults());
}
