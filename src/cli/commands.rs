use crate::dispatcher::{Dispatcher, HandlerRequest, HandlerResponse};
use crate::middleware::{CorsConfig, TracingMiddleware};
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use http::Method;
use std::io::Write;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::info;

/// Command-line interface for brrtrouter-cors
///
/// Loads CORS policies from YAML/JSON files and shows what they do to a
/// request.
#[derive(Parser)]
#[command(name = "brrtrouter-cors")]
#[command(about = "Check CORS policies against sample requests", long_about = None)]
pub struct Cli {
    /// Log level for the middleware's own tracing output
    #[arg(long, global = true, default_value = "warn", env = "BRRTR_LOG_LEVEL")]
    pub log_level: String,

    /// The subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Run one request through a policy and print the response
    Check {
        /// Path to the CORS policy file (YAML or JSON)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Request method
        #[arg(short, long, default_value = "GET")]
        method: String,

        /// Value of the request's Origin header
        #[arg(short, long)]
        origin: Option<String>,

        /// Extra request header as `Name: value` (repeatable)
        #[arg(long = "header", value_parser = parse_header)]
        headers: Vec<(String, String)>,
    },
    /// Load a policy file and report whether it builds
    Validate {
        /// Path to the CORS policy file (YAML or JSON)
        #[arg(short, long)]
        config: PathBuf,
    },
    /// Print the default policy as YAML
    Defaults,
}

fn parse_header(raw: &str) -> Result<(String, String), String> {
    let (name, value) = raw
        .split_once(':')
        .ok_or_else(|| format!("expected `Name: value`, got `{raw}`"))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(format!("empty header name in `{raw}`"));
    }
    Ok((name.to_string(), value.trim().to_string()))
}

fn load_config(path: Option<&PathBuf>) -> Result<CorsConfig> {
    match path {
        Some(path) => CorsConfig::from_path(path),
        None => Ok(CorsConfig::default()),
    }
}

/// Execute a parsed command, writing human-readable output to `out`
pub fn run_cli(cli: &Cli, out: &mut dyn Write) -> Result<()> {
    match &cli.command {
        Commands::Check {
            config,
            method,
            origin,
            headers,
        } => {
            let cors = load_config(config.as_ref())?
                .build()
                .context("CORS policy rejected")?;

            let method = Method::from_bytes(method.as_bytes())
                .with_context(|| format!("Invalid HTTP method `{method}`"))?;
            let mut req = HandlerRequest::new(method, "/");
            if let Some(origin) = origin {
                req = req.with_header("Origin", origin.as_str());
            }
            for (name, value) in headers {
                req = req.with_header(name, value.as_str());
            }

            let continued = Arc::new(AtomicBool::new(false));
            let reached = Arc::clone(&continued);
            let mut dispatcher =
                Dispatcher::new(move |_req: &HandlerRequest, res: &mut HandlerResponse| {
                    reached.store(true, Ordering::SeqCst);
                    res.status = 200;
                });
            dispatcher.add_middleware(Arc::new(TracingMiddleware));
            dispatcher.add_middleware(Arc::new(cors));

            let res = dispatcher.dispatch(&req);
            info!(status = res.status, "check complete");

            writeln!(out, "status: {}", res.status)?;
            writeln!(out, "continued: {}", continued.load(Ordering::SeqCst))?;
            for (name, value) in &res.headers {
                writeln!(out, "{}: {}", name, value)?;
            }
            Ok(())
        }
        Commands::Validate { config } => {
            let cors = CorsConfig::from_path(config)?
                .build()
                .with_context(|| format!("CORS policy {} rejected", config.display()))?;
            writeln!(
                out,
                "{}: ok (origin: {})",
                config.display(),
                cors.origin_decision().kind()
            )?;
            Ok(())
        }
        Commands::Defaults => {
            let yaml = serde_yaml::to_string(&CorsConfig::defaults())
                .context("Failed to render default policy")?;
            write!(out, "{yaml}")?;
            Ok(())
        }
    }
}
