//! # brrtrouter-cors
//!
//! **brrtrouter-cors** is the Cross-Origin Resource Sharing middleware used by
//! BRRTRouter services, packaged so any HTTP server can use it.
//!
//! ## Overview
//!
//! Given a policy, the middleware inspects each request, writes the CORS
//! response headers, and either answers preflight (`OPTIONS`) requests itself
//! or hands control to the next stage. It holds no per-request state: the
//! policy is resolved once at build time and shared read-only afterwards.
//!
//! ## Architecture
//!
//! - **[`middleware`]** - the CORS middleware, its builder, file-based
//!   configuration and the [`Middleware`](middleware::Middleware) trait
//! - **[`dispatcher`]** - request/response values and the middleware chain
//! - **[`otel`]** - structured logging setup
//! - **[`cli`]** - the `brrtrouter-cors` command for checking policy files
//!
//! ### Request Handling Flow
//!
//! ```mermaid
//! sequenceDiagram
//!     participant Server as Host server
//!     participant Cors as CorsMiddleware
//!     participant Origin as OriginDecision
//!     participant Next as Next stage
//!
//!     Server->>Cors: handle(req, res, next)
//!     Cors->>Origin: apply(req, res)
//!     Origin-->>Cors: Allow-Origin / Vary written
//!     Cors->>Cors: Allow-Methods, Allow-Headers,<br/>Expose-Headers, Credentials, Max-Age
//!     alt OPTIONS and not preflight_continue
//!         Cors-->>Server: status 204, Content-Length: 0, ended
//!     else
//!         Cors->>Next: next(req, res)
//!         Next-->>Server: downstream response
//!     end
//! ```
//!
//! ## Origin Policies
//!
//! | Configured origin | `Access-Control-Allow-Origin` | `Vary: Origin` |
//! |---|---|---|
//! | `true` | `*` | no |
//! | `false` | never written | no |
//! | `"https://a.com"` | `https://a.com` | no |
//! | callback | callback's return value | yes |
//! | list of strings | request origin, if listed | yes (unless the list has `*`) |
//! | `Regex` | request origin, if it matches | yes |
//!
//! ## Quick Start
//!
//! ```rust
//! use brrtrouter_cors::dispatcher::{Dispatcher, HandlerRequest};
//! use brrtrouter_cors::middleware::CorsMiddleware;
//! use http::Method;
//! use regex::Regex;
//! use std::sync::Arc;
//!
//! let cors = CorsMiddleware::builder()
//!     .origin(Regex::new(r"^https://([a-z]+\.)?example\.com$").unwrap())
//!     .credentials(true)
//!     .max_age(86400)
//!     .build()
//!     .expect("valid CORS policy");
//!
//! let mut dispatcher = Dispatcher::new(|_req, res| res.status = 200);
//! dispatcher.add_middleware(Arc::new(cors));
//!
//! let req = HandlerRequest::new(Method::GET, "/pets")
//!     .with_header("Origin", "https://app.example.com");
//! let res = dispatcher.dispatch(&req);
//!
//! assert_eq!(res.get_header("access-control-allow-origin"), Some("https://app.example.com"));
//! assert_eq!(res.get_header("vary"), Some("Origin"));
//! assert_eq!(res.status, 200);
//! ```
//!
//! ## Configuration Files
//!
//! ```yaml
//! cors:
//!   origin: ["https://example.com"]
//!   methods: [GET, POST]
//!   credentials: true
//!   maxAge: 600
//! ```
//!
//! Load with [`CorsConfig::from_path`](middleware::CorsConfig::from_path) and
//! call `.build()`. An `origin` of an unsupported shape fails there with
//! [`CorsConfigError::InvalidOriginSpec`](middleware::CorsConfigError::InvalidOriginSpec),
//! never while serving requests.

pub mod cli;
pub mod dispatcher;
pub mod middleware;
pub mod otel;

pub use middleware::{cors, CorsConfig, CorsConfigError, CorsMiddleware, CorsMiddlewareBuilder};
