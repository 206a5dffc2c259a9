//! # Dispatcher Module
//!
//! Host-side plumbing the CORS middleware runs inside of.
//!
//! ## Overview
//!
//! - [`HandlerRequest`] - read-only request view (method, path, headers)
//! - [`HandlerResponse`] - response sink (headers, status, body, termination)
//! - [`Dispatcher`] - runs a request through ordered middleware and a handler
//!
//! Servers that already speak the `http` crate convert with
//! `HandlerRequest::from(&parts)` and [`HandlerResponse::into_http`].
//!
//! ## Request Flow
//!
//! 1. Each middleware gets the request, the response and a continuation
//! 2. Calling the continuation runs the next middleware (or the handler)
//! 3. A middleware that ends the response stops the chain
//!
//! ```rust
//! use brrtrouter_cors::dispatcher::{Dispatcher, HandlerRequest};
//! use brrtrouter_cors::middleware::cors;
//! use http::Method;
//! use std::sync::Arc;
//!
//! let mut dispatcher = Dispatcher::new(|_req, res| {
//!     res.status = 200;
//!     res.body = serde_json::json!("hello");
//! });
//! dispatcher.add_middleware(Arc::new(cors()));
//!
//! let res = dispatcher.dispatch(&HandlerRequest::new(Method::GET, "/"));
//! assert_eq!(res.get_header("access-control-allow-origin"), Some("*"));
//! assert_eq!(res.status, 200);
//! ```

mod core;
mod vary;

pub use self::core::{
    Dispatcher, Handler, HandlerRequest, HandlerResponse, HeaderVec, MAX_INLINE_HEADERS,
};
pub use vary::merge as merge_vary;
