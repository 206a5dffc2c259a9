//! # CLI Module
//!
//! Command-line tooling for checking CORS policy files.
//!
//! ## Commands
//!
//! ### `check`
//!
//! Run one synthetic request through a policy and print the status, the
//! response headers and whether the request reached the downstream handler:
//!
//! ```bash
//! brrtrouter-cors check --config cors.yaml --method OPTIONS --origin https://example.com
//! ```
//!
//! Without `--config` the default policy is used.
//!
//! ### `validate`
//!
//! Load and build a policy, failing on an unsupported `origin` shape:
//!
//! ```bash
//! brrtrouter-cors validate --config cors.yaml
//! ```
//!
//! ### `defaults`
//!
//! Print the default policy as YAML, a starting point for a config file.

mod commands;

#[cfg(test)]
mod tests;

pub use commands::{run_cli, Cli, Commands};
