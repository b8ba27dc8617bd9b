//! # Flight operations proxy
//!
//! Credential-gated caching proxy in front of the DAA flight operations REST API.
//! Credentials are supplied at runtime, checked against upstream, and used by a
//! background loop that keeps the latest copy of two upstream documents in memory.
//!
//! Modules:
//! - `credentials` — current `app_id` / `app_key` pair
//! - `upstream` — authenticated upstream GET calls and credential validation
//! - `cache` — last good copy of each resource
//! - `refresh` — refresh cycle and background scheduler
//! - `proxy` — read-with-fallback and save-and-validate operations
//! - `server` — HTTP routes

pub mod cache;
pub mod config;
pub mod credentials;
pub mod error;
pub mod observability;
pub mod proxy;
pub mod refresh;
pub mod server;
pub mod upstream;
pub mod utils;

#[cfg(test)]
mod tests;

pub use crate::config::settings::ServiceConfig;
pub use crate::error::ProxyError;
