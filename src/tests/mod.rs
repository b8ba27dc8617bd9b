pub mod common;

mod fallback_read;
mod metrics_endpoint;
