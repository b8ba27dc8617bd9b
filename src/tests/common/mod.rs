// tests/common/mod.rs
pub use axum::Router;
pub use tokio::task::JoinHandle;

use std::net::SocketAddr;
use reqwest::Client;

use crate::config::settings::{MetricsConfig, UpstreamConfig};
use crate::credentials::store::Credentials;
use crate::observability::metrics::get_metrics;
use crate::proxy::service::ProxyService;
use crate::server::server::{self, AppState};

/// Spawn an Axum router on an ephemeral port and return (JoinHandle, SocketAddr)
pub async fn spawn_axum(router: Router) -> (JoinHandle<()>, SocketAddr) {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.expect("bind failed");
    let addr = listener.local_addr().unwrap();
    let handle = tokio::spawn(async move {
        axum::serve(listener, router).await.expect("server failed");
    });
    (handle, addr)
}

pub fn build_reqwest_client() -> Client {
    Client::builder()
        .timeout(std::time::Duration::from_secs(5))
        .build()
        .expect("reqwest client")
}

/// Upstream config pointing at a mock server with short paths and timeouts.
pub fn test_upstream_config(base_url: &str) -> UpstreamConfig {
    UpstreamConfig {
        base_url: base_url.to_string(),
        probe_path: "/probe".to_string(),
        primary_path: "/flights".to_string(),
        secondary_path: "/updates".to_string(),
        validate_timeout_ms: 2_000,
        fetch_timeout_ms: 2_000,
    }
}

/// Base URL of a port that was just released, so connections are refused.
pub async fn unreachable_base_url() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.expect("bind failed");
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}", addr)
}

/// Full proxy (routes + metrics) on an ephemeral port, without the background scheduler.
pub async fn spawn_proxy(
    upstream: UpstreamConfig,
    credentials: Credentials,
) -> anyhow::Result<(JoinHandle<()>, SocketAddr, ProxyService)> {
    let service = ProxyService::new(upstream, credentials)?;
    let state = AppState::new(get_metrics().await, service.clone());
    let app = server::router(state, &MetricsConfig::default());
    let (handle, addr) = spawn_axum(app).await;
    Ok((handle, addr, service))
}
