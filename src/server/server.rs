use anyhow::{Context, Result};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use crate::config::settings::{MetricsConfig, SettingsConfig};
use crate::observability::metrics::{get_metrics, Metrics};
use crate::observability::routes::MetricsState;
use crate::proxy::service::ProxyService;
use crate::server::handlers;

#[derive(Clone)]
pub struct AppState {
    pub metrics_state: MetricsState,
    pub service: ProxyService,
}

impl AppState {
    pub fn new(metrics: &Metrics, service: ProxyService) -> Self {
        Self {
            metrics_state: MetricsState::new(metrics.registry.clone()),
            service,
        }
    }
}

/// Proxy routes plus the optional metrics route, with CORS and request tracing.
pub fn router(state: AppState, metrics_config: &MetricsConfig) -> Router {
    Router::new()
        .merge(handlers::router())
        .merge(state.metrics_state.router(metrics_config))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Bind the configured address and serve until ctrl-c.
pub async fn start(settings_config: &SettingsConfig, service: ProxyService) -> Result<()> {
    let metrics = get_metrics().await;
    let state = AppState::new(metrics, service);
    let app = router(state, &settings_config.metrics);

    let address = format!("{}:{}", settings_config.server.host, settings_config.server.port);
    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .with_context(|| format!("failed to bind {}", address))?;
    info!("serving on http://{}", address);
    info!("if credentials are missing or stale, open /keys");

    metrics.up.set(1);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    metrics.up.set(0);
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        error!("failed to listen for shutdown signal: {}", err);
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received, stopping server");
}
