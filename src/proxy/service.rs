use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use tracing::{info, warn};

use crate::cache::resource::Resource;
use crate::cache::resource_cache::ResourceCache;
use crate::config::settings::UpstreamConfig;
use crate::credentials::store::{mask, CredentialStore, Credentials};
use crate::error::ProxyError;
use crate::observability::metrics::get_metrics;
use crate::refresh::cycle::RefreshCycle;
use crate::upstream::client::UpstreamClient;

/// Snapshot served on the status endpoints.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ServiceStatus {
    pub credentials_configured: bool,
    pub last_refreshed_at: Option<DateTime<Utc>>,
    pub primary_cached: bool,
    pub secondary_cached: bool,
}

/// Wires the credential store, upstream client, cache and refresh cycle together
/// and exposes the operations request handlers need.
#[derive(Debug, Clone)]
pub struct ProxyService {
    credentials: CredentialStore,
    client: UpstreamClient,
    cache: ResourceCache,
    cycle: RefreshCycle,
}

impl ProxyService {
    pub fn new(upstream: UpstreamConfig, initial: Credentials) -> Result<Self> {
        let credentials = CredentialStore::new(initial);
        let client = UpstreamClient::new(upstream, credentials.clone())?;
        let cache = ResourceCache::new();
        let cycle = RefreshCycle::new(client.clone(), cache.clone());
        Ok(Self {
            credentials,
            client,
            cache,
            cycle,
        })
    }

    pub fn credentials(&self) -> &CredentialStore {
        &self.credentials
    }

    pub fn cache(&self) -> &ResourceCache {
        &self.cache
    }

    /// Cycle shared with the background scheduler.
    pub fn refresh_cycle(&self) -> RefreshCycle {
        self.cycle.clone()
    }

    /// Cached document, or one synchronous refresh on a miss.
    pub async fn read(&self, resource: Resource) -> Result<Arc<Value>, ProxyError> {
        if let Some(doc) = self.cache.read(resource).await {
            return Ok(doc);
        }

        info!("cache miss for '{}', refreshing now", resource);
        get_metrics()
            .await
            .cache_fallback_refreshes
            .with_label_values(&[resource.as_str()])
            .inc();
        self.cycle.run().await;

        self.cache
            .read(resource)
            .await
            .ok_or(ProxyError::Unavailable(resource))
    }

    /// Store the pair, then probe upstream with it. On success the cache is refreshed
    /// right away. Rejected credentials stay stored.
    pub async fn save_credentials(&self, app_id: &str, app_key: &str) -> Result<(), ProxyError> {
        self.credentials.set(app_id, app_key).await?;
        info!("new credentials saved: app_id = {}", mask(app_id));

        if !self.client.validate(app_id, app_key).await {
            warn!("credentials for app_id {} rejected by upstream", mask(app_id));
            return Err(ProxyError::CredentialsRejected);
        }

        self.cycle.run().await;
        Ok(())
    }

    /// Probe whatever credentials the store currently holds. Used once at startup.
    pub async fn check_stored_credentials(&self) -> Option<bool> {
        let current = self.credentials.get().await;
        if !current.is_configured() {
            return None;
        }
        Some(self.client.validate(&current.app_id, &current.app_key).await)
    }

    pub async fn status(&self) -> ServiceStatus {
        let entry = self.cache.snapshot().await;
        ServiceStatus {
            credentials_configured: self.credentials.is_configured().await,
            last_refreshed_at: entry.last_refreshed_at,
            primary_cached: entry.primary.is_some(),
            secondary_cached: entry.secondary.is_some(),
        }
    }
}
