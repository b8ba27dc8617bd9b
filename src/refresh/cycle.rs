use chrono::Utc;
use serde_json::Value;
use tokio::time::Instant;
use tracing::{info, warn};

use crate::cache::resource::Resource;
use crate::cache::resource_cache::{MergeOutcome, ResourceCache};
use crate::error::ProxyError;
use crate::observability::metrics::get_metrics;
use crate::upstream::client::UpstreamClient;

/// One fetch-both-and-merge pass over the upstream resources.
#[derive(Debug, Clone)]
pub struct RefreshCycle {
    client: UpstreamClient,
    cache: ResourceCache,
}

impl RefreshCycle {
    pub fn new(client: UpstreamClient, cache: ResourceCache) -> Self {
        Self { client, cache }
    }

    /// Both resources are always attempted; a failure of one never blocks the other
    /// and never reaches the caller.
    pub async fn run(&self) -> MergeOutcome {
        info!("refresh cycle start");
        let (primary, secondary) = tokio::join!(
            self.fetch_resource(Resource::Primary),
            self.fetch_resource(Resource::Secondary),
        );

        let now = Utc::now();
        let outcome = self.cache.write_from_cycle(primary, secondary, now).await;

        let metrics = get_metrics().await;
        metrics.refresh_cycles.with_label_values(&[outcome.label()]).inc();
        if outcome.any() {
            metrics.cache_last_refresh_unix.set(now.timestamp());
            info!("cache refreshed ({}) at {}", outcome.label(), now.to_rfc3339());
        } else {
            warn!("refresh cycle failed for every resource, keeping cached values");
        }
        outcome
    }

    async fn fetch_resource(&self, resource: Resource) -> Result<Value, ProxyError> {
        let start = Instant::now();
        let path = self.client.config().path_for(resource);
        let result = self.client.fetch(path).await;

        get_metrics()
            .await
            .resource_fetch_duration
            .with_label_values(&[resource.as_str()])
            .observe(start.elapsed().as_secs_f64());

        match &result {
            Ok(_) => info!("resource '{}' fetched", resource),
            Err(err) => warn!("resource '{}' fetch failed: {}", resource, err),
        }
        result
    }
}
