use prometheus::{HistogramOpts, HistogramVec, IntCounter, IntCounterVec, IntGauge, Opts, Registry};
use tracing::info;
use std::sync::Arc;
use tokio::sync::OnceCell;


// Declare the static OnceCell to hold the Metrics.
static METRICS_INSTANCE: OnceCell<Arc<Metrics>> = OnceCell::const_new();

/// Asynchronously initializes and gets a reference to the static `Metrics`.
pub async fn get_metrics() -> &'static Arc<Metrics> {
    METRICS_INSTANCE.get_or_init(|| async {
        info!("Initializing Metrics ...");
        Metrics::new()}
    ).await
}


#[derive(Clone)]
pub struct Metrics {
    pub registry: Registry,

    // Upstream metrics
    pub upstream_requests: IntCounterVec,
    pub upstream_failures: IntCounterVec,
    pub upstream_decode_failures: IntCounter,
    pub credential_validations: IntCounterVec,

    // Refresh metrics
    pub resource_fetch_duration: HistogramVec,
    pub refresh_cycles: IntCounterVec,

    // Cache metrics
    pub cache_fallback_refreshes: IntCounterVec,
    pub cache_last_refresh_unix: IntGauge,

    // Runtime
    pub up: IntGauge,
}

impl Metrics {
    fn new() -> Arc<Self> {
        let registry = Registry::new_custom(Some("flightopsproxy".into()), None).unwrap();

        let metrics: Arc<Metrics> = Arc::new(Self {
            // Upstream
            upstream_requests: IntCounterVec::new(Opts::new("upstream_requests_total", "Upstream fetch requests by endpoint"),&["endpoint"],).unwrap(),
            upstream_failures: IntCounterVec::new(Opts::new("upstream_failures_total", "Upstream fetch failures by reason"),&["endpoint", "reason"],).unwrap(),
            upstream_decode_failures: IntCounter::new("upstream_decode_failures_total", "Upstream 200 responses whose body was not JSON").unwrap(),
            credential_validations: IntCounterVec::new(Opts::new("credential_validations_total", "Credential probes by outcome"),&["outcome"],).unwrap(),

            // Refresh
            resource_fetch_duration: HistogramVec::new(HistogramOpts::new("resource_fetch_duration_seconds", "Resource fetch duration seconds").buckets(vec![0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 15.0]),&["resource"],).unwrap(),
            refresh_cycles: IntCounterVec::new(Opts::new("refresh_cycles_total", "Refresh cycles by outcome"),&["outcome"],).unwrap(),

            // Cache
            cache_fallback_refreshes: IntCounterVec::new(Opts::new("cache_fallback_refreshes_total", "Synchronous refreshes triggered by a cache miss"),&["resource"],).unwrap(),
            cache_last_refresh_unix: IntGauge::new("cache_last_refresh_timestamp_seconds", "Time of the last refresh that updated the cache").unwrap(),

            up: IntGauge::new("up", "1 if service is healthy").unwrap(),

            registry,
        });

        // Register all metrics in the registry
        let reg = &metrics.registry;
        reg.register(Box::new(metrics.upstream_requests.clone())).unwrap();
        reg.register(Box::new(metrics.upstream_failures.clone())).unwrap();
        reg.register(Box::new(metrics.upstream_decode_failures.clone())).unwrap();
        reg.register(Box::new(metrics.credential_validations.clone())).unwrap();
        reg.register(Box::new(metrics.resource_fetch_duration.clone())).unwrap();
        reg.register(Box::new(metrics.refresh_cycles.clone())).unwrap();
        reg.register(Box::new(metrics.cache_fallback_refreshes.clone())).unwrap();
        reg.register(Box::new(metrics.cache_last_refresh_unix.clone())).unwrap();
        reg.register(Box::new(metrics.up.clone())).unwrap();

        metrics
    }
}
