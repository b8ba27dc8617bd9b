use anyhow::Result;
use http::header::ACCEPT;
use http::StatusCode;
use reqwest::{Client, RequestBuilder};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::config::settings::UpstreamConfig;
use crate::credentials::store::{CredentialStore, Credentials};
use crate::error::{truncate_body, ProxyError};
use crate::observability::metrics::get_metrics;

pub const APP_ID_HEADER: &str = "app_id";
pub const APP_KEY_HEADER: &str = "app_key";

static VALID_MSG: &str = "valid";
static INVALID_MSG: &str = "invalid";
static ERROR_MSG: &str = "error";

/// Authenticated GET access to the upstream flight-operations API.
///
/// One pooled `reqwest::Client` is shared by every call; timeouts are set per request.
#[derive(Debug, Clone)]
pub struct UpstreamClient {
    http: Client,
    config: Arc<UpstreamConfig>,
    credentials: CredentialStore,
}

impl UpstreamClient {
    pub fn new(config: UpstreamConfig, credentials: CredentialStore) -> Result<Self> {
        let http = Client::builder().build()?;
        Ok(Self {
            http,
            config: Arc::new(config),
            credentials,
        })
    }

    pub fn config(&self) -> &UpstreamConfig {
        &self.config
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url.trim_end_matches('/'), path)
    }

    fn authorized_get(&self, url: &str, credentials: &Credentials, timeout: Duration) -> RequestBuilder {
        self.http
            .get(url)
            .header(APP_ID_HEADER, credentials.app_id.as_str())
            .header(APP_KEY_HEADER, credentials.app_key.as_str())
            .header(ACCEPT, "application/json")
            .timeout(timeout)
    }

    /// Probe upstream with a candidate pair. Only a 200 counts as valid; transport
    /// errors and timeouts are reported as `false`.
    pub async fn validate(&self, app_id: &str, app_key: &str) -> bool {
        let metrics = get_metrics().await;
        let candidate = Credentials::new(app_id, app_key);
        let url = self.url(&self.config.probe_path);

        let response = match self
            .authorized_get(&url, &candidate, self.config.validate_timeout())
            .send()
            .await
        {
            Ok(response) => response,
            Err(err) => {
                warn!("credential validation request for app_id {} failed: {}", candidate.masked_id(), err);
                metrics.credential_validations.with_label_values(&[ERROR_MSG]).inc();
                return false;
            }
        };

        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        info!(
            "credential validation status: {} | body: {}",
            status.as_u16(),
            truncate_body(&body)
        );

        let valid = status == StatusCode::OK;
        metrics
            .credential_validations
            .with_label_values(&[if valid { VALID_MSG } else { INVALID_MSG }])
            .inc();
        valid
    }

    /// GET `<base_url><resource_path>` with the stored credentials.
    ///
    /// A 200 whose body is not JSON yields `Value::Null` instead of an error.
    pub async fn fetch(&self, resource_path: &str) -> Result<Value, ProxyError> {
        let metrics = get_metrics().await;
        let credentials = self.credentials.get().await;
        if !credentials.is_configured() {
            metrics
                .upstream_failures
                .with_label_values(&[resource_path, ProxyError::NoCredentials.reason()])
                .inc();
            return Err(ProxyError::NoCredentials);
        }

        metrics.upstream_requests.with_label_values(&[resource_path]).inc();
        let url = self.url(resource_path);
        debug!("fetching {}", url);

        let result = self.send_fetch(&url, &credentials).await;
        if let Err(err) = &result {
            metrics
                .upstream_failures
                .with_label_values(&[resource_path, err.reason()])
                .inc();
        }
        result
    }

    async fn send_fetch(&self, url: &str, credentials: &Credentials) -> Result<Value, ProxyError> {
        let response = self
            .authorized_get(url, credentials, self.config.fetch_timeout())
            .send()
            .await?;

        let status = response.status();
        info!("upstream status: {} for {}", status.as_u16(), url);

        if status != StatusCode::OK {
            let body = truncate_body(&response.text().await.unwrap_or_default());
            warn!("upstream error for {}: {}", url, body);
            return Err(ProxyError::Upstream {
                status: status.as_u16(),
                body,
            });
        }

        let bytes = response.bytes().await?;
        Ok(decode_lenient(url, &bytes).await)
    }
}

/// Upstream payloads are opaque; malformed JSON becomes `null` rather than a failure.
async fn decode_lenient(url: &str, bytes: &[u8]) -> Value {
    match serde_json::from_slice::<Value>(bytes) {
        Ok(value) => value,
        Err(err) => {
            warn!("upstream body from {} is not valid JSON, caching null: {}", url, err);
            get_metrics().await.upstream_decode_failures.inc();
            Value::Null
        }
    }
}
