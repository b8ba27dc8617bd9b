use std::fmt;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::error::ProxyError;

/// Upstream `app_id` / `app_key` pair.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    pub app_id: String,
    pub app_key: String,
}

impl Credentials {
    pub fn new(app_id: impl Into<String>, app_key: impl Into<String>) -> Self {
        Self {
            app_id: app_id.into(),
            app_key: app_key.into(),
        }
    }

    pub fn is_configured(&self) -> bool {
        !self.app_id.is_empty() && !self.app_key.is_empty()
    }

    /// Identifier safe to put in logs: first four characters and `...`.
    pub fn masked_id(&self) -> String {
        mask(&self.app_id)
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("app_id", &self.masked_id())
            .field("app_key", &if self.app_key.is_empty() { "<empty>" } else { "<redacted>" })
            .finish()
    }
}

pub fn mask(value: &str) -> String {
    if value.is_empty() {
        return "<empty>".to_string();
    }
    let prefix: String = value.chars().take(4).collect();
    format!("{}...", prefix)
}

/// Current credential pair, last write wins.
///
/// The whole pair sits behind one lock so a reader never sees the id of one
/// write combined with the key of another.
#[derive(Debug, Clone, Default)]
pub struct CredentialStore {
    inner: Arc<RwLock<Credentials>>,
}

impl CredentialStore {
    pub fn new(initial: Credentials) -> Self {
        Self {
            inner: Arc::new(RwLock::new(initial)),
        }
    }

    pub async fn get(&self) -> Credentials {
        self.inner.read().await.clone()
    }

    pub async fn is_configured(&self) -> bool {
        self.inner.read().await.is_configured()
    }

    /// Replace the stored pair. A partial pair is rejected and the store stays as it was.
    pub async fn set(&self, app_id: &str, app_key: &str) -> Result<(), ProxyError> {
        if app_id.is_empty() || app_key.is_empty() {
            return Err(ProxyError::InvalidInput(
                "both app_id and app_key are required".to_string(),
            ));
        }
        *self.inner.write().await = Credentials::new(app_id, app_key);
        Ok(())
    }
}
