use chrono::{DateTime, Utc};
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::cache::resource::Resource;

/// Last good copy of each upstream document.
///
/// A resource is `None` until its first successful fetch. After that it always
/// holds the most recent successfully fetched document: failures never blank it.
#[derive(Debug, Clone, Default)]
pub struct CacheEntry {
    pub primary: Option<Arc<Value>>,
    pub secondary: Option<Arc<Value>>,
    pub last_refreshed_at: Option<DateTime<Utc>>,
}

impl CacheEntry {
    pub fn get(&self, resource: Resource) -> Option<Arc<Value>> {
        match resource {
            Resource::Primary => self.primary.clone(),
            Resource::Secondary => self.secondary.clone(),
        }
    }
}

/// Which resources a merge actually replaced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MergeOutcome {
    pub primary_updated: bool,
    pub secondary_updated: bool,
}

impl MergeOutcome {
    pub fn any(&self) -> bool {
        self.primary_updated || self.secondary_updated
    }

    pub fn all(&self) -> bool {
        self.primary_updated && self.secondary_updated
    }

    /// `full`, `partial` or `failed`, used as a metric label.
    pub fn label(&self) -> &'static str {
        if self.all() {
            "full"
        } else if self.any() {
            "partial"
        } else {
            "failed"
        }
    }
}

/// Single-lock cache shared between the refresh loop and request handlers.
/// Critical sections only swap `Arc`s, no I/O happens under the lock.
#[derive(Debug, Clone, Default)]
pub struct ResourceCache {
    inner: Arc<Mutex<CacheEntry>>,
}

impl ResourceCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn read(&self, resource: Resource) -> Option<Arc<Value>> {
        self.inner.lock().await.get(resource)
    }

    pub async fn read_primary(&self) -> Option<Arc<Value>> {
        self.read(Resource::Primary).await
    }

    pub async fn read_secondary(&self) -> Option<Arc<Value>> {
        self.read(Resource::Secondary).await
    }

    pub async fn last_refreshed_at(&self) -> Option<DateTime<Utc>> {
        self.inner.lock().await.last_refreshed_at
    }

    /// Whole entry taken under one lock acquisition.
    pub async fn snapshot(&self) -> CacheEntry {
        self.inner.lock().await.clone()
    }

    /// Partial-success merge of one refresh cycle.
    ///
    /// Each resource is overwritten only when its own fetch succeeded.
    /// `last_refreshed_at` moves to `at` when at least one fetch succeeded.
    pub async fn write_from_cycle<E>(
        &self,
        primary: Result<Value, E>,
        secondary: Result<Value, E>,
        at: DateTime<Utc>,
    ) -> MergeOutcome {
        // wrap before locking
        let primary = primary.ok().map(Arc::new);
        let secondary = secondary.ok().map(Arc::new);

        let mut entry = self.inner.lock().await;
        let mut outcome = MergeOutcome::default();
        if let Some(doc) = primary {
            entry.primary = Some(doc);
            outcome.primary_updated = true;
        }
        if let Some(doc) = secondary {
            entry.secondary = Some(doc);
            outcome.secondary_updated = true;
        }
        if outcome.any() {
            entry.last_refreshed_at = Some(at);
        }
        outcome
    }
}
