use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::config::AppConfig;
use crate::errors::Result;

pub mod file;
pub mod memory;
mod models;

pub use models::{
    ClickEvent, Device, Platform, PurgeReport, RedirectRecord, RetentionPolicy, StatsCounter,
};

/// Record store used by the redirect and API surfaces.
///
/// The keyspace mirrors the hosted KV layout the service grew out of:
/// `redirect:{key}`, `stats:{key}`, `click:{click_id}`, `daily:{date}:{key}`.
/// Counter increments happen inside `apply_clicks` under the backend's own
/// locking, so concurrent batches never lose updates.
#[async_trait]
pub trait Store: Send + Sync {
    async fn get_redirect(&self, key: &str) -> Option<RedirectRecord>;
    async fn redirect_exists(&self, key: &str) -> bool;
    async fn put_redirect(&self, record: RedirectRecord) -> Result<()>;
    async fn list_redirects(&self) -> Vec<RedirectRecord>;

    async fn get_stats(&self, key: &str) -> Option<StatsCounter>;
    /// Most recent click events for a key, newest first.
    async fn recent_clicks(&self, key: &str, limit: usize) -> Vec<ClickEvent>;
    /// Persist a batch of click events and atomically bump the per-key and
    /// per-day counters.
    async fn apply_clicks(&self, batch: Vec<ClickEvent>) -> Result<()>;

    /// Drop click events and daily counters older than the policy allows.
    async fn purge_expired(
        &self,
        policy: &RetentionPolicy,
        now: DateTime<Utc>,
    ) -> Result<PurgeReport>;

    async fn backend_name(&self) -> String;
}

pub struct StorageFactory;

impl StorageFactory {
    pub async fn create(config: &AppConfig) -> Result<Arc<dyn Store>> {
        let boxed: Box<dyn Store> = match config.storage_backend.as_str() {
            "file" => Box::new(file::FileStore::new_async(&config.db_file_name).await?),
            _ => Box::new(memory::MemoryStore::new()),
        };

        Ok(Arc::from(boxed))
    }
}

/// Composite key for a daily counter, `{date}:{key}` with an ISO date.
pub(crate) fn daily_key(date: chrono::NaiveDate, key: &str) -> String {
    format!("{}:{}", date.format("%Y-%m-%d"), key)
}

/// Parse the date half of a daily counter key.
pub(crate) fn daily_key_date(composite: &str) -> Option<chrono::NaiveDate> {
    let (date, _) = composite.split_once(':')?;
    chrono::NaiveDate::parse_from_str(date, "%Y-%m-%d").ok()
}
