//! In-memory store backed by DashMap.
//!
//! Default backend; also the one integration tests run against. Counter
//! updates go through DashMap's entry API, which holds the shard lock for the
//! duration of the modification, so concurrent `apply_clicks` batches cannot
//! lose increments.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;

use super::{daily_key, daily_key_date, Store};
use crate::errors::Result;
use crate::storage::{ClickEvent, PurgeReport, RedirectRecord, RetentionPolicy, StatsCounter};

#[derive(Default)]
pub struct MemoryStore {
    redirects: DashMap<String, RedirectRecord>,
    stats: DashMap<String, StatsCounter>,
    clicks: DashMap<String, ClickEvent>,
    daily: DashMap<String, u64>,
}

impl MemoryStore {
    pub fn new() -> Self {
        MemoryStore::default()
    }

    pub fn new_shared() -> Arc<dyn Store> {
        Arc::new(MemoryStore::new())
    }

    /// Daily counter value, exposed for tests.
    pub fn daily_count(&self, date: chrono::NaiveDate, key: &str) -> u64 {
        self.daily
            .get(&daily_key(date, key))
            .map(|v| *v)
            .unwrap_or(0)
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn get_redirect(&self, key: &str) -> Option<RedirectRecord> {
        self.redirects.get(key).map(|r| r.value().clone())
    }

    async fn redirect_exists(&self, key: &str) -> bool {
        self.redirects.contains_key(key)
    }

    async fn put_redirect(&self, record: RedirectRecord) -> Result<()> {
        self.redirects.insert(record.key.clone(), record);
        Ok(())
    }

    async fn list_redirects(&self) -> Vec<RedirectRecord> {
        self.redirects.iter().map(|r| r.value().clone()).collect()
    }

    async fn get_stats(&self, key: &str) -> Option<StatsCounter> {
        self.stats.get(key).map(|s| s.value().clone())
    }

    async fn recent_clicks(&self, key: &str, limit: usize) -> Vec<ClickEvent> {
        let mut events: Vec<ClickEvent> = self
            .clicks
            .iter()
            .filter(|e| e.value().key == key)
            .map(|e| e.value().clone())
            .collect();
        events.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        events.truncate(limit);
        events
    }

    async fn apply_clicks(&self, batch: Vec<ClickEvent>) -> Result<()> {
        for event in batch {
            let day = daily_key(event.timestamp.date_naive(), &event.key);

            {
                let mut counter = self.stats.entry(event.key.clone()).or_default();
                counter.clicks += 1;
                if counter.last_click.is_none_or(|last| last < event.timestamp) {
                    counter.last_click = Some(event.timestamp);
                }
            }
            *self.daily.entry(day).or_insert(0) += 1;

            self.clicks.insert(event.click_id.clone(), event);
        }
        Ok(())
    }

    async fn purge_expired(
        &self,
        policy: &RetentionPolicy,
        now: DateTime<Utc>,
    ) -> Result<PurgeReport> {
        let click_cutoff = now - chrono::Duration::days(policy.click_days);
        let daily_cutoff = (now - chrono::Duration::days(policy.daily_days)).date_naive();

        let clicks_before = self.clicks.len() as u64;
        self.clicks.retain(|_, e| e.timestamp >= click_cutoff);

        let daily_before = self.daily.len() as u64;
        self.daily
            .retain(|k, _| daily_key_date(k).is_none_or(|d| d >= daily_cutoff));

        Ok(PurgeReport {
            clicks_removed: clicks_before - self.clicks.len() as u64,
            daily_removed: daily_before - self.daily.len() as u64,
        })
    }

    async fn backend_name(&self) -> String {
        "memory".to_string()
    }
}
