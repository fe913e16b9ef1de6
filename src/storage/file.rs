//! JSON file store.
//!
//! The whole dataset lives in one JSON document, loaded at startup and
//! rewritten after every mutation. Mutations run under a single RwLock, which
//! also makes counter increments atomic. Fine for a single instance with
//! modest traffic; anything bigger should run the memory backend behind a
//! durable click sink.

use std::collections::HashMap;
use std::fs;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use tracing::info;

use super::{daily_key, daily_key_date, Store};
use crate::errors::{BbError, Result};
use crate::storage::{ClickEvent, PurgeReport, RedirectRecord, RetentionPolicy, StatsCounter};

#[derive(serde::Serialize, serde::Deserialize, Default)]
struct FileState {
    #[serde(default)]
    redirects: HashMap<String, RedirectRecord>,
    #[serde(default)]
    stats: HashMap<String, StatsCounter>,
    #[serde(default)]
    clicks: HashMap<String, ClickEvent>,
    #[serde(default)]
    daily: HashMap<String, u64>,
}

pub struct FileStore {
    file_path: String,
    state: RwLock<FileState>,
}

impl FileStore {
    pub async fn new_async(file_path: &str) -> Result<Self> {
        let state = match fs::read_to_string(file_path) {
            Ok(content) => serde_json::from_str::<FileState>(&content).map_err(|e| {
                BbError::serialization(format!("Failed to parse store file: {}", e))
            })?,
            Err(_) => {
                let empty = FileState::default();
                fs::write(file_path, serde_json::to_string(&empty)?)?;
                info!("Created empty store file: {}", file_path);
                empty
            }
        };

        info!(
            "Loaded {} redirect records from {}",
            state.redirects.len(),
            file_path
        );

        Ok(FileStore {
            file_path: file_path.to_string(),
            state: RwLock::new(state),
        })
    }

    fn save(&self, state: &FileState) -> Result<()> {
        let json = serde_json::to_string_pretty(state)?;
        fs::write(&self.file_path, json)?;
        Ok(())
    }
}

#[async_trait]
impl Store for FileStore {
    async fn get_redirect(&self, key: &str) -> Option<RedirectRecord> {
        self.state.read().await.redirects.get(key).cloned()
    }

    async fn redirect_exists(&self, key: &str) -> bool {
        self.state.read().await.redirects.contains_key(key)
    }

    async fn put_redirect(&self, record: RedirectRecord) -> Result<()> {
        let mut state = self.state.write().await;
        state.redirects.insert(record.key.clone(), record);
        self.save(&state)
    }

    async fn list_redirects(&self) -> Vec<RedirectRecord> {
        self.state.read().await.redirects.values().cloned().collect()
    }

    async fn get_stats(&self, key: &str) -> Option<StatsCounter> {
        self.state.read().await.stats.get(key).cloned()
    }

    async fn recent_clicks(&self, key: &str, limit: usize) -> Vec<ClickEvent> {
        let state = self.state.read().await;
        let mut events: Vec<ClickEvent> = state
            .clicks
            .values()
            .filter(|e| e.key == key)
            .cloned()
            .collect();
        events.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        events.truncate(limit);
        events
    }

    async fn apply_clicks(&self, batch: Vec<ClickEvent>) -> Result<()> {
        let mut state = self.state.write().await;
        for event in batch {
            let day = daily_key(event.timestamp.date_naive(), &event.key);

            let counter = state.stats.entry(event.key.clone()).or_default();
            counter.clicks += 1;
            if counter.last_click.is_none_or(|last| last < event.timestamp) {
                counter.last_click = Some(event.timestamp);
            }
            *state.daily.entry(day).or_insert(0) += 1;
            state.clicks.insert(event.click_id.clone(), event);
        }
        self.save(&state)
    }

    async fn purge_expired(
        &self,
        policy: &RetentionPolicy,
        now: DateTime<Utc>,
    ) -> Result<PurgeReport> {
        let click_cutoff = now - chrono::Duration::days(policy.click_days);
        let daily_cutoff = (now - chrono::Duration::days(policy.daily_days)).date_naive();

        let mut state = self.state.write().await;

        let clicks_before = state.clicks.len() as u64;
        state.clicks.retain(|_, e| e.timestamp >= click_cutoff);

        let daily_before = state.daily.len() as u64;
        state
            .daily
            .retain(|k, _| daily_key_date(k).is_none_or(|d| d >= daily_cutoff));

        let report = PurgeReport {
            clicks_removed: clicks_before - state.clicks.len() as u64,
            daily_removed: daily_before - state.daily.len() as u64,
        };

        if report.clicks_removed > 0 || report.daily_removed > 0 {
            self.save(&state)?;
        }
        Ok(report)
    }

    async fn backend_name(&self) -> String {
        "file".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{Device, Platform};

    fn sample_record(key: &str) -> RedirectRecord {
        RedirectRecord {
            key: key.to_string(),
            dest: "https://example.com".into(),
            platform: Platform::Other,
            owner: "default".into(),
            title: String::new(),
            add_to_cart: false,
            expires_at: None,
            active: true,
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_persists_across_reopen() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("store.json");
        let path = path.to_str().unwrap();

        {
            let store = FileStore::new_async(path).await.unwrap();
            store.put_redirect(sample_record("abc123")).await.unwrap();
            store
                .apply_clicks(vec![ClickEvent {
                    key: "abc123".into(),
                    click_id: "c1".into(),
                    user_agent: "test".into(),
                    ip: "127.0.0.1".into(),
                    referrer: "direct".into(),
                    device: Device::Desktop,
                    country: "BR".into(),
                    timestamp: Utc::now(),
                    platform: Platform::Other,
                    owner: "default".into(),
                }])
                .await
                .unwrap();
        }

        let reopened = FileStore::new_async(path).await.unwrap();
        assert!(reopened.redirect_exists("abc123").await);
        assert_eq!(reopened.get_stats("abc123").await.unwrap().clicks, 1);
        assert_eq!(reopened.recent_clicks("abc123", 10).await.len(), 1);
    }

    #[tokio::test]
    async fn test_corrupt_file_is_an_error() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("broken.json");
        fs::write(&path, "not json at all").unwrap();

        let result = FileStore::new_async(path.to_str().unwrap()).await;
        assert!(matches!(result, Err(BbError::Serialization(_))));
    }
}
