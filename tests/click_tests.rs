//! Click counter concurrency tests
//!
//! The first test documents why naive read-modify-write counters lose
//! updates under concurrent clicks; the second shows the shipped
//! `apply_clicks` path counts exactly N for N concurrent events.

use std::sync::Arc;

use chrono::Utc;
use tokio::sync::{Barrier, RwLock};

use bbredirect::storage::memory::MemoryStore;
use bbredirect::storage::{ClickEvent, Device, Platform, Store};

const CONCURRENCY: usize = 32;

fn sample_click(click_id: &str) -> ClickEvent {
    ClickEvent {
        key: "abc123".into(),
        click_id: click_id.into(),
        user_agent: "test".into(),
        ip: "127.0.0.1".into(),
        referrer: "direct".into(),
        device: Device::Desktop,
        country: "BR".into(),
        timestamp: Utc::now(),
        platform: Platform::Other,
        owner: "default".into(),
    }
}

/// Counter written the way the original service did it: read the value, then
/// write value + 1, with nothing holding the two together.
struct NaiveCounter {
    value: RwLock<u64>,
}

#[tokio::test]
async fn test_naive_read_modify_write_loses_updates() {
    let counter = Arc::new(NaiveCounter {
        value: RwLock::new(0),
    });
    // every task reads before any task writes, the worst-case interleaving
    let barrier = Arc::new(Barrier::new(CONCURRENCY));

    let mut handles = Vec::new();
    for _ in 0..CONCURRENCY {
        let counter = counter.clone();
        let barrier = barrier.clone();
        handles.push(tokio::spawn(async move {
            let seen = *counter.value.read().await;
            barrier.wait().await;
            *counter.value.write().await = seen + 1;
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }

    let final_value = *counter.value.read().await;
    assert!(
        final_value < CONCURRENCY as u64,
        "naive counter should under-count: got {} of {}",
        final_value,
        CONCURRENCY
    );
}

#[tokio::test]
async fn test_apply_clicks_counts_every_concurrent_event() {
    let store = Arc::new(MemoryStore::new());

    let mut handles = Vec::new();
    for i in 0..CONCURRENCY {
        let store = store.clone();
        handles.push(tokio::spawn(async move {
            store
                .apply_clicks(vec![sample_click(&format!("c{}", i))])
                .await
                .unwrap();
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }

    let stats = store.get_stats("abc123").await.unwrap();
    assert_eq!(stats.clicks, CONCURRENCY as u64);
}
