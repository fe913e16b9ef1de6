//! Retention sweeper
//!
//! Click events are kept 90 days and daily counters 180 days. A background
//! task walks the store on a fixed interval and deletes whatever has aged out.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::sleep;
use tracing::{debug, error, info};

use crate::storage::{RetentionPolicy, Store};

pub async fn run_retention_sweeper(
    store: Arc<dyn Store>,
    policy: RetentionPolicy,
    interval: Duration,
) {
    loop {
        sleep(interval).await;

        match store.purge_expired(&policy, chrono::Utc::now()).await {
            Ok(report) if report.clicks_removed > 0 || report.daily_removed > 0 => {
                info!(
                    "Retention sweep removed {} click events and {} daily counters",
                    report.clicks_removed, report.daily_removed
                );
            }
            Ok(_) => debug!("Retention sweep: nothing to remove"),
            Err(e) => error!("Retention sweep failed: {}", e),
        }
    }
}
