use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, Mutex};
use tokio::time::sleep;
use tracing::{debug, error, warn};

use super::ClickSink;
use crate::storage::ClickEvent;

const MAX_FLUSH_ATTEMPTS: u32 = 3;
const RETRY_BASE_DELAY: Duration = Duration::from_millis(200);

/// Bounded outbox between the redirect path and the click sink.
///
/// `record` never blocks and never fails the redirect: when the queue is full
/// the event is dropped with a warning. The background task drains the queue
/// on a fixed interval and retries failed batches with exponential backoff
/// before giving up on them.
pub struct ClickManager {
    tx: mpsc::Sender<ClickEvent>,
    rx: Mutex<mpsc::Receiver<ClickEvent>>,
    sink: Arc<dyn ClickSink>,
    flush_interval: Duration,
}

impl ClickManager {
    pub fn new(sink: Arc<dyn ClickSink>, capacity: usize, flush_interval: Duration) -> Arc<Self> {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        Arc::new(Self {
            tx,
            rx: Mutex::new(rx),
            sink,
            flush_interval,
        })
    }

    /// Enqueue one click event. Fast path of every redirect, must not block.
    pub fn record(&self, event: ClickEvent) {
        if let Err(e) = self.tx.try_send(event) {
            warn!("ClickManager: queue full, dropping click event: {}", e);
        }
    }

    /// Run the periodic flush loop. Spawn once at startup.
    pub async fn run(self: Arc<Self>) {
        loop {
            sleep(self.flush_interval).await;
            self.flush().await;
        }
    }

    /// Drain the queue and flush whatever is buffered. Also called once on
    /// shutdown so in-flight clicks are not lost.
    pub async fn flush(&self) {
        let batch = {
            let mut rx = self.rx.lock().await;
            let mut batch = Vec::new();
            while let Ok(event) = rx.try_recv() {
                batch.push(event);
            }
            batch
        };

        if batch.is_empty() {
            return;
        }

        debug!("ClickManager: flushing {} click events", batch.len());
        self.flush_with_retry(batch).await;
    }

    async fn flush_with_retry(&self, batch: Vec<ClickEvent>) {
        let count = batch.len();
        let mut delay = RETRY_BASE_DELAY;

        for attempt in 1..=MAX_FLUSH_ATTEMPTS {
            match self.sink.flush_clicks(batch.clone()).await {
                Ok(()) => {
                    debug!("ClickManager: flushed {} events (attempt {})", count, attempt);
                    return;
                }
                Err(e) if attempt < MAX_FLUSH_ATTEMPTS => {
                    warn!(
                        "ClickManager: flush attempt {} failed, retrying in {:?}: {}",
                        attempt, delay, e
                    );
                    sleep(delay).await;
                    delay *= 2;
                }
                Err(e) => {
                    error!(
                        "ClickManager: dropping batch of {} events after {} attempts: {}",
                        count, MAX_FLUSH_ATTEMPTS, e
                    );
                }
            }
        }
    }
}
