use std::sync::Arc;

use crate::storage::{ClickEvent, Store};

/// Destination for drained click batches.
#[async_trait::async_trait]
pub trait ClickSink: Send + Sync {
    async fn flush_clicks(&self, batch: Vec<ClickEvent>) -> anyhow::Result<()>;
}

/// Sink that writes batches into the record store.
pub struct StoreSink(pub Arc<dyn Store>);

#[async_trait::async_trait]
impl ClickSink for StoreSink {
    async fn flush_clicks(&self, batch: Vec<ClickEvent>) -> anyhow::Result<()> {
        self.0.apply_clicks(batch).await?;
        Ok(())
    }
}
