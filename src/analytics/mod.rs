//! Click tracking pipeline
//!
//! Redirect handlers enqueue `ClickEvent`s on the `ClickManager` and return
//! immediately; a background task drains the queue, writes batches through a
//! `ClickSink`, and retries transient failures. A separate sweeper enforces
//! the retention policy.

mod manager;
pub mod retention;
mod sink;

pub use manager::ClickManager;
pub use sink::{ClickSink, StoreSink};
