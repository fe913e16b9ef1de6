//! bbredirect - BuscaBuscaBrasil affiliate redirect and click tracking service
//!
//! Short links under `/r/{key}` resolve to marketplace product pages with the
//! affiliate tag attached. Every hit records a click event through a buffered
//! background pipeline so the redirect itself never waits on tracking writes.
//!
//! # Architecture
//! - `storage`: record store trait and backends (memory, file)
//! - `analytics`: click queue, background flush, retention sweep
//! - `services`: HTTP handlers (redirect, API, health, interstitial page)
//! - `middleware`: bearer token auth for the API and health surfaces
//! - `config`: environment-driven configuration
//! - `system`: logging and process-level concerns

pub mod analytics;
pub mod config;
pub mod errors;
pub mod middleware;
pub mod services;
pub mod storage;
pub mod system;
pub mod utils;
