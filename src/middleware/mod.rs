pub mod auth;

pub use auth::{ApiAuthMiddleware, HealthAuthMiddleware};
