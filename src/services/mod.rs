//! HTTP service layer

pub mod api;
pub mod health;
pub mod interstitial;
pub mod redirect;

pub use api::{api_routes, ApiService};
pub use health::{health_routes, AppStartTime, HealthService};
pub use redirect::{redirect_routes, RedirectService};
