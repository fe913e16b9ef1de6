use std::sync::Arc;
use std::time::{Duration, Instant};

use actix_web::{web, HttpResponse, Responder};
use serde_json::json;
use tracing::{error, trace};

use crate::storage::Store;

// Application start time, injected at startup
#[derive(Clone, Debug)]
pub struct AppStartTime {
    pub start_datetime: chrono::DateTime<chrono::Utc>,
}

pub struct HealthService;

impl HealthService {
    pub async fn health_check(
        store: web::Data<Arc<dyn Store>>,
        app_start_time: web::Data<AppStartTime>,
    ) -> impl Responder {
        let start = Instant::now();
        trace!("Received health check request");

        let storage_status =
            match tokio::time::timeout(Duration::from_secs(5), store.list_redirects()).await {
                Ok(records) => json!({
                    "status": "healthy",
                    "redirect_count": records.len(),
                    "backend": store.backend_name().await,
                }),
                Err(_) => {
                    error!("Storage health check timeout");
                    json!({
                        "status": "unhealthy",
                        "error": "timeout",
                        "backend": store.backend_name().await,
                    })
                }
            };

        let now = chrono::Utc::now();
        let uptime_seconds = (now - app_start_time.start_datetime).num_seconds().max(0) as u64;
        let is_healthy = storage_status["status"] == "healthy";

        let response_status = if is_healthy {
            actix_web::http::StatusCode::OK
        } else {
            actix_web::http::StatusCode::SERVICE_UNAVAILABLE
        };

        HttpResponse::build(response_status)
            .append_header(("Content-Type", "application/json; charset=utf-8"))
            .json(json!({
                "status": if is_healthy { "healthy" } else { "unhealthy" },
                "timestamp": now.to_rfc3339(),
                "uptime": uptime_seconds,
                "checks": { "storage": storage_status },
                "response_time_ms": start.elapsed().as_millis(),
            }))
    }

    pub async fn readiness_check() -> impl Responder {
        HttpResponse::Ok()
            .append_header(("Content-Type", "text/plain"))
            .body("OK")
    }

    pub async fn liveness_check() -> impl Responder {
        HttpResponse::NoContent().finish()
    }
}

pub fn health_routes() -> actix_web::Scope {
    web::scope("/health")
        .route("", web::get().to(HealthService::health_check))
        .route("/ready", web::get().to(HealthService::readiness_check))
        .route("/live", web::get().to(HealthService::liveness_check))
}
