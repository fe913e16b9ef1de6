use actix_web::middleware::Next;
use actix_web::{
    body::BoxBody,
    dev::{ServiceRequest, ServiceResponse},
    web, Error, HttpResponse,
};
use tracing::{debug, info};

use crate::config::AppConfig;

pub struct ApiAuthMiddleware;

impl ApiAuthMiddleware {
    /// Bearer auth for /api. The presented token is compared against the
    /// configured secret; an empty configured token disables the surface
    /// entirely (404, indistinguishable from a missing route).
    pub async fn api_auth(
        req: ServiceRequest,
        next: Next<BoxBody>,
    ) -> Result<ServiceResponse<BoxBody>, Error> {
        if req.method() == actix_web::http::Method::OPTIONS {
            return Ok(req.into_response(HttpResponse::NoContent().finish()));
        }

        let expected = req
            .app_data::<web::Data<AppConfig>>()
            .map(|c| c.api_token.clone())
            .unwrap_or_default();

        if expected.is_empty() {
            return Ok(req.into_response(
                HttpResponse::NotFound()
                    .insert_header(("Content-Type", "text/html; charset=utf-8"))
                    .body("Not Found"),
            ));
        }

        if bearer_matches(&req, &expected) {
            debug!("API authentication succeeded");
            return next.call(req).await;
        }

        info!("API authentication failed: token mismatch or missing Authorization header");
        Ok(req.into_response(
            HttpResponse::Unauthorized()
                .append_header(("Content-Type", "application/json; charset=utf-8"))
                .json(serde_json::json!({
                    "success": false,
                    "error": "Unauthorized: invalid or missing token"
                })),
        ))
    }
}

pub struct HealthAuthMiddleware;

impl HealthAuthMiddleware {
    /// Bearer auth for /health. An empty configured token leaves the probes
    /// open so liveness checks work out of the box.
    pub async fn health_auth(
        req: ServiceRequest,
        next: Next<BoxBody>,
    ) -> Result<ServiceResponse<BoxBody>, Error> {
        let expected = req
            .app_data::<web::Data<AppConfig>>()
            .map(|c| c.health_token.clone())
            .unwrap_or_default();

        if expected.is_empty() || bearer_matches(&req, &expected) {
            return next.call(req).await;
        }

        info!("Health authentication failed");
        Ok(req.into_response(
            HttpResponse::Unauthorized()
                .append_header(("Content-Type", "application/json; charset=utf-8"))
                .json(serde_json::json!({
                    "success": false,
                    "error": "Unauthorized"
                })),
        ))
    }
}

fn bearer_matches(req: &ServiceRequest, expected: &str) -> bool {
    req.headers()
        .get("Authorization")
        .and_then(|h| h.as_bytes().strip_prefix(b"Bearer "))
        .is_some_and(|presented| presented == expected.as_bytes())
}
