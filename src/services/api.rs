use std::sync::Arc;

use actix_web::{web, HttpResponse, Responder};
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use crate::config::AppConfig;
use crate::errors::BbError;
use crate::storage::{Platform, RedirectRecord, Store};
use crate::utils::url_validator::validate_dest;
use crate::utils::{generate_key, TimeParser};

/// Attempts before giving up on finding an unused random key.
const KEY_GENERATION_ATTEMPTS: usize = 4;

/// Cap on click events returned by the stats endpoint.
const RECENT_CLICKS_LIMIT: usize = 100;

#[derive(Deserialize, Clone, Debug)]
pub struct CreateRedirect {
    pub dest: String,
    pub platform: Option<Platform>,
    pub owner: Option<String>,
    pub title: Option<String>,
    pub add_to_cart: Option<bool>,
    pub expires_at: Option<String>,
}

#[derive(Serialize, Debug)]
pub struct CreatedResponse {
    pub success: bool,
    pub key: String,
    pub short_url: String,
    pub data: RedirectRecord,
}

#[derive(Serialize, Debug)]
pub struct RedirectWithClicks {
    #[serde(flatten)]
    pub record: RedirectRecord,
    pub clicks: u64,
}

#[derive(Serialize, Debug)]
pub struct StatsResponse {
    pub clicks: u64,
    pub last_click: Option<chrono::DateTime<chrono::Utc>>,
    pub recent_clicks: Vec<crate::storage::ClickEvent>,
}

pub struct ApiService;

impl ApiService {
    /// `POST /api/redirects`
    pub async fn create_redirect(
        payload: web::Json<CreateRedirect>,
        store: web::Data<Arc<dyn Store>>,
        config: web::Data<AppConfig>,
    ) -> impl Responder {
        let payload = payload.into_inner();

        if let Err(e) = validate_dest(&payload.dest) {
            return Self::bad_request(e.message());
        }

        let expires_at = match payload.expires_at.as_deref() {
            Some(raw) => match TimeParser::parse_expire_time(raw) {
                Ok(dt) => Some(dt),
                Err(e) => return Self::bad_request(e.message()),
            },
            None => None,
        };

        let key = match Self::allocate_key(&store, config.random_key_length).await {
            Ok(key) => key,
            Err(e) => {
                error!("API: key allocation failed: {}", e);
                return Self::internal_error();
            }
        };

        let record = RedirectRecord {
            key: key.clone(),
            platform: payload
                .platform
                .unwrap_or_else(|| Platform::detect(&payload.dest)),
            dest: payload.dest,
            owner: payload.owner.unwrap_or_else(|| "default".to_string()),
            title: payload.title.unwrap_or_default(),
            add_to_cart: payload.add_to_cart.unwrap_or(false),
            expires_at,
            active: true,
            created_at: chrono::Utc::now(),
        };

        match store.put_redirect(record.clone()).await {
            Ok(()) => {
                info!("API: redirect created - {} -> {}", key, record.dest);
                HttpResponse::Created()
                    .append_header(("Content-Type", "application/json; charset=utf-8"))
                    .json(CreatedResponse {
                        success: true,
                        short_url: format!("{}/r/{}", config.base_url, key),
                        key,
                        data: record,
                    })
            }
            Err(e) => {
                error!("API: failed to store redirect {}: {}", key, e);
                Self::internal_error()
            }
        }
    }

    /// `GET /api/redirects`: all records joined with their click counts,
    /// newest first.
    pub async fn list_redirects(store: web::Data<Arc<dyn Store>>) -> impl Responder {
        let mut records = store.list_redirects().await;
        records.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        let mut out = Vec::with_capacity(records.len());
        for record in records {
            let clicks = store
                .get_stats(&record.key)
                .await
                .map(|s| s.clicks)
                .unwrap_or(0);
            out.push(RedirectWithClicks { record, clicks });
        }

        HttpResponse::Ok()
            .append_header(("Content-Type", "application/json; charset=utf-8"))
            .json(out)
    }

    /// `GET /api/stats/{key}`
    pub async fn get_stats(
        key: web::Path<String>,
        store: web::Data<Arc<dyn Store>>,
    ) -> impl Responder {
        let key = key.into_inner();

        if !store.redirect_exists(&key).await {
            return HttpResponse::NotFound()
                .append_header(("Content-Type", "application/json; charset=utf-8"))
                .json(serde_json::json!({
                    "success": false,
                    "error": "Redirect not found"
                }));
        }

        let stats = store.get_stats(&key).await.unwrap_or_default();
        let recent_clicks = store.recent_clicks(&key, RECENT_CLICKS_LIMIT).await;

        HttpResponse::Ok()
            .append_header(("Content-Type", "application/json; charset=utf-8"))
            .json(StatsResponse {
                clicks: stats.clicks,
                last_click: stats.last_click,
                recent_clicks,
            })
    }

    /// Fallback for unknown /api routes.
    pub async fn not_found() -> impl Responder {
        HttpResponse::NotFound()
            .append_header(("Content-Type", "application/json; charset=utf-8"))
            .json(serde_json::json!({
                "success": false,
                "error": "Not found"
            }))
    }

    async fn allocate_key(
        store: &Arc<dyn Store>,
        length: usize,
    ) -> crate::errors::Result<String> {
        for _ in 0..KEY_GENERATION_ATTEMPTS {
            let key = generate_key(length);
            if !store.redirect_exists(&key).await {
                return Ok(key);
            }
        }
        Err(BbError::key_exhausted(format!(
            "No free key of length {} after {} attempts",
            length, KEY_GENERATION_ATTEMPTS
        )))
    }

    fn bad_request(message: &str) -> HttpResponse {
        HttpResponse::BadRequest()
            .append_header(("Content-Type", "application/json; charset=utf-8"))
            .json(serde_json::json!({
                "success": false,
                "error": message
            }))
    }

    // Details stay in the logs; the client gets a generic message.
    fn internal_error() -> HttpResponse {
        HttpResponse::InternalServerError()
            .append_header(("Content-Type", "application/json; charset=utf-8"))
            .json(serde_json::json!({
                "success": false,
                "error": "Internal server error"
            }))
    }
}

/// Maps body extraction failures onto the same `{success, error}` JSON
/// shape the handlers use, instead of actix's plain-text default.
fn json_error_handler(
    err: actix_web::error::JsonPayloadError,
    _req: &actix_web::HttpRequest,
) -> actix_web::Error {
    let response = HttpResponse::BadRequest()
        .append_header(("Content-Type", "application/json; charset=utf-8"))
        .json(serde_json::json!({
            "success": false,
            "error": err.to_string()
        }));
    actix_web::error::InternalError::from_response(err, response).into()
}

/// API route configuration. Auth and CORS wrap this scope in `main`.
pub fn api_routes() -> actix_web::Scope {
    web::scope("/api")
        .app_data(web::JsonConfig::default().error_handler(json_error_handler))
        .route("/redirects", web::post().to(ApiService::create_redirect))
        .route("/redirects", web::get().to(ApiService::list_redirects))
        .route("/stats/{key}", web::get().to(ApiService::get_stats))
        .default_service(web::route().to(ApiService::not_found))
}
