use std::sync::Arc;

use actix_web::http::StatusCode;
use actix_web::{web, HttpRequest, HttpResponse, Responder};
use tracing::debug;

use crate::analytics::ClickManager;
use crate::services::interstitial;
use crate::storage::{ClickEvent, Platform, RedirectRecord, Store};
use crate::utils::affiliate::{convert_to_add_to_cart, deep_link};
use crate::utils::generate_click_id;
use crate::utils::ip::extract_client_ip;
use crate::utils::ua::detect_device;

/// bb_ref cookie lifetime: 30 days.
const COOKIE_MAX_AGE_SECS: u32 = 2_592_000;

pub struct RedirectService;

impl RedirectService {
    /// `GET /r/{key}`: resolve the record, enqueue the click, answer with the
    /// interstitial page. Tracking never delays or fails the redirect.
    pub async fn handle_redirect(
        req: HttpRequest,
        path: web::Path<String>,
        store: web::Data<Arc<dyn Store>>,
        clicks: web::Data<Arc<ClickManager>>,
    ) -> impl Responder {
        let key = path.into_inner();

        let Some(record) = store.get_redirect(&key).await else {
            debug!("Redirect key not found: {}", key);
            return Self::not_found_response();
        };

        let now = chrono::Utc::now();
        if record.is_expired(now) {
            debug!("Redirect key expired: {}", key);
            return Self::gone_response();
        }
        if !record.active {
            debug!("Redirect key deactivated: {}", key);
            return Self::not_found_response();
        }

        let event = Self::build_click_event(&req, &record, now);
        // HEAD probes from monitors and bots must not count as clicks.
        if req.method() != actix_web::http::Method::HEAD {
            clicks.record(event.clone());
        }

        let final_url = Self::final_url(&record);
        let app_link = deep_link(record.platform, &final_url, event.device);
        let body = interstitial::render(&record, &event, &final_url, app_link.as_deref());

        let cookie = format!(
            "bb_ref={}:{}:{}; Max-Age={}; Path=/; Secure; HttpOnly; SameSite=Lax",
            record.platform, record.owner, event.click_id, COOKIE_MAX_AGE_SECS
        );

        HttpResponse::Ok()
            .insert_header(("Content-Type", "text/html; charset=utf-8"))
            .insert_header(("Cache-Control", "no-store"))
            .insert_header(("Set-Cookie", cookie))
            .body(body)
    }

    /// `POST /r/sync`: attribution reconciliation beacon from the
    /// interstitial. Best effort; a parseable payload refreshes the bb_ref
    /// cookie, anything else is ignored. The endpoint is unauthenticated,
    /// so every echoed field is validated before it reaches Set-Cookie.
    pub async fn handle_sync(body: web::Bytes) -> impl Responder {
        #[derive(serde::Deserialize)]
        struct SyncPayload {
            #[serde(alias = "clickId")]
            click_id: String,
            #[serde(default)]
            platform: Option<Platform>,
            #[serde(default)]
            owner: Option<String>,
        }

        let payload = match serde_json::from_slice::<SyncPayload>(&body) {
            Ok(payload) => payload,
            Err(e) => {
                debug!("Sync payload ignored: {}", e);
                return HttpResponse::NoContent().finish();
            }
        };

        if !is_click_id(&payload.click_id)
            || !payload.owner.as_deref().is_none_or(is_cookie_safe_owner)
        {
            debug!("Sync payload rejected: unsafe cookie fields");
            return HttpResponse::NoContent().finish();
        }

        let cookie = format!(
            "bb_ref={}:{}:{}; Max-Age={}; Path=/; Secure; HttpOnly; SameSite=Lax",
            payload.platform.unwrap_or(Platform::Other).as_str(),
            payload.owner.as_deref().unwrap_or("default"),
            payload.click_id,
            COOKIE_MAX_AGE_SECS
        );
        HttpResponse::NoContent()
            .insert_header(("Set-Cookie", cookie))
            .finish()
    }

    fn build_click_event(
        req: &HttpRequest,
        record: &RedirectRecord,
        now: chrono::DateTime<chrono::Utc>,
    ) -> ClickEvent {
        let header = |name: &str| {
            req.headers()
                .get(name)
                .and_then(|h| h.to_str().ok())
                .map(str::to_string)
        };

        let user_agent = header("user-agent").unwrap_or_else(|| "unknown".to_string());
        let device = detect_device(&user_agent);

        ClickEvent {
            key: record.key.clone(),
            click_id: generate_click_id(),
            device,
            user_agent,
            ip: extract_client_ip(req).unwrap_or_else(|| "unknown".to_string()),
            referrer: header("referer").unwrap_or_else(|| "direct".to_string()),
            country: header("cf-ipcountry").unwrap_or_else(|| "unknown".to_string()),
            timestamp: now,
            platform: record.platform,
            owner: record.owner.clone(),
        }
    }

    /// Destination with the add-to-cart rewrite applied when configured.
    fn final_url(record: &RedirectRecord) -> String {
        if record.platform == Platform::Amazon && record.add_to_cart {
            convert_to_add_to_cart(&record.dest).into_owned()
        } else {
            record.dest.clone()
        }
    }

    fn not_found_response() -> HttpResponse {
        HttpResponse::build(StatusCode::NOT_FOUND)
            .insert_header(("Content-Type", "text/plain; charset=utf-8"))
            .insert_header(("Cache-Control", "no-store"))
            .body("Link não encontrado ou expirado")
    }

    fn gone_response() -> HttpResponse {
        HttpResponse::build(StatusCode::GONE)
            .insert_header(("Content-Type", "text/plain; charset=utf-8"))
            .insert_header(("Cache-Control", "no-store"))
            .body("Link expirado")
    }
}

/// Click ids come out of `generate_click_id`: lowercase base36 only.
fn is_click_id(s: &str) -> bool {
    !s.is_empty()
        && s.len() <= 32
        && s.bytes()
            .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit())
}

/// Owner slugs safe to echo into a cookie value.
fn is_cookie_safe_owner(s: &str) -> bool {
    !s.is_empty()
        && s.len() <= 64
        && s.bytes()
            .all(|b| b.is_ascii_alphanumeric() || matches!(b, b'-' | b'_' | b'.'))
}

/// Redirect route configuration.
pub fn redirect_routes() -> actix_web::Scope {
    web::scope("/r")
        .route("/sync", web::post().to(RedirectService::handle_sync))
        .route("/{key}", web::get().to(RedirectService::handle_redirect))
        .route("/{key}", web::head().to(RedirectService::handle_redirect))
}
