//! Redirect service tests
//!
//! The critical path: short key → interstitial page with the affiliate
//! destination embedded, bb_ref cookie set, click queued.

use std::sync::Arc;
use std::time::Duration;

use actix_web::http::StatusCode;
use actix_web::test::{self, TestRequest};
use actix_web::{web, App};
use chrono::Utc;

use bbredirect::analytics::{ClickManager, StoreSink};
use bbredirect::services::redirect_routes;
use bbredirect::storage::memory::MemoryStore;
use bbredirect::storage::{Platform, RedirectRecord, Store};

const ANDROID_UA: &str = "Mozilla/5.0 (Linux; Android 13; Pixel 7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/119.0.0.0 Mobile Safari/537.36";

fn sample_record(key: &str) -> RedirectRecord {
    RedirectRecord {
        key: key.to_string(),
        dest: "https://www.amazon.com.br/dp/B000123456?tag=bbb-20".into(),
        platform: Platform::Amazon,
        owner: "bbb".into(),
        title: "Oferta".into(),
        add_to_cart: false,
        expires_at: None,
        active: true,
        created_at: Utc::now(),
    }
}

fn test_env() -> (Arc<dyn Store>, Arc<ClickManager>) {
    let store: Arc<dyn Store> = Arc::new(MemoryStore::new());
    let clicks = ClickManager::new(
        Arc::new(StoreSink(store.clone())),
        64,
        Duration::from_secs(60),
    );
    (store, clicks)
}

macro_rules! redirect_app {
    ($store:expr, $clicks:expr) => {{
        test::init_service(
            App::new()
                .app_data(web::Data::new($store.clone()))
                .app_data(web::Data::new($clicks.clone()))
                .service(redirect_routes()),
        )
        .await
    }};
}

fn bb_ref_cookies<B>(resp: &actix_web::dev::ServiceResponse<B>) -> Vec<String> {
    resp.headers()
        .get_all("set-cookie")
        .filter_map(|h| h.to_str().ok())
        .filter(|c| c.starts_with("bb_ref="))
        .map(String::from)
        .collect()
}

#[tokio::test]
async fn test_unknown_key_404_without_cookie() {
    let (store, clicks) = test_env();
    let app = redirect_app!(store, clicks);

    let req = TestRequest::get().uri("/r/zzz999").to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert!(bb_ref_cookies(&resp).is_empty());

    let body = test::read_body(resp).await;
    assert_eq!(&body[..], "Link não encontrado ou expirado".as_bytes());
}

#[tokio::test]
async fn test_expired_key_410_regardless_of_active() {
    let (store, clicks) = test_env();

    let mut expired = sample_record("old001");
    expired.expires_at = Some(Utc::now() - chrono::Duration::days(1));
    store.put_redirect(expired.clone()).await.unwrap();

    let mut expired_inactive = sample_record("old002");
    expired_inactive.expires_at = Some(Utc::now() - chrono::Duration::days(1));
    expired_inactive.active = false;
    store.put_redirect(expired_inactive).await.unwrap();

    let app = redirect_app!(store, clicks);

    for key in ["/r/old001", "/r/old002"] {
        let req = TestRequest::get().uri(key).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::GONE);
        assert!(bb_ref_cookies(&resp).is_empty());
    }
}

#[tokio::test]
async fn test_inactive_key_404() {
    let (store, clicks) = test_env();

    let mut record = sample_record("off001");
    record.active = false;
    store.put_redirect(record).await.unwrap();

    let app = redirect_app!(store, clicks);
    let req = TestRequest::get().uri("/r/off001").to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert!(bb_ref_cookies(&resp).is_empty());
}

#[tokio::test]
async fn test_valid_key_serves_interstitial_with_cookie() {
    let (store, clicks) = test_env();
    store.put_redirect(sample_record("ab12cd")).await.unwrap();

    let app = redirect_app!(store, clicks);
    let req = TestRequest::get().uri("/r/ab12cd").to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
        resp.headers().get("cache-control").unwrap().to_str().unwrap(),
        "no-store"
    );

    let cookies = bb_ref_cookies(&resp);
    assert_eq!(cookies.len(), 1, "exactly one bb_ref cookie expected");
    let cookie = &cookies[0];
    assert!(cookie.contains("Max-Age=2592000"));
    assert!(cookie.contains("SameSite=Lax"));
    assert!(cookie.contains("HttpOnly"));

    // value is platform:owner:click_id
    let value = cookie
        .strip_prefix("bb_ref=")
        .unwrap()
        .split(';')
        .next()
        .unwrap();
    let parts: Vec<&str> = value.split(':').collect();
    assert_eq!(parts.len(), 3);
    assert_eq!(parts[0], "amazon");
    assert_eq!(parts[1], "bbb");
    assert!(!parts[2].is_empty());

    let body = String::from_utf8(test::read_body(resp).await.to_vec()).unwrap();
    assert!(body.contains("https://www.amazon.com.br/dp/B000123456?tag=bbb-20"));
    assert!(body.contains(parts[2]), "click id embedded in the page");
}

#[tokio::test]
async fn test_add_to_cart_rewrite_in_page() {
    let (store, clicks) = test_env();

    let mut record = sample_record("cart01");
    record.add_to_cart = true;
    store.put_redirect(record).await.unwrap();

    let app = redirect_app!(store, clicks);
    let req = TestRequest::get().uri("/r/cart01").to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::OK);
    let body = String::from_utf8(test::read_body(resp).await.to_vec()).unwrap();
    assert!(body.contains(
        "https://www.amazon.com.br/gp/aws/cart/add.html?ASIN.1=B000123456&Quantity.1=1&tag=bbb-20"
    ));
}

#[tokio::test]
async fn test_android_gets_amazon_deep_link() {
    let (store, clicks) = test_env();
    store.put_redirect(sample_record("droid1")).await.unwrap();

    let app = redirect_app!(store, clicks);
    let req = TestRequest::get()
        .uri("/r/droid1")
        .insert_header(("user-agent", ANDROID_UA))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::OK);
    let body = String::from_utf8(test::read_body(resp).await.to_vec()).unwrap();
    assert!(body.contains("com.amazon.mShop.android.shopping"));
}

#[tokio::test]
async fn test_click_is_recorded_after_flush() {
    let (store, clicks) = test_env();
    store.put_redirect(sample_record("hit001")).await.unwrap();

    let app = redirect_app!(store, clicks);
    let req = TestRequest::get()
        .uri("/r/hit001")
        .insert_header(("user-agent", ANDROID_UA))
        .insert_header(("cf-ipcountry", "BR"))
        .insert_header(("cf-connecting-ip", "203.0.113.9"))
        .insert_header(("referer", "https://instagram.com/bbb"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    clicks.flush().await;

    let stats = store.get_stats("hit001").await.unwrap();
    assert_eq!(stats.clicks, 1);
    assert!(stats.last_click.is_some());

    let events = store.recent_clicks("hit001", 10).await;
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].country, "BR");
    assert_eq!(events[0].ip, "203.0.113.9");
    assert_eq!(events[0].referrer, "https://instagram.com/bbb");
    assert_eq!(events[0].device.as_str(), "android");
}

#[tokio::test]
async fn test_no_click_recorded_for_dead_links() {
    let (store, clicks) = test_env();

    let mut expired = sample_record("dead01");
    expired.expires_at = Some(Utc::now() - chrono::Duration::days(1));
    store.put_redirect(expired).await.unwrap();

    let app = redirect_app!(store, clicks);
    let req = TestRequest::get().uri("/r/dead01").to_request();
    test::call_service(&app, req).await;

    clicks.flush().await;
    assert!(store.get_stats("dead01").await.is_none());
}

#[tokio::test]
async fn test_sync_refreshes_cookie() {
    let (store, clicks) = test_env();
    let app = redirect_app!(store, clicks);

    let req = TestRequest::post()
        .uri("/r/sync")
        .set_payload(r#"{"clickId":"m3xk1a9qz1","key":"ab12cd","platform":"amazon","owner":"bbb"}"#)
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::NO_CONTENT);
    let cookies = bb_ref_cookies(&resp);
    assert_eq!(cookies.len(), 1);
    assert!(cookies[0].starts_with("bb_ref=amazon:bbb:m3xk1a9qz1"));
}

#[tokio::test]
async fn test_sync_rejects_cookie_attribute_injection() {
    let (store, clicks) = test_env();
    let app = redirect_app!(store, clicks);

    let payloads = [
        // attribute smuggling through the click id
        r#"{"clickId":"x; Domain=evil.example; Max-Age=999999999"}"#,
        // and through the owner
        r#"{"clickId":"m3xk1a9qz1","owner":"bbb; Domain=evil.example"}"#,
        // unknown platform values never reach the cookie
        r#"{"clickId":"m3xk1a9qz1","platform":"amazon; Secure"}"#,
    ];
    for payload in payloads {
        let req = TestRequest::post()
            .uri("/r/sync")
            .set_payload(payload)
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::NO_CONTENT, "payload: {}", payload);
        assert!(bb_ref_cookies(&resp).is_empty(), "payload: {}", payload);
    }
}

#[tokio::test]
async fn test_head_request_is_not_counted() {
    let (store, clicks) = test_env();
    store.put_redirect(sample_record("head01")).await.unwrap();

    let app = redirect_app!(store, clicks);
    let req = TestRequest::with_uri("/r/head01")
        .method(actix_web::http::Method::HEAD)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    clicks.flush().await;
    assert!(store.get_stats("head01").await.is_none());
}

#[tokio::test]
async fn test_sync_garbage_payload_is_ignored() {
    let (store, clicks) = test_env();
    let app = redirect_app!(store, clicks);

    let req = TestRequest::post()
        .uri("/r/sync")
        .set_payload("not json")
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::NO_CONTENT);
    assert!(bb_ref_cookies(&resp).is_empty());
}
