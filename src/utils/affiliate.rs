//! Affiliate URL handling
//!
//! Amazon "add to cart" rewriting and native-app deep links for the
//! interstitial page.

use std::borrow::Cow;

use url::Url;

use crate::storage::{Device, Platform};

const CART_PATH: &str = "/gp/aws/cart/add.html";

/// Rewrite an Amazon product URL into the add-to-cart form:
/// `https://{host}/gp/aws/cart/add.html?ASIN.1={asin}&Quantity.1=1&tag={tag}`.
///
/// Total and idempotent: when the URL carries no ASIN or no `tag` parameter
/// it is returned unchanged, and cart URLs themselves carry neither a `/dp/`
/// nor a `/gp/product/` segment, so converting twice is a no-op.
pub fn convert_to_add_to_cart(dest: &str) -> Cow<'_, str> {
    let Ok(parsed) = Url::parse(dest) else {
        return Cow::Borrowed(dest);
    };

    let asin = extract_asin(parsed.path());
    let tag = parsed
        .query_pairs()
        .find(|(k, _)| k == "tag")
        .map(|(_, v)| v.into_owned());

    match (asin, tag, parsed.host_str()) {
        (Some(asin), Some(tag), Some(host)) => Cow::Owned(format!(
            "https://{}{}?ASIN.1={}&Quantity.1=1&tag={}",
            host, CART_PATH, asin, tag
        )),
        _ => Cow::Borrowed(dest),
    }
}

/// ASIN from a product path: the 10-char uppercase alphanumeric token after
/// `/dp/` or `/gp/product/`.
fn extract_asin(path: &str) -> Option<&str> {
    let rest = path
        .split_once("/dp/")
        .or_else(|| path.split_once("/gp/product/"))
        .map(|(_, rest)| rest)?;

    let candidate = rest.split(['/', '?']).next()?;
    if candidate.len() == 10
        && candidate
            .chars()
            .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit())
    {
        Some(candidate)
    } else {
        None
    }
}

/// Native-app deep link for the final URL, when the platform and device have
/// one. The interstitial tries this first and falls back to the web URL.
pub fn deep_link(platform: Platform, final_url: &str, device: Device) -> Option<String> {
    if !device.is_mobile() {
        return None;
    }

    let parsed = Url::parse(final_url).ok()?;
    let host = parsed.host_str()?;
    let path_and_query = match parsed.query() {
        Some(q) => format!("{}?{}", parsed.path(), q),
        None => parsed.path().to_string(),
    };

    match (platform, device) {
        (Platform::Amazon, Device::Android) => Some(format!(
            "intent://{}{}#Intent;scheme=https;package=com.amazon.mShop.android.shopping;S.browser_fallback_url={};end",
            host,
            path_and_query,
            urlencoding::encode(final_url)
        )),
        (Platform::Amazon, _) => Some(format!(
            "com.amazon.mobile.shopping://{}{}",
            host, path_and_query
        )),
        (Platform::MercadoLivre, Device::Android) => Some(format!(
            "intent://{}{}#Intent;scheme=https;package=com.mercadolibre;S.browser_fallback_url={};end",
            host,
            path_and_query,
            urlencoding::encode(final_url)
        )),
        (Platform::MercadoLivre, _) => {
            Some(format!("meli://webview?url={}", urlencoding::encode(final_url)))
        }
        _ => None,
    }
}
