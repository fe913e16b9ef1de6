//! Client IP extraction
//!
//! Priority: `CF-Connecting-IP` (set by the edge), first entry of
//! `X-Forwarded-For`, then the peer address. Failures fall back to None; the
//! click pipeline stores "unknown" in that case.

use actix_web::HttpRequest;

pub fn extract_client_ip(req: &HttpRequest) -> Option<String> {
    if let Some(ip) = header_value(req, "cf-connecting-ip") {
        return Some(ip);
    }

    if let Some(forwarded) = header_value(req, "x-forwarded-for") {
        if let Some(first) = forwarded.split(',').next() {
            let first = first.trim();
            if !first.is_empty() {
                return Some(first.to_string());
            }
        }
    }

    req.peer_addr().map(|addr| addr.ip().to_string())
}

fn header_value(req: &HttpRequest, name: &str) -> Option<String> {
    req.headers()
        .get(name)
        .and_then(|h| h.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(String::from)
}
