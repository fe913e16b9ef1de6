//! Interstitial HTML page
//!
//! The redirect responds with a small page instead of a 30x so the click
//! identity can be replicated into every client-side storage primitive before
//! the browser leaves. Read priority for consumers is cookie > localStorage >
//! IndexedDB. On mobile the page first tries the native app deep link with a
//! 1500 ms timeout; otherwise it falls through to `location.replace` after
//! 800 ms.

use crate::storage::{ClickEvent, RedirectRecord};

const DEEP_LINK_TIMEOUT_MS: u32 = 1500;
const REDIRECT_DELAY_MS: u32 = 800;

const TEMPLATE: &str = r#"<!DOCTYPE html>
<html lang="pt-BR">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<meta name="robots" content="noindex">
<title>Redirecionando...</title>
<style>
body{font-family:-apple-system,BlinkMacSystemFont,'Segoe UI',Roboto,sans-serif;display:flex;align-items:center;justify-content:center;min-height:100vh;margin:0;background:#f7f7f7;color:#333}
.box{text-align:center;padding:2rem}
.spinner{width:40px;height:40px;margin:0 auto 1rem;border:4px solid #ddd;border-top-color:#e47911;border-radius:50%;animation:spin .8s linear infinite}
@keyframes spin{to{transform:rotate(360deg)}}
a{color:#e47911}
</style>
</head>
<body>
<div class="box">
<div class="spinner"></div>
<p>Redirecionando para a oferta...</p>
<p><a href="%%FINAL_URL_ATTR%%" rel="noopener">Clique aqui se n&atilde;o for redirecionado</a></p>
</div>
<script>
(function(){
  var payload = {
    clickId: %%CLICK_ID%%,
    key: %%KEY%%,
    platform: %%PLATFORM%%,
    owner: %%OWNER%%,
    ts: Date.now()
  };
  var serialized = JSON.stringify(payload);
  try { localStorage.setItem('bb_ref', serialized); } catch (e) {}
  try { sessionStorage.setItem('bb_ref', serialized); } catch (e) {}
  try {
    var open = indexedDB.open('bb_tracking', 1);
    open.onupgradeneeded = function () { open.result.createObjectStore('refs'); };
    open.onsuccess = function () {
      try {
        open.result.transaction('refs', 'readwrite').objectStore('refs').put(payload, 'bb_ref');
      } catch (e) {}
    };
  } catch (e) {}
  try {
    if (navigator.sendBeacon) {
      navigator.sendBeacon('/r/sync', new Blob([serialized], { type: 'application/json' }));
    }
  } catch (e) {}

  var finalUrl = %%FINAL_URL%%;
  var deepLink = %%DEEP_LINK%%;
  if (deepLink) {
    var timer = setTimeout(function () { location.replace(finalUrl); }, %%DEEP_LINK_TIMEOUT%%);
    document.addEventListener('visibilitychange', function () {
      if (document.hidden) { clearTimeout(timer); }
    });
    location.href = deepLink;
  } else {
    setTimeout(function () { location.replace(finalUrl); }, %%REDIRECT_DELAY%%);
  }
})();
</script>
</body>
</html>
"#;

/// Render the interstitial for one click.
pub fn render(
    record: &RedirectRecord,
    event: &ClickEvent,
    final_url: &str,
    deep_link: Option<&str>,
) -> String {
    let deep_link_js = match deep_link {
        Some(link) => js_string(link),
        None => "null".to_string(),
    };

    TEMPLATE
        .replace("%%FINAL_URL_ATTR%%", &html_escape(final_url))
        .replace("%%FINAL_URL%%", &js_string(final_url))
        .replace("%%DEEP_LINK%%", &deep_link_js)
        .replace("%%CLICK_ID%%", &js_string(&event.click_id))
        .replace("%%KEY%%", &js_string(&record.key))
        .replace("%%PLATFORM%%", &js_string(record.platform.as_str()))
        .replace("%%OWNER%%", &js_string(&record.owner))
        .replace("%%DEEP_LINK_TIMEOUT%%", &DEEP_LINK_TIMEOUT_MS.to_string())
        .replace("%%REDIRECT_DELAY%%", &REDIRECT_DELAY_MS.to_string())
}

/// JSON-encode a value for embedding in the inline script. The JSON escapes
/// cover quotes and control characters; `/` is additionally escaped so a
/// `</script>` inside a URL cannot terminate the script element.
fn js_string(value: &str) -> String {
    serde_json::to_string(value)
        .unwrap_or_else(|_| "\"\"".to_string())
        .replace("</", "<\\/")
}

fn html_escape(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
