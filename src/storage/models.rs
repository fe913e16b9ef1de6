use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Marketplace the destination URL belongs to. Drives affiliate tag handling
/// and app deep linking on the interstitial page.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Amazon,
    MercadoLivre,
    Magalu,
    Americanas,
    CasasBahia,
    Shopee,
    AliExpress,
    Other,
}

impl Platform {
    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Amazon => "amazon",
            Platform::MercadoLivre => "mercadolivre",
            Platform::Magalu => "magalu",
            Platform::Americanas => "americanas",
            Platform::CasasBahia => "casasbahia",
            Platform::Shopee => "shopee",
            Platform::AliExpress => "aliexpress",
            Platform::Other => "other",
        }
    }

    /// Infer the platform from a destination URL host.
    pub fn detect(dest: &str) -> Platform {
        let host = url::Url::parse(dest)
            .ok()
            .and_then(|u| u.host_str().map(|h| h.to_lowercase()))
            .unwrap_or_default();

        if host.contains("amazon.") || host == "amzn.to" || host == "a.co" {
            Platform::Amazon
        } else if host.contains("mercadolivre") || host.contains("mercadolibre") {
            Platform::MercadoLivre
        } else if host.contains("magazineluiza") || host.contains("magalu") {
            Platform::Magalu
        } else if host.contains("americanas") {
            Platform::Americanas
        } else if host.contains("casasbahia") {
            Platform::CasasBahia
        } else if host.contains("shopee") {
            Platform::Shopee
        } else if host.contains("aliexpress") {
            Platform::AliExpress
        } else {
            Platform::Other
        }
    }
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Device class derived from the user agent at click time.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Device {
    Android,
    Ios,
    Mobile,
    Desktop,
    Bot,
    Unknown,
}

impl Device {
    pub fn as_str(&self) -> &'static str {
        match self {
            Device::Android => "android",
            Device::Ios => "ios",
            Device::Mobile => "mobile",
            Device::Desktop => "desktop",
            Device::Bot => "bot",
            Device::Unknown => "unknown",
        }
    }

    pub fn is_mobile(&self) -> bool {
        matches!(self, Device::Android | Device::Ios | Device::Mobile)
    }
}

/// Stored configuration mapping a short key to a destination URL.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct RedirectRecord {
    pub key: String,
    pub dest: String,
    pub platform: Platform,
    pub owner: String,
    pub title: String,
    pub add_to_cart: bool,
    pub expires_at: Option<DateTime<Utc>>,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

impl RedirectRecord {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|exp| exp < now)
    }
}

/// One immutable record of a single redirect hit.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct ClickEvent {
    pub key: String,
    pub click_id: String,
    pub user_agent: String,
    pub ip: String,
    pub referrer: String,
    pub device: Device,
    pub country: String,
    pub timestamp: DateTime<Utc>,
    pub platform: Platform,
    pub owner: String,
}

/// Aggregated counter per key, bumped when click batches are applied.
#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct StatsCounter {
    pub clicks: u64,
    pub last_click: Option<DateTime<Utc>>,
}

/// How long click events and daily counters are kept.
#[derive(Clone, Copy, Debug)]
pub struct RetentionPolicy {
    pub click_days: i64,
    pub daily_days: i64,
}

impl Default for RetentionPolicy {
    fn default() -> Self {
        RetentionPolicy {
            click_days: 90,
            daily_days: 180,
        }
    }
}

/// Outcome of a retention sweep.
#[derive(Clone, Copy, Debug, Default)]
pub struct PurgeReport {
    pub clicks_removed: u64,
    pub daily_removed: u64,
}
