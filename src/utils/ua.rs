//! User-agent classification via woothee.

use once_cell::sync::Lazy;
use woothee::parser::Parser;

use crate::storage::Device;

static PARSER: Lazy<Parser> = Lazy::new(Parser::new);

/// Classify the requesting device from its user-agent string.
pub fn detect_device(user_agent: &str) -> Device {
    let Some(result) = PARSER.parse(user_agent) else {
        return Device::Unknown;
    };

    if result.category == "crawler" {
        return Device::Bot;
    }

    let os = result.os.to_lowercase();
    if os.contains("android") {
        return Device::Android;
    }
    if os.contains("iphone") || os.contains("ipad") || os.contains("ios") {
        return Device::Ios;
    }

    match result.category {
        "smartphone" | "mobilephone" => Device::Mobile,
        "pc" => Device::Desktop,
        _ => Device::Unknown,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ANDROID_UA: &str = "Mozilla/5.0 (Linux; Android 13; Pixel 7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/119.0.0.0 Mobile Safari/537.36";
    const IPHONE_UA: &str = "Mozilla/5.0 (iPhone; CPU iPhone OS 17_0 like Mac OS X) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.0 Mobile/15E148 Safari/604.1";
    const DESKTOP_UA: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/119.0.0.0 Safari/537.36";
    const BOT_UA: &str = "Mozilla/5.0 (compatible; Googlebot/2.1; +http://www.google.com/bot.html)";

    #[test]
    fn test_device_detection() {
        assert_eq!(detect_device(ANDROID_UA), Device::Android);
        assert_eq!(detect_device(IPHONE_UA), Device::Ios);
        assert_eq!(detect_device(DESKTOP_UA), Device::Desktop);
        assert_eq!(detect_device(BOT_UA), Device::Bot);
        assert_eq!(detect_device(""), Device::Unknown);
        assert_eq!(detect_device("definitely-not-a-browser"), Device::Unknown);
    }
}
