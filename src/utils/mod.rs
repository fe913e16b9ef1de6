pub mod affiliate;
pub mod ip;
pub mod time_parser;
pub mod ua;
pub mod url_validator;

pub use time_parser::TimeParser;

const BASE36: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Random lowercase base36 short key.
pub fn generate_key(length: usize) -> String {
    std::iter::repeat_with(|| BASE36[rand::random_range(0..BASE36.len())] as char)
        .take(length)
        .collect()
}

/// Click identifier: millisecond timestamp in base36 plus 6 random base36
/// chars. Not cryptographically unique; collisions are improbable enough for
/// tracking purposes.
pub fn generate_click_id() -> String {
    let millis = chrono::Utc::now().timestamp_millis().max(0) as u64;
    let mut id = to_base36(millis);
    id.extend(
        std::iter::repeat_with(|| BASE36[rand::random_range(0..BASE36.len())] as char).take(6),
    );
    id
}

fn to_base36(mut n: u64) -> String {
    if n == 0 {
        return "0".to_string();
    }
    let mut digits = Vec::new();
    while n > 0 {
        digits.push(BASE36[(n % 36) as usize]);
        n /= 36;
    }
    digits.reverse();
    String::from_utf8(digits).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_key_charset_and_length() {
        for _ in 0..50 {
            let key = generate_key(6);
            assert_eq!(key.len(), 6);
            assert!(key.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit()));
        }
    }

    #[test]
    fn test_to_base36() {
        assert_eq!(to_base36(0), "0");
        assert_eq!(to_base36(35), "z");
        assert_eq!(to_base36(36), "10");
        assert_eq!(to_base36(36 * 36 + 1), "101");
    }

    #[test]
    fn test_click_id_shape() {
        let id = generate_click_id();
        assert!(id.len() > 6);
        assert!(id.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit()));
    }
}
