//! Expiry time parsing
//!
//! Accepts RFC3339 timestamps and relative durations like `30d`, `2w` or
//! combined forms like `1d12h`.

use chrono::{DateTime, Duration, Utc};

use crate::errors::{BbError, Result};

pub struct TimeParser;

impl TimeParser {
    /// Parse an expiry expression into an absolute UTC timestamp.
    pub fn parse_expire_time(input: &str) -> Result<DateTime<Utc>> {
        let input = input.trim();

        if let Ok(dt) = DateTime::parse_from_rfc3339(input) {
            return Ok(dt.with_timezone(&Utc));
        }

        Self::parse_relative_time(input)
    }

    fn parse_relative_time(input: &str) -> Result<DateTime<Utc>> {
        let mut total = Duration::zero();
        let mut remaining = input;

        while !remaining.is_empty() {
            let digits: String = remaining.chars().take_while(|c| c.is_ascii_digit()).collect();
            if digits.is_empty() {
                return Err(BbError::date_parse(format!(
                    "Invalid time expression: '{}'",
                    input
                )));
            }
            remaining = &remaining[digits.len()..];

            let num: i64 = digits
                .parse()
                .map_err(|_| BbError::date_parse(format!("Invalid number: '{}'", digits)))?;

            let unit: String = remaining
                .chars()
                .take_while(|c| c.is_alphabetic())
                .collect();
            if unit.is_empty() {
                return Err(BbError::date_parse(format!(
                    "Missing time unit after '{}'",
                    num
                )));
            }
            remaining = &remaining[unit.len()..];

            let duration = match unit.to_lowercase().as_str() {
                "s" | "sec" | "second" | "seconds" => Duration::seconds(num),
                "m" | "min" | "minute" | "minutes" => Duration::minutes(num),
                "h" | "hour" | "hours" => Duration::hours(num),
                "d" | "day" | "days" => Duration::days(num),
                "w" | "week" | "weeks" => Duration::weeks(num),
                "y" | "year" | "years" => Duration::days(num * 365),
                _ => {
                    return Err(BbError::date_parse(format!(
                        "Unsupported time unit: '{}'",
                        unit
                    )))
                }
            };

            total += duration;
        }

        if total == Duration::zero() {
            return Err(BbError::date_parse("Time interval cannot be zero"));
        }

        Utc::now()
            .checked_add_signed(total)
            .ok_or_else(|| BbError::date_parse("Computed expiry is out of range"))
    }
}
