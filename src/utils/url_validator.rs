//! Destination URL validation
//!
//! Blocks dangerous schemes and anything that is not plain http/https before
//! a redirect record is created.

use url::Url;

use crate::errors::{BbError, Result};

const DANGEROUS_PROTOCOLS: &[&str] = &[
    "javascript:",
    "data:",
    "file:",
    "vbscript:",
    "about:",
    "blob:",
];

pub fn validate_dest(dest: &str) -> Result<()> {
    let dest = dest.trim();

    if dest.is_empty() {
        return Err(BbError::validation("Destination URL cannot be empty"));
    }

    let lower = dest.to_lowercase();
    for proto in DANGEROUS_PROTOCOLS {
        if lower.starts_with(proto) {
            return Err(BbError::validation(format!(
                "Blocked URL scheme: {}",
                proto
            )));
        }
    }

    if !lower.starts_with("http://") && !lower.starts_with("https://") {
        return Err(BbError::validation(
            "Destination must start with http:// or https://",
        ));
    }

    Url::parse(dest)
        .map_err(|e| BbError::validation(format!("Invalid URL format: {}", e)))?;

    Ok(())
}
