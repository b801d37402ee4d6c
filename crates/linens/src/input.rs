//! Parsing of raw form input into linen counts.

use laundry_core::{DomainError, DomainResult};

/// Parse a user-typed whole count such as `"12"`.
pub fn parse_count(raw: &str) -> DomainResult<u32> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(DomainError::validation("please enter a count"));
    }
    trimmed
        .parse::<u32>()
        .map_err(|_| DomainError::validation(format!("'{trimmed}' is not a valid count")))
}
