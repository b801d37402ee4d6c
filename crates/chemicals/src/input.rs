//! Parsing of raw form input into ledger quantities.

use core::str::FromStr;

use laundry_core::{DomainError, DomainResult};
use rust_decimal::Decimal;

/// Parse a user-typed quantity such as `"2.5"`.
///
/// Blank, non-numeric and negative input is a validation error. Whether zero
/// is acceptable depends on the operation and is checked there.
pub fn parse_quantity(raw: &str) -> DomainResult<Decimal> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(DomainError::validation("please enter a quantity"));
    }
    let value = Decimal::from_str(trimmed)
        .map_err(|_| DomainError::validation(format!("'{trimmed}' is not a valid number")))?;
    if value < Decimal::ZERO {
        return Err(DomainError::validation("quantity cannot be negative"));
    }
    Ok(value.normalize())
}
