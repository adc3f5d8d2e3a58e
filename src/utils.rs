//! Utility functions for identifier generation

use bech32::Bech32m;
use uuid7::uuid7;

use crate::error::{CoreError, IdError};

/// Human-readable prefix for ride identifiers.
pub const RIDE_HRP: &str = "ride_";
/// Human-readable prefix for user identifiers.
pub const USER_HRP: &str = "user_";

// construct a unique, time-ordered id then encode using bech32m
pub fn new_uuid_to_bech32(hrp: &str) -> Result<String, IdError> {
    let hrp = bech32::Hrp::parse(hrp)?;
    let encode = bech32::encode::<Bech32m>(hrp, uuid7().as_bytes())?;
    Ok(encode)
}

/// Reject blank input. The value is kept as given.
pub fn required(field: &str, value: &str) -> Result<String, CoreError> {
    if value.trim().is_empty() {
        return Err(CoreError::Validation(format!("{field} is required")));
    }
    Ok(value.to_string())
}
