//! Confirmation code generation, hashing, and verification.
//!
//! Codes are short numeric strings typed by the user from their inbox. Only
//! a keyed HMAC-SHA256 hash of the code is persisted; verification recomputes
//! the MAC and compares in constant time. The MAC input includes the email
//! address, so a code issued for one address cannot confirm another.

use hmac::{Hmac, Mac};
use serde_json::json;
use sha2::Sha256;

use crate::error::AppError;

type HmacSha256 = Hmac<Sha256>;

/// Number of digits in a confirmation code.
pub const CODE_LENGTH: usize = 6;

/// Generates a random numeric confirmation code.
///
/// Uses `getrandom` for entropy; the result is zero-padded to
/// [`CODE_LENGTH`] digits.
///
/// # Panics
///
/// Panics if the system random number generator fails (extremely rare).
pub fn generate_confirmation_code() -> String {
    let mut buffer = [0u8; 4];

    getrandom::fill(&mut buffer).expect("Failed to generate random bytes");

    let n = u32::from_le_bytes(buffer) % 1_000_000;
    format!("{n:06}")
}

/// Computes the hex-encoded keyed hash stored for an issued code.
pub fn hash_confirmation_code(secret: &str, email: &str, code: &str) -> String {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .expect("HMAC accepts keys of any length");

    mac.update(email.as_bytes());
    mac.update(b":");
    mac.update(code.as_bytes());

    hex::encode(mac.finalize().into_bytes())
}

/// Verifies a submitted code against the stored hash in constant time.
///
/// Returns `false` for malformed stored hashes rather than erroring: a
/// corrupt hash can only ever fail verification.
pub fn verify_confirmation_code(secret: &str, email: &str, code: &str, stored_hash: &str) -> bool {
    let Ok(expected) = hex::decode(stored_hash) else {
        return false;
    };

    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .expect("HMAC accepts keys of any length");

    mac.update(email.as_bytes());
    mac.update(b":");
    mac.update(code.as_bytes());

    mac.verify_slice(&expected).is_ok()
}

/// Validates the shape of a user-submitted code.
///
/// # Rules
///
/// - Exactly [`CODE_LENGTH`] characters
/// - ASCII digits only
///
/// # Errors
///
/// Returns [`AppError::Validation`] if the shape is wrong.
pub fn validate_code_format(code: &str) -> Result<(), AppError> {
    if code.len() != CODE_LENGTH {
        return Err(AppError::bad_request(
            "Confirmation code must be 6 digits",
            json!({ "provided_length": code.len() }),
        ));
    }

    if !code.chars().all(|c| c.is_ascii_digit()) {
        return Err(AppError::bad_request(
            "Confirmation code can only contain digits",
            json!({}),
        ));
    }

    Ok(())
}
