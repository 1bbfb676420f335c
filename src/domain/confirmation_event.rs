//! Event emitted when a confirmation code must be delivered.

/// A confirmation code delivery request.
///
/// Carries the plaintext code from issuance to the delivery worker. The code
/// exists only in this event and in the outgoing message; storage keeps the
/// keyed hash.
#[derive(Debug, Clone)]
pub struct ConfirmationEmail {
    pub registration_id: i64,
    pub email: String,
    pub code: String,
}
