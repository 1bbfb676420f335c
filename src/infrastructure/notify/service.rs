//! Confirmation delivery trait and error types.

use async_trait::async_trait;
use std::fmt;

/// Errors that can occur while delivering a confirmation code.
#[derive(Debug)]
pub enum NotifyError {
    ConnectionError(String),
    DeliveryError(String),
}

impl fmt::Display for NotifyError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::ConnectionError(e) => write!(f, "Notifier connection error: {}", e),
            Self::DeliveryError(e) => write!(f, "Notifier delivery error: {}", e),
        }
    }
}

impl std::error::Error for NotifyError {}

/// Result type for delivery operations.
pub type NotifyResult<T> = Result<T, NotifyError>;

/// Trait for delivering confirmation codes to an email address.
///
/// Implementations must be thread-safe. Delivery failures are retried by the
/// confirmation worker, so implementations should return errors rather than
/// retrying internally.
///
/// # Implementations
///
/// - [`crate::infrastructure::notify::LogNotifier`] - Records deliveries in
///   the structured log (development and test environments)
#[async_trait]
pub trait ConfirmationNotifier: Send + Sync {
    /// Delivers a confirmation code to the given address.
    ///
    /// # Errors
    ///
    /// Returns [`NotifyError`] when the delivery cannot be handed off; the
    /// caller decides whether to retry.
    async fn send_confirmation(&self, email: &str, code: &str) -> NotifyResult<()>;

    /// Checks if the delivery backend is reachable.
    ///
    /// Used by health check endpoints to report notifier status.
    async fn health_check(&self) -> bool;
}
