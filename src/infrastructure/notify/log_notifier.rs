//! Log-backed confirmation delivery.

use async_trait::async_trait;
use tracing::info;

use super::service::{ConfirmationNotifier, NotifyResult};

/// A notifier that writes deliveries to the structured log instead of
/// sending mail.
///
/// # Use Cases
///
/// - Development environments without a mail provider
/// - Integration tests asserting on the delivery pipeline
/// - Deployments where delivery is handled by an external log shipper
pub struct LogNotifier;

impl LogNotifier {
    /// Creates a new LogNotifier instance.
    pub fn new() -> Self {
        tracing::debug!("Using LogNotifier (confirmation codes go to the log)");
        Self
    }
}

impl Default for LogNotifier {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ConfirmationNotifier for LogNotifier {
    async fn send_confirmation(&self, email: &str, code: &str) -> NotifyResult<()> {
        info!(email, code, "Confirmation code issued");
        Ok(())
    }

    async fn health_check(&self) -> bool {
        true
    }
}
