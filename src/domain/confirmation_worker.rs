//! Background worker delivering confirmation codes.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio_retry::Retry;
use tokio_retry::strategy::{ExponentialBackoff, jitter};

use crate::domain::confirmation_event::ConfirmationEmail;
use crate::infrastructure::notify::ConfirmationNotifier;

/// Delivery attempts per event before the event is dropped.
const MAX_ATTEMPTS: usize = 4;

/// Initial backoff between delivery attempts, in milliseconds.
const BACKOFF_BASE_MS: u64 = 200;

/// Consumes confirmation events from the channel and delivers them.
///
/// Each event is retried with jittered exponential backoff. An event that
/// still fails after [`MAX_ATTEMPTS`] is logged and dropped; the user can
/// request a fresh code through the resend endpoint.
///
/// Runs until the sending side of the channel is closed.
pub async fn run_confirmation_worker(
    mut rx: mpsc::Receiver<ConfirmationEmail>,
    notifier: Arc<dyn ConfirmationNotifier>,
) {
    while let Some(event) = rx.recv().await {
        let strategy = ExponentialBackoff::from_millis(BACKOFF_BASE_MS)
            .map(jitter)
            .take(MAX_ATTEMPTS - 1);

        let result = Retry::spawn(strategy, || {
            let notifier = notifier.clone();
            let email = event.email.clone();
            let code = event.code.clone();

            async move { notifier.send_confirmation(&email, &code).await }
        })
        .await;

        match result {
            Ok(()) => {
                tracing::debug!(
                    registration_id = event.registration_id,
                    "Confirmation code delivered"
                );
            }
            Err(e) => {
                metrics::counter!("confirmation_deliveries_failed_total").increment(1);
                tracing::warn!(
                    registration_id = event.registration_id,
                    error = %e,
                    "Dropping confirmation delivery after {MAX_ATTEMPTS} attempts"
                );
            }
        }
    }

    tracing::info!("Confirmation worker stopped: channel closed");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::notify::{NotifyError, NotifyResult};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Notifier that fails a configured number of times before succeeding.
    struct FlakyNotifier {
        failures: AtomicUsize,
        calls: AtomicUsize,
    }

    impl FlakyNotifier {
        fn new(failures: usize) -> Self {
            Self {
                failures: AtomicUsize::new(failures),
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl ConfirmationNotifier for FlakyNotifier {
        async fn send_confirmation(&self, _email: &str, _code: &str) -> NotifyResult<()> {
            self.calls.fetch_add(1, Ordering::SeqCst);

            if self.failures.load(Ordering::SeqCst) > 0 {
                self.failures.fetch_sub(1, Ordering::SeqCst);
                return Err(NotifyError::DeliveryError("transient".to_string()));
            }

            Ok(())
        }

        async fn health_check(&self) -> bool {
            true
        }
    }

    fn event() -> ConfirmationEmail {
        ConfirmationEmail {
            registration_id: 1,
            email: "user@example.com".to_string(),
            code: "123456".to_string(),
        }
    }

    #[tokio::test]
    async fn test_delivers_event() {
        let notifier = Arc::new(FlakyNotifier::new(0));
        let (tx, rx) = mpsc::channel(8);

        tx.send(event()).await.unwrap();
        drop(tx);

        run_confirmation_worker(rx, notifier.clone()).await;

        assert_eq!(notifier.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_retries_transient_failures() {
        let notifier = Arc::new(FlakyNotifier::new(2));
        let (tx, rx) = mpsc::channel(8);

        tx.send(event()).await.unwrap();
        drop(tx);

        run_confirmation_worker(rx, notifier.clone()).await;

        assert_eq!(notifier.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_gives_up_after_max_attempts() {
        let notifier = Arc::new(FlakyNotifier::new(usize::MAX));
        let (tx, rx) = mpsc::channel(8);

        tx.send(event()).await.unwrap();
        drop(tx);

        run_confirmation_worker(rx, notifier.clone()).await;

        assert_eq!(notifier.calls.load(Ordering::SeqCst), MAX_ATTEMPTS);
    }
}
