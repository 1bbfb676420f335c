//! Shared application state injected into HTTP handlers.

use std::sync::Arc;

use tokio::sync::mpsc;

use crate::application::services::RegistrationService;
use crate::domain::confirmation_event::ConfirmationEmail;
use crate::infrastructure::notify::ConfirmationNotifier;

/// State shared by every handler.
///
/// Cheap to clone: all members are `Arc`s or channel handles.
#[derive(Clone)]
pub struct AppState {
    pub registration_service: Arc<RegistrationService>,
    pub confirmation_tx: mpsc::Sender<ConfirmationEmail>,
    pub notifier: Arc<dyn ConfirmationNotifier>,
}

impl AppState {
    /// Creates the application state.
    pub fn new(
        registration_service: Arc<RegistrationService>,
        confirmation_tx: mpsc::Sender<ConfirmationEmail>,
        notifier: Arc<dyn ConfirmationNotifier>,
    ) -> Self {
        Self {
            registration_service,
            confirmation_tx,
            notifier,
        }
    }
}
