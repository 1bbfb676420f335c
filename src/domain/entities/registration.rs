//! Registration entity tracking one user's progress through onboarding.

use chrono::{DateTime, Utc};

use crate::domain::entities::RegistrationStep;

/// A registration in progress (or completed).
///
/// `code_hash` holds only the keyed hash of the most recently issued
/// confirmation code; the plaintext code exists transiently in the delivery
/// pipeline and is never stored.
#[derive(Debug, Clone)]
pub struct Registration {
    pub id: i64,
    pub email: String,
    pub step: RegistrationStep,
    pub display_name: Option<String>,
    pub bio: Option<String>,
    pub avatar_url: Option<String>,
    pub code_hash: Option<String>,
    pub code_expires_at: Option<DateTime<Utc>>,
    pub confirmed_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Registration {
    /// Returns true once the email address has been confirmed.
    pub fn is_confirmed(&self) -> bool {
        self.confirmed_at.is_some()
    }

    /// Returns true once the wizard has been submitted.
    pub fn is_completed(&self) -> bool {
        self.completed_at.is_some()
    }

    /// Returns true if the issued confirmation code has passed its expiry.
    ///
    /// A registration without an issued code is not considered expired.
    pub fn code_expired(&self) -> bool {
        self.code_expires_at.is_some_and(|e| Utc::now() >= e)
    }
}

/// Input data for creating a new registration.
///
/// New registrations start in [`RegistrationStep::EmailConfirmation`] with a
/// confirmation code already issued.
#[derive(Debug, Clone)]
pub struct NewRegistration {
    pub email: String,
    pub code_hash: String,
    pub code_expires_at: DateTime<Utc>,
}

/// Partial update for profile fields.
///
/// `None` fields are left unchanged.
/// `bio: Some(None)` clears the bio; `Some(Some(text))` sets it. The same
/// double-option convention applies to `avatar_url`.
#[derive(Debug, Clone, Default)]
pub struct ProfilePatch {
    pub display_name: Option<String>,
    pub bio: Option<Option<String>>,
    pub avatar_url: Option<Option<String>>,
}
