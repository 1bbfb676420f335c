//! Repository trait for registration data access.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::entities::{NewRegistration, ProfilePatch, Registration, RegistrationStep};
use crate::error::AppError;

/// Repository interface for managing registrations.
///
/// Provides lifecycle operations for the onboarding wizard: creation,
/// confirmation-code bookkeeping, step transitions, profile updates, and
/// maintenance queries for the admin tooling.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::PgRegistrationRepository`] - PostgreSQL implementation
/// - In-memory implementation in the `tests/` integration suite
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RegistrationRepository: Send + Sync {
    /// Creates a new registration in the email-confirmation step.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Conflict`] if the email is already registered.
    /// Returns [`AppError::Internal`] on database errors.
    async fn create(&self, new: NewRegistration) -> Result<Registration, AppError>;

    /// Finds a registration by its id.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn find_by_id(&self, id: i64) -> Result<Option<Registration>, AppError>;

    /// Finds a registration by its email address.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn find_by_email(&self, email: &str) -> Result<Option<Registration>, AppError>;

    /// Moves a registration to the given wizard step.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if no registration matches `id`.
    /// Returns [`AppError::Internal`] on database errors.
    async fn set_step(&self, id: i64, step: RegistrationStep) -> Result<Registration, AppError>;

    /// Replaces the email address and issued code, returning the
    /// registration to the email-confirmation step with `confirmed_at`
    /// cleared.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if no registration matches `id`.
    /// Returns [`AppError::Conflict`] if the email belongs to another registration.
    /// Returns [`AppError::Internal`] on database errors.
    async fn set_email(
        &self,
        id: i64,
        email: &str,
        code_hash: &str,
        code_expires_at: DateTime<Utc>,
    ) -> Result<Registration, AppError>;

    /// Stores a freshly issued confirmation code hash and its expiry.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if no registration matches `id`.
    /// Returns [`AppError::Internal`] on database errors.
    async fn set_confirmation_code(
        &self,
        id: i64,
        code_hash: &str,
        code_expires_at: DateTime<Utc>,
    ) -> Result<Registration, AppError>;

    /// Records a successful confirmation: sets `confirmed_at`, clears the
    /// stored code, and advances to the profile-setup step.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if no registration matches `id`.
    /// Returns [`AppError::Internal`] on database errors.
    async fn mark_confirmed(&self, id: i64) -> Result<Registration, AppError>;

    /// Partially updates profile fields.
    ///
    /// Only fields present in [`ProfilePatch`] are modified. `None` fields
    /// are unchanged; `Some(None)` clears an optional field.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if no registration matches `id`.
    /// Returns [`AppError::Internal`] on database errors.
    async fn update_profile(&self, id: i64, patch: ProfilePatch)
    -> Result<Registration, AppError>;

    /// Finalizes a registration: sets `completed_at` and advances to the
    /// submitting step.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if no registration matches `id`.
    /// Returns [`AppError::Internal`] on database errors.
    async fn complete(&self, id: i64) -> Result<Registration, AppError>;

    /// Lists registrations with pagination, newest first.
    ///
    /// # Arguments
    ///
    /// - `page` - Page number (1-indexed)
    /// - `page_size` - Number of items per page
    /// - `step` - Optional wizard step filter
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn list(
        &self,
        page: i64,
        page_size: i64,
        step: Option<RegistrationStep>,
    ) -> Result<Vec<Registration>, AppError>;

    /// Counts registrations, optionally filtered by wizard step.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn count(&self, step: Option<RegistrationStep>) -> Result<i64, AppError>;

    /// Deletes unfinished registrations created before `cutoff`.
    ///
    /// Returns the number of rows removed. Completed registrations are never
    /// touched.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn delete_stale(&self, cutoff: DateTime<Utc>) -> Result<u64, AppError>;
}
