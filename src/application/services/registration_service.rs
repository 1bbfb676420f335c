//! Registration wizard orchestration service.

use std::sync::Arc;

use chrono::{Duration, Utc};
use serde_json::json;
use tokio::sync::mpsc;
use url::Url;

use crate::domain::confirmation_event::ConfirmationEmail;
use crate::domain::entities::{NewRegistration, ProfilePatch, Registration, RegistrationStep};
use crate::domain::repositories::RegistrationRepository;
use crate::domain::validation::{EmailChecklist, EmailRules};
use crate::error::AppError;
use crate::utils::confirmation_code::{
    generate_confirmation_code, hash_confirmation_code, validate_code_format,
    verify_confirmation_code,
};

/// Maximum length of a profile bio.
const BIO_MAX_LEN: usize = 500;

/// Service driving a registration through the onboarding wizard.
///
/// Validates emails with the pure rule set, issues and verifies confirmation
/// codes, and enforces the wizard step machine: an operation is only applied
/// when the registration sits on the step it belongs to.
pub struct RegistrationService {
    repository: Arc<dyn RegistrationRepository>,
    rules: Arc<dyn EmailRules>,
    confirmation_tx: mpsc::Sender<ConfirmationEmail>,
    code_signing_secret: String,
    code_ttl: Duration,
}

impl RegistrationService {
    /// Creates a new registration service.
    pub fn new(
        repository: Arc<dyn RegistrationRepository>,
        rules: Arc<dyn EmailRules>,
        confirmation_tx: mpsc::Sender<ConfirmationEmail>,
        code_signing_secret: String,
        code_ttl: Duration,
    ) -> Self {
        Self {
            repository,
            rules,
            confirmation_tx,
            code_signing_secret,
            code_ttl,
        }
    }

    /// Evaluates the email format rules without touching storage.
    ///
    /// Backs the per-keystroke checklist endpoint.
    pub fn email_checklist(&self, email: &str) -> EmailChecklist {
        self.rules.check(email)
    }

    /// Starts a registration for the given email.
    ///
    /// A pending registration for the same address is restarted: a fresh
    /// code is issued and delivery re-enqueued. A confirmed-but-unfinished
    /// registration and a completed one both conflict.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] with the full per-rule checklist in
    /// `details` when the email fails format checks.
    /// Returns [`AppError::Conflict`] when the email is already taken.
    pub async fn start(&self, email: String) -> Result<Registration, AppError> {
        self.require_valid_email(&email)?;

        if let Some(existing) = self.repository.find_by_email(&email).await? {
            if existing.is_completed() {
                return Err(AppError::conflict(
                    "Email is already registered",
                    json!({ "email": email }),
                ));
            }

            if existing.is_confirmed() {
                return Err(AppError::conflict(
                    "Email is already confirmed, continue the existing registration",
                    json!({ "id": existing.id, "step": existing.step }),
                ));
            }

            // Restart: re-issue the code and normalize the wizard back to
            // the confirmation step, wherever the pending entry was left.
            let (code, hash) = self.issue_code(&existing.email);
            let registration = self
                .repository
                .set_email(existing.id, &existing.email, &hash, Utc::now() + self.code_ttl)
                .await?;

            self.enqueue_delivery(&registration, code);

            return Ok(registration);
        }

        let (code, hash) = self.issue_code(&email);
        let registration = self
            .repository
            .create(NewRegistration {
                email,
                code_hash: hash,
                code_expires_at: Utc::now() + self.code_ttl,
            })
            .await?;

        metrics::counter!("registrations_started_total").increment(1);
        tracing::info!(id = registration.id, "Registration started");

        self.enqueue_delivery(&registration, code);

        Ok(registration)
    }

    /// Fetches a registration by id.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if no registration matches `id`.
    pub async fn get(&self, id: i64) -> Result<Registration, AppError> {
        self.repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found("Registration not found", json!({ "id": id })))
    }

    /// Verifies a submitted confirmation code and advances the wizard.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Conflict`] when the registration is not awaiting
    /// confirmation, [`AppError::Gone`] when the code has expired, and
    /// [`AppError::Validation`] when the code is malformed or wrong.
    pub async fn confirm_email(&self, id: i64, code: &str) -> Result<Registration, AppError> {
        validate_code_format(code)?;

        let registration = self.get(id).await?;
        require_step(&registration, RegistrationStep::EmailConfirmation)?;

        let (Some(stored_hash), Some(expires_at)) =
            (&registration.code_hash, registration.code_expires_at)
        else {
            return Err(AppError::conflict(
                "No confirmation code has been issued",
                json!({ "id": id }),
            ));
        };

        if Utc::now() >= expires_at {
            return Err(AppError::gone(
                "Confirmation code has expired, request a new one",
                json!({ "expired_at": expires_at }),
            ));
        }

        if !verify_confirmation_code(
            &self.code_signing_secret,
            &registration.email,
            code,
            stored_hash,
        ) {
            return Err(AppError::bad_request(
                "Incorrect confirmation code",
                json!({}),
            ));
        }

        let registration = self.repository.mark_confirmed(id).await?;

        metrics::counter!("emails_confirmed_total").increment(1);
        tracing::info!(id, "Email confirmed");

        Ok(registration)
    }

    /// Issues a fresh confirmation code and re-enqueues delivery.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Conflict`] when the registration is not awaiting
    /// confirmation.
    pub async fn resend_code(&self, id: i64) -> Result<Registration, AppError> {
        let registration = self.get(id).await?;
        require_step(&registration, RegistrationStep::EmailConfirmation)?;

        let (code, hash) = self.issue_code(&registration.email);
        let registration = self
            .repository
            .set_confirmation_code(id, &hash, Utc::now() + self.code_ttl)
            .await?;

        self.enqueue_delivery(&registration, code);

        Ok(registration)
    }

    /// Replaces the email address after the wizard stepped back to entry.
    ///
    /// Re-validates the new address, re-issues the code, and moves the
    /// registration forward to the confirmation step.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] with the checklist when the email
    /// fails format checks, and [`AppError::Conflict`] when the address
    /// belongs to a different registration or the wizard is not on the
    /// email-entry step.
    pub async fn change_email(&self, id: i64, email: String) -> Result<Registration, AppError> {
        self.require_valid_email(&email)?;

        let registration = self.get(id).await?;
        require_step(&registration, RegistrationStep::EmailEntry)?;

        if let Some(other) = self.repository.find_by_email(&email).await? {
            if other.id != id {
                return Err(AppError::conflict(
                    "Email is already registered",
                    json!({ "email": email }),
                ));
            }
        }

        let (code, hash) = self.issue_code(&email);
        let registration = self
            .repository
            .set_email(id, &email, &hash, Utc::now() + self.code_ttl)
            .await?;

        self.enqueue_delivery(&registration, code);

        Ok(registration)
    }

    /// Applies the wizard's backward transition.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Conflict`] when the current step has no
    /// predecessor (email entry and the terminal submitting step).
    pub async fn step_back(&self, id: i64) -> Result<Registration, AppError> {
        let registration = self.get(id).await?;
        let previous = registration.step.prev();

        if previous == registration.step {
            return Err(AppError::conflict(
                "Cannot step back from the current step",
                json!({ "step": registration.step }),
            ));
        }

        self.repository.set_step(id, previous).await
    }

    /// Partially updates profile fields while on the profile-setup step.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Conflict`] when the wizard is not on profile
    /// setup, and [`AppError::Validation`] for an over-long bio or a
    /// malformed avatar URL.
    pub async fn update_profile(
        &self,
        id: i64,
        patch: ProfilePatch,
    ) -> Result<Registration, AppError> {
        let registration = self.get(id).await?;
        require_step(&registration, RegistrationStep::ProfileSetup)?;

        if let Some(Some(bio)) = &patch.bio {
            if bio.chars().count() > BIO_MAX_LEN {
                return Err(AppError::bad_request(
                    "Bio is too long",
                    json!({ "max_length": BIO_MAX_LEN }),
                ));
            }
        }

        if let Some(Some(avatar_url)) = &patch.avatar_url {
            let parsed = Url::parse(avatar_url).map_err(|e| {
                AppError::bad_request(
                    "Invalid avatar URL",
                    json!({ "reason": e.to_string() }),
                )
            })?;

            if !matches!(parsed.scheme(), "http" | "https") {
                return Err(AppError::bad_request(
                    "Avatar URL must use http or https",
                    json!({ "scheme": parsed.scheme() }),
                ));
            }
        }

        self.repository.update_profile(id, patch).await
    }

    /// Submits the wizard: requires a display name, then finalizes.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Conflict`] when the wizard is not on profile
    /// setup, and [`AppError::Validation`] when no display name has been
    /// provided.
    pub async fn submit(&self, id: i64) -> Result<Registration, AppError> {
        let registration = self.get(id).await?;
        require_step(&registration, RegistrationStep::ProfileSetup)?;

        if registration
            .display_name
            .as_deref()
            .is_none_or(|name| name.trim().is_empty())
        {
            return Err(AppError::bad_request(
                "Display name is required before submitting",
                json!({}),
            ));
        }

        let registration = self.repository.complete(id).await?;

        metrics::counter!("registrations_completed_total").increment(1);
        tracing::info!(id, "Registration completed");

        Ok(registration)
    }

    /// Counts registrations, optionally filtered by step.
    pub async fn count(&self, step: Option<RegistrationStep>) -> Result<i64, AppError> {
        self.repository.count(step).await
    }

    fn require_valid_email(&self, email: &str) -> Result<(), AppError> {
        let checklist = self.rules.check(email);

        if !checklist.is_fully_valid {
            return Err(AppError::bad_request(
                "Email failed format checks",
                json!({ "checks": checklist }),
            ));
        }

        Ok(())
    }

    fn issue_code(&self, email: &str) -> (String, String) {
        let code = generate_confirmation_code();
        let hash = hash_confirmation_code(&self.code_signing_secret, email, &code);

        (code, hash)
    }

    fn enqueue_delivery(&self, registration: &Registration, code: String) {
        let event = ConfirmationEmail {
            registration_id: registration.id,
            email: registration.email.clone(),
            code,
        };

        if let Err(e) = self.confirmation_tx.try_send(event) {
            metrics::counter!("confirmation_deliveries_dropped_total").increment(1);
            tracing::warn!(
                id = registration.id,
                error = %e,
                "Confirmation delivery queue full, dropping event"
            );
        }
    }
}

fn require_step(registration: &Registration, expected: RegistrationStep) -> Result<(), AppError> {
    if registration.step != expected {
        return Err(AppError::conflict(
            "Operation does not apply to the current wizard step",
            json!({ "expected": expected, "actual": registration.step }),
        ));
    }

    Ok(())
}
