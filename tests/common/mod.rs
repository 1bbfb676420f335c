#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use axum::Router;
use axum::routing::{get, patch, post};
use chrono::{DateTime, Duration, Utc};
use serde_json::json;
use tokio::sync::mpsc;

use registration_service::api::handlers::{
    change_email_handler, confirm_email_handler, email_checks_handler, get_registration_handler,
    health_handler, resend_code_handler, start_registration_handler, step_back_handler,
    submit_handler, update_profile_handler,
};
use registration_service::application::services::RegistrationService;
use registration_service::domain::confirmation_event::ConfirmationEmail;
use registration_service::domain::entities::{
    NewRegistration, ProfilePatch, Registration, RegistrationStep,
};
use registration_service::domain::repositories::RegistrationRepository;
use registration_service::domain::validation::EmailValidator;
use registration_service::error::AppError;
use registration_service::infrastructure::notify::{ConfirmationNotifier, LogNotifier};
use registration_service::state::AppState;

pub const TEST_SIGNING_SECRET: &str = "test-signing-secret";

/// Map-backed repository driving the handlers without PostgreSQL.
#[derive(Default)]
pub struct InMemoryRegistrationRepository {
    rows: Mutex<HashMap<i64, Registration>>,
    next_id: AtomicI64,
}

impl InMemoryRegistrationRepository {
    pub fn new() -> Self {
        Self {
            rows: Mutex::new(HashMap::new()),
            next_id: AtomicI64::new(1),
        }
    }

    /// Forces the issued code of a registration into the past.
    pub fn expire_code(&self, id: i64) {
        let mut rows = self.rows.lock().unwrap();
        if let Some(reg) = rows.get_mut(&id) {
            reg.code_expires_at = Some(Utc::now() - Duration::seconds(1));
        }
    }

    fn not_found(id: i64) -> AppError {
        AppError::not_found("Registration not found", json!({ "id": id }))
    }

    fn update<F>(&self, id: i64, f: F) -> Result<Registration, AppError>
    where
        F: FnOnce(&mut Registration),
    {
        let mut rows = self.rows.lock().unwrap();
        let reg = rows.get_mut(&id).ok_or_else(|| Self::not_found(id))?;

        f(reg);
        reg.updated_at = Utc::now();

        Ok(reg.clone())
    }
}

#[async_trait]
impl RegistrationRepository for InMemoryRegistrationRepository {
    async fn create(&self, new: NewRegistration) -> Result<Registration, AppError> {
        let mut rows = self.rows.lock().unwrap();

        if rows.values().any(|r| r.email == new.email) {
            return Err(AppError::conflict(
                "Unique constraint violation",
                json!({ "constraint": "registrations_email_key" }),
            ));
        }

        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let now = Utc::now();
        let reg = Registration {
            id,
            email: new.email,
            step: RegistrationStep::EmailConfirmation,
            display_name: None,
            bio: None,
            avatar_url: None,
            code_hash: Some(new.code_hash),
            code_expires_at: Some(new.code_expires_at),
            confirmed_at: None,
            completed_at: None,
            created_at: now,
            updated_at: now,
        };

        rows.insert(id, reg.clone());
        Ok(reg)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Registration>, AppError> {
        Ok(self.rows.lock().unwrap().get(&id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Registration>, AppError> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .values()
            .find(|r| r.email == email)
            .cloned())
    }

    async fn set_step(&self, id: i64, step: RegistrationStep) -> Result<Registration, AppError> {
        self.update(id, |reg| reg.step = step)
    }

    async fn set_email(
        &self,
        id: i64,
        email: &str,
        code_hash: &str,
        code_expires_at: DateTime<Utc>,
    ) -> Result<Registration, AppError> {
        self.update(id, |reg| {
            reg.email = email.to_string();
            reg.step = RegistrationStep::EmailConfirmation;
            reg.code_hash = Some(code_hash.to_string());
            reg.code_expires_at = Some(code_expires_at);
            reg.confirmed_at = None;
        })
    }

    async fn set_confirmation_code(
        &self,
        id: i64,
        code_hash: &str,
        code_expires_at: DateTime<Utc>,
    ) -> Result<Registration, AppError> {
        self.update(id, |reg| {
            reg.code_hash = Some(code_hash.to_string());
            reg.code_expires_at = Some(code_expires_at);
        })
    }

    async fn mark_confirmed(&self, id: i64) -> Result<Registration, AppError> {
        self.update(id, |reg| {
            reg.step = RegistrationStep::ProfileSetup;
            reg.confirmed_at = Some(Utc::now());
            reg.code_hash = None;
            reg.code_expires_at = None;
        })
    }

    async fn update_profile(
        &self,
        id: i64,
        patch: ProfilePatch,
    ) -> Result<Registration, AppError> {
        self.update(id, |reg| {
            if let Some(display_name) = patch.display_name {
                reg.display_name = Some(display_name);
            }
            if let Some(bio) = patch.bio {
                reg.bio = bio;
            }
            if let Some(avatar_url) = patch.avatar_url {
                reg.avatar_url = avatar_url;
            }
        })
    }

    async fn complete(&self, id: i64) -> Result<Registration, AppError> {
        self.update(id, |reg| {
            reg.step = RegistrationStep::Submitting;
            reg.completed_at = Some(Utc::now());
        })
    }

    async fn list(
        &self,
        page: i64,
        page_size: i64,
        step: Option<RegistrationStep>,
    ) -> Result<Vec<Registration>, AppError> {
        let rows = self.rows.lock().unwrap();
        let mut all: Vec<Registration> = rows
            .values()
            .filter(|r| step.is_none_or(|s| r.step == s))
            .cloned()
            .collect();

        all.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        let offset = ((page - 1) * page_size).max(0) as usize;

        Ok(all
            .into_iter()
            .skip(offset)
            .take(page_size.max(0) as usize)
            .collect())
    }

    async fn count(&self, step: Option<RegistrationStep>) -> Result<i64, AppError> {
        let rows = self.rows.lock().unwrap();

        Ok(rows
            .values()
            .filter(|r| step.is_none_or(|s| r.step == s))
            .count() as i64)
    }

    async fn delete_stale(&self, cutoff: DateTime<Utc>) -> Result<u64, AppError> {
        let mut rows = self.rows.lock().unwrap();
        let before = rows.len();

        rows.retain(|_, r| r.completed_at.is_some() || r.created_at >= cutoff);

        Ok((before - rows.len()) as u64)
    }
}

pub fn create_test_state(
    repository: Arc<InMemoryRegistrationRepository>,
) -> (AppState, mpsc::Receiver<ConfirmationEmail>) {
    let (tx, rx) = mpsc::channel(100);

    let notifier: Arc<dyn ConfirmationNotifier> = Arc::new(LogNotifier::new());
    let registration_service = Arc::new(RegistrationService::new(
        repository,
        Arc::new(EmailValidator::new()),
        tx.clone(),
        TEST_SIGNING_SECRET.to_string(),
        Duration::minutes(10),
    ));

    let state = AppState::new(registration_service, tx, notifier);

    (state, rx)
}

/// Mounts every handler without the rate-limiting layers, which require
/// socket peer information that the test server does not provide.
pub fn test_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/api/email/checks", post(email_checks_handler))
        .route("/api/registrations", post(start_registration_handler))
        .route("/api/registrations/{id}", get(get_registration_handler))
        .route(
            "/api/registrations/{id}/confirm",
            post(confirm_email_handler),
        )
        .route("/api/registrations/{id}/resend", post(resend_code_handler))
        .route("/api/registrations/{id}/email", post(change_email_handler))
        .route("/api/registrations/{id}/back", post(step_back_handler))
        .route(
            "/api/registrations/{id}/profile",
            patch(update_profile_handler),
        )
        .route("/api/registrations/{id}/submit", post(submit_handler))
        .with_state(state)
}
