//! PostgreSQL implementation of registration repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::json;
use sqlx::PgPool;
use std::sync::Arc;

use crate::domain::entities::{NewRegistration, ProfilePatch, Registration, RegistrationStep};
use crate::domain::repositories::RegistrationRepository;
use crate::error::AppError;

/// Columns selected for every registration query.
const REGISTRATION_COLUMNS: &str = "id, email, step, display_name, bio, avatar_url, \
     code_hash, code_expires_at, confirmed_at, completed_at, created_at, updated_at";

/// PostgreSQL repository for registration storage and retrieval.
///
/// Uses SQLx prepared statements for SQL injection protection. The wizard
/// step is stored as text and parsed back into [`RegistrationStep`] on read.
pub struct PgRegistrationRepository {
    pool: Arc<PgPool>,
}

impl PgRegistrationRepository {
    /// Creates a new repository with a database connection pool.
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

/// Raw row shape as stored in PostgreSQL.
#[derive(Debug, sqlx::FromRow)]
struct RegistrationRow {
    id: i64,
    email: String,
    step: String,
    display_name: Option<String>,
    bio: Option<String>,
    avatar_url: Option<String>,
    code_hash: Option<String>,
    code_expires_at: Option<DateTime<Utc>>,
    confirmed_at: Option<DateTime<Utc>>,
    completed_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<RegistrationRow> for Registration {
    type Error = AppError;

    fn try_from(row: RegistrationRow) -> Result<Self, Self::Error> {
        let step = row.step.parse::<RegistrationStep>().map_err(|e| {
            AppError::internal("Corrupt registration row", json!({ "reason": e.to_string() }))
        })?;

        Ok(Registration {
            id: row.id,
            email: row.email,
            step,
            display_name: row.display_name,
            bio: row.bio,
            avatar_url: row.avatar_url,
            code_hash: row.code_hash,
            code_expires_at: row.code_expires_at,
            confirmed_at: row.confirmed_at,
            completed_at: row.completed_at,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[async_trait]
impl RegistrationRepository for PgRegistrationRepository {
    async fn create(&self, new: NewRegistration) -> Result<Registration, AppError> {
        let sql = format!(
            "INSERT INTO registrations (email, step, code_hash, code_expires_at)
             VALUES ($1, $2, $3, $4)
             RETURNING {REGISTRATION_COLUMNS}"
        );

        let row = sqlx::query_as::<_, RegistrationRow>(&sql)
            .bind(&new.email)
            .bind(RegistrationStep::EmailConfirmation.as_str())
            .bind(&new.code_hash)
            .bind(new.code_expires_at)
            .fetch_one(self.pool.as_ref())
            .await?;

        row.try_into()
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Registration>, AppError> {
        let sql = format!("SELECT {REGISTRATION_COLUMNS} FROM registrations WHERE id = $1");

        let row = sqlx::query_as::<_, RegistrationRow>(&sql)
            .bind(id)
            .fetch_optional(self.pool.as_ref())
            .await?;

        row.map(Registration::try_from).transpose()
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Registration>, AppError> {
        let sql = format!("SELECT {REGISTRATION_COLUMNS} FROM registrations WHERE email = $1");

        let row = sqlx::query_as::<_, RegistrationRow>(&sql)
            .bind(email)
            .fetch_optional(self.pool.as_ref())
            .await?;

        row.map(Registration::try_from).transpose()
    }

    async fn set_step(&self, id: i64, step: RegistrationStep) -> Result<Registration, AppError> {
        let sql = format!(
            "UPDATE registrations
             SET step = $2, updated_at = now()
             WHERE id = $1
             RETURNING {REGISTRATION_COLUMNS}"
        );

        let row = sqlx::query_as::<_, RegistrationRow>(&sql)
            .bind(id)
            .bind(step.as_str())
            .fetch_optional(self.pool.as_ref())
            .await?;

        row.ok_or_else(|| registration_not_found(id))?.try_into()
    }

    async fn set_email(
        &self,
        id: i64,
        email: &str,
        code_hash: &str,
        code_expires_at: DateTime<Utc>,
    ) -> Result<Registration, AppError> {
        let sql = format!(
            "UPDATE registrations
             SET email = $2,
                 step = $3,
                 code_hash = $4,
                 code_expires_at = $5,
                 confirmed_at = NULL,
                 updated_at = now()
             WHERE id = $1
             RETURNING {REGISTRATION_COLUMNS}"
        );

        let row = sqlx::query_as::<_, RegistrationRow>(&sql)
            .bind(id)
            .bind(email)
            .bind(RegistrationStep::EmailConfirmation.as_str())
            .bind(code_hash)
            .bind(code_expires_at)
            .fetch_optional(self.pool.as_ref())
            .await?;

        row.ok_or_else(|| registration_not_found(id))?.try_into()
    }

    async fn set_confirmation_code(
        &self,
        id: i64,
        code_hash: &str,
        code_expires_at: DateTime<Utc>,
    ) -> Result<Registration, AppError> {
        let sql = format!(
            "UPDATE registrations
             SET code_hash = $2, code_expires_at = $3, updated_at = now()
             WHERE id = $1
             RETURNING {REGISTRATION_COLUMNS}"
        );

        let row = sqlx::query_as::<_, RegistrationRow>(&sql)
            .bind(id)
            .bind(code_hash)
            .bind(code_expires_at)
            .fetch_optional(self.pool.as_ref())
            .await?;

        row.ok_or_else(|| registration_not_found(id))?.try_into()
    }

    async fn mark_confirmed(&self, id: i64) -> Result<Registration, AppError> {
        let sql = format!(
            "UPDATE registrations
             SET step = $2,
                 confirmed_at = now(),
                 code_hash = NULL,
                 code_expires_at = NULL,
                 updated_at = now()
             WHERE id = $1
             RETURNING {REGISTRATION_COLUMNS}"
        );

        let row = sqlx::query_as::<_, RegistrationRow>(&sql)
            .bind(id)
            .bind(RegistrationStep::ProfileSetup.as_str())
            .fetch_optional(self.pool.as_ref())
            .await?;

        row.ok_or_else(|| registration_not_found(id))?.try_into()
    }

    async fn update_profile(
        &self,
        id: i64,
        patch: ProfilePatch,
    ) -> Result<Registration, AppError> {
        // Read-modify-write: the double-option patch semantics stay in Rust.
        let current = self
            .find_by_id(id)
            .await?
            .ok_or_else(|| registration_not_found(id))?;

        let display_name = patch.display_name.or(current.display_name);
        let bio = match patch.bio {
            Some(value) => value,
            None => current.bio,
        };
        let avatar_url = match patch.avatar_url {
            Some(value) => value,
            None => current.avatar_url,
        };

        let sql = format!(
            "UPDATE registrations
             SET display_name = $2, bio = $3, avatar_url = $4, updated_at = now()
             WHERE id = $1
             RETURNING {REGISTRATION_COLUMNS}"
        );

        let row = sqlx::query_as::<_, RegistrationRow>(&sql)
            .bind(id)
            .bind(display_name)
            .bind(bio)
            .bind(avatar_url)
            .fetch_optional(self.pool.as_ref())
            .await?;

        row.ok_or_else(|| registration_not_found(id))?.try_into()
    }

    async fn complete(&self, id: i64) -> Result<Registration, AppError> {
        let sql = format!(
            "UPDATE registrations
             SET step = $2, completed_at = now(), updated_at = now()
             WHERE id = $1
             RETURNING {REGISTRATION_COLUMNS}"
        );

        let row = sqlx::query_as::<_, RegistrationRow>(&sql)
            .bind(id)
            .bind(RegistrationStep::Submitting.as_str())
            .fetch_optional(self.pool.as_ref())
            .await?;

        row.ok_or_else(|| registration_not_found(id))?.try_into()
    }

    async fn list(
        &self,
        page: i64,
        page_size: i64,
        step: Option<RegistrationStep>,
    ) -> Result<Vec<Registration>, AppError> {
        let offset = (page - 1) * page_size;

        let sql = format!(
            "SELECT {REGISTRATION_COLUMNS}
             FROM registrations
             WHERE ($1::text IS NULL OR step = $1)
             ORDER BY created_at DESC
             LIMIT $2 OFFSET $3"
        );

        let rows = sqlx::query_as::<_, RegistrationRow>(&sql)
            .bind(step.map(RegistrationStep::as_str))
            .bind(page_size)
            .bind(offset)
            .fetch_all(self.pool.as_ref())
            .await?;

        rows.into_iter().map(Registration::try_from).collect()
    }

    async fn count(&self, step: Option<RegistrationStep>) -> Result<i64, AppError> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM registrations WHERE ($1::text IS NULL OR step = $1)",
        )
        .bind(step.map(RegistrationStep::as_str))
        .fetch_one(self.pool.as_ref())
        .await?;

        Ok(count)
    }

    async fn delete_stale(&self, cutoff: DateTime<Utc>) -> Result<u64, AppError> {
        let result = sqlx::query(
            "DELETE FROM registrations WHERE completed_at IS NULL AND created_at < $1",
        )
        .bind(cutoff)
        .execute(self.pool.as_ref())
        .await?;

        Ok(result.rows_affected())
    }
}

fn registration_not_found(id: i64) -> AppError {
    AppError::not_found("Registration not found", json!({ "id": id }))
}
