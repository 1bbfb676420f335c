//! Handlers for registration wizard endpoints.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use validator::Validate;

use crate::api::dto::registration::{
    ChangeEmailRequest, ConfirmEmailRequest, RegistrationResponse, StartRegistrationRequest,
    UpdateProfileRequest,
};
use crate::error::AppError;
use crate::state::AppState;

/// Starts a registration for an email address.
///
/// # Endpoint
///
/// `POST /api/registrations`
///
/// # Request Body
///
/// ```json
/// { "email": "user@example.com" }
/// ```
///
/// # Errors
///
/// Returns 400 with the per-rule checklist in `error.details.checks` when
/// the email fails format checks, and 409 when the address is already
/// registered or confirmed.
pub async fn start_registration_handler(
    State(state): State<AppState>,
    Json(payload): Json<StartRegistrationRequest>,
) -> Result<(StatusCode, Json<RegistrationResponse>), AppError> {
    payload.validate()?;

    let registration = state.registration_service.start(payload.email).await?;

    Ok((StatusCode::CREATED, Json(registration.into())))
}

/// Returns the current wizard state of a registration.
///
/// # Endpoint
///
/// `GET /api/registrations/{id}`
pub async fn get_registration_handler(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<RegistrationResponse>, AppError> {
    let registration = state.registration_service.get(id).await?;

    Ok(Json(registration.into()))
}

/// Verifies a confirmation code and advances to profile setup.
///
/// # Endpoint
///
/// `POST /api/registrations/{id}/confirm`
///
/// # Errors
///
/// - 400 - malformed or incorrect code
/// - 409 - the registration is not awaiting confirmation
/// - 410 - the code has expired; request a new one via resend
pub async fn confirm_email_handler(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<ConfirmEmailRequest>,
) -> Result<Json<RegistrationResponse>, AppError> {
    payload.validate()?;

    let registration = state
        .registration_service
        .confirm_email(id, &payload.code)
        .await?;

    Ok(Json(registration.into()))
}

/// Issues a fresh confirmation code.
///
/// # Endpoint
///
/// `POST /api/registrations/{id}/resend`
pub async fn resend_code_handler(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<RegistrationResponse>, AppError> {
    let registration = state.registration_service.resend_code(id).await?;

    Ok(Json(registration.into()))
}

/// Replaces the email after the wizard stepped back to entry.
///
/// # Endpoint
///
/// `POST /api/registrations/{id}/email`
pub async fn change_email_handler(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<ChangeEmailRequest>,
) -> Result<Json<RegistrationResponse>, AppError> {
    payload.validate()?;

    let registration = state
        .registration_service
        .change_email(id, payload.email)
        .await?;

    Ok(Json(registration.into()))
}

/// Applies the wizard's backward transition.
///
/// # Endpoint
///
/// `POST /api/registrations/{id}/back`
///
/// # Errors
///
/// Returns 409 when the current step has no predecessor.
pub async fn step_back_handler(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<RegistrationResponse>, AppError> {
    let registration = state.registration_service.step_back(id).await?;

    Ok(Json(registration.into()))
}

/// Partially updates profile fields during profile setup.
///
/// # Endpoint
///
/// `PATCH /api/registrations/{id}/profile`
///
/// Absent fields are unchanged; an explicit `null` clears `bio` or
/// `avatar_url`.
pub async fn update_profile_handler(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateProfileRequest>,
) -> Result<Json<RegistrationResponse>, AppError> {
    payload.validate()?;

    let registration = state
        .registration_service
        .update_profile(id, payload.into())
        .await?;

    Ok(Json(registration.into()))
}

/// Submits the wizard and finalizes the registration.
///
/// # Endpoint
///
/// `POST /api/registrations/{id}/submit`
///
/// # Errors
///
/// Returns 400 when no display name has been provided, 409 when the wizard
/// is not on profile setup.
pub async fn submit_handler(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<RegistrationResponse>, AppError> {
    let registration = state.registration_service.submit(id).await?;

    Ok(Json(registration.into()))
}
