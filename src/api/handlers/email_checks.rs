//! Handler for the email checklist endpoint.

use axum::{Json, extract::State};

use crate::api::dto::email_checks::{EmailChecksRequest, EmailChecksResponse};
use crate::state::AppState;

/// Evaluates the email format rules for a candidate address.
///
/// # Endpoint
///
/// `POST /api/email/checks`
///
/// Called by the registration screen on every change of the email field; the
/// response drives the per-rule checklist next to the input.
///
/// # Request Body
///
/// ```json
/// { "email": "user@example.com" }
/// ```
///
/// # Response
///
/// ```json
/// {
///   "email": "user@example.com",
///   "checks": {
///     "contains_one_at_and_dot": true,
///     "uses_only_allowed_characters": true,
///     "has_valid_domain": true,
///     "is_fully_valid": true
///   }
/// }
/// ```
///
/// Never fails: any string, including an empty one, produces a report.
pub async fn email_checks_handler(
    State(state): State<AppState>,
    Json(payload): Json<EmailChecksRequest>,
) -> Json<EmailChecksResponse> {
    let checks = state.registration_service.email_checklist(&payload.email);

    Json(EmailChecksResponse {
        email: payload.email,
        checks,
    })
}
