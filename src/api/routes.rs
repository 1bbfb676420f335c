//! API route configuration.

use crate::api::handlers::{
    change_email_handler, confirm_email_handler, email_checks_handler, get_registration_handler,
    resend_code_handler, start_registration_handler, step_back_handler, submit_handler,
    update_profile_handler,
};
use crate::api::middleware::rate_limit;
use crate::state::AppState;
use axum::{
    Router,
    routing::{get, patch, post},
};

/// All registration API routes.
///
/// # Endpoints
///
/// - `POST  /email/checks`               - Per-rule email format checklist
/// - `POST  /registrations`              - Start a registration
/// - `GET   /registrations/{id}`         - Current wizard state
/// - `POST  /registrations/{id}/confirm` - Verify the confirmation code
/// - `POST  /registrations/{id}/resend`  - Issue a fresh code
/// - `POST  /registrations/{id}/email`   - Replace the email after stepping back
/// - `POST  /registrations/{id}/back`    - Wizard backward transition
/// - `PATCH /registrations/{id}/profile` - Partial profile update
/// - `POST  /registrations/{id}/submit`  - Finalize the registration
///
/// Code verification endpoints carry a stricter rate limit than the rest of
/// the API.
pub fn routes() -> Router<AppState> {
    let confirmation = Router::new()
        .route("/registrations/{id}/confirm", post(confirm_email_handler))
        .route("/registrations/{id}/resend", post(resend_code_handler))
        .layer(rate_limit::secure_layer());

    Router::new()
        .route("/email/checks", post(email_checks_handler))
        .route("/registrations", post(start_registration_handler))
        .route("/registrations/{id}", get(get_registration_handler))
        .route("/registrations/{id}/email", post(change_email_handler))
        .route("/registrations/{id}/back", post(step_back_handler))
        .route(
            "/registrations/{id}/profile",
            patch(update_profile_handler),
        )
        .route("/registrations/{id}/submit", post(submit_handler))
        .merge(confirmation)
}
