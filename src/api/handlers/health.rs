//! Handler for health check endpoint.

use axum::{Json, extract::State, http::StatusCode};

use crate::api::dto::health::{CheckStatus, HealthChecks, HealthResponse};
use crate::state::AppState;

/// Returns service health status with component checks.
///
/// # Endpoint
///
/// `GET /health`
///
/// # Response Codes
///
/// - **200 OK**: All components healthy
/// - **503 Service Unavailable**: One or more components degraded
///
/// # Components Checked
///
/// 1. **Database**: Runs a registration count query
/// 2. **Confirmation Queue**: Checks if the channel is open and reports capacity
/// 3. **Notifier**: Asks the delivery backend for reachability
pub async fn health_handler(
    State(state): State<AppState>,
) -> Result<Json<HealthResponse>, (StatusCode, Json<HealthResponse>)> {
    let db_check = check_database(&state).await;

    let queue_check = check_confirmation_queue(&state);

    let notifier_check = check_notifier(&state).await;

    let all_healthy =
        db_check.status == "ok" && queue_check.status == "ok" && notifier_check.status == "ok";

    let response = HealthResponse {
        status: if all_healthy { "healthy" } else { "degraded" }.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        checks: HealthChecks {
            database: db_check,
            confirmation_queue: queue_check,
            notifier: notifier_check,
        },
    };

    if all_healthy {
        Ok(Json(response))
    } else {
        Err((StatusCode::SERVICE_UNAVAILABLE, Json(response)))
    }
}

/// Checks database connectivity by counting registrations.
async fn check_database(state: &AppState) -> CheckStatus {
    match state.registration_service.count(None).await {
        Ok(total) => CheckStatus {
            status: "ok".to_string(),
            message: Some(format!("Connected, {} registrations", total)),
        },
        Err(e) => CheckStatus {
            status: "error".to_string(),
            message: Some(format!("Database error: {}", e)),
        },
    }
}

/// Checks if the confirmation delivery queue is operational.
fn check_confirmation_queue(state: &AppState) -> CheckStatus {
    if state.confirmation_tx.is_closed() {
        CheckStatus {
            status: "error".to_string(),
            message: Some("Confirmation queue is closed".to_string()),
        }
    } else {
        CheckStatus {
            status: "ok".to_string(),
            message: Some(format!("Capacity: {}", state.confirmation_tx.capacity())),
        }
    }
}

/// Checks the confirmation delivery backend.
async fn check_notifier(state: &AppState) -> CheckStatus {
    if state.notifier.health_check().await {
        CheckStatus {
            status: "ok".to_string(),
            message: None,
        }
    } else {
        CheckStatus {
            status: "error".to_string(),
            message: Some("Notifier unreachable".to_string()),
        }
    }
}
