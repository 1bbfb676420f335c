//! DTOs for the email checklist endpoint.

use serde::{Deserialize, Serialize};

use crate::domain::validation::EmailChecklist;

/// Request carrying a candidate email address.
///
/// Deliberately unvalidated: the checklist endpoint is the validation, and
/// every string — empty, oversized, or full of control characters — yields a
/// well-defined report.
#[derive(Debug, Deserialize)]
pub struct EmailChecksRequest {
    pub email: String,
}

/// Per-rule evaluation report for the submitted address.
#[derive(Debug, Serialize)]
pub struct EmailChecksResponse {
    pub email: String,
    pub checks: EmailChecklist,
}
