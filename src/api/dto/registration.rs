//! DTOs for registration wizard endpoints.

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;
use validator::Validate;

use crate::domain::entities::{ProfilePatch, Registration, RegistrationStep};

/// Compiled regex for confirmation code shape.
static CODE_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[0-9]{6}$").unwrap());

/// Request to start a registration.
#[derive(Debug, Deserialize, Validate)]
pub struct StartRegistrationRequest {
    /// The candidate email address. Format rules are evaluated by the
    /// service; this only caps the transport size.
    #[validate(length(max = 254, message = "Email is too long"))]
    pub email: String,
}

/// Request to confirm the email with a delivered code.
#[derive(Debug, Deserialize, Validate)]
pub struct ConfirmEmailRequest {
    #[validate(regex(path = "*CODE_REGEX", message = "Code must be 6 digits"))]
    pub code: String,
}

/// Request to replace the email after stepping back to entry.
#[derive(Debug, Deserialize, Validate)]
pub struct ChangeEmailRequest {
    #[validate(length(max = 254, message = "Email is too long"))]
    pub email: String,
}

/// Partial profile update.
///
/// `display_name` uses plain option semantics (absent = unchanged). The
/// optional `bio` and `avatar_url` fields distinguish "absent" from an
/// explicit `null`, which clears the field.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateProfileRequest {
    #[validate(length(min = 1, max = 50, message = "Display name must be 1-50 characters"))]
    pub display_name: Option<String>,

    #[serde(default, with = "::serde_with::rust::double_option")]
    pub bio: Option<Option<String>>,

    #[serde(default, with = "::serde_with::rust::double_option")]
    pub avatar_url: Option<Option<String>>,
}

impl From<UpdateProfileRequest> for ProfilePatch {
    fn from(req: UpdateProfileRequest) -> Self {
        Self {
            display_name: req.display_name,
            bio: req.bio,
            avatar_url: req.avatar_url,
        }
    }
}

/// Wizard state returned by every registration endpoint.
///
/// The stored code hash never leaves the service; only the expiry is
/// exposed so clients can render a countdown.
#[derive(Debug, Serialize)]
pub struct RegistrationResponse {
    pub id: i64,
    pub email: String,
    pub step: RegistrationStep,
    pub display_name: Option<String>,
    pub bio: Option<String>,
    pub avatar_url: Option<String>,
    pub code_expires_at: Option<DateTime<Utc>>,
    pub confirmed_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl From<Registration> for RegistrationResponse {
    fn from(reg: Registration) -> Self {
        Self {
            id: reg.id,
            email: reg.email,
            step: reg.step,
            display_name: reg.display_name,
            bio: reg.bio,
            avatar_url: reg.avatar_url,
            code_expires_at: reg.code_expires_at,
            confirmed_at: reg.confirmed_at,
            completed_at: reg.completed_at,
            created_at: reg.created_at,
        }
    }
}
