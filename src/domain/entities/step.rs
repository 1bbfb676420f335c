//! Wizard step machine for the registration flow.

use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/// Position of a registration in the onboarding wizard.
///
/// Transitions are pure: [`next`](Self::next) and [`prev`](Self::prev) return
/// the following/preceding step without touching any state. `Submitting` is
/// terminal; `EmailEntry` has no predecessor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RegistrationStep {
    /// The user is entering (or re-entering) their email address.
    EmailEntry,
    /// A confirmation code has been issued and awaits verification.
    EmailConfirmation,
    /// The email is confirmed; profile fields are being filled in.
    ProfileSetup,
    /// The profile was submitted; the registration is finalized.
    Submitting,
}

impl RegistrationStep {
    /// The step reached by the wizard's forward transition.
    ///
    /// `Submitting` maps to itself.
    pub fn next(self) -> Self {
        match self {
            Self::EmailEntry => Self::EmailConfirmation,
            Self::EmailConfirmation => Self::ProfileSetup,
            Self::ProfileSetup => Self::Submitting,
            Self::Submitting => Self::Submitting,
        }
    }

    /// The step reached by the wizard's backward transition.
    ///
    /// `EmailEntry` and `Submitting` map to themselves.
    pub fn prev(self) -> Self {
        match self {
            Self::EmailEntry => Self::EmailEntry,
            Self::EmailConfirmation => Self::EmailEntry,
            Self::ProfileSetup => Self::EmailConfirmation,
            Self::Submitting => Self::Submitting,
        }
    }

    /// Stable identifier used for storage and JSON.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::EmailEntry => "email_entry",
            Self::EmailConfirmation => "email_confirmation",
            Self::ProfileSetup => "profile_setup",
            Self::Submitting => "submitting",
        }
    }
}

impl fmt::Display for RegistrationStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RegistrationStep {
    type Err = UnknownStep;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "email_entry" => Ok(Self::EmailEntry),
            "email_confirmation" => Ok(Self::EmailConfirmation),
            "profile_setup" => Ok(Self::ProfileSetup),
            "submitting" => Ok(Self::Submitting),
            other => Err(UnknownStep(other.to_string())),
        }
    }
}

/// Error returned when a stored step value does not match any known step.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown registration step: {0}")]
pub struct UnknownStep(pub String);
