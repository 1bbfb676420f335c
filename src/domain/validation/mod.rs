//! Pure validation rules for user-supplied registration input.

pub mod email;

pub use email::{EmailChecklist, EmailRules, EmailValidator};
