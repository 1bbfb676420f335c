//! HTTP request handlers for API endpoints.
//!
//! Each handler module corresponds to a logical grouping of endpoints.

pub mod email_checks;
pub mod health;
pub mod registrations;

pub use email_checks::email_checks_handler;
pub use health::health_handler;
pub use registrations::{
    change_email_handler, confirm_email_handler, get_registration_handler, resend_code_handler,
    start_registration_handler, step_back_handler, submit_handler, update_profile_handler,
};
