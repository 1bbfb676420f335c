//! Domain layer containing business entities and logic.
//!
//! This module implements the core domain logic following Clean Architecture
//! principles. It defines entities, validation rules, repository interfaces,
//! and the confirmation-delivery worker independent of infrastructure
//! concerns.
//!
//! # Architecture
//!
//! - [`entities`] - Core business data structures and the wizard step machine
//! - [`validation`] - Pure email format rules
//! - [`repositories`] - Data access trait definitions
//! - [`confirmation_event`] - Confirmation delivery event model
//! - [`confirmation_worker`] - Asynchronous delivery worker with retry
//!
//! # Design Principles
//!
//! - Domain layer has no dependencies on infrastructure or presentation layers
//! - Repository traits define contracts implemented by infrastructure layer
//! - Business logic is encapsulated in services (see [`crate::application::services`])
//!
//! # Confirmation Delivery Flow
//!
//! 1. [`crate::application::services::RegistrationService`] issues a code
//! 2. [`confirmation_event::ConfirmationEmail`] is sent to an async channel
//! 3. [`confirmation_worker::run_confirmation_worker`] delivers events with
//!    retry and backoff
//! 4. Delivery goes through [`crate::infrastructure::notify::ConfirmationNotifier`]

pub mod confirmation_event;
pub mod confirmation_worker;
pub mod entities;
pub mod repositories;
pub mod validation;
