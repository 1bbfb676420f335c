//! Repository trait definitions for the domain layer.
//!
//! This module defines the repository interfaces (traits) that abstract data
//! access operations following the Repository pattern. These traits are
//! implemented by concrete repositories in the infrastructure layer.
//!
//! # Architecture
//!
//! - Traits define the contract for data operations
//! - Implementations live in `crate::infrastructure::persistence`
//! - Mock implementations are auto-generated via `mockall` for testing
//!
//! # Available Repositories
//!
//! - [`RegistrationRepository`] - Registration lifecycle persistence
//!
//! # Testing
//!
//! The integration tests in `tests/` drive the handlers against an in-memory
//! implementation of [`RegistrationRepository`]; unit tests in the
//! application layer use the generated mock.

pub mod registration_repository;

pub use registration_repository::RegistrationRepository;

#[cfg(test)]
pub use registration_repository::MockRegistrationRepository;
