//! PostgreSQL repository implementations.
//!
//! Concrete implementations of domain repository traits using SQLx prepared
//! statements.
//!
//! # Repositories
//!
//! - [`PgRegistrationRepository`] - Registration storage and retrieval

pub mod pg_registration_repository;

pub use pg_registration_repository::PgRegistrationRepository;
