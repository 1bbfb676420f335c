//! Infrastructure layer for external integrations.
//!
//! This layer implements interfaces defined by the domain layer, providing
//! concrete implementations for data persistence and confirmation delivery.
//!
//! # Modules
//!
//! - [`notify`] - Confirmation delivery abstractions (log-backed implementation)
//! - [`persistence`] - PostgreSQL repository implementations

pub mod notify;
pub mod persistence;
