//! Infrastructure layer for external integrations.
//!
//! This layer implements interfaces defined by the domain layer, providing
//! concrete implementations for data persistence and caching.
//!
//! # Modules
//!
//! - [`cache`] - Caching abstractions (Redis and in-process implementations)
//! - [`persistence`] - Repository implementations

pub mod cache;
pub mod persistence;
