//! Application layer services implementing business logic.
//!
//! This layer orchestrates domain operations by coordinating repository calls,
//! cache access, validation, and business rules. Services consume the
//! repository and cache traits and provide a clean API for outer layers.
//!
//! # Available Services
//!
//! - [`services::url_service::UrlService`] - Short URL resolution and lifecycle
//! - [`services::revocation_service::RevocationService`] - Session token revocation list

pub mod services;
