//! # SnapLink
//!
//! The consistency and lifecycle core of a URL shortener: cache-aside
//! resolution over Redis, asynchronous visit tracking, background expiry
//! sweeping and token revocation, built on Tokio.
//!
//! ## Architecture
//!
//! This crate follows Clean Architecture principles with clear layer separation:
//!
//! - **Domain Layer** ([`domain`]) - Core business entities, repository traits,
//!   and the visit event worker
//! - **Application Layer** ([`application`]) - Resolution, lifecycle and
//!   revocation services
//! - **Infrastructure Layer** ([`infrastructure`]) - Redis and in-process cache
//!   backends, in-process persistence
//!
//! The outer edge (HTTP handlers, CLIs) is deliberately not part of this
//! crate; embed it and put whatever surface you like on top.
//!
//! ## Features
//!
//! - Cache-aside alias resolution with asynchronous cache repopulation
//! - Fire-and-forget visit counting through a bounded queue
//! - Lazy expiry enforced by a background sweeper, with archive tombstones
//! - TTL-bounded token revocation markers
//!
//! ## Quick Start
//!
//! ```bash
//! # Optional: point the cache at Redis, otherwise an in-process cache is used
//! export REDIS_URL="redis://localhost:6379/0"
//!
//! # Tune the lifecycle (all optional)
//! export CACHE_TTL_SECONDS=3600
//! export SWEEP_INTERVAL_SECONDS=600
//! export SWEEP_RETENTION_DAYS=30
//! ```
//!
//! Load the configuration with [`config::load_from_env`], then build an
//! [`AppState`] over your store; it wires the cache, the visit worker and
//! the sweeper and hands back the service handles.
//!
//! ## Configuration
//!
//! Service configuration is loaded from environment variables via [`config::Config`].
//! See [`config`] module for available options.

pub mod application;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod state;
pub mod sweeper;
pub mod utils;

pub mod config;
pub mod logging;

pub use error::AppError;
pub use state::AppState;

/// Commonly used types for external consumers.
///
/// Re-exports frequently used types to simplify imports for library users
/// and integration tests.
pub mod prelude {
    pub use crate::application::services::{
        RevocationService, UrlService, UrlServiceOptions, UrlStats,
    };
    pub use crate::domain::entities::{ArchivedUrlEntry, NewUrlEntry, UrlEntry};
    pub use crate::error::AppError;
    pub use crate::state::AppState;
    pub use crate::sweeper::{SweepReport, Sweeper, SweeperConfig};
}
