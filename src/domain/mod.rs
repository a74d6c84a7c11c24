//! Domain layer containing business entities and logic.
//!
//! This module implements the core domain logic following Clean Architecture principles.
//! It defines entities, repository interfaces, and the usage-tracking worker.
//!
//! # Architecture
//!
//! - [`entities`] - Core business data structures
//! - [`repositories`] - Data access trait definitions
//! - [`visit_event`] - Usage tracking event model
//! - [`visit_worker`] - Asynchronous usage-stat processing worker
//!
//! # Design Principles
//!
//! - Repository traits define contracts implemented by the infrastructure layer
//! - Business logic is encapsulated in services (see [`crate::application::services`])
//!
//! # Visit Processing Flow
//!
//! 1. The resolution path serves a target URL
//! 2. A [`visit_event::VisitEvent`] is sent to a bounded async channel
//! 3. [`visit_worker::run_visit_worker`] drains events one by one
//! 4. Stats are written back via [`repositories::UrlRepository`] and the
//!    cached copy is refreshed

pub mod entities;
pub mod repositories;
pub mod visit_event;
pub mod visit_worker;
