//! Visit event model for asynchronous usage tracking.

use chrono::{DateTime, Utc};

/// An in-memory representation of one successful resolution.
///
/// Used to pass usage information from the resolution path to the background
/// worker via a channel. This decouples returning the target URL from the
/// store write, keeping reads fast.
///
/// # Design
///
/// - Carries the alias plus the moment the visit happened, nothing else
/// - The timestamp travels with the event so a slow queue drain still
///   records when the visit actually occurred
/// - Cloneable for sending across async boundaries
///
/// # Usage Flow
///
/// 1. Created on the resolution path after a successful lookup
/// 2. Sent to the bounded channel (non-blocking, dropped when full)
/// 3. Processed by [`crate::domain::visit_worker::run_visit_worker`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VisitEvent {
    pub alias: String,
    pub visited_at: DateTime<Utc>,
}

impl VisitEvent {
    /// Creates a visit event stamped with the current time.
    pub fn new(alias: impl Into<String>) -> Self {
        Self {
            alias: alias.into(),
            visited_at: Utc::now(),
        }
    }

    /// Creates a visit event with an explicit timestamp.
    pub fn at(alias: impl Into<String>, visited_at: DateTime<Utc>) -> Self {
        Self {
            alias: alias.into(),
            visited_at,
        }
    }
}
