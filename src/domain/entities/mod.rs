//! Core domain entities representing the business data model.
//!
//! This module contains the fundamental data structures that represent the core
//! concepts of the URL shortening service. Entities are plain data structures
//! with only small intrinsic predicates as logic.
//!
//! # Entity Types
//!
//! - [`UrlEntry`] - A shortened URL mapping with usage metadata
//! - [`ArchivedUrlEntry`] - A tombstone kept after deletion
//!
//! # Design Pattern
//!
//! Entities follow the "New Type" pattern with a separate struct for creation:
//! - `NewUrlEntry` - For creating new records
//!
//! All entities include unit tests demonstrating their construction and usage.

pub mod url_entry;

pub use url_entry::{ArchivedUrlEntry, NewUrlEntry, UrlEntry};
