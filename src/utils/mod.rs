//! Utility functions for alias generation, URL processing, and timestamps.
//!
//! This module provides helper functions used across the application:
//!
//! - [`alias`] - Alias generation and validation
//! - [`url_normalizer`] - Target URL normalization and sanitization
//! - [`utc_time`] - UTC timestamp formatting shared by cache payloads

pub mod alias;
pub mod url_normalizer;
pub mod utc_time;
