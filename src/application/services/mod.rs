//! Business logic services for the application layer.

pub mod revocation_service;
pub mod url_service;

pub use revocation_service::RevocationService;
pub use url_service::{UrlService, UrlServiceOptions, UrlStats};
