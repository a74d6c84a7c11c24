//! Repository implementations.
//!
//! Concrete implementations of the domain repository traits. The bundled
//! implementation keeps everything in process memory; durable deployments
//! plug a database-backed [`crate::domain::repositories::UrlRepository`]
//! in through the same trait.
//!
//! # Repositories
//!
//! - [`InMemoryUrlRepository`] - URL entry storage and archive

pub mod memory_repository;

pub use memory_repository::InMemoryUrlRepository;
