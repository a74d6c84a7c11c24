//! Alias generation and validation utilities.
//!
//! Provides random alias generation and validation for custom user-provided
//! aliases.

use crate::error::AppError;
use rand::Rng;
use serde_json::json;

/// Characters an alias may contain. 63 symbols: letters, digits, underscore.
const ALIAS_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789_";

/// Length of generated aliases.
const GENERATED_ALIAS_LENGTH: usize = 6;

/// Maximum length of user-provided aliases.
const MAX_ALIAS_LENGTH: usize = 7;

/// Generates a random alias.
///
/// Draws [`GENERATED_ALIAS_LENGTH`] characters uniformly from
/// [`ALIAS_ALPHABET`], giving 63^6 (~6.2e10) possible values. Collisions are
/// possible and handled by the caller retrying against the store.
///
/// # Examples
///
/// ```ignore
/// let alias = generate_alias();
/// assert_eq!(alias.len(), 6);
/// ```
pub fn generate_alias() -> String {
    let mut rng = rand::rng();

    (0..GENERATED_ALIAS_LENGTH)
        .map(|_| {
            let idx = rng.random_range(0..ALIAS_ALPHABET.len());
            ALIAS_ALPHABET[idx] as char
        })
        .collect()
}

/// Validates a user-provided custom alias.
///
/// # Rules
///
/// - Length: 1-7 characters
/// - Allowed characters: ASCII letters, digits, underscore
///
/// # Errors
///
/// Returns [`AppError::Validation`] if any rule is violated.
///
/// # Examples
///
/// ```ignore
/// assert!(validate_custom_alias("abc_123").is_ok());
/// assert!(validate_custom_alias("toolong12").is_err());
/// assert!(validate_custom_alias("bad!@#").is_err());
/// ```
pub fn validate_custom_alias(alias: &str) -> Result<(), AppError> {
    if alias.is_empty() || alias.len() > MAX_ALIAS_LENGTH {
        return Err(AppError::bad_request(
            "Alias must be 1-7 characters",
            json!({ "provided_length": alias.len() }),
        ));
    }

    if !alias
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_')
    {
        return Err(AppError::bad_request(
            "Alias can only contain letters, digits, and underscore",
            json!({ "alias": alias }),
        ));
    }

    Ok(())
}
