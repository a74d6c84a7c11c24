use serde::Serialize;
use serde_json::Value;

#[derive(Serialize)]
struct ErrorBody {
    error: ErrorInfo,
}

#[derive(Serialize)]
struct ErrorInfo {
    code: &'static str,
    message: String,
    details: Value,
}

/// Application error shared by every service in the crate.
///
/// Each variant carries a human-readable message plus a structured `details`
/// payload that callers can log or render verbatim.
#[derive(Debug)]
pub enum AppError {
    Validation { message: String, details: Value },
    NotFound { message: String, details: Value },
    Conflict { message: String, details: Value },
    Forbidden { message: String, details: Value },
    InvalidTtl { message: String, details: Value },
    BackendUnavailable { message: String, details: Value },
    Internal { message: String, details: Value },
}

impl AppError {
    pub fn bad_request(message: impl Into<String>, details: Value) -> Self {
        Self::Validation {
            message: message.into(),
            details,
        }
    }
    pub fn not_found(message: impl Into<String>, details: Value) -> Self {
        Self::NotFound {
            message: message.into(),
            details,
        }
    }
    pub fn conflict(message: impl Into<String>, details: Value) -> Self {
        Self::Conflict {
            message: message.into(),
            details,
        }
    }
    pub fn forbidden(message: impl Into<String>, details: Value) -> Self {
        Self::Forbidden {
            message: message.into(),
            details,
        }
    }
    pub fn invalid_ttl(message: impl Into<String>, details: Value) -> Self {
        Self::InvalidTtl {
            message: message.into(),
            details,
        }
    }
    pub fn backend_unavailable(message: impl Into<String>, details: Value) -> Self {
        Self::BackendUnavailable {
            message: message.into(),
            details,
        }
    }
    pub fn internal(message: impl Into<String>, details: Value) -> Self {
        Self::Internal {
            message: message.into(),
            details,
        }
    }

    /// Stable machine-readable discriminant for logs and wire bodies.
    pub fn code(&self) -> &'static str {
        match self {
            AppError::Validation { .. } => "validation_error",
            AppError::NotFound { .. } => "not_found",
            AppError::Conflict { .. } => "conflict",
            AppError::Forbidden { .. } => "forbidden",
            AppError::InvalidTtl { .. } => "invalid_ttl",
            AppError::BackendUnavailable { .. } => "backend_unavailable",
            AppError::Internal { .. } => "internal_error",
        }
    }

    pub fn message(&self) -> &str {
        match self {
            AppError::Validation { message, .. }
            | AppError::NotFound { message, .. }
            | AppError::Conflict { message, .. }
            | AppError::Forbidden { message, .. }
            | AppError::InvalidTtl { message, .. }
            | AppError::BackendUnavailable { message, .. }
            | AppError::Internal { message, .. } => message,
        }
    }

    /// Serializes into the `{ "error": { code, message, details } }` body
    /// outer layers expose.
    pub fn to_body(&self) -> Value {
        let (message, details) = match self {
            AppError::Validation { message, details }
            | AppError::NotFound { message, details }
            | AppError::Conflict { message, details }
            | AppError::Forbidden { message, details }
            | AppError::InvalidTtl { message, details }
            | AppError::BackendUnavailable { message, details }
            | AppError::Internal { message, details } => (message.clone(), details.clone()),
        };

        let body = ErrorBody {
            error: ErrorInfo {
                code: self.code(),
                message,
                details,
            },
        };

        serde_json::to_value(body).unwrap_or(Value::Null)
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code(), self.message())
    }
}

impl std::error::Error for AppError {}
