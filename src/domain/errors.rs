//! Domain errors. Used by ports and use cases.
//!
//! Adapters map infrastructure errors into these.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Backend error: {0}")]
    Backend(String),

    /// 401 from the backend: the stored token is missing, expired or rejected.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// 403 from the backend.
    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Authentication failed: {0}")]
    Auth(String),

    /// User-supplied value that cannot form a request (e.g. a blank pet id).
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Invalid session: {0}")]
    InvalidSession(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("UI error: {0}")]
    Ui(String),
}
