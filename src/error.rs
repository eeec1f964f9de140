//! Error types for the bike service assistant
//!
//! The diagnosis core itself never fails; these cover configuration,
//! the interaction log and the HTTP server.

use thiserror::Error;

/// Result type alias for assistant operations
pub type Result<T> = std::result::Result<T, AssistantError>;

#[derive(Error, Debug)]
pub enum AssistantError {

    // =============================
    // Service Errors
    // =============================

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Interaction log error: {0}")]
    LogError(String),
}
