//! Error Types

use thiserror::Error;

/// Result type alias for core operations
pub type Result<T> = std::result::Result<T, CoreError>;

#[derive(Error, Debug)]
pub enum CoreError {
    /// Another user already holds this identifier
    #[error("User already exists: {0}")]
    UserExists(String),

    /// Storage backend failure (poisoned lock, unreachable store)
    #[error("Storage error: {0}")]
    Storage(String),

    /// Input that cannot be acted on
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl CoreError {
    pub fn user_message(&self) -> String {
        match self {
            Self::UserExists(_) => "That username is already taken.".into(),
            Self::InvalidInput(msg) => msg.clone(),
            Self::Storage(_) => "An unexpected error occurred.".into(),
        }
    }
}
