//! Error types for session control and settings

/// Error type for game engine operations
#[derive(thiserror::Error, Debug)]
pub enum GameError {
    /// `start` was called before the play field was configured
    #[error("game engine not initialized: call configure(width, height) first")]
    NotInitialized,

    /// `start` was called while a session is still running
    #[error("a session is already active")]
    AlreadyActive,

    /// Settings failed validation
    #[error("invalid settings: {0}")]
    InvalidSettings(String),

    /// Settings JSON could not be parsed or written
    #[error("settings JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for game engine operations
pub type Result<T> = std::result::Result<T, GameError>;
