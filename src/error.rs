use crate::config::ConfigError;

/// Errors that abort a sweep
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    // Usage errors
    #[error("Usage error: {0}")]
    Usage(String),

    // Configuration errors
    #[error(transparent)]
    Config(#[from] ConfigError),

    // Store errors (connectivity, protocol)
    #[error("Store error: {0}")]
    Store(String),

    // Report output errors
    #[error("Output error: {0}")]
    Output(#[from] std::io::Error),
}

impl AppError {
    /// Process exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            AppError::Usage(_) => 2,
            AppError::Config(_) | AppError::Store(_) | AppError::Output(_) => 1,
        }
    }
}

impl From<redis::RedisError> for AppError {
    fn from(err: redis::RedisError) -> Self {
        AppError::Store(format!("Redis error: {}", err))
    }
}

/// Result type alias for store and sweep operations
pub type AppResult<T> = Result<T, AppError>;
