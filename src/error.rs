use thiserror::Error;

pub type RecResult<T> = Result<T, RecError>;

#[derive(Error, Debug)]
pub enum RecError {
    /// Store unreachable or returned rows that could not be decoded. Retryable.
    #[error("Data unavailable: {0}")]
    DataUnavailable(String),

    #[error("Invalid request parameter '{name}': {reason}")]
    InvalidRequestParameter { name: String, reason: String },

    #[error("Configuration error: {0}")]
    Config(String),
}

impl RecError {
    pub fn invalid_parameter(name: &str, reason: impl Into<String>) -> Self {
        RecError::InvalidRequestParameter {
            name: name.to_string(),
            reason: reason.into(),
        }
    }

    pub fn is_retryable(&self) -> bool {
        matches!(self, RecError::DataUnavailable(_))
    }
}

impl From<sqlx::Error> for RecError {
    fn from(err: sqlx::Error) -> Self {
        RecError::DataUnavailable(err.to_string())
    }
}

impl From<config::ConfigError> for RecError {
    fn from(err: config::ConfigError) -> Self {
        RecError::Config(err.to_string())
    }
}
