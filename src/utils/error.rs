use thiserror::Error;

#[derive(Error, Debug)]
pub enum SspError {
    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid value for '{field}': {value} ({reason})")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required field: {field}")]
    MissingConfigError { field: String },

    #[error("Validation error: {message}")]
    ValidationError { message: String },

    #[error("Invalid date format for '{field}': '{value}'. Use ISO-8601, e.g. 2024-01-31 or 2024-01-31T23:59:59Z")]
    DateFormatError { field: String, value: String },

    #[error("Type mismatch for '{field}': expected {expected}")]
    TypeMismatch { field: String, expected: String },

    #[error("Unexpected response: {message}")]
    ResponseError { message: String },
}

impl SspError {
    pub fn type_mismatch(field: &str, expected: &str) -> Self {
        SspError::TypeMismatch {
            field: field.to_string(),
            expected: expected.to_string(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        SspError::ValidationError {
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, SspError>;
