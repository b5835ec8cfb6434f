use thiserror::Error;

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Account service returned {status}: {body}")]
    UnexpectedStatus { status: u16, body: String },

    #[error("Configuration error in '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },
}

impl AuthError {
    /// 給終端使用者看的簡短訊息
    pub fn user_friendly_message(&self) -> String {
        match self {
            AuthError::HttpError(_) => "Could not reach the account service".to_string(),
            AuthError::UnexpectedStatus { status, .. } => {
                format!("The account service rejected the request ({})", status)
            }
            AuthError::IoError(e) => format!("Could not read file: {}", e),
            AuthError::SerializationError(_) => {
                "The account service sent a response we could not read".to_string()
            }
            AuthError::ConfigValidationError { field, message } => {
                format!("Configuration problem with '{}': {}", field, message)
            }
            AuthError::InvalidConfigValueError { field, reason, .. } => {
                format!("Configuration problem with '{}': {}", field, reason)
            }
            AuthError::MissingConfigError { field } => {
                format!("Configuration problem with '{}': value is missing", field)
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, AuthError>;
