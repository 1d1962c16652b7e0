use thiserror::Error;

/// Errors raised while reading a settings document
#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("settings document is not a JSON object")]
    NotAnObject,

    #[error("setting {key:?} is not a boolean, number or string")]
    UnsupportedValue { key: String },

    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ProtocolError>;
