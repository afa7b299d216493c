use crate::gateway::GatewayError;
use thiserror::Error;

/// Failures surfaced to the user through the notification area
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AppError {
    /// Detected client-side; the gateway was never called
    #[error("{0}")]
    Validation(String),
    #[error("Upload failed: {0}")]
    Upload(String),
    #[error("Text is empty")]
    EmptyInput,
    #[error("Image resolution failed: {0}")]
    ImageResolution(String),
    /// Reported by the backend for one specific request, passed through verbatim
    #[error("{0}")]
    Generation(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Connection error: {0}")]
    Transport(String),
}

impl AppError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Classify a gateway failure outside of generation and upload calls
    pub fn from_gateway(err: GatewayError) -> Self {
        match err {
            GatewayError::Transport(msg) => Self::Transport(msg),
            GatewayError::NotFound(msg) => Self::NotFound(msg),
            GatewayError::EmptyInput => Self::EmptyInput,
            GatewayError::Rejected(msg) => Self::Validation(msg),
            GatewayError::Malformed(msg) => Self::Transport(msg),
        }
    }

    /// A failed generation call keeps the backend message verbatim
    pub fn from_generation(err: GatewayError) -> Self {
        match err {
            GatewayError::Rejected(msg) => Self::Generation(msg),
            other => Self::from_gateway(other),
        }
    }

    pub fn from_upload(err: GatewayError) -> Self {
        match err {
            GatewayError::Transport(msg) => Self::Transport(msg),
            other => Self::Upload(other.to_string()),
        }
    }
}

impl From<GatewayError> for AppError {
    fn from(err: GatewayError) -> Self {
        Self::from_gateway(err)
    }
}
