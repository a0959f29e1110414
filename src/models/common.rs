use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Which capability a result came from. Selects the user-facing failure text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Capability {
    Image,
    Text,
}

impl Capability {
    pub fn failure_prefix(&self) -> &'static str {
        match self {
            Capability::Image => "Error generating image: ",
            Capability::Text => "Error generating text: ",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GenerationErrorKind {
    Network,
    Timeout,
    Authentication,
    ModelNotFound,
    RateLimited,
    ModelLoading,
    InvalidRequest,
    Gateway,
    UnexpectedResponse,
}

impl GenerationErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            GenerationErrorKind::Network => "network",
            GenerationErrorKind::Timeout => "timeout",
            GenerationErrorKind::Authentication => "authentication",
            GenerationErrorKind::ModelNotFound => "model_not_found",
            GenerationErrorKind::RateLimited => "rate_limited",
            GenerationErrorKind::ModelLoading => "model_loading",
            GenerationErrorKind::InvalidRequest => "invalid_request",
            GenerationErrorKind::Gateway => "gateway",
            GenerationErrorKind::UnexpectedResponse => "unexpected_response",
        }
    }

    /// Maps a non-success HTTP status from the inference API onto a kind.
    pub fn from_status(status: u16) -> Self {
        match status {
            401 | 403 => GenerationErrorKind::Authentication,
            404 => GenerationErrorKind::ModelNotFound,
            429 => GenerationErrorKind::RateLimited,
            503 => GenerationErrorKind::ModelLoading,
            400 | 422 => GenerationErrorKind::InvalidRequest,
            _ => GenerationErrorKind::Gateway,
        }
    }
}

/// A failed generation call. Handlers hand this back instead of panicking;
/// the presentation layer decides how to show it.
#[derive(Debug, Clone, PartialEq, Error, Serialize, Deserialize)]
#[error("{} error: {message}", .kind.as_str())]
pub struct GenerationError {
    pub kind: GenerationErrorKind,
    pub message: String,
}

impl GenerationError {
    pub fn new(kind: GenerationErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn unexpected_response(message: impl Into<String>) -> Self {
        Self::new(GenerationErrorKind::UnexpectedResponse, message)
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::new(GenerationErrorKind::InvalidRequest, message)
    }

    /// User-facing text, e.g. `Error generating text: operation timed out`.
    pub fn render(&self, capability: Capability) -> String {
        format!("{}{}", capability.failure_prefix(), self.message)
    }
}
