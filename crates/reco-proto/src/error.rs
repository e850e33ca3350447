//! Typed failures of the recommendation API client.
//!
//! `Clone` so results can be posted across the UI's task channel.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ApiError {
    /// The request never produced a response (refused, timed out, DNS...).
    #[error("request failed: {0}")]
    Transport(String),

    /// The service answered with a non-success status.
    #[error("service returned {status}: {message}")]
    Status { status: u16, message: String },

    /// The body was not the JSON shape we expected.
    #[error("malformed response: {0}")]
    Decode(String),

    #[error("invalid base url '{0}'")]
    InvalidBaseUrl(String),
}

impl ApiError {
    /// Short form for toasts and the list's error row.
    pub fn summary(&self) -> String {
        match self {
            Self::Transport(_) => "service unreachable".to_string(),
            Self::Status { message, .. } => message.clone(),
            Self::Decode(_) => "unexpected response from service".to_string(),
            Self::InvalidBaseUrl(url) => format!("invalid API url: {}", url),
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            ApiError::Decode(e.to_string())
        } else {
            ApiError::Transport(e.to_string())
        }
    }
}
