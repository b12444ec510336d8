//! Error types for the marketplace client

use crate::envelope::NormalizedError;
use serde_json::Value;
use thiserror::Error;

/// Message surfaced when a request was sent but no response came back.
pub(crate) const NETWORK_ERROR_MESSAGE: &str =
    "Network error: please check your connection and try again";

/// Client error types
#[derive(Error, Debug)]
pub enum ClientError {
    /// The request never produced a server response (connect failure,
    /// timeout, or a request that could not be constructed).
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The server answered with a non-success status.
    #[error("server returned {status}: {message}")]
    Api {
        status: u16,
        message: String,
        details: Option<Value>,
    },

    /// A 2xx response whose envelope carried an explicit `success: false`.
    #[error("{message}")]
    Rejected { message: String },

    /// The session could not be recovered; stored credentials have already
    /// been cleared and the session-expired hook emitted.
    #[error("session expired: {0}")]
    SessionExpired(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("configuration error: {0}")]
    Configuration(String),
}

pub type Result<T> = std::result::Result<T, ClientError>;

impl ClientError {
    /// HTTP status of the server response, when there was one.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        self.status() == Some(401)
    }

    /// Shape this error into the uniform caller-facing form.
    pub fn normalized(&self) -> NormalizedError {
        match self {
            Self::Transport(e) if e.is_builder() => {
                NormalizedError::new(e.to_string(), None, None)
            }
            Self::Transport(_) => {
                NormalizedError::new(NETWORK_ERROR_MESSAGE.to_string(), None, None)
            }
            Self::Api {
                status,
                message,
                details,
            } => NormalizedError::new(message.clone(), details.clone(), Some(*status)),
            Self::Rejected { message } => NormalizedError::new(message.clone(), None, None),
            other => NormalizedError::new(other.to_string(), None, None),
        }
    }
}
