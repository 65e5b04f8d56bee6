//! Error types for the Pustaka client

use std::fmt;

use thiserror::Error;

/// Main application error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Not authenticated")]
    AuthMissing,

    #[error("Session expired")]
    AuthExpired,

    #[error("Request failed ({status}): {message}")]
    RequestFailed { status: u16, message: String },

    #[error("Invalid response shape: {0}")]
    InvalidResponseShape(String),

    #[error("Validation error: {0}")]
    ValidationFailed(String),

    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Decode error: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Request cancelled")]
    Cancelled,

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Storage error: {0}")]
    Storage(#[from] std::io::Error),
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        AppError::ValidationFailed(errors.to_string())
    }
}

/// How a notice is presented to the user
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    /// Inline banner above a list or form
    Banner,
    /// Blocking notice that must be dismissed
    Blocking,
    /// Session is gone: sign out and show the sign-in view
    SignIn,
}

/// User-visible message derived from an error
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl AppError {
    /// Build an error from a non-2xx response.
    pub fn from_status(status: u16, server_message: Option<String>) -> Self {
        if status == 401 {
            return AppError::AuthExpired;
        }
        let message = server_message
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| format!("Request failed with status {}", status));
        AppError::RequestFailed { status, message }
    }

    /// Whether this error ends the session
    pub fn is_auth_expired(&self) -> bool {
        matches!(self, AppError::AuthExpired)
    }

    /// Single mapping from errors to what the user sees.
    pub fn notice(&self) -> Notice {
        let (kind, message) = match self {
            AppError::AuthMissing => (
                NoticeKind::SignIn,
                "You are not signed in. Please sign in to continue.".to_string(),
            ),
            AppError::AuthExpired => (
                NoticeKind::SignIn,
                "Your session has expired. Please sign in again.".to_string(),
            ),
            AppError::RequestFailed { message, .. } => (NoticeKind::Blocking, message.clone()),
            AppError::InvalidResponseShape(_) | AppError::Decode(_) => (
                NoticeKind::Banner,
                "The server returned an unexpected response.".to_string(),
            ),
            AppError::ValidationFailed(msg) => (NoticeKind::Banner, msg.clone()),
            AppError::Transport(e) => {
                tracing::error!("Transport error: {:?}", e);
                (
                    NoticeKind::Banner,
                    "Could not reach the server. Use reload to try again.".to_string(),
                )
            }
            AppError::Cancelled => (NoticeKind::Banner, "Request cancelled.".to_string()),
            AppError::Config(e) => (NoticeKind::Blocking, format!("Configuration error: {}", e)),
            AppError::Storage(e) => {
                tracing::error!("Storage error: {:?}", e);
                (NoticeKind::Banner, "Could not save local state.".to_string())
            }
        };

        Notice { kind, message }
    }
}

/// Result type alias for client operations
pub type AppResult<T> = Result<T, AppError>;
