//! wabulk Error Types
//!
//! Centralized error handling for template listing and bulk sends.

use thiserror::Error;

/// Central error type for wabulk
#[derive(Error, Debug)]
pub enum WaError {
    /// Rejected before any request was issued
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("You have selected {selected} recipients, but the maximum is {max}")]
    RecipientLimit { selected: usize, max: usize },

    /// Network, DNS or timeout failure
    #[error("Transport error: {0}")]
    Transport(String),

    /// 401/403 from the provider
    #[error("Authentication rejected (HTTP {status})")]
    Auth {
        status: u16,
        body: Option<serde_json::Value>,
    },

    /// Any other non-2xx response
    #[error("API error (HTTP {status})")]
    Api {
        status: u16,
        body: Option<serde_json::Value>,
    },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type alias for wabulk operations
pub type WaResult<T> = Result<T, WaError>;

impl WaError {
    /// Raw provider payload attached to an HTTP failure, if any
    pub fn provider_body(&self) -> Option<&serde_json::Value> {
        match self {
            WaError::Auth { body, .. } | WaError::Api { body, .. } => body.as_ref(),
            _ => None,
        }
    }

    /// True for errors raised before any network call
    pub fn is_validation(&self) -> bool {
        matches!(self, WaError::Validation(_) | WaError::RecipientLimit { .. })
    }
}

impl From<reqwest::Error> for WaError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            WaError::Transport(format!("request timed out: {err}"))
        } else {
            WaError::Transport(err.to_string())
        }
    }
}
