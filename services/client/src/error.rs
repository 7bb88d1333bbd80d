//! services/client/src/error.rs
//!
//! Defines the primary error type for the entire client service.
//!
//! The `Display` strings of the transport variants are the messages shown to
//! the user, so they are written for people rather than for logs.

use crate::config::ConfigError;
use academic_search_core::ports::PortError;

pub const NETWORK_ERROR: &str = "Network error. Please check your connection.";
pub const UNAUTHORIZED: &str = "You are not authorized to perform this action.";
pub const SESSION_EXPIRED: &str = "Your session has expired. Please log in again.";
pub const GENERIC_ERROR: &str = "An error occurred. Please try again.";
pub const NO_ANSWER: &str = "No AI answer available";

/// The primary error type for the `client` service.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// No HTTP reply was received (connection failure or timeout).
    #[error("Network error. Please check your connection.")]
    Network(String),

    /// The backend answered 401. The session has already been torn down.
    #[error("You are not authorized to perform this action.")]
    Unauthorized,

    /// The backend answered 403. The session is kept.
    #[error("Your session has expired. Please log in again.")]
    Forbidden,

    /// Any other non-2xx reply.
    #[error("{message}")]
    RequestFailed { status: u16, message: String },

    /// A local precondition failed; no request was sent.
    #[error("{0}")]
    Validation(String),

    /// Answer mode succeeded at the transport level but produced no answer.
    #[error("No AI answer available")]
    NoAnswerAvailable,

    #[error("No authentication token received from server")]
    NoToken,

    #[error("Invalid token")]
    InvalidToken,

    /// Represents an error that propagated up from one of the core ports.
    #[error("Service Port Error: {0}")]
    Port(#[from] PortError),

    /// Represents an error that occurred during configuration loading.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// A catch-all for any other unexpected errors.
    #[error("An unexpected internal error occurred: {0}")]
    Internal(String),
}

impl ClientError {
    /// HTTP status associated with this error, when there is one.
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Unauthorized => Some(401),
            ClientError::Forbidden => Some(403),
            ClientError::RequestFailed { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// A convenience type alias for `Result<T, ClientError>`.
pub type ClientResult<T> = Result<T, ClientError>;
