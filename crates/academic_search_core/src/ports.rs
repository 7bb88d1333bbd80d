//! crates/academic_search_core/src/ports.rs
//!
//! Defines the service contracts (traits) the client core depends on.
//! These traits form the boundary of the hexagonal architecture, keeping the
//! core independent of the concrete HTTP stack, the persistence medium and
//! whatever UI owns navigation.

use async_trait::async_trait;
use bytes::Bytes;

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    /// The request never produced an HTTP reply (connect failure, timeout, ...).
    #[error("No response received: {0}")]
    NoResponse(String),
    #[error("Storage failure: {0}")]
    Storage(String),
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// HTTP Exchange Types
//=========================================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
}

#[derive(Debug, Clone, PartialEq)]
pub enum HttpBody {
    Empty,
    Json(serde_json::Value),
    /// A single-file multipart form.
    Multipart {
        field: String,
        file_name: String,
        bytes: Bytes,
    },
}

/// An outgoing request. `path` is relative to the backend's base URL.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub path: String,
    pub headers: Vec<(String, String)>,
    pub body: HttpBody,
}

impl HttpRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

/// A reply of any status. Header names are lower-cased by the backend.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Bytes,
}

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

#[async_trait]
pub trait HttpBackend: Send + Sync {
    /// Performs one HTTP exchange.
    ///
    /// Every reply, whatever its status, is `Ok`. `Err(PortError::NoResponse)`
    /// is reserved for requests that got no reply at all.
    async fn execute(&self, request: HttpRequest) -> PortResult<HttpResponse>;
}

/// A small key-value persistence capability for client-side state.
pub trait Storage: Send + Sync {
    fn get(&self, key: &str) -> PortResult<Option<String>>;

    fn set(&self, key: &str, value: &str) -> PortResult<()>;

    /// Removes `key`. Removing a missing key is not an error.
    fn clear(&self, key: &str) -> PortResult<()>;
}

/// The collaborator that owns the login entry point.
pub trait Navigator: Send + Sync {
    fn redirect_to_login(&self);
}
