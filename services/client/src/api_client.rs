//! services/client/src/api_client.rs
//!
//! The transport layer. Every backend call goes through `ApiClient::send`,
//! which attaches the bearer token and tenant header and folds transport and
//! HTTP failures into the `ClientError` taxonomy.

use crate::config::Config;
use crate::error::{ClientError, ClientResult, GENERIC_ERROR};
use crate::session::SessionStore;
use academic_search_core::ports::{
    HttpBackend, HttpBody, HttpMethod, HttpRequest, HttpResponse, Navigator, PortError,
};
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, error, warn};

/// A successful (2xx) reply with its body parsed as JSON.
///
/// An empty or non-JSON body is represented as `Value::Null`.
#[derive(Debug, Clone, PartialEq)]
pub struct RawResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Value,
}

impl RawResponse {
    pub fn json(body: Value) -> Self {
        Self {
            status: 200,
            headers: Vec::new(),
            body,
        }
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

/// The shared HTTP client used by all application services.
pub struct ApiClient {
    backend: Arc<dyn HttpBackend>,
    sessions: SessionStore,
    navigator: Arc<dyn Navigator>,
    tenant_header: String,
    default_tenant: String,
}

impl ApiClient {
    pub fn new(
        backend: Arc<dyn HttpBackend>,
        sessions: SessionStore,
        navigator: Arc<dyn Navigator>,
        config: &Config,
    ) -> Self {
        Self {
            backend,
            sessions,
            navigator,
            tenant_header: config.tenant_header.clone(),
            default_tenant: config.default_tenant.clone(),
        }
    }

    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }

    pub async fn post_json(&self, path: &str, body: Value) -> ClientResult<RawResponse> {
        self.send(HttpMethod::Post, path, HttpBody::Json(body)).await
    }

    /// Sends one request and classifies the outcome.
    pub async fn send(
        &self,
        method: HttpMethod,
        path: &str,
        body: HttpBody,
    ) -> ClientResult<RawResponse> {
        // 1. Attach the auth and tenant headers.
        let mut headers = Vec::with_capacity(2);
        if let Some(token) = self.sessions.token()? {
            headers.push(("Authorization".to_string(), format!("Bearer {}", token)));
        }
        let tenant = self
            .sessions
            .tenant()?
            .unwrap_or_else(|| self.default_tenant.clone());
        headers.push((self.tenant_header.clone(), tenant));

        let request = HttpRequest {
            method,
            path: path.to_string(),
            headers,
            body,
        };

        // 2. Dispatch. A missing reply is a network error.
        let response = match self.backend.execute(request).await {
            Ok(response) => response,
            Err(PortError::NoResponse(reason)) => {
                warn!("No response from {}: {}", path, reason);
                return Err(ClientError::Network(reason));
            }
            Err(e) => return Err(e.into()),
        };
        debug!("{} answered {}", path, response.status);

        // 3. Classify the status.
        self.classify(path, response)
    }

    fn classify(&self, path: &str, response: HttpResponse) -> ClientResult<RawResponse> {
        let body = parse_body(&response.body);

        match response.status {
            200..=299 => Ok(RawResponse {
                status: response.status,
                headers: response.headers,
                body,
            }),
            401 => {
                warn!("{} answered 401; tearing down the session", path);
                if let Err(e) = self.sessions.clear() {
                    error!("Failed to clear session after 401: {:?}", e);
                }
                self.navigator.redirect_to_login();
                Err(ClientError::Unauthorized)
            }
            403 => Err(ClientError::Forbidden),
            status => {
                let message = body
                    .get("message")
                    .and_then(Value::as_str)
                    .filter(|message| !message.trim().is_empty())
                    .unwrap_or(GENERIC_ERROR)
                    .to_string();
                warn!("{} failed with {}: {}", path, status, message);
                Err(ClientError::RequestFailed { status, message })
            }
        }
    }
}

fn parse_body(bytes: &[u8]) -> Value {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Value::Null;
    }
    serde_json::from_slice(bytes).unwrap_or(Value::Null)
}
