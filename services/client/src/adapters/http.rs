//! services/client/src/adapters/http.rs
//!
//! This module contains the HTTP adapter, the concrete implementation of the
//! `HttpBackend` port on top of `reqwest`.

use academic_search_core::ports::{
    HttpBackend, HttpBody, HttpMethod, HttpRequest, HttpResponse, PortError, PortResult,
};
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use std::time::Duration;
use tracing::debug;

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// An adapter that implements `HttpBackend` with a pooled `reqwest::Client`.
#[derive(Clone)]
pub struct ReqwestBackend {
    client: Client,
    base_url: String,
}

impl ReqwestBackend {
    /// Creates a new `ReqwestBackend` with a fixed per-request timeout.
    pub fn new(base_url: &str, timeout: Duration) -> PortResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| PortError::Unexpected(e.to_string()))?;
        Ok(Self::with_client(client, base_url))
    }

    pub fn with_client(client: Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }
}

//=========================================================================================
// `HttpBackend` Trait Implementation
//=========================================================================================

#[async_trait]
impl HttpBackend for ReqwestBackend {
    async fn execute(&self, request: HttpRequest) -> PortResult<HttpResponse> {
        let url = self.url(&request.path);
        debug!("{:?} {}", request.method, url);

        let mut builder = match request.method {
            HttpMethod::Get => self.client.get(&url),
            HttpMethod::Post => self.client.post(&url),
        };
        builder = builder.header(reqwest::header::ACCEPT, "application/json");
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        builder = match request.body {
            HttpBody::Empty => builder,
            HttpBody::Json(value) => builder.json(&value),
            HttpBody::Multipart {
                field,
                file_name,
                bytes,
            } => {
                let part = Part::bytes(bytes.to_vec()).file_name(file_name);
                builder.multipart(Form::new().part(field, part))
            }
        };

        // Any reply counts as a response; only a missing reply is an error.
        let response = builder
            .send()
            .await
            .map_err(|e| PortError::NoResponse(e.to_string()))?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|value| (name.as_str().to_ascii_lowercase(), value.to_string()))
            })
            .collect();
        // Status and headers arrived; only the body failed.
        let body = response
            .bytes()
            .await
            .map_err(|e| PortError::Unexpected(format!("unreadable response body: {}", e)))?;

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}
