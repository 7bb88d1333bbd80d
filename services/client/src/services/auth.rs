//! services/client/src/services/auth.rs
//!
//! Login, registration and logout against `/v1/auth`.

use crate::api_client::{ApiClient, RawResponse};
use crate::error::ClientResult;
use crate::normalize::normalize_auth_response;
use crate::session::SessionStore;
use academic_search_core::domain::{Credentials, Registration, Session};
use serde_json::json;
use std::sync::Arc;
use tracing::info;

const AUTH_BASE: &str = "/v1/auth";

#[derive(Clone)]
pub struct AuthService {
    api: Arc<ApiClient>,
    fallback_token: Option<String>,
}

impl AuthService {
    pub fn new(api: Arc<ApiClient>, fallback_token: Option<String>) -> Self {
        Self {
            api,
            fallback_token,
        }
    }

    fn sessions(&self) -> &SessionStore {
        self.api.sessions()
    }

    /// POST /v1/auth/login, then persists the resulting session.
    pub async fn login(&self, credentials: &Credentials) -> ClientResult<Session> {
        let raw = self
            .api
            .post_json(
                &format!("{}/login", AUTH_BASE),
                json!({
                    "email": credentials.email,
                    "password": credentials.password,
                }),
            )
            .await?;
        self.establish(&raw)
    }

    /// POST /v1/auth/register, then persists the resulting session.
    pub async fn register(&self, registration: &Registration) -> ClientResult<Session> {
        let raw = self
            .api
            .post_json(
                &format!("{}/register", AUTH_BASE),
                json!({
                    "username": registration.username,
                    "email": registration.email,
                    "password": registration.password,
                }),
            )
            .await?;
        self.establish(&raw)
    }

    fn establish(&self, raw: &RawResponse) -> ClientResult<Session> {
        let session = normalize_auth_response(raw, self.fallback_token.as_deref())?;
        self.sessions().save(&session)?;
        info!("Signed in as {}", session.identity.username);
        Ok(session)
    }

    pub fn logout(&self) -> ClientResult<()> {
        self.sessions().clear()?;
        Ok(())
    }

    pub fn current_session(&self) -> ClientResult<Option<Session>> {
        Ok(self.sessions().load()?)
    }

    pub fn is_authenticated(&self) -> ClientResult<bool> {
        Ok(self.current_session()?.is_some())
    }
}
