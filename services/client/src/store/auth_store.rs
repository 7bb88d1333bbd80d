//! services/client/src/store/auth_store.rs
//!
//! Authentication state for the UI layer, hydrated from the persisted session.

use crate::error::ClientResult;
use crate::services::AuthService;
use academic_search_core::domain::{session_expiry_buffer, Credentials, Registration, Session};
use chrono::Utc;
use tokio::sync::Mutex;
use tracing::info;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AuthState {
    pub session: Option<Session>,
    pub is_loading: bool,
    pub error: Option<String>,
}

impl AuthState {
    pub fn is_authenticated(&self) -> bool {
        self.session.is_some()
    }
}

pub struct AuthStore {
    auth: AuthService,
    state: Mutex<AuthState>,
}

impl AuthStore {
    /// Builds the store from whatever session is already persisted.
    pub fn new(auth: AuthService) -> ClientResult<Self> {
        let session = live_session(&auth)?;
        Ok(Self {
            auth,
            state: Mutex::new(AuthState {
                session,
                ..AuthState::default()
            }),
        })
    }

    pub async fn snapshot(&self) -> AuthState {
        self.state.lock().await.clone()
    }

    pub async fn login(&self, credentials: &Credentials) -> ClientResult<Session> {
        self.begin().await;
        let result = self.auth.login(credentials).await;
        self.finish(result).await
    }

    pub async fn register(&self, registration: &Registration) -> ClientResult<Session> {
        self.begin().await;
        let result = self.auth.register(registration).await;
        self.finish(result).await
    }

    pub async fn logout(&self) -> ClientResult<()> {
        self.auth.logout()?;
        *self.state.lock().await = AuthState::default();
        Ok(())
    }

    /// Re-reads the persisted session, e.g. after a 401 tore it down.
    pub async fn refresh(&self) -> ClientResult<()> {
        let session = live_session(&self.auth)?;
        self.state.lock().await.session = session;
        Ok(())
    }

    pub async fn set_error(&self, error: Option<String>) {
        self.state.lock().await.error = error;
    }

    pub async fn clear_error(&self) {
        self.state.lock().await.error = None;
    }

    async fn begin(&self) {
        let mut state = self.state.lock().await;
        state.is_loading = true;
        state.error = None;
    }

    async fn finish(&self, result: ClientResult<Session>) -> ClientResult<Session> {
        let mut state = self.state.lock().await;
        state.is_loading = false;
        match &result {
            Ok(session) => {
                state.session = Some(session.clone());
                state.error = None;
            }
            Err(e) => {
                state.session = None;
                state.error = Some(e.to_string());
            }
        }
        result
    }
}

/// The persisted session, unless it is about to expire (in which case it is
/// cleared).
fn live_session(auth: &AuthService) -> ClientResult<Option<Session>> {
    match auth.current_session()? {
        Some(session) if session.expires_within(Utc::now(), session_expiry_buffer()) => {
            info!("Persisted session for {} has expired", session.identity.username);
            auth.logout()?;
            Ok(None)
        }
        session => Ok(session),
    }
}
