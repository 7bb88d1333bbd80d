//! services/client/src/session.rs
//!
//! Persists the authenticated session through the `Storage` port.
//!
//! The token and the serialized identity live under two fixed keys and are
//! written, read and cleared as a pair.

use academic_search_core::domain::{Identity, Session};
use academic_search_core::ports::{PortError, PortResult, Storage};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::warn;

pub const TOKEN_KEY: &str = "content_plus_token";
pub const USER_KEY: &str = "content_plus_user";
pub const TENANT_KEY: &str = "tenant";

//=========================================================================================
// "Impure" Storage Record
//=========================================================================================

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct IdentityRecord {
    user_id: String,
    username: String,
    email: String,
    tenant: String,
    role: String,
    #[serde(default)]
    authorities: BTreeSet<String>,
    #[serde(default)]
    expires_at: Option<DateTime<Utc>>,
}

impl IdentityRecord {
    fn from_domain(identity: &Identity) -> Self {
        Self {
            user_id: identity.user_id.clone(),
            username: identity.username.clone(),
            email: identity.email.clone(),
            tenant: identity.tenant.clone(),
            role: identity.role.clone(),
            authorities: identity.authorities.clone(),
            expires_at: identity.expires_at,
        }
    }

    fn to_domain(self) -> Identity {
        Identity {
            user_id: self.user_id,
            username: self.username,
            email: self.email,
            tenant: self.tenant,
            role: self.role,
            authorities: self.authorities,
            expires_at: self.expires_at,
        }
    }
}

//=========================================================================================
// SessionStore
//=========================================================================================

/// Reads and writes the persisted session.
#[derive(Clone)]
pub struct SessionStore {
    storage: Arc<dyn Storage>,
}

impl SessionStore {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self { storage }
    }

    pub fn save(&self, session: &Session) -> PortResult<()> {
        let identity = serde_json::to_string(&IdentityRecord::from_domain(&session.identity))
            .map_err(|e| PortError::Unexpected(e.to_string()))?;
        self.storage.set(TOKEN_KEY, &session.token)?;
        self.storage.set(USER_KEY, &identity)
    }

    /// Returns the session only when both halves are present and readable.
    /// A half-written pair is cleared and reported as absent.
    pub fn load(&self) -> PortResult<Option<Session>> {
        let token = self.storage.get(TOKEN_KEY)?;
        let user = self.storage.get(USER_KEY)?;

        match (token, user) {
            (None, None) => Ok(None),
            (Some(token), Some(user)) => {
                match serde_json::from_str::<IdentityRecord>(&user) {
                    Ok(record) => Ok(Some(Session::new(token, record.to_domain()))),
                    Err(e) => {
                        warn!("Discarding persisted session with unreadable identity: {}", e);
                        self.clear()?;
                        Ok(None)
                    }
                }
            }
            _ => {
                warn!("Discarding partially persisted session");
                self.clear()?;
                Ok(None)
            }
        }
    }

    /// The bearer token of the persisted session, if there is a complete one.
    pub fn token(&self) -> PortResult<Option<String>> {
        Ok(self.load()?.map(|session| session.token))
    }

    pub fn clear(&self) -> PortResult<()> {
        self.storage.clear(TOKEN_KEY)?;
        self.storage.clear(USER_KEY)
    }

    pub fn tenant(&self) -> PortResult<Option<String>> {
        Ok(self
            .storage
            .get(TENANT_KEY)?
            .filter(|tenant| !tenant.trim().is_empty()))
    }

    pub fn set_tenant(&self, tenant: &str) -> PortResult<()> {
        self.storage.set(TENANT_KEY, tenant)
    }
}
