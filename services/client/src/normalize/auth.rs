//! services/client/src/normalize/auth.rs
//!
//! Turns a raw login/register response into a `Session`.
//!
//! The backend has placed the token in several different spots over time.
//! `TokenLocation::ORDER` is the precedence contract: the first location that
//! yields a non-empty token wins and nothing is merged.

use crate::api_client::RawResponse;
use crate::error::{ClientError, ClientResult};
use crate::normalize::wire::{lenient, lenient_number, lenient_strings};
use academic_search_core::domain::{Identity, Session};
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

/// Where a token was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenLocation {
    /// `body.accessToken`
    AccessToken,
    /// `body.data.accessToken`
    DataAccessToken,
    /// `body.data.token`
    DataToken,
    /// `body.token`
    Token,
    /// `body.data` when it is itself a string
    DataString,
    /// `Authorization` header, minus a leading `Bearer `
    AuthorizationHeader,
    /// `x-auth-token` header
    AuthTokenHeader,
    /// The configured fallback token
    Fallback,
}

impl TokenLocation {
    /// Precedence order, highest first.
    pub const ORDER: [TokenLocation; 8] = [
        TokenLocation::AccessToken,
        TokenLocation::DataAccessToken,
        TokenLocation::DataToken,
        TokenLocation::Token,
        TokenLocation::DataString,
        TokenLocation::AuthorizationHeader,
        TokenLocation::AuthTokenHeader,
        TokenLocation::Fallback,
    ];

    /// Looks for a token at this location only.
    pub fn extract(&self, raw: &RawResponse, fallback: Option<&str>) -> Option<String> {
        let body = &raw.body;
        let found = match self {
            TokenLocation::AccessToken => body.get("accessToken").and_then(Value::as_str),
            TokenLocation::DataAccessToken => body
                .get("data")
                .and_then(|data| data.get("accessToken"))
                .and_then(Value::as_str),
            TokenLocation::DataToken => body
                .get("data")
                .and_then(|data| data.get("token"))
                .and_then(Value::as_str),
            TokenLocation::Token => body.get("token").and_then(Value::as_str),
            TokenLocation::DataString => body.get("data").and_then(Value::as_str),
            TokenLocation::AuthorizationHeader => raw
                .header("authorization")
                .map(|value| value.strip_prefix("Bearer ").unwrap_or(value)),
            TokenLocation::AuthTokenHeader => raw.header("x-auth-token"),
            TokenLocation::Fallback => fallback,
        };

        found
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .map(str::to_string)
    }
}

/// Finds the highest-precedence token in `raw`.
pub fn locate_token(raw: &RawResponse, fallback: Option<&str>) -> Option<(TokenLocation, String)> {
    TokenLocation::ORDER
        .iter()
        .find_map(|location| location.extract(raw, fallback).map(|token| (*location, token)))
}

//=========================================================================================
// Claims Decoding
//=========================================================================================

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
struct ClaimsWire {
    #[serde(deserialize_with = "lenient")]
    user_id: Option<String>,
    #[serde(deserialize_with = "lenient")]
    sub: Option<String>,
    #[serde(deserialize_with = "lenient")]
    username: Option<String>,
    #[serde(deserialize_with = "lenient")]
    email: Option<String>,
    #[serde(deserialize_with = "lenient")]
    tenant: Option<String>,
    #[serde(deserialize_with = "lenient")]
    role: Option<String>,
    #[serde(deserialize_with = "lenient_strings")]
    authorities: Vec<String>,
    #[serde(deserialize_with = "lenient_number")]
    exp: Option<i64>,
}

impl ClaimsWire {
    fn has_identity(&self) -> bool {
        self.user_id.is_some()
            || self.sub.is_some()
            || self.username.is_some()
            || self.email.is_some()
    }

    fn to_domain(self) -> Identity {
        Identity {
            user_id: self.user_id.or(self.sub).unwrap_or_default(),
            username: self.username.unwrap_or_default(),
            email: self.email.unwrap_or_default(),
            tenant: self.tenant.unwrap_or_default(),
            role: self.role.unwrap_or_default(),
            authorities: self.authorities.into_iter().collect(),
            expires_at: self.exp.and_then(|exp| DateTime::<Utc>::from_timestamp(exp, 0)),
        }
    }
}

/// Decodes the claims segment of a JWT into an `Identity`.
///
/// The signature is not checked; the identity is a display and authorization
/// hint, the backend remains the authority.
pub fn decode_identity(token: &str) -> ClientResult<Identity> {
    let mut segments = token.split('.');
    let claims_segment = match (segments.next(), segments.next()) {
        (Some(_), Some(claims)) if !claims.is_empty() => claims,
        _ => return Err(ClientError::InvalidToken),
    };

    let bytes = URL_SAFE_NO_PAD
        .decode(claims_segment.trim_end_matches('='))
        .map_err(|_| ClientError::InvalidToken)?;
    let claims: Value = serde_json::from_slice(&bytes).map_err(|_| ClientError::InvalidToken)?;
    if !claims.is_object() {
        return Err(ClientError::InvalidToken);
    }

    let claims: ClaimsWire =
        serde_json::from_value(claims).map_err(|_| ClientError::InvalidToken)?;
    if !claims.has_identity() {
        return Err(ClientError::InvalidToken);
    }
    Ok(claims.to_domain())
}

/// Locates the token in `raw`, decodes it, and builds the session.
///
/// Persisting the session is the caller's job.
pub fn normalize_auth_response(raw: &RawResponse, fallback: Option<&str>) -> ClientResult<Session> {
    let (location, token) = locate_token(raw, fallback).ok_or(ClientError::NoToken)?;
    if location == TokenLocation::Fallback {
        warn!("Token not found in response, using the configured fallback token");
    } else {
        debug!("Token found at {:?}", location);
    }

    let identity = decode_identity(&token)?;
    Ok(Session::new(token, identity))
}
