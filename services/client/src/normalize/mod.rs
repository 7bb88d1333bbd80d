//! services/client/src/normalize/mod.rs
//!
//! Pure functions that reshape raw backend payloads into domain types.

pub mod auth;
pub mod search;
pub(crate) mod wire;

pub use auth::{decode_identity, locate_token, normalize_auth_response, TokenLocation};
pub use search::{
    detect_shape, normalize_answer_response, normalize_document_lookup,
    normalize_search_response, ResultsShape,
};
