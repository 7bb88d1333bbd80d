//! The academic search client: transport, response normalization, and the
//! state containers a UI layer renders from.

pub mod adapters;
pub mod api_client;
pub mod config;
pub mod error;
pub mod normalize;
pub mod services;
pub mod session;
pub mod store;

pub use api_client::{ApiClient, RawResponse};
pub use config::Config;
pub use error::{ClientError, ClientResult};
pub use session::SessionStore;
