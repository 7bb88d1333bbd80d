pub mod auth_store;
pub mod search_store;

pub use auth_store::{AuthState, AuthStore};
pub use search_store::{ResultView, SearchPhase, SearchState, SearchStore, Submission};
