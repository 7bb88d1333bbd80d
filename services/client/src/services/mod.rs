pub mod auth;
pub mod documents;
pub mod search;

pub use auth::AuthService;
pub use documents::DocumentService;
pub use search::{SearchOutcome, SearchService};
