pub mod http;
pub mod navigator;
pub mod storage;

pub use http::ReqwestBackend;
pub use navigator::LogNavigator;
pub use storage::{FileStorage, MemoryStorage};
