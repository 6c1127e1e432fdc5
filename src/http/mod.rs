pub mod client;
pub mod error;
pub mod refresh;

pub use client::ApiClient;
pub use error::{ApiError, NetworkErrorKind};
