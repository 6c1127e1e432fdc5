pub mod api;
pub mod token;
pub mod user;

pub use api::{unwrap_data, ErrorBody};
pub use token::TokenPair;
pub use user::User;
