pub mod auth;

pub use auth::{ChangePasswordData, LoginCredentials, LoginResponse, RegisterData};
