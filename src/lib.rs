//! Client library for the EduPay admin API, shared between the UI shell and tests.

pub mod api;
pub mod config;
pub mod endpoints;
pub mod http;
pub mod models;
pub mod notify;
pub mod session;
pub mod store;
pub mod utils;
