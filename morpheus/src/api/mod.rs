pub mod auth;
pub mod client;
pub mod clouds;
pub mod common;
pub mod credentials;
pub mod error;
pub mod integrations;
pub mod library;
pub mod roles;
pub mod users;

#[cfg(test)]
pub mod test_helpers;

pub use client::{Client, ConnectionConfig, RetryConfig};
pub use common::ApiErrorDetails;
pub use error::ApiError;
