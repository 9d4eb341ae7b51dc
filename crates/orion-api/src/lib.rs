//! Client for the Orion REST backend.

pub mod auth;
pub mod client;
pub mod error;
pub(crate) mod retry;

pub use auth::{StaticToken, TokenFuture, TokenSource};
pub use client::ApiClient;
pub use error::ApiError;
