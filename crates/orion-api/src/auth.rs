//! Bearer token supply for the backend client.

use std::future::Future;
use std::pin::Pin;

pub type TokenFuture<'a> = Pin<Box<dyn Future<Output = Option<String>> + Send + 'a>>;

/// Supplies the bearer token attached to every request.
///
/// `force_refresh` is set after the backend answered 401; implementations
/// backed by an identity provider should mint a new token instead of
/// returning a cached one. `None` sends the request unauthenticated.
pub trait TokenSource: Send + Sync {
    fn token(&self, force_refresh: bool) -> TokenFuture<'_>;
}

/// A fixed token, e.g. one pasted into `orion session login`.
///
/// Refreshing returns the same value, so a rejected token surfaces as
/// [`crate::ApiError::Unauthorized`] after the single retry.
pub struct StaticToken(String);

impl StaticToken {
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }
}

impl std::fmt::Debug for StaticToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("StaticToken([redacted])")
    }
}

impl TokenSource for StaticToken {
    fn token(&self, _force_refresh: bool) -> TokenFuture<'_> {
        let token = self.0.clone();
        Box::pin(async move { Some(token) })
    }
}
