//! Object-safe lookup seam so the picker can run against a fake in tests.

use std::future::Future;
use std::pin::Pin;

use orion_core::Coordinates;

use crate::client::GeocodeClient;
use crate::error::GeocodeError;
use crate::types::Place;

pub type LookupFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, GeocodeError>> + Send + 'a>>;

/// Forward and reverse place lookup.
pub trait Geocoder: Send + Sync {
    /// Free-text lookup; an empty vec means no match.
    fn search<'a>(&'a self, query: &'a str) -> LookupFuture<'a, Vec<Place>>;

    /// Point lookup.
    fn reverse(&self, at: Coordinates) -> LookupFuture<'_, Place>;
}

impl Geocoder for GeocodeClient {
    fn search<'a>(&'a self, query: &'a str) -> LookupFuture<'a, Vec<Place>> {
        Box::pin(GeocodeClient::search(self, query))
    }

    fn reverse(&self, at: Coordinates) -> LookupFuture<'_, Place> {
        Box::pin(GeocodeClient::reverse(self, at))
    }
}
