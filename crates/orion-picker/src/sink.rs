//! Where a saved location goes.

use std::future::Future;
use std::pin::Pin;

use orion_core::{Coordinates, CreateLocation};

pub type PersistFuture<'a> =
    Pin<Box<dyn Future<Output = Result<(), Box<dyn std::error::Error + Send + Sync>>> + Send + 'a>>;

/// The location handed over on save.
#[derive(Debug, Clone, PartialEq)]
pub struct LocationDraft {
    pub display_name: String,
    pub coordinates: Coordinates,
    pub country: Option<String>,
    pub region: Option<String>,
}

impl LocationDraft {
    /// Request body for `POST /locations`.
    #[must_use]
    pub fn into_create(self, id_user: &str) -> CreateLocation {
        CreateLocation {
            display_name: self.display_name,
            latitude: self.coordinates.latitude,
            longitude: self.coordinates.longitude,
            id_user: id_user.to_owned(),
        }
    }
}

/// Persists a saved location, typically through the REST backend.
pub trait LocationSink: Send + Sync {
    fn persist<'a>(&'a self, draft: &'a LocationDraft) -> PersistFuture<'a>;
}
