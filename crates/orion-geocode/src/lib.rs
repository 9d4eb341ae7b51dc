//! Forward and reverse geocoding against a Nominatim-compatible service.

pub mod client;
pub mod error;
pub mod geocoder;
pub mod types;

pub use client::GeocodeClient;
pub use error::GeocodeError;
pub use geocoder::{Geocoder, LookupFuture};
pub use types::{build_query, Address, Place};
