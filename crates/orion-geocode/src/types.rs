//! Response types for Nominatim-compatible `/search` and `/reverse` endpoints.
//!
//! Nominatim encodes `lat`/`lon` as JSON strings; some compatible services
//! send numbers. Both are accepted.

use orion_core::{Coordinates, SelectedLocation};
use serde::{Deserialize, Deserializer};

/// A place returned by forward or reverse lookup.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Place {
    #[serde(deserialize_with = "de_degrees")]
    pub lat: f64,
    #[serde(deserialize_with = "de_degrees")]
    pub lon: f64,
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub address: Address,
}

/// Structured address parts. Which keys are present depends on the place type.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Address {
    pub country: Option<String>,
    pub state: Option<String>,
    pub city: Option<String>,
    pub town: Option<String>,
    pub village: Option<String>,
    pub county: Option<String>,
}

impl Place {
    #[must_use]
    pub fn coordinates(&self) -> Coordinates {
        Coordinates::new(self.lat, self.lon)
    }

    /// The most useful sub-national name: state, then city, town, village, county.
    #[must_use]
    pub fn region(&self) -> Option<&str> {
        let a = &self.address;
        a.state
            .as_deref()
            .or(a.city.as_deref())
            .or(a.town.as_deref())
            .or(a.village.as_deref())
            .or(a.county.as_deref())
    }

    /// Converts the place into a picker selection pinned at `at`.
    ///
    /// The caller supplies the point so that a reverse lookup never moves the
    /// user's pin to the service's snapped coordinates. An empty display name
    /// falls back to the coordinate label.
    #[must_use]
    pub fn into_selection(self, at: Coordinates) -> SelectedLocation {
        let region = self.region().map(str::to_owned);
        let mut selection = SelectedLocation::from_coordinates(at);
        if !self.display_name.trim().is_empty() {
            selection.display_name = self.display_name;
        }
        selection.country = self.address.country;
        selection.region = region;
        selection
    }
}

/// Error envelope used by `/reverse` when nothing is found,
/// e.g. `{"error": "Unable to geocode"}`.
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorBody {
    pub error: String,
}

fn de_degrees<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(f64),
        Text(String),
    }

    match Raw::deserialize(deserializer)? {
        Raw::Number(n) => Ok(n),
        Raw::Text(s) => s.trim().parse::<f64>().map_err(serde::de::Error::custom),
    }
}

/// Builds the free-text query for a forward lookup.
///
/// `"region, country"` when both are filled, otherwise whichever is present.
#[must_use]
pub fn build_query(region: &str, country: &str) -> Option<String> {
    match (region.trim(), country.trim()) {
        ("", "") => None,
        (r, "") => Some(r.to_string()),
        ("", c) => Some(c.to_string()),
        (r, c) => Some(format!("{r}, {c}")),
    }
}
