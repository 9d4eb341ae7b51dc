//! Geographic point types shared by the picker, the geocoder and the REST client.

use serde::{Deserialize, Serialize};

/// Country/region placeholder used when a reverse lookup fails.
pub const UNKNOWN_PLACE: &str = "Unknown";

/// A WGS84 point in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    #[must_use]
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// `true` when both components are finite and inside
    /// `[-90, 90]` / `[-180, 180]`.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && (-90.0..=90.0).contains(&self.latitude)
            && (-180.0..=180.0).contains(&self.longitude)
    }

    /// Copy of `self` with both components rounded to 6 decimal places.
    #[must_use]
    pub fn rounded(&self) -> Self {
        Self::new(round6(self.latitude), round6(self.longitude))
    }

    /// Compares two points at 6-decimal precision.
    #[must_use]
    pub fn same_point(&self, other: &Coordinates) -> bool {
        self.rounded() == other.rounded()
    }
}

impl std::fmt::Display for Coordinates {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&format_coordinate_label(self, 6))
    }
}

/// Rounds to 6 decimal places (~11 cm at the equator).
#[must_use]
pub fn round6(value: f64) -> f64 {
    (value * 1_000_000.0).round() / 1_000_000.0
}

/// Formats a point as `"{lat}, {lng}"` with a fixed number of decimals.
#[must_use]
pub fn format_coordinate_label(coordinates: &Coordinates, precision: usize) -> String {
    format!(
        "{:.p$}, {:.p$}",
        coordinates.latitude,
        coordinates.longitude,
        p = precision
    )
}

/// Parses the two free-text coordinate fields.
///
/// Returns `None` unless both trim to a number and the pair is in range.
/// Partial input such as `"-"` or `"1e"` is treated the same as garbage.
#[must_use]
pub fn parse_coordinate_text(latitude: &str, longitude: &str) -> Option<Coordinates> {
    let latitude = latitude.trim().parse::<f64>().ok()?;
    let longitude = longitude.trim().parse::<f64>().ok()?;
    let coordinates = Coordinates::new(latitude, longitude);
    coordinates.is_valid().then_some(coordinates)
}

/// The single point currently held by a location picker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectedLocation {
    pub coordinates: Coordinates,
    pub display_name: String,
    pub country: Option<String>,
    pub region: Option<String>,
}

impl SelectedLocation {
    /// A location labelled only by its own coordinates (4 decimals).
    #[must_use]
    pub fn from_coordinates(coordinates: Coordinates) -> Self {
        Self {
            coordinates,
            display_name: format_coordinate_label(&coordinates, 4),
            country: None,
            region: None,
        }
    }

    /// The location recorded when a reverse lookup fails.
    #[must_use]
    pub fn fallback(coordinates: Coordinates) -> Self {
        Self {
            country: Some(UNKNOWN_PLACE.to_string()),
            region: Some(UNKNOWN_PLACE.to_string()),
            ..Self::from_coordinates(coordinates)
        }
    }
}

/// Body of `POST /locations`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateLocation {
    pub display_name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub id_user: String,
}

/// A farm location as stored by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    #[serde(rename = "_id")]
    pub id: String,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default)]
    pub display_name: String,
}

impl Location {
    #[must_use]
    pub fn coordinates(&self) -> Coordinates {
        Coordinates::new(self.latitude, self.longitude)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_range_is_inclusive() {
        assert!(Coordinates::new(90.0, 180.0).is_valid());
        assert!(Coordinates::new(-90.0, -180.0).is_valid());
        assert!(!Coordinates::new(90.000_1, 0.0).is_valid());
        assert!(!Coordinates::new(0.0, -180.5).is_valid());
    }

    #[test]
    fn non_finite_is_invalid() {
        assert!(!Coordinates::new(f64::NAN, 0.0).is_valid());
        assert!(!Coordinates::new(0.0, f64::INFINITY).is_valid());
    }

    #[test]
    fn same_point_ignores_noise_below_six_decimals() {
        let a = Coordinates::new(35.676_200, 139.650_300);
        let b = Coordinates::new(35.676_200_4, 139.650_299_8);
        assert!(a.same_point(&b));
        let c = Coordinates::new(35.676_21, 139.650_3);
        assert!(!a.same_point(&c));
    }

    #[test]
    fn label_pads_to_requested_precision() {
        let c = Coordinates::new(40.712_8, -74.006);
        assert_eq!(format_coordinate_label(&c, 4), "40.7128, -74.0060");
        assert_eq!(format_coordinate_label(&c, 6), "40.712800, -74.006000");
    }

    #[test]
    fn parse_accepts_padded_numbers() {
        let c = parse_coordinate_text(" 35.676200 ", "139.650300").unwrap();
        assert!((c.latitude - 35.6762).abs() < 1e-9);
        assert!((c.longitude - 139.6503).abs() < 1e-9);
    }

    #[test]
    fn parse_rejects_partial_and_out_of_range_input() {
        assert!(parse_coordinate_text("", "10").is_none());
        assert!(parse_coordinate_text("10", "-").is_none());
        assert!(parse_coordinate_text("abc", "10").is_none());
        assert!(parse_coordinate_text("91", "10").is_none());
        assert!(parse_coordinate_text("10", "181").is_none());
        assert!(parse_coordinate_text("inf", "10").is_none());
    }

    #[test]
    fn fallback_uses_unknown_country_and_region() {
        let loc = SelectedLocation::fallback(Coordinates::new(40.712_8, -74.006));
        assert_eq!(loc.display_name, "40.7128, -74.0060");
        assert_eq!(loc.country.as_deref(), Some("Unknown"));
        assert_eq!(loc.region.as_deref(), Some("Unknown"));
    }

    #[test]
    fn location_reads_mongo_style_id() {
        let loc: Location = serde_json::from_value(serde_json::json!({
            "_id": "abc123",
            "latitude": 1.5,
            "longitude": 2.5,
            "display_name": "North field"
        }))
        .unwrap();
        assert_eq!(loc.id, "abc123");
        assert_eq!(loc.coordinates(), Coordinates::new(1.5, 2.5));
    }
}
