//! The pure decision taken when a channel's debounce window expires.

use orion_core::{parse_coordinate_text, Coordinates, SelectedLocation};
use orion_geocode::build_query;

/// Text-field inputs that feed the picker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Channel {
    /// Latitude and longitude fields.
    Coordinates,
    /// Country and region fields (forward-search variant only).
    Search,
}

/// Current text of every form field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PickerFields {
    pub farm_name: String,
    pub latitude: String,
    pub longitude: String,
    pub country: String,
    pub region: String,
}

/// Snapshot handed to [`reconcile`].
#[derive(Debug, Clone, Copy)]
pub struct PickerInputs<'a> {
    pub fields: &'a PickerFields,
    pub held: Option<&'a SelectedLocation>,
    pub reverse_geocode: bool,
    pub forward_search: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Reconciliation {
    /// Nothing to do: text is incomplete or already matches the held point.
    Ignore,
    /// Hold the typed point with a coordinate label, no lookup.
    Derive(Coordinates),
    /// Hold the typed point and reverse-geocode it for a label.
    Resolve(Coordinates),
    /// Forward-geocode this query.
    Search(String),
}

/// Decides what an expired `channel` should do given the latest inputs.
#[must_use]
pub fn reconcile(channel: Channel, inputs: &PickerInputs<'_>) -> Reconciliation {
    match channel {
        Channel::Coordinates => {
            let Some(candidate) =
                parse_coordinate_text(&inputs.fields.latitude, &inputs.fields.longitude)
            else {
                return Reconciliation::Ignore;
            };
            if inputs
                .held
                .is_some_and(|held| held.coordinates.same_point(&candidate))
            {
                return Reconciliation::Ignore;
            }
            if inputs.reverse_geocode {
                Reconciliation::Resolve(candidate)
            } else {
                Reconciliation::Derive(candidate)
            }
        }
        Channel::Search => {
            if !inputs.forward_search {
                return Reconciliation::Ignore;
            }
            build_query(&inputs.fields.region, &inputs.fields.country)
                .map_or(Reconciliation::Ignore, Reconciliation::Search)
        }
    }
}
