//! Location picker: keeps one selected point consistent with the map marker,
//! the coordinate text fields and the optional country/region search fields.

pub mod debounce;
pub mod error;
pub mod picker;
pub mod reconcile;
pub mod sink;
pub mod suppress;

pub use debounce::Debounce;
pub use error::PickerError;
pub use picker::{
    DialogState, LocationPicker, Lookup, Outcome, PickerOptions, SaveBlocker, Ticket,
    DEFAULT_DEBOUNCE,
};
pub use reconcile::{reconcile, Channel, PickerFields, PickerInputs, Reconciliation};
pub use sink::{LocationDraft, LocationSink, PersistFuture};
pub use suppress::SuppressToken;
