use orion_core::FieldError;
use thiserror::Error;

use crate::picker::SaveBlocker;

#[derive(Debug, Error)]
pub enum PickerError {
    #[error("location picker is not open")]
    NotOpen,

    #[error("cannot save yet: {}", join(.0))]
    NotReady(Vec<SaveBlocker>),

    #[error("invalid location form: {}", join(.0))]
    Invalid(Vec<FieldError>),

    /// The sink rejected the location; the picker keeps its state for a retry.
    #[error("failed to save location: {source}")]
    Persist {
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

fn join<T: std::fmt::Display>(items: &[T]) -> String {
    items
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
