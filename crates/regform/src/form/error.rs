//! Errors surfaced by the form controller.

use thiserror::Error;

use super::photo::PhotoRejection;
use super::rules::ValidationReport;
use super::state::Field;
use crate::backend::{Capability, PhotoSource};
use crate::error::StoreFailure;

/// Error type for form operations.
///
/// None of these are fatal: the form stays usable after every one of them.
#[derive(Debug, Error)]
pub enum FormError {
    /// A keystroke was rejected; the field keeps its previous value.
    #[error("invalid {field}: {reason}")]
    InvalidInput {
        /// The field being edited.
        field: Field,
        /// Why the value was rejected.
        reason: String,
    },

    /// Full-form validation failed; nothing was written.
    #[error("validation failed: {0}")]
    Validation(ValidationReport),

    /// The user refused a device capability.
    #[error("{capability} permission denied")]
    PermissionDenied {
        /// The refused capability.
        capability: Capability,
    },

    /// The user backed out of the picker.
    #[error("photo selection cancelled")]
    PickerCancelled,

    /// The picker reported a failure.
    #[error("{origin} picker failed: {message}")]
    Picker {
        /// Camera or gallery.
        origin: PhotoSource,
        /// Picker-provided detail.
        message: String,
    },

    /// The picked photo broke a size or type limit and was discarded.
    #[error(transparent)]
    PhotoRejected(#[from] PhotoRejection),

    /// Writing the record failed; the form is unchanged and may be resubmitted.
    #[error("failed to save record ({kind}): {source}")]
    Store {
        /// Coarse classification for the user-facing message.
        kind: StoreFailure,
        /// Underlying store error.
        #[source]
        source: crate::Error,
    },
}

impl FormError {
    /// Create an invalid input error.
    pub fn invalid_input(field: Field, reason: impl Into<String>) -> Self {
        Self::InvalidInput {
            field,
            reason: reason.into(),
        }
    }

    /// Wrap a record store failure, classifying it.
    #[must_use]
    pub fn store(source: crate::Error) -> Self {
        Self::Store {
            kind: source.store_failure(),
            source,
        }
    }

    /// Title and body for a notice describing this error.
    #[must_use]
    pub fn notice(&self) -> (&'static str, String) {
        match self {
            Self::InvalidInput { reason, .. } => ("Invalid Input", reason.clone()),
            Self::Validation(report) => (
                "Validation Error",
                report
                    .first()
                    .map_or_else(String::new, |issue| issue.message.clone()),
            ),
            Self::PermissionDenied { capability } => (
                "Permission Denied",
                format!("{capability} permission is required to take a photo"),
            ),
            Self::PickerCancelled => ("Cancelled", "No photo was selected".to_string()),
            Self::Picker { message, .. } => ("Error", message.clone()),
            Self::PhotoRejected(rejection) => ("Invalid Image", rejection.to_string()),
            Self::Store { kind, .. } => {
                let (title, body) = kind.user_message();
                (title, body.to_string())
            }
        }
    }
}
