//! `regform` - Registration form engine
//!
//! This library provides the registration form controller (field state,
//! validation, photo attachment and the submit state machine) together with
//! the record model, collaborator traits, and SQLite and local-directory
//! implementations of those collaborators.

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

pub mod backend;
pub mod blob;
pub mod cli;
pub mod config;
pub mod device;
pub mod error;
pub mod form;
pub mod listing;
pub mod logging;
pub mod record;
pub mod storage;

#[cfg(test)]
mod testing;

pub use backend::{Collaborators, UploadProgress};
pub use blob::LocalBlobStore;
pub use config::Config;
pub use device::{AlwaysGranted, FilePicker};
pub use error::{Error, Result, StoreFailure};
pub use form::{FormController, FormError, SubmitOutcome};
pub use listing::RecordListing;
pub use logging::init_logging;
pub use record::{RecordId, StoredRecord, SubmissionRecord};
pub use storage::SqliteRecordStore;
