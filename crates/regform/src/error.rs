//! Error types for regform.
//!
//! This module defines the crate-level error type used by the storage,
//! configuration and blob layers. Form-level failures (rejected input,
//! validation, permission prompts) live in [`crate::form::FormError`].

use std::path::PathBuf;
use thiserror::Error;

/// The main error type for regform operations.
#[derive(Error, Debug)]
pub enum Error {
    // === Storage Errors ===
    /// Failed to open or create the database.
    #[error("failed to open database at {path}: {source}")]
    DatabaseOpen {
        /// Path to the database file.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: rusqlite::Error,
    },

    /// A database query failed.
    #[error("database query failed: {0}")]
    DatabaseQuery(#[from] rusqlite::Error),

    /// Failed to run database migrations.
    #[error("database migration failed: {message}")]
    DatabaseMigration {
        /// Description of what went wrong.
        message: String,
    },

    /// No record exists with the given id.
    #[error("record '{id}' not found in collection '{collection}'")]
    RecordNotFound {
        /// Collection that was searched.
        collection: String,
        /// The missing record id.
        id: String,
    },

    /// A stored document could not be decoded.
    #[error("corrupt record '{id}': {message}")]
    CorruptRecord {
        /// Id of the offending record.
        id: String,
        /// Description of the decoding failure.
        message: String,
    },

    // === Configuration Errors ===
    /// Failed to load configuration.
    #[error("failed to load configuration: {0}")]
    ConfigLoad(Box<figment::Error>),

    /// Configuration validation failed.
    #[error("invalid configuration: {message}")]
    ConfigValidation {
        /// Description of the validation failure.
        message: String,
    },

    // === Blob Errors ===
    /// The blob store could not persist an asset.
    #[error("failed to store photo from {source_uri}: {message}")]
    BlobStore {
        /// URI of the asset being stored.
        source_uri: String,
        /// Description of what went wrong.
        message: String,
    },

    // === I/O Errors ===
    /// File system operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to create a required directory.
    #[error("failed to create directory {path}: {source}")]
    DirectoryCreate {
        /// Path that couldn't be created.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    // === Serialization Errors ===
    /// JSON serialization/deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // === Generic Errors ===
    /// The store backend is temporarily unreachable.
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// The caller lacks permission for the store operation.
    #[error("store permission denied: {0}")]
    PermissionDenied(String),

    /// An internal error occurred (bug).
    #[error("internal error: {0}")]
    Internal(String),
}

/// A specialized Result type for regform operations.
pub type Result<T> = std::result::Result<T, Error>;

impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Self::ConfigLoad(Box::new(err))
    }
}

/// Classification of a failed record-store write, as shown to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreFailure {
    /// The store refused the write.
    PermissionDenied,
    /// The store could not be reached (network or backend down).
    Unavailable,
    /// Anything else.
    Unknown,
}

impl StoreFailure {
    /// Title and body of the notice shown for this failure.
    #[must_use]
    pub fn user_message(&self) -> (&'static str, &'static str) {
        match self {
            Self::PermissionDenied => (
                "Permission Error",
                "You do not have permission to save data. Please check the store's access rules.",
            ),
            Self::Unavailable => (
                "Network Error",
                "Database is currently unavailable. Please check your connection.",
            ),
            Self::Unknown => ("Error", "Failed to save user data."),
        }
    }
}

impl std::fmt::Display for StoreFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::PermissionDenied => write!(f, "permission_denied"),
            Self::Unavailable => write!(f, "unavailable"),
            Self::Unknown => write!(f, "unknown"),
        }
    }
}

impl Error {
    /// Create a new internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Create a blob store error for the given asset URI.
    #[must_use]
    pub fn blob_store(source_uri: impl Into<String>, message: impl Into<String>) -> Self {
        Self::BlobStore {
            source_uri: source_uri.into(),
            message: message.into(),
        }
    }

    /// Create a record-not-found error.
    #[must_use]
    pub fn record_not_found(collection: impl Into<String>, id: impl Into<String>) -> Self {
        Self::RecordNotFound {
            collection: collection.into(),
            id: id.into(),
        }
    }

    /// Check if this error means the record does not exist.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::RecordNotFound { .. })
    }

    /// Classify this error as a record-store failure.
    ///
    /// SQLite result codes are mapped onto the same three buckets a hosted
    /// document store reports.
    #[must_use]
    pub fn store_failure(&self) -> StoreFailure {
        match self {
            Self::PermissionDenied(_) => StoreFailure::PermissionDenied,
            Self::Unavailable(_) | Self::DatabaseOpen { .. } => StoreFailure::Unavailable,
            Self::DatabaseQuery(err) => classify_sqlite(err),
            _ => StoreFailure::Unknown,
        }
    }
}

fn classify_sqlite(err: &rusqlite::Error) -> StoreFailure {
    use rusqlite::ErrorCode;

    match err.sqlite_error_code() {
        Some(
            ErrorCode::ReadOnly
            | ErrorCode::PermissionDenied
            | ErrorCode::AuthorizationForStatementDenied,
        ) => StoreFailure::PermissionDenied,
        Some(
            ErrorCode::DatabaseBusy
            | ErrorCode::DatabaseLocked
            | ErrorCode::CannotOpen
            | ErrorCode::SystemIoFailure
            | ErrorCode::DiskFull,
        ) => StoreFailure::Unavailable,
        _ => StoreFailure::Unknown,
    }
}
