//! Record list view: fetch, delete and open for edit.

use std::cmp::Reverse;
use std::sync::Arc;

use tracing::{debug, info};

use crate::backend::RecordStore;
use crate::error::Result;
use crate::form::EditContext;
use crate::record::{RecordId, StoredRecord};

/// Sort records newest first; records without a creation time go last.
pub fn sort_newest_first(records: &mut [StoredRecord]) {
    records.sort_by_key(|record| Reverse(record.created_at()));
}

/// A cached listing of one collection.
pub struct RecordListing {
    store: Arc<dyn RecordStore>,
    collection: String,
    records: Vec<StoredRecord>,
}

impl std::fmt::Debug for RecordListing {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecordListing")
            .field("collection", &self.collection)
            .field("records", &self.records.len())
            .finish_non_exhaustive()
    }
}

impl RecordListing {
    /// Create an empty listing; call [`RecordListing::refresh`] to load it.
    #[must_use]
    pub fn new(store: Arc<dyn RecordStore>, collection: impl Into<String>) -> Self {
        Self {
            store,
            collection: collection.into(),
            records: Vec::new(),
        }
    }

    /// Re-fetch the collection.
    ///
    /// # Errors
    ///
    /// Returns an error if the store read fails; the previous listing is kept.
    pub async fn refresh(&mut self) -> Result<&[StoredRecord]> {
        let mut records = self.store.list(&self.collection).await?;
        sort_newest_first(&mut records);
        debug!(collection = %self.collection, count = records.len(), "Listing refreshed");
        self.records = records;
        Ok(&self.records)
    }

    /// The records from the last refresh, newest first.
    #[must_use]
    pub fn records(&self) -> &[StoredRecord] {
        &self.records
    }

    /// A record from the last refresh.
    #[must_use]
    pub fn find(&self, id: &RecordId) -> Option<&StoredRecord> {
        self.records.iter().find(|record| &record.id == id)
    }

    /// Remove a record and re-fetch the listing. There is no undo.
    ///
    /// # Errors
    ///
    /// Returns an error if the delete or the re-fetch fails.
    pub async fn delete(&mut self, id: &RecordId) -> Result<()> {
        self.store.delete(&self.collection, id).await?;
        info!(record_id = %id, "Record deleted");
        self.refresh().await?;
        Ok(())
    }

    /// Load a record fresh from the store for editing.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::RecordNotFound`] if it no longer exists.
    pub async fn open_for_edit(&self, id: &RecordId) -> Result<EditContext> {
        let stored = self.store.get(&self.collection, id).await?;
        Ok(EditContext::from(stored))
    }
}
