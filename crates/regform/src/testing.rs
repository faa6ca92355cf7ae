//! Recording fakes for the collaborator traits.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use chrono::Utc;

use crate::backend::{
    BlobStore, Capability, Collaborators, ImageAsset, ImagePicker, PermissionGate,
    PermissionStatus, PhotoSource, PickResult, PickerOptions, RecordStore, UploadProgress,
};
use crate::error::{Error, Result};
use crate::record::{
    Education, Gender, RecordId, Stamp, StoredRecord, SubmissionRecord, Timestamps,
};

/// A call made against [`MemoryRecordStore`].
#[derive(Debug, Clone, PartialEq)]
pub enum StoreCall {
    Create(SubmissionRecord),
    Update(RecordId, SubmissionRecord),
    Get(RecordId),
    List,
    Delete(RecordId),
}

/// In-memory record store that logs every call.
#[derive(Debug, Default)]
pub struct MemoryRecordStore {
    records: Mutex<BTreeMap<(String, String), SubmissionRecord>>,
    calls: Mutex<Vec<StoreCall>>,
    fail_with: Mutex<Option<fn() -> Error>>,
}

impl MemoryRecordStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Make every subsequent write fail with the given error.
    pub fn fail_writes(&self, make: fn() -> Error) {
        *self.fail_with.lock().unwrap() = Some(make);
    }

    pub fn calls(&self) -> Vec<StoreCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn writes(&self) -> Vec<StoreCall> {
        self.calls()
            .into_iter()
            .filter(|c| matches!(c, StoreCall::Create(_) | StoreCall::Update(..)))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.records.lock().unwrap().len()
    }

    /// Insert a record directly, bypassing the call log.
    pub fn seed(&self, collection: &str, id: &str, record: SubmissionRecord) {
        self.records
            .lock()
            .unwrap()
            .insert((collection.to_string(), id.to_string()), record);
    }

    fn check_failure(&self) -> Result<()> {
        match *self.fail_with.lock().unwrap() {
            Some(make) => Err(make()),
            None => Ok(()),
        }
    }
}

fn resolve(stamp: Option<Stamp>) -> Option<Stamp> {
    stamp.map(|s| Stamp::At(s.resolve(Utc::now())))
}

#[async_trait::async_trait]
impl RecordStore for MemoryRecordStore {
    async fn create(&self, collection: &str, record: &SubmissionRecord) -> Result<RecordId> {
        self.calls
            .lock()
            .unwrap()
            .push(StoreCall::Create(record.clone()));
        self.check_failure()?;

        let id = RecordId::generate();
        let mut stored = record.clone();
        stored.timestamps = Timestamps {
            created_at: resolve(record.timestamps.created_at),
            updated_at: resolve(record.timestamps.updated_at),
        };
        self.seed(collection, id.as_str(), stored);
        Ok(id)
    }

    async fn update(
        &self,
        collection: &str,
        id: &RecordId,
        record: &SubmissionRecord,
    ) -> Result<()> {
        self.calls
            .lock()
            .unwrap()
            .push(StoreCall::Update(id.clone(), record.clone()));
        self.check_failure()?;

        let mut records = self.records.lock().unwrap();
        let key = (collection.to_string(), id.as_str().to_string());
        let Some(existing) = records.get_mut(&key) else {
            return Err(Error::record_not_found(collection, id.as_str()));
        };
        let created_at = record
            .timestamps
            .created_at
            .map_or(existing.timestamps.created_at, |s| resolve(Some(s)));
        *existing = record.clone();
        existing.timestamps = Timestamps {
            created_at,
            updated_at: resolve(record.timestamps.updated_at),
        };
        Ok(())
    }

    async fn get(&self, collection: &str, id: &RecordId) -> Result<StoredRecord> {
        self.calls.lock().unwrap().push(StoreCall::Get(id.clone()));
        self.records
            .lock()
            .unwrap()
            .get(&(collection.to_string(), id.as_str().to_string()))
            .map(|record| StoredRecord {
                id: id.clone(),
                record: record.clone(),
            })
            .ok_or_else(|| Error::record_not_found(collection, id.as_str()))
    }

    async fn list(&self, collection: &str) -> Result<Vec<StoredRecord>> {
        self.calls.lock().unwrap().push(StoreCall::List);
        Ok(self
            .records
            .lock()
            .unwrap()
            .iter()
            .filter(|((coll, _), _)| coll == collection)
            .map(|((_, id), record)| StoredRecord {
                id: RecordId::from(id.as_str()),
                record: record.clone(),
            })
            .collect())
    }

    async fn delete(&self, collection: &str, id: &RecordId) -> Result<()> {
        self.calls
            .lock()
            .unwrap()
            .push(StoreCall::Delete(id.clone()));
        self.check_failure()?;
        self.records
            .lock()
            .unwrap()
            .remove(&(collection.to_string(), id.as_str().to_string()));
        Ok(())
    }
}

/// How [`FakeBlobStore`] answers.
#[derive(Debug, Clone)]
pub enum BlobBehaviour {
    Succeed(String),
    Fail,
    Hang,
}

/// Blob store that records which assets it was asked to store.
#[derive(Debug)]
pub struct FakeBlobStore {
    behaviour: BlobBehaviour,
    stored: Mutex<Vec<String>>,
}

impl FakeBlobStore {
    pub fn new(behaviour: BlobBehaviour) -> Arc<Self> {
        Arc::new(Self {
            behaviour,
            stored: Mutex::new(Vec::new()),
        })
    }

    pub fn stored(&self) -> Vec<String> {
        self.stored.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl BlobStore for FakeBlobStore {
    async fn store(&self, asset: &ImageAsset, progress: &UploadProgress) -> Result<String> {
        self.stored.lock().unwrap().push(asset.uri.clone());
        match &self.behaviour {
            BlobBehaviour::Succeed(reference) => {
                progress.report(50, 100);
                progress.report(100, 100);
                Ok(reference.clone())
            }
            BlobBehaviour::Fail => Err(Error::blob_store(&asset.uri, "bucket unreachable")),
            BlobBehaviour::Hang => std::future::pending().await,
        }
    }
}

/// Permission gate with a fixed answer.
#[derive(Debug)]
pub struct FixedPermission {
    pub status: PermissionStatus,
    pub requests: AtomicUsize,
}

impl FixedPermission {
    pub fn new(status: PermissionStatus) -> Arc<Self> {
        Arc::new(Self {
            status,
            requests: AtomicUsize::new(0),
        })
    }

    pub fn request_count(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl PermissionGate for FixedPermission {
    async fn request(&self, _capability: Capability) -> PermissionStatus {
        self.requests.fetch_add(1, Ordering::SeqCst);
        self.status
    }
}

/// Picker with a fixed answer.
#[derive(Debug)]
pub struct FixedPicker {
    pub result: PickResult,
    pub picks: Mutex<Vec<PhotoSource>>,
}

impl FixedPicker {
    pub fn new(result: PickResult) -> Arc<Self> {
        Arc::new(Self {
            result,
            picks: Mutex::new(Vec::new()),
        })
    }

    pub fn pick_count(&self) -> usize {
        self.picks.lock().unwrap().len()
    }
}

#[async_trait::async_trait]
impl ImagePicker for FixedPicker {
    async fn pick(&self, source: PhotoSource, _options: &PickerOptions) -> PickResult {
        self.picks.lock().unwrap().push(source);
        self.result.clone()
    }
}

/// A set of fakes plus the [`Collaborators`] bundle wired to them.
#[derive(Debug)]
pub struct Harness {
    pub records: Arc<MemoryRecordStore>,
    pub blobs: Arc<FakeBlobStore>,
    pub permissions: Arc<FixedPermission>,
    pub picker: Arc<FixedPicker>,
}

impl Harness {
    pub fn new() -> Self {
        Self::with(
            BlobBehaviour::Succeed("https://blobs.test/photo.jpg".to_string()),
            PermissionStatus::Granted,
            PickResult::Asset(jpeg_asset(200_000)),
        )
    }

    pub fn with(blobs: BlobBehaviour, permission: PermissionStatus, pick: PickResult) -> Self {
        Self {
            records: MemoryRecordStore::new(),
            blobs: FakeBlobStore::new(blobs),
            permissions: FixedPermission::new(permission),
            picker: FixedPicker::new(pick),
        }
    }

    pub fn collaborators(&self) -> Collaborators {
        Collaborators {
            records: self.records.clone(),
            blobs: self.blobs.clone(),
            permissions: self.permissions.clone(),
            picker: self.picker.clone(),
        }
    }
}

pub fn jpeg_asset(size: u64) -> ImageAsset {
    ImageAsset {
        uri: "file:///tmp/picked.jpg".to_string(),
        file_name: Some("picked.jpg".to_string()),
        file_size: Some(size),
        mime_type: Some("image/jpeg".to_string()),
    }
}

/// A minimal valid record for seeding stores.
pub fn sample_record(name: &str) -> SubmissionRecord {
    SubmissionRecord {
        name: name.to_string(),
        mobile_number: "9876543210".to_string(),
        gender: Gender::Other,
        marital_status: Vec::new(),
        state: "Goa".to_string(),
        email: "someone@example.com".to_string(),
        education: Education::Other,
        photo_ref: None,
        timestamps: Timestamps::default(),
    }
}
