//! Per-resource image records and their publish-once store.
//!
//! An [`ImageRecord`] is immutable once built. The acquisition side never
//! edits a record in place: it builds a complete replacement and swaps it
//! into the [`RecordStore`] slot in one step, so readers only ever observe a
//! record that is either still settling (`Pending`/`InFlight`, no payload) or
//! fully populated (`Loaded` or `Failed`).
//!
//! ```text
//!   Pending ──► InFlight ──► Loaded
//!                   │
//!                   └──────► Failed ──(retry)──► InFlight ──► Loaded | Failed
//! ```

use std::fmt;
use std::sync::Arc;

use image::DynamicImage;
use parking_lot::RwLock;

use crate::catalog::{Catalog, CollectionId, RecordKey, ResourceLocator};

/// Load status of a record.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RecordStatus {
    /// Not yet visited by the acquisition walk.
    Pending,
    /// A fetch-and-decode is in progress; payload fields are not populated.
    InFlight,
    /// Decoded original and metadata are available.
    Loaded,
    /// Every allowed attempt failed; the last error is available.
    Failed,
}

impl RecordStatus {
    /// Whether the record has reached a terminal state for the current pass.
    pub fn is_settled(&self) -> bool {
        matches!(self, RecordStatus::Loaded | RecordStatus::Failed)
    }
}

impl fmt::Display for RecordStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            RecordStatus::Pending => "pending",
            RecordStatus::InFlight => "in-flight",
            RecordStatus::Loaded => "loaded",
            RecordStatus::Failed => "failed",
        };
        f.write_str(label)
    }
}

/// Descriptive metadata of a decoded image.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ImageMetadata {
    pub width: u32,
    pub height: u32,
    /// Container format, e.g. `PNG` or `JPEG`.
    pub format: String,
    /// Pixel layout, e.g. `RGB` or `L`.
    pub color_mode: String,
}

impl ImageMetadata {
    /// One-line description for an info bar.
    pub fn info_line(&self) -> String {
        format!(
            "Size: {}x{} | Format: {} | Mode: {}",
            self.width, self.height, self.format, self.color_mode
        )
    }
}

#[derive(Clone, Debug)]
enum Payload {
    None,
    Loaded {
        original: Arc<DynamicImage>,
        metadata: ImageMetadata,
    },
    Failed {
        error: String,
    },
}

/// State of one (collection, position) resource.
#[derive(Clone, Debug)]
pub struct ImageRecord {
    key: RecordKey,
    locator: ResourceLocator,
    status: RecordStatus,
    payload: Payload,
    attempt_count: u32,
}

impl ImageRecord {
    /// A record that has not been visited yet.
    pub fn pending(key: RecordKey, locator: ResourceLocator) -> Self {
        Self {
            key,
            locator,
            status: RecordStatus::Pending,
            payload: Payload::None,
            attempt_count: 0,
        }
    }

    /// Replacement marking this record as being fetched.
    pub(crate) fn to_in_flight(&self) -> Self {
        Self {
            key: self.key,
            locator: self.locator.clone(),
            status: RecordStatus::InFlight,
            payload: Payload::None,
            attempt_count: self.attempt_count,
        }
    }

    /// Replacement carrying a decoded original.
    pub(crate) fn to_loaded(
        &self,
        original: DynamicImage,
        metadata: ImageMetadata,
        attempts: u32,
    ) -> Self {
        Self {
            key: self.key,
            locator: self.locator.clone(),
            status: RecordStatus::Loaded,
            payload: Payload::Loaded {
                original: Arc::new(original),
                metadata,
            },
            attempt_count: self.attempt_count + attempts,
        }
    }

    /// Replacement carrying the last failure.
    pub(crate) fn to_failed(&self, error: impl Into<String>, attempts: u32) -> Self {
        Self {
            key: self.key,
            locator: self.locator.clone(),
            status: RecordStatus::Failed,
            payload: Payload::Failed {
                error: error.into(),
            },
            attempt_count: self.attempt_count + attempts,
        }
    }

    pub fn key(&self) -> RecordKey {
        self.key
    }

    pub fn locator(&self) -> &ResourceLocator {
        &self.locator
    }

    pub fn status(&self) -> RecordStatus {
        self.status
    }

    pub fn is_loaded(&self) -> bool {
        self.status == RecordStatus::Loaded
    }

    /// Decoded original, present iff the record is `Loaded`.
    pub fn original(&self) -> Option<&Arc<DynamicImage>> {
        match &self.payload {
            Payload::Loaded { original, .. } => Some(original),
            _ => None,
        }
    }

    /// Metadata, present iff the record is `Loaded`.
    pub fn metadata(&self) -> Option<&ImageMetadata> {
        match &self.payload {
            Payload::Loaded { metadata, .. } => Some(metadata),
            _ => None,
        }
    }

    /// Last failure text, present iff the record is `Failed`.
    pub fn last_error(&self) -> Option<&str> {
        match &self.payload {
            Payload::Failed { error } => Some(error),
            _ => None,
        }
    }

    /// Total fetch-and-decode attempts made for this record so far.
    pub fn attempt_count(&self) -> u32 {
        self.attempt_count
    }
}

/// Point-in-time count of records per status.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RecordCounts {
    pub pending: usize,
    pub in_flight: usize,
    pub loaded: usize,
    pub failed: usize,
}

impl RecordCounts {
    pub fn total(&self) -> usize {
        self.pending + self.in_flight + self.loaded + self.failed
    }
}

/// Arena of records indexed by (collection, position).
///
/// Each slot holds an `Arc<ImageRecord>` behind its own lock. Writers replace
/// the whole `Arc`; readers clone it and keep a consistent snapshot no matter
/// what is published afterwards.
#[derive(Debug)]
pub struct RecordStore {
    collections: Vec<Vec<RwLock<Arc<ImageRecord>>>>,
}

impl RecordStore {
    /// Creates one `Pending` record per catalog entry.
    pub fn new(catalog: &Catalog) -> Self {
        let collections = catalog
            .collections()
            .map(|(id, collection)| {
                collection
                    .locators()
                    .iter()
                    .enumerate()
                    .map(|(position, locator)| {
                        RwLock::new(Arc::new(ImageRecord::pending(
                            RecordKey::new(id, position),
                            locator.clone(),
                        )))
                    })
                    .collect()
            })
            .collect();

        Self { collections }
    }

    /// Current snapshot of one record.
    pub fn get(&self, key: RecordKey) -> Option<Arc<ImageRecord>> {
        self.collections
            .get(key.collection.index())?
            .get(key.position)
            .map(|slot| Arc::clone(&slot.read()))
    }

    /// Atomically replaces the record stored under `record.key()`.
    ///
    /// Returns the record that was replaced, or `None` if the key is unknown.
    pub(crate) fn publish(&self, record: ImageRecord) -> Option<Arc<ImageRecord>> {
        let key = record.key();
        let slot = self
            .collections
            .get(key.collection.index())?
            .get(key.position)?;
        let previous = std::mem::replace(&mut *slot.write(), Arc::new(record));
        Some(previous)
    }

    /// Snapshot of every record in one collection, in position order.
    pub fn collection(&self, id: CollectionId) -> Vec<Arc<ImageRecord>> {
        self.collections
            .get(id.index())
            .map(|slots| slots.iter().map(|s| Arc::clone(&s.read())).collect())
            .unwrap_or_default()
    }

    /// Positions of `Loaded` records in one collection, ascending.
    pub fn loaded_positions(&self, id: CollectionId) -> Vec<usize> {
        self.collection(id)
            .iter()
            .filter(|r| r.is_loaded())
            .map(|r| r.key().position)
            .collect()
    }

    /// Keys of every `Failed` record, in catalog order.
    pub fn failed_keys(&self) -> Vec<RecordKey> {
        self.snapshot()
            .iter()
            .filter(|r| r.status() == RecordStatus::Failed)
            .map(|r| r.key())
            .collect()
    }

    /// Snapshot of all records in catalog order.
    pub fn snapshot(&self) -> Vec<Arc<ImageRecord>> {
        self.collections
            .iter()
            .flat_map(|slots| slots.iter().map(|s| Arc::clone(&s.read())))
            .collect()
    }

    /// Counts records by status.
    pub fn counts(&self) -> RecordCounts {
        let mut counts = RecordCounts::default();
        for record in self.snapshot() {
            match record.status() {
                RecordStatus::Pending => counts.pending += 1,
                RecordStatus::InFlight => counts.in_flight += 1,
                RecordStatus::Loaded => counts.loaded += 1,
                RecordStatus::Failed => counts.failed += 1,
            }
        }
        counts
    }

    /// Total number of records.
    pub fn len(&self) -> usize {
        self.collections.iter().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
