//! Resource catalog: named collections of remote image locators.
//!
//! The catalog is fixed before acquisition starts. Collection order and the
//! order of locators inside each collection define the acquisition order and
//! the navigation order; neither is ever re-sorted.
//!
//! # Example
//!
//! ```ignore
//! use cupola::catalog::Catalog;
//!
//! let catalog = Catalog::cupola();
//! let window = catalog.collection_id("Window 1").unwrap();
//! assert_eq!(catalog.collection(window).unwrap().len(), 5);
//! assert_eq!(catalog.total(), 33);
//! ```

mod builtin;

use std::fmt;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

/// Errors that can occur while building or loading a catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// Two collections share the same name.
    #[error("Duplicate collection name: {0}")]
    DuplicateCollection(String),

    /// A collection was declared without a name.
    #[error("Collection names must not be empty")]
    EmptyName,

    /// The catalog file could not be read.
    #[error("Failed to read catalog {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The catalog file is not valid JSON for a catalog.
    #[error("Invalid catalog JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Opaque identifier of one remote image (a URL for the HTTP fetcher).
#[derive(Clone, Debug, PartialEq, Eq, Hash, Deserialize)]
#[serde(transparent)]
pub struct ResourceLocator(String);

impl ResourceLocator {
    /// Creates a locator from any string-like value.
    pub fn new(locator: impl Into<String>) -> Self {
        Self(locator.into())
    }

    /// Returns the locator text.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ResourceLocator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ResourceLocator {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for ResourceLocator {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Index of a collection inside its catalog.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CollectionId(pub(crate) usize);

impl CollectionId {
    /// Returns the zero-based catalog index of this collection.
    pub fn index(&self) -> usize {
        self.0
    }
}

/// Identity of one record: a (collection, position) pair.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RecordKey {
    /// Collection the record belongs to.
    pub collection: CollectionId,
    /// Zero-based position inside the collection.
    pub position: usize,
}

impl RecordKey {
    /// Creates a key for the given collection and position.
    pub fn new(collection: CollectionId, position: usize) -> Self {
        Self {
            collection,
            position,
        }
    }
}

/// A named, ordered group of locators.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct Collection {
    name: String,
    locators: Vec<ResourceLocator>,
}

impl Collection {
    /// Creates a collection from a name and its ordered locators.
    pub fn new<I, L>(name: impl Into<String>, locators: I) -> Self
    where
        I: IntoIterator<Item = L>,
        L: Into<ResourceLocator>,
    {
        Self {
            name: name.into(),
            locators: locators.into_iter().map(Into::into).collect(),
        }
    }

    /// Returns the collection name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the locators in navigation order.
    pub fn locators(&self) -> &[ResourceLocator] {
        &self.locators
    }

    /// Returns the locator at `position`.
    pub fn locator(&self, position: usize) -> Option<&ResourceLocator> {
        self.locators.get(position)
    }

    /// Number of locators in this collection.
    pub fn len(&self) -> usize {
        self.locators.len()
    }

    /// Whether this collection has no locators.
    pub fn is_empty(&self) -> bool {
        self.locators.is_empty()
    }
}

/// One catalog entry as visited by the acquisition walk.
#[derive(Clone, Copy, Debug)]
pub struct CatalogEntry<'a> {
    /// Record identity.
    pub key: RecordKey,
    /// Name of the owning collection.
    pub collection_name: &'a str,
    /// Locator to fetch.
    pub locator: &'a ResourceLocator,
    /// Zero-based index of this entry across the whole catalog.
    pub sequence: usize,
}

/// Immutable mapping of collection name to ordered locators.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Catalog {
    collections: Vec<Collection>,
    /// Catalog-wide sequence number of the first record of each collection.
    offsets: Vec<usize>,
    total: usize,
}

impl Catalog {
    /// Builds a catalog from collections, preserving their order.
    ///
    /// Fails if a name is empty or appears twice.
    pub fn from_collections(collections: Vec<Collection>) -> Result<Self, CatalogError> {
        for (i, collection) in collections.iter().enumerate() {
            if collection.name.trim().is_empty() {
                return Err(CatalogError::EmptyName);
            }
            if collections[..i].iter().any(|c| c.name == collection.name) {
                return Err(CatalogError::DuplicateCollection(collection.name.clone()));
            }
        }

        let mut offsets = Vec::with_capacity(collections.len());
        let mut total = 0;
        for collection in &collections {
            offsets.push(total);
            total += collection.len();
        }

        Ok(Self {
            collections,
            offsets,
            total,
        })
    }

    /// The seven-window ISS Cupola catalog.
    pub fn cupola() -> Self {
        let collections = builtin::CUPOLA_WINDOWS
            .iter()
            .map(|(name, urls)| Collection::new(*name, urls.iter().copied()))
            .collect();

        // Names in the built-in table are unique and non-empty.
        Self::from_collections(collections).unwrap_or_default()
    }

    /// Parses a catalog from an ordered JSON array of
    /// `{"name": ..., "locators": [...]}` objects.
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let collections: Vec<Collection> = serde_json::from_str(json)?;
        Self::from_collections(collections)
    }

    /// Loads a catalog JSON file.
    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        let json = std::fs::read_to_string(path).map_err(|source| CatalogError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&json)
    }

    /// Total number of records across all collections.
    pub fn total(&self) -> usize {
        self.total
    }

    /// Number of collections.
    pub fn collection_count(&self) -> usize {
        self.collections.len()
    }

    /// Iterates collections in catalog order.
    pub fn collections(&self) -> impl Iterator<Item = (CollectionId, &Collection)> {
        self.collections
            .iter()
            .enumerate()
            .map(|(i, c)| (CollectionId(i), c))
    }

    /// Returns a collection by id.
    pub fn collection(&self, id: CollectionId) -> Option<&Collection> {
        self.collections.get(id.0)
    }

    /// Looks up a collection by its name.
    pub fn collection_id(&self, name: &str) -> Option<CollectionId> {
        self.collections
            .iter()
            .position(|c| c.name == name)
            .map(CollectionId)
    }

    /// Returns the locator of a record.
    pub fn locator(&self, key: RecordKey) -> Option<&ResourceLocator> {
        self.collection(key.collection)?.locator(key.position)
    }

    /// Walks every entry: collections in catalog order, then positions in list order.
    pub fn entries(&self) -> impl Iterator<Item = CatalogEntry<'_>> {
        self.collections().flat_map(move |(id, collection)| {
            let base = self.offsets[id.0];
            collection
                .locators
                .iter()
                .enumerate()
                .map(move |(position, locator)| CatalogEntry {
                    key: RecordKey::new(id, position),
                    collection_name: collection.name(),
                    locator,
                    sequence: base + position,
                })
        })
    }
}
