//! Viewer session: active image, navigation and slideshow.
//!
//! Navigation only ever considers `Loaded` records. Records that are still
//! pending, in flight or failed are skipped, so a partially acquired catalog
//! can be browsed while acquisition is still running.

mod slideshow;

pub use slideshow::{Slideshow, DEFAULT_SLIDESHOW_INTERVAL_MS};

use std::time::Duration;

use thiserror::Error;
use tokio::runtime::Handle;
use tracing::debug;

use crate::catalog::{Catalog, CollectionId, RecordKey};
use crate::record::RecordStore;
use crate::transform::TransformState;

/// Navigation preconditions that could not be met.
///
/// None of these are fatal; the session is left unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NavigationError {
    #[error("No images available in {collection}")]
    NoLoadedItems { collection: String },

    #[error("Unknown collection: {0}")]
    UnknownCollection(String),

    #[error("No image is being viewed")]
    NoActiveImage,
}

/// Presentation state of the viewer.
#[derive(Debug, Default)]
pub struct Session {
    active: Option<RecordKey>,
    transform: TransformState,
    slideshow: Slideshow,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// The collection being viewed, if any.
    pub fn active_collection(&self) -> Option<CollectionId> {
        self.active.map(|key| key.collection)
    }

    /// The record being viewed, if any.
    pub fn active_key(&self) -> Option<RecordKey> {
        self.active
    }

    pub fn transform(&self) -> &TransformState {
        &self.transform
    }

    pub fn transform_mut(&mut self) -> &mut TransformState {
        &mut self.transform
    }

    /// Views the first `Loaded` record at or after `index` in `collection`,
    /// wrapping to the first `Loaded` record when none follows.
    ///
    /// Fails without changing the session when the collection has no
    /// `Loaded` record.
    pub fn show_image(
        &mut self,
        catalog: &Catalog,
        records: &RecordStore,
        collection: CollectionId,
        index: usize,
    ) -> Result<RecordKey, NavigationError> {
        let name = catalog
            .collection(collection)
            .ok_or_else(|| NavigationError::UnknownCollection(format!("#{}", collection.index())))?
            .name();

        let loaded = records.loaded_positions(collection);
        let position = loaded
            .iter()
            .copied()
            .find(|&p| p >= index)
            .or_else(|| loaded.first().copied())
            .ok_or_else(|| NavigationError::NoLoadedItems {
                collection: name.to_string(),
            })?;

        let key = RecordKey::new(collection, position);
        self.switch_to(key);
        debug!(collection = name, position, requested = index, "Showing image");
        Ok(key)
    }

    /// [`Session::show_image`] with the collection looked up by name.
    pub fn show_image_by_name(
        &mut self,
        catalog: &Catalog,
        records: &RecordStore,
        collection: &str,
        index: usize,
    ) -> Result<RecordKey, NavigationError> {
        let id = catalog
            .collection_id(collection)
            .ok_or_else(|| NavigationError::UnknownCollection(collection.to_string()))?;
        self.show_image(catalog, records, id, index)
    }

    /// Advances to the next `Loaded` record of the active collection,
    /// wrapping around. A no-op when at most one record is loaded.
    pub fn next(&mut self, records: &RecordStore) -> Result<RecordKey, NavigationError> {
        self.step(records, Direction::Forward)
    }

    /// Retreats to the previous `Loaded` record of the active collection,
    /// wrapping around. A no-op when at most one record is loaded.
    pub fn previous(&mut self, records: &RecordStore) -> Result<RecordKey, NavigationError> {
        self.step(records, Direction::Backward)
    }

    fn step(
        &mut self,
        records: &RecordStore,
        direction: Direction,
    ) -> Result<RecordKey, NavigationError> {
        let current = self.active.ok_or(NavigationError::NoActiveImage)?;
        let loaded = records.loaded_positions(current.collection);
        if loaded.len() <= 1 {
            return Ok(current);
        }

        // The active record is always loaded, but stay well defined if it is
        // somehow missing from the list.
        let position = match loaded.binary_search(&current.position) {
            Ok(i) => match direction {
                Direction::Forward => loaded[(i + 1) % loaded.len()],
                Direction::Backward => loaded[(i + loaded.len() - 1) % loaded.len()],
            },
            Err(i) => match direction {
                Direction::Forward => loaded[i % loaded.len()],
                Direction::Backward => loaded[(i + loaded.len() - 1) % loaded.len()],
            },
        };

        let key = RecordKey::new(current.collection, position);
        self.switch_to(key);
        Ok(key)
    }

    /// Leaves the viewer. Stops the slideshow and clears the active image.
    pub fn return_to_overview(&mut self) {
        self.slideshow.stop();
        self.active = None;
        self.transform.reset_all();
        debug!("Returned to overview");
    }

    /// `"<collection> - Image k/n"` where k is the rank of the active record
    /// among the `Loaded` records of its collection.
    pub fn position_label(&self, catalog: &Catalog, records: &RecordStore) -> Option<String> {
        let key = self.active?;
        let name = catalog.collection(key.collection)?.name();
        let loaded = records.loaded_positions(key.collection);
        let rank = loaded.iter().position(|&p| p == key.position)?;
        Some(format!("{} - Image {}/{}", name, rank + 1, loaded.len()))
    }

    /// Starts the slideshow, or stops it when it is already running.
    ///
    /// Returns whether the slideshow is running afterwards.
    pub fn toggle_slideshow(
        &mut self,
        runtime: &Handle,
        interval: Duration,
    ) -> Result<bool, NavigationError> {
        if self.slideshow.stop() {
            return Ok(false);
        }
        if self.active.is_none() {
            return Err(NavigationError::NoActiveImage);
        }
        self.slideshow.start(runtime, interval);
        Ok(true)
    }

    /// Stops the slideshow. A no-op when it is not running.
    pub fn stop_slideshow(&mut self) {
        self.slideshow.stop();
    }

    pub fn is_slideshow_active(&self) -> bool {
        self.slideshow.is_active()
    }

    /// Applies pending slideshow ticks, advancing once per tick.
    ///
    /// Returns the active key if at least one tick was applied.
    pub fn poll_slideshow(&mut self, records: &RecordStore) -> Option<RecordKey> {
        let ticks = self.slideshow.take_ticks();
        let mut shown = None;
        for _ in 0..ticks {
            shown = self.next(records).ok();
        }
        shown
    }

    /// Waits for the next slideshow tick and advances.
    ///
    /// Returns `None` when the slideshow is not running.
    pub async fn advance_on_tick(&mut self, records: &RecordStore) -> Option<RecordKey> {
        if !self.slideshow.next_tick().await {
            return None;
        }
        self.next(records).ok()
    }

    fn switch_to(&mut self, key: RecordKey) {
        self.active = Some(key);
        self.transform.reset_all();
    }
}

#[derive(Clone, Copy)]
enum Direction {
    Forward,
    Backward,
}
