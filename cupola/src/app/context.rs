//! The viewer's explicit context object.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread::JoinHandle;

use image::DynamicImage;
use tokio::runtime::Handle;
use tracing::info;

use super::error::AppError;
use crate::acquisition::{AcquisitionSummary, AcquisitionWorker, EventSender, RetrySummary};
use crate::catalog::{Catalog, RecordKey};
use crate::config::{ConfigFile, ViewerConfig};
use crate::export::{self, ExportError};
use crate::provider::{ImageCrateDecoder, ReqwestFetcher};
use crate::record::RecordStore;
use crate::session::{NavigationError, Session};
use crate::transform::{DisplayCache, Renderer, TransformState, Viewport};

/// Everything one viewer instance needs, created once per run.
///
/// The catalog and record store are shared with the acquisition worker;
/// the session and display cache belong to the consumer alone.
pub struct ViewerContext {
    catalog: Arc<Catalog>,
    records: Arc<RecordStore>,
    worker: Arc<AcquisitionWorker>,
    session: Session,
    renderer: Renderer,
    display: DisplayCache,
    viewer: ViewerConfig,
}

impl ViewerContext {
    /// Creates a context with one `Pending` record per catalog entry.
    pub fn new(catalog: Catalog, worker: AcquisitionWorker, viewer: ViewerConfig) -> Self {
        let records = RecordStore::new(&catalog);
        Self {
            catalog: Arc::new(catalog),
            records: Arc::new(records),
            worker: Arc::new(worker),
            session: Session::new(),
            renderer: Renderer::new(viewer.viewport_margin),
            display: DisplayCache::new(),
            viewer,
        }
    }

    /// Builds a context with the HTTP fetcher, using the configured catalog
    /// file or the built-in catalog.
    pub fn from_config(config: &ConfigFile) -> Result<Self, AppError> {
        let catalog = match &config.catalog.path {
            Some(path) => Catalog::load(path)?,
            None => Catalog::cupola(),
        };
        Self::with_catalog(catalog, config)
    }

    /// Builds a context for `catalog` with the HTTP fetcher.
    pub fn with_catalog(catalog: Catalog, config: &ConfigFile) -> Result<Self, AppError> {
        let acquisition = &config.acquisition;
        let fetcher =
            ReqwestFetcher::new(acquisition.user_agent.as_str()).map_err(AppError::HttpClient)?;
        let worker = AcquisitionWorker::new(Arc::new(fetcher), Arc::new(ImageCrateDecoder))
            .with_policy(acquisition.retry_policy())
            .with_timeout(acquisition.timeout());

        info!(
            collections = catalog.collection_count(),
            total = catalog.total(),
            "Viewer context created"
        );
        Ok(Self::new(catalog, worker, config.viewer.clone()))
    }

    pub fn catalog(&self) -> &Arc<Catalog> {
        &self.catalog
    }

    pub fn records(&self) -> &Arc<RecordStore> {
        &self.records
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn viewer_config(&self) -> &ViewerConfig {
        &self.viewer
    }

    /// Whether an acquisition or retry pass is still running.
    pub fn is_acquiring(&self) -> bool {
        self.worker.is_running()
    }

    /// Starts the initial acquisition pass on its own thread.
    ///
    /// Fails with [`SpawnError::PassInProgress`] while an earlier initial or
    /// retry pass is still running.
    ///
    /// [`SpawnError::PassInProgress`]: crate::acquisition::SpawnError::PassInProgress
    pub fn start_acquisition(
        &self,
        events: EventSender,
    ) -> Result<JoinHandle<AcquisitionSummary>, AppError> {
        Arc::clone(&self.worker)
            .spawn(
                Arc::clone(&self.catalog),
                Arc::clone(&self.records),
                events,
            )
            .map_err(AppError::WorkerSpawn)
    }

    /// Starts a retry-failed pass on its own thread, under the same
    /// one-pass-at-a-time rule as [`start_acquisition`](Self::start_acquisition).
    pub fn retry_failed(&self, events: EventSender) -> Result<JoinHandle<RetrySummary>, AppError> {
        Arc::clone(&self.worker)
            .spawn_retry(
                Arc::clone(&self.catalog),
                Arc::clone(&self.records),
                events,
            )
            .map_err(AppError::WorkerSpawn)
    }

    /// Opens `collection` at the first loaded image at or after `index`.
    pub fn show_image(&mut self, collection: &str, index: usize) -> Result<RecordKey, AppError> {
        Ok(self
            .session
            .show_image_by_name(&self.catalog, &self.records, collection, index)?)
    }

    pub fn next(&mut self) -> Result<RecordKey, AppError> {
        Ok(self.session.next(&self.records)?)
    }

    pub fn previous(&mut self) -> Result<RecordKey, AppError> {
        Ok(self.session.previous(&self.records)?)
    }

    /// Mutable access to the view parameters of the active image.
    pub fn transform_mut(&mut self) -> &mut TransformState {
        self.session.transform_mut()
    }

    /// Starts or stops the slideshow using the configured interval.
    pub fn toggle_slideshow(&mut self, runtime: &Handle) -> Result<bool, AppError> {
        let interval = self.viewer.slideshow_interval();
        Ok(self.session.toggle_slideshow(runtime, interval)?)
    }

    /// Applies pending slideshow ticks.
    pub fn poll_slideshow(&mut self) -> Option<RecordKey> {
        self.session.poll_slideshow(&self.records)
    }

    /// Waits for the next slideshow tick and advances.
    pub async fn advance_slideshow(&mut self) -> Option<RecordKey> {
        self.session.advance_on_tick(&self.records).await
    }

    pub fn return_to_overview(&mut self) {
        self.session.return_to_overview();
        self.display.clear();
    }

    /// `"<collection> - Image k/n"` for the active image.
    pub fn position_label(&self) -> Option<String> {
        self.session.position_label(&self.catalog, &self.records)
    }

    /// Renders the active image for `viewport`, reusing the cached bitmap
    /// when nothing changed.
    pub fn render_current(&mut self, viewport: Viewport) -> Result<Arc<DynamicImage>, AppError> {
        let key = self
            .session
            .active_key()
            .ok_or(NavigationError::NoActiveImage)?;
        let record = self
            .records
            .get(key)
            .ok_or(NavigationError::NoActiveImage)?;
        let original = record.original().ok_or(NavigationError::NoActiveImage)?;

        Ok(self.display.get_or_render(
            &self.renderer,
            key,
            original,
            self.session.transform(),
            viewport,
        )?)
    }

    /// Saves the active image and returns the path written.
    ///
    /// Once the active image has been rendered, the saved bitmap reflects
    /// the current transform at the last viewport, re-rendering if the
    /// transform changed since. Before any render the original is saved.
    /// Without `path` the file goes to the configured save directory under
    /// the default name.
    pub fn save_current(&mut self, path: Option<&Path>) -> Result<PathBuf, AppError> {
        let key = self.session.active_key().ok_or(ExportError::NoActiveImage)?;

        let path = match path {
            Some(path) => path.to_path_buf(),
            None => {
                let name = self
                    .catalog
                    .collection(key.collection)
                    .map(|c| c.name())
                    .unwrap_or_default();
                export::default_path(&self.viewer.save_directory(), name, key.position)
            }
        };

        match self.display.viewport_for(key) {
            Some(viewport) => {
                let rendered = self.render_current(viewport)?;
                export::save_image(&rendered, &path)?
            }
            None => {
                let record = self.records.get(key).ok_or(ExportError::NoActiveImage)?;
                let original = record.original().ok_or(ExportError::NoActiveImage)?;
                export::save_image(original, &path)?
            }
        }
        Ok(path)
    }
}
