//! Resilient background acquisition of the image catalog.
//!
//! # Architecture
//!
//! ```text
//! AcquisitionWorker (own thread, sequential)
//!         │
//!         ├── Fetcher + Decoder (collaborators)
//!         │
//!         ├── RetryPolicy (3 attempts, 1s apart)
//!         │
//!         ├── RecordStore (publish-once replacement per item)
//!         │
//!         └── EventSender ──► EventReceiver (drained by the consumer)
//! ```
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use cupola::acquisition::{event_channel, AcquisitionWorker};
//!
//! let (tx, mut rx) = event_channel();
//! let worker = Arc::new(AcquisitionWorker::new(fetcher, decoder));
//! let handle = worker.spawn(catalog.clone(), records.clone(), tx)?;
//!
//! // On the consumer's own turn:
//! while let Ok(event) = rx.try_recv() {
//!     println!("{}", event.describe());
//! }
//! ```

mod policy;
mod progress;
mod worker;

pub use policy::{RetryPolicy, DEFAULT_MAX_ATTEMPTS, DEFAULT_RETRY_DELAY_MS};
pub use progress::{
    event_channel, AcquisitionEvent, AcquisitionProgress, AcquisitionSummary, EventReceiver,
    EventSender, ItemOutcome, RetrySummary,
};
pub use worker::{AcquisitionWorker, SpawnError, DEFAULT_FETCH_TIMEOUT_SECS};
