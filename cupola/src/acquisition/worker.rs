//! Background acquisition of the catalog.
//!
//! One worker thread walks the catalog sequentially: collections in catalog
//! order, then positions in list order. Each item goes through
//! `Pending → InFlight → Loaded | Failed`, every transition published as a
//! whole replacement record. A failing item never stops the walk.

use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use thiserror::Error;
use tracing::{debug, info, warn};

use super::policy::RetryPolicy;
use super::progress::{
    AcquisitionEvent, AcquisitionProgress, AcquisitionSummary, EventSender, ItemOutcome,
    RetrySummary,
};
use crate::catalog::{Catalog, RecordKey, ResourceLocator};
use crate::provider::{AcquireError, DecodedImage, Decoder, Fetcher};
use crate::record::{ImageRecord, RecordStatus, RecordStore};

/// Default per-request timeout (30 seconds).
pub const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 30;

/// Why a background pass could not be started.
#[derive(Debug, Error)]
pub enum SpawnError {
    /// Another initial or retry pass is still running on this worker.
    #[error("An acquisition pass is already running")]
    PassInProgress,

    /// The OS refused to create the thread.
    #[error("Failed to start worker thread: {0}")]
    Thread(#[from] io::Error),
}

/// Marks a spawned pass as running until dropped.
struct PassGuard(Arc<AtomicBool>);

impl Drop for PassGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Fetches and decodes catalog items into a [`RecordStore`].
///
/// The worker is the only writer of record status and payload. The same
/// worker also serves the retry-failed path, which only ever selects records
/// that are currently `Failed`.
pub struct AcquisitionWorker {
    fetcher: Arc<dyn Fetcher>,
    decoder: Arc<dyn Decoder>,
    policy: RetryPolicy,
    timeout: Duration,
    running: Arc<AtomicBool>,
}

impl AcquisitionWorker {
    /// Creates a worker with the default retry policy and timeout.
    pub fn new(fetcher: Arc<dyn Fetcher>, decoder: Arc<dyn Decoder>) -> Self {
        Self {
            fetcher,
            decoder,
            policy: RetryPolicy::default(),
            timeout: Duration::from_secs(DEFAULT_FETCH_TIMEOUT_SECS),
            running: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Sets the retry policy used by the initial pass.
    pub fn with_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Sets the per-request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Whether a spawned pass is still running.
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    fn claim_pass(&self) -> Result<PassGuard, SpawnError> {
        self.running
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map(|_| PassGuard(Arc::clone(&self.running)))
            .map_err(|_| SpawnError::PassInProgress)
    }

    /// Starts the initial pass on a dedicated thread.
    ///
    /// At most one spawned pass runs per worker; a second one is refused
    /// until the first thread finishes.
    pub fn spawn(
        self: Arc<Self>,
        catalog: Arc<Catalog>,
        records: Arc<RecordStore>,
        events: EventSender,
    ) -> Result<JoinHandle<AcquisitionSummary>, SpawnError> {
        let guard = self.claim_pass()?;
        let handle = thread::Builder::new()
            .name("cupola-acquisition".to_string())
            .spawn(move || {
                let _guard = guard;
                self.run(&catalog, &records, &events)
            })?;
        Ok(handle)
    }

    /// Starts a retry-failed pass on a dedicated thread.
    pub fn spawn_retry(
        self: Arc<Self>,
        catalog: Arc<Catalog>,
        records: Arc<RecordStore>,
        events: EventSender,
    ) -> Result<JoinHandle<RetrySummary>, SpawnError> {
        let guard = self.claim_pass()?;
        let handle = thread::Builder::new()
            .name("cupola-retry".to_string())
            .spawn(move || {
                let _guard = guard;
                self.retry_failed(&catalog, &records, &events)
            })?;
        Ok(handle)
    }

    /// Walks the whole catalog, blocking the calling thread until done.
    pub fn run(
        &self,
        catalog: &Catalog,
        records: &RecordStore,
        events: &EventSender,
    ) -> AcquisitionSummary {
        let mut progress = AcquisitionProgress::new(catalog.total());
        info!(
            total = progress.total,
            collections = catalog.collection_count(),
            max_attempts = self.policy.max_attempts(),
            "Starting image acquisition"
        );

        for entry in catalog.entries() {
            let Some(in_flight) = self.begin(records, entry.key) else {
                warn!(key = ?entry.key, "Catalog entry has no record slot");
                continue;
            };
            events.send(AcquisitionEvent::ItemStarted {
                key: entry.key,
                collection: entry.collection_name.to_string(),
                number: entry.sequence + 1,
                of: progress.total,
            });

            let (outcome, attempts) = self.finish(records, &in_flight, &self.policy);
            if outcome.is_loaded() {
                progress.record_success();
            } else {
                progress.record_failure();
            }

            events.send(AcquisitionEvent::ItemFinished {
                key: entry.key,
                collection: entry.collection_name.to_string(),
                outcome,
                attempts,
            });
            events.send(AcquisitionEvent::AggregateProgress(progress));
        }

        let summary = AcquisitionSummary::from(progress);
        info!(
            succeeded = summary.succeeded,
            failed = summary.failed,
            total = summary.total,
            "Image acquisition complete"
        );
        events.send(AcquisitionEvent::AcquisitionComplete(summary));
        summary
    }

    /// Re-attempts every record that is currently `Failed`, once each.
    ///
    /// Loaded records are never selected, so invoking this repeatedly is safe.
    pub fn retry_failed(
        &self,
        catalog: &Catalog,
        records: &RecordStore,
        events: &EventSender,
    ) -> RetrySummary {
        let failed = records.failed_keys();
        let mut summary = RetrySummary::default();
        info!(count = failed.len(), "Retrying failed images");

        for (i, key) in failed.iter().enumerate() {
            let collection = catalog
                .collection(key.collection)
                .map(|c| c.name().to_string())
                .unwrap_or_default();

            // Only records that are still Failed are touched.
            let Some(in_flight) = records
                .get(*key)
                .filter(|r| r.status() == RecordStatus::Failed)
                .and_then(|_| self.begin(records, *key))
            else {
                continue;
            };
            events.send(AcquisitionEvent::ItemStarted {
                key: *key,
                collection: collection.clone(),
                number: i + 1,
                of: failed.len(),
            });

            let (outcome, attempts) = self.finish(records, &in_flight, &RetryPolicy::None);
            summary.retried += 1;
            if outcome.is_loaded() {
                summary.recovered += 1;
            }

            events.send(AcquisitionEvent::ItemFinished {
                key: *key,
                collection,
                outcome,
                attempts,
            });
        }

        info!(
            retried = summary.retried,
            recovered = summary.recovered,
            "Retry of failed images complete"
        );
        events.send(AcquisitionEvent::RetryComplete(summary));
        summary
    }

    /// Publishes the in-flight marker for a record.
    fn begin(&self, records: &RecordStore, key: RecordKey) -> Option<ImageRecord> {
        let in_flight = records.get(key)?.to_in_flight();
        records.publish(in_flight.clone());
        Some(in_flight)
    }

    /// Attempts an in-flight record and publishes its settled replacement.
    fn finish(
        &self,
        records: &RecordStore,
        in_flight: &ImageRecord,
        policy: &RetryPolicy,
    ) -> (ItemOutcome, u32) {
        debug!(locator = %in_flight.locator(), "Fetching image");
        let (result, attempts) = self.attempt(in_flight.locator(), policy);
        let (settled, outcome) = settle(in_flight, result, attempts);
        records.publish(settled);
        (outcome, attempts)
    }

    /// Fetch-and-decode with retries according to `policy`.
    fn attempt(
        &self,
        locator: &ResourceLocator,
        policy: &RetryPolicy,
    ) -> (Result<DecodedImage, AcquireError>, u32) {
        let mut attempt = 0;
        loop {
            attempt += 1;
            match self.fetch_and_decode(locator) {
                Ok(decoded) => return (Ok(decoded), attempt),
                Err(e) => match policy.delay_for_attempt(attempt) {
                    Some(delay) => {
                        warn!(
                            locator = %locator,
                            attempt,
                            max_attempts = policy.max_attempts(),
                            error = %e,
                            "Image fetch failed, retrying"
                        );
                        if !delay.is_zero() {
                            thread::sleep(delay);
                        }
                    }
                    None => return (Err(e), attempt),
                },
            }
        }
    }

    fn fetch_and_decode(&self, locator: &ResourceLocator) -> Result<DecodedImage, AcquireError> {
        let bytes = self.fetcher.fetch(locator, self.timeout)?;
        Ok(self.decoder.decode(&bytes)?)
    }
}

/// Builds the settled replacement for an in-flight record.
fn settle(
    in_flight: &ImageRecord,
    result: Result<DecodedImage, AcquireError>,
    attempts: u32,
) -> (ImageRecord, ItemOutcome) {
    match result {
        Ok(DecodedImage { image, metadata }) => {
            debug!(
                locator = %in_flight.locator(),
                width = metadata.width,
                height = metadata.height,
                attempts,
                "Image loaded"
            );
            let outcome = ItemOutcome::Loaded(metadata.clone());
            (in_flight.to_loaded(image, metadata, attempts), outcome)
        }
        Err(e) => {
            warn!(
                locator = %in_flight.locator(),
                attempts,
                error = %e,
                "Image failed to load"
            );
            let error = e.to_string();
            (
                in_flight.to_failed(error.clone(), attempts),
                ItemOutcome::Failed(error),
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::acquisition::progress::{event_channel, EventReceiver};
    use crate::catalog::{Collection, CollectionId};
    use crate::provider::{test_png, FetchError, ImageCrateDecoder, MockFetcher};
    use parking_lot::Mutex;
    use std::sync::mpsc;

    /// Serves `bytes`, but only once the test releases each request.
    struct GatedFetcher {
        bytes: Vec<u8>,
        release: Mutex<mpsc::Receiver<()>>,
    }

    impl Fetcher for GatedFetcher {
        fn fetch(&self, _: &ResourceLocator, _: Duration) -> Result<Vec<u8>, FetchError> {
            let _ = self.release.lock().recv();
            Ok(self.bytes.clone())
        }
    }

    fn abc_catalog() -> Catalog {
        Catalog::from_collections(vec![Collection::new("Window 0", ["A", "B", "C"])]).unwrap()
    }

    fn worker(fetcher: Arc<MockFetcher>) -> AcquisitionWorker {
        AcquisitionWorker::new(fetcher, Arc::new(ImageCrateDecoder))
            .with_policy(RetryPolicy::fixed(3, Duration::ZERO))
    }

    fn drain(rx: &mut EventReceiver) -> Vec<AcquisitionEvent> {
        let mut events = Vec::new();
        while let Ok(event) = rx.try_recv() {
            events.push(event);
        }
        events
    }

    fn key(position: usize) -> RecordKey {
        RecordKey::new(CollectionId(0), position)
    }

    #[test]
    fn test_partial_failure_scenario() {
        let catalog = abc_catalog();
        let records = RecordStore::new(&catalog);
        let fetcher = Arc::new(MockFetcher::new(test_png(8, 4)).always_failing("B"));
        let (tx, _rx) = event_channel();

        let summary = worker(Arc::clone(&fetcher)).run(&catalog, &records, &tx);

        assert_eq!(summary.total, 3);
        assert_eq!(summary.succeeded, 2);
        assert_eq!(summary.failed, 1);
        assert_eq!(records.loaded_positions(CollectionId(0)), vec![0, 2]);

        let b = records.get(key(1)).unwrap();
        assert_eq!(b.status(), RecordStatus::Failed);
        assert!(b.last_error().unwrap().contains("mock failure"));
        assert_eq!(b.attempt_count(), 3);
    }

    #[test]
    fn test_permanent_failure_attempted_exactly_max_attempts() {
        let catalog = abc_catalog();
        let records = RecordStore::new(&catalog);
        let fetcher = Arc::new(MockFetcher::new(test_png(8, 4)).always_failing("B"));
        let (tx, _rx) = event_channel();

        worker(Arc::clone(&fetcher)).run(&catalog, &records, &tx);

        assert_eq!(fetcher.attempts("A"), 1);
        assert_eq!(fetcher.attempts("B"), 3);
        assert_eq!(fetcher.attempts("C"), 1);
    }

    #[test]
    fn test_transient_failure_recovers_within_budget() {
        let catalog = abc_catalog();
        let records = RecordStore::new(&catalog);
        let fetcher = Arc::new(MockFetcher::new(test_png(8, 4)).failing("A", 2));
        let (tx, _rx) = event_channel();

        let summary = worker(Arc::clone(&fetcher)).run(&catalog, &records, &tx);

        assert_eq!(summary.succeeded, 3);
        let a = records.get(key(0)).unwrap();
        assert!(a.is_loaded());
        assert_eq!(a.attempt_count(), 3);
        assert_eq!(a.metadata().unwrap().width, 8);
    }

    #[test]
    fn test_decode_failures_are_retried_like_network_failures() {
        let catalog = abc_catalog();
        let records = RecordStore::new(&catalog);
        let fetcher = Arc::new(MockFetcher::new(b"not an image".to_vec()));
        let (tx, _rx) = event_channel();

        let summary = worker(Arc::clone(&fetcher)).run(&catalog, &records, &tx);

        assert_eq!(summary.succeeded, 0);
        assert_eq!(summary.failed, 3);
        for locator in ["A", "B", "C"] {
            assert_eq!(fetcher.attempts(locator), 3);
        }
    }

    #[test]
    fn test_event_order() {
        let catalog = abc_catalog();
        let records = RecordStore::new(&catalog);
        let fetcher = Arc::new(MockFetcher::new(test_png(8, 4)).always_failing("B"));
        let (tx, mut rx) = event_channel();

        worker(fetcher).run(&catalog, &records, &tx);
        let events = drain(&mut rx);

        // Three events per item plus the terminal event.
        assert_eq!(events.len(), 10);
        assert!(events.last().unwrap().is_terminal());
        assert_eq!(events.iter().filter(|e| e.is_terminal()).count(), 1);

        let started: Vec<_> = events
            .iter()
            .filter_map(|e| match e {
                AcquisitionEvent::ItemStarted { key, number, of, .. } => {
                    Some((key.position, *number, *of))
                }
                _ => None,
            })
            .collect();
        assert_eq!(started, vec![(0, 1, 3), (1, 2, 3), (2, 3, 3)]);

        for chunk in events[..9].chunks(3) {
            assert!(matches!(chunk[0], AcquisitionEvent::ItemStarted { .. }));
            assert!(matches!(chunk[1], AcquisitionEvent::ItemFinished { .. }));
            assert!(matches!(chunk[2], AcquisitionEvent::AggregateProgress(_)));
        }
    }

    #[test]
    fn test_progress_is_monotonic_and_sums_to_total() {
        let catalog = abc_catalog();
        let records = RecordStore::new(&catalog);
        let fetcher = Arc::new(MockFetcher::new(test_png(8, 4)).always_failing("A"));
        let (tx, mut rx) = event_channel();

        worker(fetcher).run(&catalog, &records, &tx);

        let mut last = AcquisitionProgress::new(3);
        let mut last_percent = 0.0;
        for event in drain(&mut rx) {
            match event {
                AcquisitionEvent::AggregateProgress(p) => {
                    assert_eq!(p.total, 3);
                    assert!(p.completed >= last.completed);
                    assert!(p.failed >= last.failed);
                    assert!(p.percent() >= last_percent);
                    last_percent = p.percent();
                    last = p;
                }
                AcquisitionEvent::AcquisitionComplete(summary) => {
                    assert_eq!(summary.succeeded + summary.failed, summary.total);
                    assert_eq!(summary.total, catalog.total());
                }
                _ => {}
            }
        }
    }

    #[test]
    fn test_retry_failed_recovers_and_leaves_loaded_untouched() {
        let catalog = abc_catalog();
        let records = RecordStore::new(&catalog);
        let fetcher = Arc::new(MockFetcher::new(test_png(8, 4)).always_failing("B"));
        let worker = worker(Arc::clone(&fetcher));
        let (tx, mut rx) = event_channel();

        worker.run(&catalog, &records, &tx);
        drain(&mut rx);
        let a_before = records.get(key(0)).unwrap();

        fetcher.recover("B");
        let summary = worker.retry_failed(&catalog, &records, &tx);

        assert_eq!(summary.retried, 1);
        assert_eq!(summary.recovered, 1);
        assert!(records.get(key(1)).unwrap().is_loaded());
        assert!(Arc::ptr_eq(&a_before, &records.get(key(0)).unwrap()));
        assert_eq!(fetcher.attempts("A"), 1);
        assert_eq!(fetcher.attempts("B"), 4);

        let events = drain(&mut rx);
        assert!(matches!(
            events.last(),
            Some(AcquisitionEvent::RetryComplete(s)) if *s == summary
        ));
    }

    #[test]
    fn test_retry_failed_is_single_attempt_and_keeps_failure() {
        let catalog = abc_catalog();
        let records = RecordStore::new(&catalog);
        let fetcher = Arc::new(MockFetcher::new(test_png(8, 4)).always_failing("B"));
        let worker = worker(Arc::clone(&fetcher));
        let (tx, _rx) = event_channel();

        worker.run(&catalog, &records, &tx);
        let summary = worker.retry_failed(&catalog, &records, &tx);

        assert_eq!(summary.retried, 1);
        assert_eq!(summary.recovered, 0);
        assert_eq!(fetcher.attempts("B"), 4);

        let b = records.get(key(1)).unwrap();
        assert_eq!(b.status(), RecordStatus::Failed);
        assert_eq!(b.attempt_count(), 4);
    }

    #[test]
    fn test_retry_failed_with_nothing_failed_is_noop() {
        let catalog = abc_catalog();
        let records = RecordStore::new(&catalog);
        let fetcher = Arc::new(MockFetcher::new(test_png(8, 4)));
        let worker = worker(Arc::clone(&fetcher));
        let (tx, _rx) = event_channel();

        worker.run(&catalog, &records, &tx);
        let snapshot = records.snapshot();
        let summary = worker.retry_failed(&catalog, &records, &tx);

        assert_eq!(summary, RetrySummary::default());
        for (before, after) in snapshot.iter().zip(records.snapshot()) {
            assert!(Arc::ptr_eq(before, &after));
        }
    }

    #[test]
    fn test_spawned_worker_reports_through_channel() {
        let catalog = Arc::new(abc_catalog());
        let records = Arc::new(RecordStore::new(&catalog));
        let fetcher = Arc::new(MockFetcher::new(test_png(8, 4)));
        let (tx, mut rx) = event_channel();

        let handle = Arc::new(worker(fetcher))
            .spawn(Arc::clone(&catalog), Arc::clone(&records), tx)
            .unwrap();
        let summary = handle.join().unwrap();

        assert_eq!(summary.succeeded, 3);
        let events = drain(&mut rx);
        assert!(matches!(
            events.last(),
            Some(AcquisitionEvent::AcquisitionComplete(s)) if s.succeeded == 3
        ));
    }

    #[test]
    fn test_second_pass_refused_while_running() {
        let catalog = Arc::new(abc_catalog());
        let records = Arc::new(RecordStore::new(&catalog));
        let (release, gate) = mpsc::channel();
        let fetcher = GatedFetcher {
            bytes: test_png(8, 4),
            release: Mutex::new(gate),
        };
        let worker = Arc::new(AcquisitionWorker::new(
            Arc::new(fetcher),
            Arc::new(ImageCrateDecoder),
        ));
        let (tx, _rx) = event_channel();

        let handle = Arc::clone(&worker)
            .spawn(Arc::clone(&catalog), Arc::clone(&records), tx.clone())
            .unwrap();
        assert!(worker.is_running());

        let again =
            Arc::clone(&worker).spawn(Arc::clone(&catalog), Arc::clone(&records), tx.clone());
        assert!(matches!(again, Err(SpawnError::PassInProgress)));
        let retry =
            Arc::clone(&worker).spawn_retry(Arc::clone(&catalog), Arc::clone(&records), tx.clone());
        assert!(matches!(retry, Err(SpawnError::PassInProgress)));

        for _ in 0..3 {
            release.send(()).unwrap();
        }
        assert_eq!(handle.join().unwrap().succeeded, 3);
        assert!(!worker.is_running());

        // Nothing failed, so the retry pass is empty, but it may start now.
        let retry = Arc::clone(&worker)
            .spawn_retry(Arc::clone(&catalog), Arc::clone(&records), tx)
            .unwrap();
        assert_eq!(retry.join().unwrap(), RetrySummary::default());
    }

    #[test]
    fn test_empty_catalog_completes() {
        let catalog = Catalog::default();
        let records = RecordStore::new(&catalog);
        let fetcher = Arc::new(MockFetcher::new(test_png(8, 4)));
        let (tx, mut rx) = event_channel();

        let summary = worker(fetcher).run(&catalog, &records, &tx);

        assert_eq!(summary, AcquisitionSummary::default());
        assert_eq!(drain(&mut rx).len(), 1);
    }
}
