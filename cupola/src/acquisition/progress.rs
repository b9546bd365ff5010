//! Progress counters and the worker → consumer event stream.
//!
//! The worker never calls into the consumer. It pushes [`AcquisitionEvent`]s
//! into an unbounded channel; the consumer drains it on its own schedule
//! (`try_recv` from a UI loop, or `recv().await`/`blocking_recv()` from a
//! CLI). A single channel carries every event, so per-item events arrive in
//! the order they were produced and the terminal event arrives last.

use tokio::sync::mpsc;

use crate::catalog::RecordKey;
use crate::record::ImageMetadata;

/// Aggregate acquisition counters.
///
/// `total` is fixed when acquisition starts; `completed` and `failed` only
/// ever grow during a pass.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct AcquisitionProgress {
    /// Items that loaded successfully.
    pub completed: usize,
    /// Items that exhausted their attempts.
    pub failed: usize,
    /// Number of items in the catalog.
    pub total: usize,
}

impl AcquisitionProgress {
    /// Creates counters for a catalog of `total` items.
    pub fn new(total: usize) -> Self {
        Self {
            completed: 0,
            failed: 0,
            total,
        }
    }

    /// Record a successfully loaded item.
    pub fn record_success(&mut self) {
        self.completed += 1;
    }

    /// Record an item that failed every attempt.
    pub fn record_failure(&mut self) {
        self.failed += 1;
    }

    /// Items processed so far, whatever their outcome.
    pub fn processed(&self) -> usize {
        self.completed + self.failed
    }

    /// Whether every item has been processed.
    pub fn is_finished(&self) -> bool {
        self.processed() >= self.total
    }

    /// Loaded items as a percentage of the catalog (100 for an empty catalog).
    pub fn percent(&self) -> f64 {
        if self.total == 0 {
            100.0
        } else {
            (self.completed as f64 / self.total as f64) * 100.0
        }
    }
}

/// Final result of an acquisition pass.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct AcquisitionSummary {
    pub succeeded: usize,
    pub failed: usize,
    pub total: usize,
}

impl AcquisitionSummary {
    /// Whether at least one item failed.
    pub fn has_failures(&self) -> bool {
        self.failed > 0
    }

    /// Status bar text for the end of acquisition.
    pub fn status_line(&self) -> String {
        let mut line = format!(
            "Ready - Loaded {}/{} images successfully",
            self.succeeded, self.total
        );
        if self.failed > 0 {
            line.push_str(&format!(" ({} failed - retry to reload)", self.failed));
        }
        line
    }
}

impl From<AcquisitionProgress> for AcquisitionSummary {
    fn from(progress: AcquisitionProgress) -> Self {
        Self {
            succeeded: progress.completed,
            failed: progress.failed,
            total: progress.total,
        }
    }
}

/// Result of a retry-failed pass.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RetrySummary {
    /// Failed records that were attempted again.
    pub retried: usize,
    /// Of those, records that are now loaded.
    pub recovered: usize,
}

impl RetrySummary {
    pub fn status_line(&self) -> String {
        format!(
            "Retry complete: {}/{} images recovered",
            self.recovered, self.retried
        )
    }
}

/// How a single item ended.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ItemOutcome {
    Loaded(ImageMetadata),
    Failed(String),
}

impl ItemOutcome {
    pub fn is_loaded(&self) -> bool {
        matches!(self, ItemOutcome::Loaded(_))
    }
}

/// Notification from the acquisition worker or the retry path.
#[derive(Clone, Debug, PartialEq)]
pub enum AcquisitionEvent {
    /// An item is about to be fetched. Does not change any counter.
    ItemStarted {
        key: RecordKey,
        collection: String,
        /// 1-based number of this item within the pass.
        number: usize,
        /// Items in the pass.
        of: usize,
    },

    /// An item settled as loaded or failed.
    ItemFinished {
        key: RecordKey,
        collection: String,
        outcome: ItemOutcome,
        attempts: u32,
    },

    /// Updated aggregate counters, sent after every `ItemFinished` of the initial pass.
    AggregateProgress(AcquisitionProgress),

    /// The initial pass walked the whole catalog. Always the last event of the pass.
    AcquisitionComplete(AcquisitionSummary),

    /// A retry-failed pass ended. Always the last event of that pass.
    RetryComplete(RetrySummary),
}

impl AcquisitionEvent {
    /// Whether this event ends a pass.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            AcquisitionEvent::AcquisitionComplete(_) | AcquisitionEvent::RetryComplete(_)
        )
    }

    /// Short human-readable description, used for loading-screen detail text.
    pub fn describe(&self) -> String {
        match self {
            AcquisitionEvent::ItemStarted {
                key,
                collection,
                number,
                of,
            } => format!(
                "Loading {} - Image {} ({}/{})",
                collection,
                key.position + 1,
                number,
                of
            ),
            AcquisitionEvent::ItemFinished {
                key,
                collection,
                outcome,
                ..
            } => match outcome {
                ItemOutcome::Loaded(_) => {
                    format!("Loaded {} - Image {}", collection, key.position + 1)
                }
                ItemOutcome::Failed(error) => format!(
                    "Failed {} - Image {}: {}",
                    collection,
                    key.position + 1,
                    error
                ),
            },
            AcquisitionEvent::AggregateProgress(progress) => {
                format!("{:.0}%", progress.percent())
            }
            AcquisitionEvent::AcquisitionComplete(summary) => summary.status_line(),
            AcquisitionEvent::RetryComplete(summary) => summary.status_line(),
        }
    }
}

/// Receiving half of the event stream, owned by the consumer.
pub type EventReceiver = mpsc::UnboundedReceiver<AcquisitionEvent>;

/// Sending half of the event stream.
///
/// Sending never blocks. Events sent after the consumer has gone away are
/// dropped silently: the worker keeps walking the catalog regardless.
#[derive(Clone, Debug)]
pub struct EventSender {
    tx: mpsc::UnboundedSender<AcquisitionEvent>,
}

impl EventSender {
    pub fn send(&self, event: AcquisitionEvent) {
        if self.tx.send(event).is_err() {
            tracing::trace!("Event receiver dropped; discarding acquisition event");
        }
    }
}

/// Creates a connected event sender/receiver pair.
pub fn event_channel() -> (EventSender, EventReceiver) {
    let (tx, rx) = mpsc::unbounded_channel();
    (EventSender { tx }, rx)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{Catalog, Collection};

    #[test]
    fn test_progress_new() {
        let progress = AcquisitionProgress::new(4);
        assert_eq!(progress.processed(), 0);
        assert!(!progress.is_finished());
        assert_eq!(progress.percent(), 0.0);
    }

    #[test]
    fn test_progress_percent_counts_completed_only() {
        let mut progress = AcquisitionProgress::new(4);
        progress.record_success();
        progress.record_failure();

        assert_eq!(progress.percent(), 25.0);
        assert_eq!(progress.processed(), 2);

        progress.record_success();
        progress.record_success();
        assert_eq!(progress.percent(), 75.0);
        assert!(progress.is_finished());
    }

    #[test]
    fn test_progress_empty_catalog() {
        let progress = AcquisitionProgress::new(0);
        assert_eq!(progress.percent(), 100.0);
        assert!(progress.is_finished());
    }

    #[test]
    fn test_summary_status_line() {
        let all = AcquisitionSummary {
            succeeded: 33,
            failed: 0,
            total: 33,
        };
        assert_eq!(all.status_line(), "Ready - Loaded 33/33 images successfully");

        let partial = AcquisitionSummary {
            succeeded: 30,
            failed: 3,
            total: 33,
        };
        assert!(partial.has_failures());
        assert!(partial.status_line().ends_with("(3 failed - retry to reload)"));
    }

    #[test]
    fn test_retry_summary_status_line() {
        let summary = RetrySummary {
            retried: 3,
            recovered: 2,
        };
        assert_eq!(summary.status_line(), "Retry complete: 2/3 images recovered");
    }

    #[test]
    fn test_channel_preserves_order() {
        let catalog = Catalog::from_collections(vec![Collection::new("W", ["a"])]).unwrap();
        let key = catalog.entries().next().unwrap().key;
        let (tx, mut rx) = event_channel();

        tx.send(AcquisitionEvent::ItemStarted {
            key,
            collection: "W".to_string(),
            number: 1,
            of: 1,
        });
        tx.send(AcquisitionEvent::AcquisitionComplete(AcquisitionSummary::default()));

        assert!(matches!(
            rx.try_recv().unwrap(),
            AcquisitionEvent::ItemStarted { .. }
        ));
        assert!(rx.try_recv().unwrap().is_terminal());
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_send_after_receiver_dropped_is_silent() {
        let (tx, rx) = event_channel();
        drop(rx);
        tx.send(AcquisitionEvent::RetryComplete(RetrySummary::default()));
    }

    #[test]
    fn test_describe_item_started() {
        let catalog = Catalog::from_collections(vec![Collection::new("Window 2", ["a", "b"])])
            .unwrap();
        let key = catalog.entries().nth(1).unwrap().key;
        let event = AcquisitionEvent::ItemStarted {
            key,
            collection: "Window 2".to_string(),
            number: 2,
            of: 2,
        };
        assert_eq!(event.describe(), "Loading Window 2 - Image 2 (2/2)");
    }
}
