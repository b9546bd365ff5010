//! Cancellable slideshow timer.
//!
//! The timer runs as a tokio task that never touches session state. Each
//! tick is a message tagged with the generation of the timer that sent it;
//! the session drains ticks on its own turn and ignores any whose generation
//! is not the current one, so a tick already in the queue when the timer was
//! stopped has no effect.

use std::time::Duration;

use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Default time between slideshow advances (3 seconds).
pub const DEFAULT_SLIDESHOW_INTERVAL_MS: u64 = 3000;

struct RunningTimer {
    generation: u64,
    cancellation: CancellationToken,
    task: JoinHandle<()>,
}

/// Repeating timer owned by a [`super::Session`].
pub struct Slideshow {
    generation: u64,
    running: Option<RunningTimer>,
    tick_tx: mpsc::UnboundedSender<u64>,
    tick_rx: mpsc::UnboundedReceiver<u64>,
}

impl Default for Slideshow {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Slideshow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Slideshow")
            .field("generation", &self.generation)
            .field("active", &self.is_active())
            .finish()
    }
}

impl Slideshow {
    pub fn new() -> Self {
        let (tick_tx, tick_rx) = mpsc::unbounded_channel();
        Self {
            generation: 0,
            running: None,
            tick_tx,
            tick_rx,
        }
    }

    pub fn is_active(&self) -> bool {
        self.running.is_some()
    }

    /// Starts a timer ticking every `interval`, replacing any running one.
    ///
    /// The first tick fires one full interval after the call.
    pub fn start(&mut self, runtime: &Handle, interval: Duration) {
        self.stop();

        self.generation += 1;
        let generation = self.generation;
        let cancellation = CancellationToken::new();
        let token = cancellation.clone();
        let tick_tx = self.tick_tx.clone();
        let period = interval.max(Duration::from_millis(1));

        let task = runtime.spawn(async move {
            let mut ticker = interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    biased;

                    _ = token.cancelled() => break,

                    _ = ticker.tick() => {
                        if tick_tx.send(generation).is_err() {
                            break;
                        }
                    }
                }
            }
        });

        debug!(generation, interval_ms = period.as_millis() as u64, "Slideshow started");
        self.running = Some(RunningTimer {
            generation,
            cancellation,
            task,
        });
    }

    /// Stops the timer. Stopping an inactive slideshow is a no-op.
    ///
    /// Returns whether a timer was running.
    pub fn stop(&mut self) -> bool {
        match self.running.take() {
            Some(timer) => {
                timer.cancellation.cancel();
                debug!(generation = timer.generation, "Slideshow stopped");
                true
            }
            None => false,
        }
    }

    /// Drains queued ticks and returns how many belong to the running timer.
    pub fn take_ticks(&mut self) -> usize {
        let current = self.running.as_ref().map(|t| t.generation);
        let mut ticks = 0;
        while let Ok(generation) = self.tick_rx.try_recv() {
            if Some(generation) == current {
                ticks += 1;
            }
        }
        ticks
    }

    /// Waits for the next tick of the running timer.
    ///
    /// Returns `false` immediately when no timer is running.
    pub async fn next_tick(&mut self) -> bool {
        loop {
            let Some(current) = self.running.as_ref().map(|t| t.generation) else {
                return false;
            };
            match self.tick_rx.recv().await {
                Some(generation) if generation == current => return true,
                Some(_) => continue,
                None => return false,
            }
        }
    }
}

impl Drop for Slideshow {
    fn drop(&mut self) {
        if let Some(timer) = self.running.take() {
            timer.cancellation.cancel();
            timer.task.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const INTERVAL: Duration = Duration::from_millis(DEFAULT_SLIDESHOW_INTERVAL_MS);

    #[tokio::test(start_paused = true)]
    async fn test_ticks_once_per_interval() {
        let mut slideshow = Slideshow::new();
        slideshow.start(&Handle::current(), INTERVAL);

        tokio::time::sleep(Duration::from_millis(2900)).await;
        assert_eq!(slideshow.take_ticks(), 0);

        tokio::time::sleep(Duration::from_millis(3200)).await;
        assert_eq!(slideshow.take_ticks(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_discards_queued_ticks() {
        let mut slideshow = Slideshow::new();
        slideshow.start(&Handle::current(), INTERVAL);
        tokio::time::sleep(Duration::from_millis(3100)).await;

        assert!(slideshow.stop());
        assert_eq!(slideshow.take_ticks(), 0);

        tokio::time::sleep(Duration::from_millis(10_000)).await;
        assert_eq!(slideshow.take_ticks(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_restart_ignores_previous_generation() {
        let mut slideshow = Slideshow::new();
        slideshow.start(&Handle::current(), INTERVAL);
        tokio::time::sleep(Duration::from_millis(3100)).await;

        // Tick from the first timer is still queued.
        slideshow.start(&Handle::current(), INTERVAL);
        assert_eq!(slideshow.take_ticks(), 0);

        tokio::time::sleep(Duration::from_millis(3100)).await;
        assert_eq!(slideshow.take_ticks(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_next_tick() {
        let mut slideshow = Slideshow::new();
        assert!(!slideshow.next_tick().await);

        slideshow.start(&Handle::current(), INTERVAL);
        assert!(slideshow.next_tick().await);
    }

    #[test]
    fn test_stop_is_idempotent() {
        let mut slideshow = Slideshow::new();
        assert!(!slideshow.stop());
        assert!(!slideshow.stop());
        assert!(!slideshow.is_active());
    }
}
