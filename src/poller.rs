//! Fixed-interval poll loop
//!
//! Fetches once immediately, then once per interval, and forwards every
//! outcome to the view. Failures are forwarded too: the view turns them
//! into the disconnected badge. There is no retry beyond the next tick.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::client::ScoreSource;
use crate::scores::Scores;
use crate::Result;

/// Result of one poll
#[derive(Debug)]
pub struct PollOutcome {
    pub seq: u64,
    pub result: Result<Scores>,
    /// When the fetch completed, so a late consumer still sees poll timing
    pub received: Instant,
}

impl PollOutcome {
    pub fn new(seq: u64, result: Result<Scores>) -> Self {
        Self::received_at(seq, result, Instant::now())
    }

    pub fn received_at(seq: u64, result: Result<Scores>, received: Instant) -> Self {
        Self { seq, result, received }
    }
}

/// Polls a [`ScoreSource`] on a fixed interval
pub struct Poller {
    source: Arc<dyn ScoreSource>,
    interval: Duration,
}

impl Poller {
    pub fn new(source: Arc<dyn ScoreSource>, interval: Duration) -> Self {
        Self { source, interval }
    }

    /// Run until the receiving side goes away
    pub async fn run(self, tx: mpsc::Sender<PollOutcome>) {
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        tracing::info!(interval_ms = self.interval.as_millis() as u64, "Poller started");

        let mut seq = 0u64;
        loop {
            ticker.tick().await;

            let result = self.source.fetch().await;
            match &result {
                Ok(scores) => {
                    tracing::debug!(seq, team1 = scores.team1, team2 = scores.team2, "Polled scores")
                }
                Err(e) => tracing::warn!(seq, error = %e, "Failed to fetch scores"),
            }

            if tx.send(PollOutcome::new(seq, result)).await.is_err() {
                tracing::debug!(seq, "View closed, stopping poller");
                break;
            }
            seq += 1;
        }
    }

    pub fn spawn(self, tx: mpsc::Sender<PollOutcome>) -> JoinHandle<()> {
        tokio::spawn(self.run(tx))
    }
}
