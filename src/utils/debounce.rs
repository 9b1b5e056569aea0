// src/utils/debounce.rs

//! Trailing-edge debouncer for a single-task event loop.

use std::time::Duration;

use tokio::time::{Instant, sleep_until};

/// Coalesces bursts of triggers into one firing after a quiet period.
///
/// Every `schedule` pushes the deadline out; only the last trigger in a burst
/// fires. `elapsed` is cancel-safe, so it can sit in a `tokio::select!` arm.
#[derive(Debug)]
pub struct Debouncer {
    delay: Duration,
    deadline: Option<Instant>,
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            deadline: None,
        }
    }

    /// (Re)start the quiet period, replacing any pending deadline.
    pub fn schedule(&mut self) {
        self.deadline = Some(Instant::now() + self.delay);
    }

    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    /// Resolve once the pending deadline passes; never resolves when idle.
    pub async fn elapsed(&mut self) {
        match self.deadline {
            Some(deadline) => {
                sleep_until(deadline).await;
                self.deadline = None;
            }
            None => std::future::pending::<()>().await,
        }
    }
}
