//! Adapter-local request spacing.
//!
//! A [`Pacer`] remembers when its adapter last called out and makes the next
//! call wait until the minimum spacing has passed. This keeps well-behaved
//! clients clear of vendor-side 429s; it is not a hard cap.

use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use tokio::time::Instant;
use tracing::debug;

/// Minimum-spacing gate for one adapter.
#[derive(Debug)]
pub struct Pacer {
    min_spacing: Duration,
    last_call_at: Mutex<Option<Instant>>,
}

impl Pacer {
    /// Creates a pacer with the given minimum spacing.
    pub fn new(min_spacing: Duration) -> Self {
        Self {
            min_spacing,
            last_call_at: Mutex::new(None),
        }
    }

    /// Returns the minimum spacing.
    pub fn min_spacing(&self) -> Duration {
        self.min_spacing
    }

    /// Returns when the last call was made.
    pub fn last_call_at(&self) -> Option<Instant> {
        *self.last_call_at.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Returns how long the next call would have to wait.
    pub fn remaining_delay(&self) -> Duration {
        self.last_call_at().map_or(Duration::ZERO, |last| {
            self.min_spacing.saturating_sub(last.elapsed())
        })
    }

    /// Sleeps until the next call is allowed. Returns the time slept.
    pub async fn wait(&self) -> Duration {
        let delay = self.remaining_delay();
        if !delay.is_zero() {
            debug!(delay_ms = delay.as_millis(), "Pacing before call");
            tokio::time::sleep(delay).await;
        }
        delay
    }

    /// Records that a call was just made.
    pub fn mark(&self) {
        *self.last_call_at.lock().unwrap_or_else(PoisonError::into_inner) = Some(Instant::now());
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_first_call_does_not_wait() {
        let pacer = Pacer::new(Duration::from_secs(2));
        assert_eq!(pacer.wait().await, Duration::ZERO);
        assert!(pacer.last_call_at().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_waits_remaining_spacing() {
        let pacer = Pacer::new(Duration::from_secs(2));
        pacer.mark();
        tokio::time::advance(Duration::from_millis(500)).await;

        let start = Instant::now();
        let slept = pacer.wait().await;
        assert_eq!(slept, Duration::from_millis(1500));
        assert!(start.elapsed() >= Duration::from_millis(1500));
    }

    #[tokio::test(start_paused = true)]
    async fn test_no_wait_after_spacing_passed() {
        let pacer = Pacer::new(Duration::from_millis(250));
        pacer.mark();
        tokio::time::advance(Duration::from_secs(1)).await;
        assert_eq!(pacer.remaining_delay(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_spacing_never_waits() {
        let pacer = Pacer::new(Duration::ZERO);
        pacer.mark();
        assert_eq!(pacer.wait().await, Duration::ZERO);
    }
}
