use std::time::Duration;

use tokio::time::sleep;
use tracing::debug;

use super::{DEFAULT_BATCH_SIZE, DEFAULT_THROTTLE_SECONDS};

/// Pause inserted after every `batch_size` attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Throttle {
    batch_size: u64,
    pause: Duration,
}

impl Default for Throttle {
    fn default() -> Self {
        Self::new(DEFAULT_BATCH_SIZE, Duration::from_secs(DEFAULT_THROTTLE_SECONDS))
    }
}

impl Throttle {
    /// A zero `batch_size` is treated as one.
    pub fn new(batch_size: u64, pause: Duration) -> Self {
        Self {
            batch_size: batch_size.max(1),
            pause,
        }
    }

    pub fn batch_size(&self) -> u64 {
        self.batch_size
    }

    pub fn is_batch_boundary(&self, attempts: u64) -> bool {
        attempts > 0 && attempts % self.batch_size == 0
    }

    /// Sleeps if `attempts` completes a batch. Returns whether it paused.
    pub async fn after_attempt(&self, attempts: u64) -> bool {
        if !self.is_batch_boundary(attempts) {
            return false;
        }
        debug!(
            attempts,
            pause_ms = self.pause.as_millis() as u64,
            "batch complete; throttling"
        );
        sleep(self.pause).await;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn boundaries_fall_on_multiples_of_batch_size() {
        let throttle = Throttle::default();

        assert!(!throttle.is_batch_boundary(0));
        assert!(!throttle.is_batch_boundary(1));
        assert!(!throttle.is_batch_boundary(19));
        assert!(throttle.is_batch_boundary(20));
        assert!(!throttle.is_batch_boundary(21));
        assert!(throttle.is_batch_boundary(40));
    }

    #[test]
    fn zero_batch_size_is_clamped() {
        let throttle = Throttle::new(0, Duration::ZERO);
        assert_eq!(throttle.batch_size(), 1);
        assert!(throttle.is_batch_boundary(1));
    }

    #[tokio::test(start_paused = true)]
    async fn pauses_only_on_boundary() {
        let throttle = Throttle::new(3, Duration::from_secs(2));
        let start = tokio::time::Instant::now();

        assert!(!throttle.after_attempt(2).await);
        assert_eq!(start.elapsed(), Duration::ZERO);

        assert!(throttle.after_attempt(3).await);
        assert!(start.elapsed() >= Duration::from_secs(2));
    }
}
