//! Tokio-backed [`Clock`].

use async_trait::async_trait;
use std::time::{Duration, Instant};

use crate::traits::Clock;

/// Wall-clock time and `tokio::time::sleep`.
///
/// Used by default when waiting for receipts. Requires a Tokio runtime with
/// the time driver enabled.
///
/// ```rust
/// use mock_core_rs::providers::TokioClock;
///
/// let clock = TokioClock;
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioClock;

#[async_trait]
impl Clock for TokioClock {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }

    fn now(&self) -> Instant {
        Instant::now()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_sleep_advances_tokio_time() {
        let start = tokio::time::Instant::now();
        TokioClock.sleep(Duration::from_secs(4)).await;
        assert!(start.elapsed() >= Duration::from_secs(4));
    }
}
