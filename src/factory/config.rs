use std::time::Duration;

/// Default interval between receipt polls, matching the ethers.js provider
/// default.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(4);

/// Interval used by [`ConfirmationConfig::local_devnet`].
pub const DEVNET_POLL_INTERVAL: Duration = Duration::from_millis(250);

/// Configuration for waiting on transaction receipts.
///
/// By default the adapter polls until the receipt shows up and never gives up
/// on its own; dropping the future is the way to stop waiting. Callers that
/// want a bound opt in with [`with_max_attempts`](Self::with_max_attempts).
///
/// # Examples
///
/// ```rust
/// use mock_core_rs::ConfirmationConfig;
/// use std::time::Duration;
///
/// // Poll every 4 seconds, no limit
/// let config = ConfirmationConfig::default();
/// assert_eq!(config.max_wait(), None);
///
/// // Give up after roughly a minute
/// let config = ConfirmationConfig::default().with_max_attempts(15);
/// assert_eq!(config.max_wait(), Some(Duration::from_secs(60)));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConfirmationConfig {
    /// Time to wait between receipt polls.
    pub poll_interval: Duration,
    /// Number of polls before giving up, `None` to wait indefinitely.
    pub max_attempts: Option<u32>,
}

impl Default for ConfirmationConfig {
    fn default() -> Self {
        Self {
            poll_interval: DEFAULT_POLL_INTERVAL,
            max_attempts: None,
        }
    }
}

impl ConfirmationConfig {
    /// Fast polling for local nodes (anvil, hardhat) that mine instantly.
    pub fn local_devnet() -> Self {
        Self {
            poll_interval: DEVNET_POLL_INTERVAL,
            max_attempts: None,
        }
    }

    /// Sets the interval between receipt polls.
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Gives up with [`ConfirmationTimeout`](crate::MockCoreError::ConfirmationTimeout)
    /// after `attempts` polls.
    pub fn with_max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = Some(attempts);
        self
    }

    /// Upper bound on the time spent sleeping between polls, if bounded.
    pub fn max_wait(&self) -> Option<Duration> {
        self.max_attempts
            .map(|attempts| self.poll_interval * attempts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ConfirmationConfig::default();
        assert_eq!(config.poll_interval, Duration::from_secs(4));
        assert_eq!(config.max_attempts, None);
        assert_eq!(config.max_wait(), None);
    }

    #[test]
    fn test_local_devnet_config() {
        let config = ConfirmationConfig::local_devnet();
        assert_eq!(config.poll_interval, Duration::from_millis(250));
        assert_eq!(config.max_attempts, None);
    }

    #[test]
    fn test_builder_methods() {
        let config = ConfirmationConfig::default()
            .with_poll_interval(Duration::from_secs(2))
            .with_max_attempts(30);
        assert_eq!(config.max_attempts, Some(30));
        assert_eq!(config.max_wait(), Some(Duration::from_secs(60)));
    }
}
