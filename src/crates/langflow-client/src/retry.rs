//! Retry policy with exponential backoff
//!
//! ```text
//! delay = initial_interval × backoff_factor ^ attempt
//! delay = min(delay, max_interval)
//! if jitter: delay *= random(0.5..=1.5)
//! ```
//!
//! ```rust
//! use langflow_client::RetryPolicy;
//! use std::time::Duration;
//!
//! let policy = RetryPolicy::new(3).with_jitter(false);
//! assert_eq!(policy.calculate_delay(0), Duration::from_millis(500));
//! assert_eq!(policy.calculate_delay(1), Duration::from_secs(1));
//! assert!(!policy.should_retry(3));
//! ```

use rand::Rng;
use std::time::Duration;

/// Exponential backoff settings for transient upstream failures
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Maximum number of attempts (including the first)
    pub max_attempts: usize,

    /// Initial interval between retries in seconds
    pub initial_interval: f64,

    /// Multiplier for the interval after each retry
    pub backoff_factor: f64,

    /// Maximum interval between retries in seconds
    pub max_interval: f64,

    /// Whether to add random jitter to intervals
    pub jitter: bool,
}

impl RetryPolicy {
    /// Create a new retry policy with the given max attempts
    pub fn new(max_attempts: usize) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            initial_interval: 0.5,
            backoff_factor: 2.0,
            max_interval: 10.0,
            jitter: true,
        }
    }

    /// Policy for a client configured with `max_retries` retries
    pub fn from_max_retries(max_retries: u32) -> Self {
        Self::new(max_retries as usize + 1)
    }

    /// Set the initial interval between retries
    pub fn with_initial_interval(mut self, seconds: f64) -> Self {
        self.initial_interval = seconds;
        self
    }

    /// Set the backoff factor
    pub fn with_backoff_factor(mut self, factor: f64) -> Self {
        self.backoff_factor = factor;
        self
    }

    /// Set the maximum interval between retries
    pub fn with_max_interval(mut self, seconds: f64) -> Self {
        self.max_interval = seconds;
        self
    }

    /// Enable or disable jitter
    pub fn with_jitter(mut self, jitter: bool) -> Self {
        self.jitter = jitter;
        self
    }

    /// Delay before retrying after failed attempt `attempt` (0-indexed)
    pub fn calculate_delay(&self, attempt: usize) -> Duration {
        if attempt >= self.max_attempts {
            return Duration::ZERO;
        }

        let base_delay = self.initial_interval * self.backoff_factor.powi(attempt as i32);
        let capped_delay = base_delay.min(self.max_interval).max(0.0);

        let final_delay = if self.jitter {
            let mut rng = rand::thread_rng();
            capped_delay * rng.gen_range(0.5..=1.5)
        } else {
            capped_delay
        };

        Duration::from_secs_f64(final_delay)
    }

    /// Check if another attempt is allowed after `attempts` attempts
    pub fn should_retry(&self, attempts: usize) -> bool {
        attempts < self.max_attempts
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(3)
    }
}
