//! # Redelivery Policy
//!
//! Exponential backoff between redelivery attempts of the in-memory event
//! bus. Jitter spreads concurrent redeliveries so a recovering backend is
//! not hit by every consumer at once.
//!
//! This layer is the only place redelivery lives; the trigger pipeline
//! itself never retries.

use rand::RngExt;
use std::time::Duration;

/// Backoff configuration applied between delivery attempts of one event.
#[derive(Debug, Clone)]
pub struct RedeliveryPolicy {
    /// Total delivery attempts for one event, first delivery included.
    pub max_attempts: u32,

    /// Delay before the first redelivery.
    pub initial_delay: Duration,

    /// Cap for the backoff growth.
    pub max_delay: Duration,

    /// Exponential growth factor.
    pub backoff_multiplier: f64,

    /// Whether to randomize delays.
    pub use_jitter: bool,

    /// Jitter range as a fraction of the delay (0.25 = ±25%).
    pub jitter_percent: f64,
}

impl Default for RedeliveryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            initial_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(16),
            backoff_multiplier: 2.0,
            use_jitter: true,
            jitter_percent: 0.25,
        }
    }
}

impl RedeliveryPolicy {
    pub fn new(
        max_attempts: u32,
        initial_delay: Duration,
        max_delay: Duration,
        backoff_multiplier: f64,
    ) -> Self {
        Self {
            max_attempts,
            initial_delay,
            max_delay,
            backoff_multiplier,
            use_jitter: true,
            jitter_percent: 0.25,
        }
    }

    /// Disable jitter. Useful for deterministic tests.
    pub fn without_jitter(mut self) -> Self {
        self.use_jitter = false;
        self
    }

    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    /// Delay before redelivery attempt `attempt` (1-based: the delay after
    /// the first failed delivery is `delay_for_attempt(1)`).
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        if attempt == 0 {
            return Duration::ZERO;
        }

        let exponent = attempt.saturating_sub(1).min(32);
        let mut delay_ms =
            self.initial_delay.as_millis() as f64 * self.backoff_multiplier.powi(exponent as i32);

        delay_ms = delay_ms.min(self.max_delay.as_millis() as f64);

        if self.use_jitter && self.jitter_percent > 0.0 {
            let spread = delay_ms * self.jitter_percent;
            let offset = rand::rng().random_range(-spread..=spread);
            delay_ms = (delay_ms + offset).max(0.0);
        }

        Duration::from_millis(delay_ms as u64)
    }
}

#[cfg(test)]
#[path = "retry_tests.rs"]
mod tests;
