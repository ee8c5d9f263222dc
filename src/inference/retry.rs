//! Randomized exponential backoff.

use std::time::Duration;

use rand::Rng;

/// Bounded attempts with a jittered exponential wait between them.
///
/// After failed attempt `n` the wait is drawn uniformly from `[min_wait, high]`, where
/// `high = multiplier * 2^(n-1)` clamped into `[min_wait, max_wait]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first.
    pub max_attempts: u32,
    pub multiplier: Duration,
    pub min_wait: Duration,
    pub max_wait: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            multiplier: Duration::from_secs(1),
            min_wait: Duration::from_secs(1),
            max_wait: Duration::from_secs(40),
        }
    }
}

impl RetryPolicy {
    /// `max_attempts` attempts with no waiting in between.
    pub fn immediate(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            multiplier: Duration::ZERO,
            min_wait: Duration::ZERO,
            max_wait: Duration::ZERO,
        }
    }

    /// Upper bound of the wait after failed attempt `attempt` (1-based).
    pub fn ceiling(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt.saturating_sub(1));
        self.multiplier
            .saturating_mul(factor)
            .max(self.min_wait)
            .min(self.max_wait)
    }

    /// Draw the wait after failed attempt `attempt`.
    pub fn delay_for<R: Rng + ?Sized>(&self, attempt: u32, rng: &mut R) -> Duration {
        let low = self.min_wait.as_secs_f64();
        let high = self.ceiling(attempt).as_secs_f64();
        if high <= low {
            return self.ceiling(attempt);
        }
        Duration::from_secs_f64(rng.gen_range(low..=high))
    }

    /// Whether another attempt is allowed after `attempt` failed.
    pub fn should_retry(&self, attempt: u32) -> bool {
        attempt < self.max_attempts
    }
}
