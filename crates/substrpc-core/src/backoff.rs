//! Exponential backoff for caller-driven reconnects.
//!
//! Sessions never reconnect or retry requests themselves. This policy only
//! paces repeated `connect` attempts made by the caller.

use std::time::Duration;

use crate::config::ReconnectConfig;

/// Stateless backoff policy; computes the next delay given the attempt number.
#[derive(Debug, Clone)]
pub struct ReconnectPolicy {
    pub config: ReconnectConfig,
}

impl ReconnectPolicy {
    pub fn new(config: ReconnectConfig) -> Self {
        Self { config }
    }

    /// Returns the delay before the `attempt`-th retry (1-based).
    /// Returns `None` if `attempt` exceeds `max_retries`.
    pub fn next_delay(&self, attempt: u32) -> Option<Duration> {
        if attempt == 0 || attempt > self.config.max_retries {
            return None;
        }
        let base_ms =
            self.config.initial_backoff_ms as f64 * self.config.multiplier.powi((attempt - 1) as i32);
        let capped = base_ms.min(self.config.max_backoff_ms as f64);
        Some(Duration::from_millis(capped as u64))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy(max_retries: u32, initial: u64, max: u64, multiplier: f64) -> ReconnectPolicy {
        ReconnectPolicy::new(ReconnectConfig {
            max_retries,
            initial_backoff_ms: initial,
            max_backoff_ms: max,
            multiplier,
        })
    }

    #[test]
    fn delays_double() {
        let p = policy(3, 100, 30_000, 2.0);
        assert_eq!(p.next_delay(1).unwrap().as_millis(), 100);
        assert_eq!(p.next_delay(2).unwrap().as_millis(), 200);
        assert_eq!(p.next_delay(3).unwrap().as_millis(), 400);
        assert!(p.next_delay(4).is_none());
    }

    #[test]
    fn delay_capped_at_max() {
        let p = policy(10, 100, 500, 10.0);
        let d5 = p.next_delay(5).unwrap();
        assert_eq!(d5, Duration::from_millis(500));
    }

    #[test]
    fn zero_attempt_has_no_delay() {
        assert!(policy(2, 100, 1_000, 2.0).next_delay(0).is_none());
    }
}
