//! Jittered exponential backoff.

use crate::RetryPolicy;
use rand::Rng;
use std::time::Duration;

/// Lower bound of the jitter factor.
pub const JITTER_MIN: f64 = 0.75;

/// Upper bound of the jitter factor.
pub const JITTER_MAX: f64 = 1.25;

/// Un-jittered delay after failed attempt `attempt` (1-based).
///
/// `min(base * multiplier^(attempt-1), max_backoff)`; attempt 1 yields `base`.
///
/// # Examples
///
/// ```
/// use relay_retry::{RetryPolicy, nominal_delay};
/// use std::time::Duration;
///
/// let policy = RetryPolicy::new(5, Duration::from_millis(100), 2.0, Duration::from_millis(350));
/// assert_eq!(nominal_delay(1, &policy), Duration::from_millis(100));
/// assert_eq!(nominal_delay(2, &policy), Duration::from_millis(200));
/// assert_eq!(nominal_delay(3, &policy), Duration::from_millis(350));
/// ```
pub fn nominal_delay(attempt: u32, policy: &RetryPolicy) -> Duration {
    let exponent = attempt.saturating_sub(1).min(i32::MAX as u32) as i32;
    let raw_ms = policy.backoff_base_ms as f64 * policy.backoff_multiplier.powi(exponent);
    let capped_ms = raw_ms.min(policy.max_backoff_ms as f64).max(0.0);
    Duration::from_micros((capped_ms * 1_000.0).round() as u64)
}

/// Delay to sleep after failed attempt `attempt`, with ±25% uniform jitter
/// applied after capping.
///
/// Saturates at [`Duration::MAX`] instead of overflowing.
pub fn backoff_delay(attempt: u32, policy: &RetryPolicy) -> Duration {
    let factor = rand::thread_rng().gen_range(JITTER_MIN..=JITTER_MAX);
    let jittered = nominal_delay(attempt, policy).as_secs_f64() * factor;
    Duration::try_from_secs_f64(jittered).unwrap_or(Duration::MAX)
}
