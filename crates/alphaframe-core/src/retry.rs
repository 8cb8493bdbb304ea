//! Retry policy with a linear, capped backoff.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// How many times a request is attempted and how long to wait in between.
///
/// The wait after the attempt with 0-based index `k` fails is
/// `min(initial_delay + increment * k, max_delay)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryPolicy {
    /// Total attempts, including the first one.
    pub max_attempts: u32,
    /// Wait after the first failed attempt.
    #[serde(with = "duration_secs")]
    pub initial_delay: Duration,
    /// Added to the wait for every further failed attempt.
    #[serde(with = "duration_secs")]
    pub increment: Duration,
    /// Upper bound for a single wait.
    #[serde(with = "duration_secs")]
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 10,
            initial_delay: Duration::from_secs(3),
            increment: Duration::from_secs(2),
            max_delay: Duration::from_secs(20),
        }
    }
}

impl RetryPolicy {
    pub fn new(
        max_attempts: u32,
        initial_delay: Duration,
        increment: Duration,
        max_delay: Duration,
    ) -> Self {
        Self {
            max_attempts,
            initial_delay,
            increment,
            max_delay,
        }
    }

    /// A single attempt, no waiting.
    pub fn no_retry() -> Self {
        Self {
            max_attempts: 1,
            ..Self::default()
        }
    }

    /// Wait before the next attempt, after the attempt `attempt` (0-based) failed.
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let grown = self.increment.saturating_mul(attempt);
        self.initial_delay.saturating_add(grown).min(self.max_delay)
    }

    /// Attempts actually made; a zero budget still performs one request.
    pub fn attempts(&self) -> u32 {
        self.max_attempts.max(1)
    }
}

mod duration_secs {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_f64(value.as_secs_f64())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let seconds = f64::deserialize(deserializer)?;
        Duration::try_from_secs_f64(seconds).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_policy_matches_provider_guidance() {
        let policy = RetryPolicy::default();

        assert_eq!(policy.max_attempts, 10);
        assert_eq!(policy.initial_delay, Duration::from_secs(3));
        assert_eq!(policy.increment, Duration::from_secs(2));
        assert_eq!(policy.max_delay, Duration::from_secs(20));
    }

    #[test]
    fn linear_backoff_grows_by_increment_and_caps() {
        let policy = RetryPolicy::default();

        assert_eq!(policy.delay_for_attempt(0), Duration::from_secs(3));
        assert_eq!(policy.delay_for_attempt(1), Duration::from_secs(5));
        assert_eq!(policy.delay_for_attempt(2), Duration::from_secs(7));
        assert_eq!(policy.delay_for_attempt(8), Duration::from_secs(19));
        assert_eq!(policy.delay_for_attempt(9), Duration::from_secs(20)); // capped
        assert_eq!(policy.delay_for_attempt(500), Duration::from_secs(20));
    }

    #[test]
    fn delay_formula_holds_for_custom_policies() {
        let cases = [(1_u64, 1_u64, 4_u64), (0, 3, 10), (5, 0, 5), (2, 7, 100)];
        for (initial, increment, cap) in cases {
            let policy = RetryPolicy::new(
                6,
                Duration::from_millis(initial),
                Duration::from_millis(increment),
                Duration::from_millis(cap),
            );
            for attempt in 0..12_u64 {
                let expected = (initial + increment * attempt).min(cap);
                assert_eq!(
                    policy.delay_for_attempt(attempt as u32),
                    Duration::from_millis(expected),
                    "initial={initial} increment={increment} cap={cap} attempt={attempt}"
                );
            }
        }
    }

    #[test]
    fn no_retry_makes_a_single_attempt() {
        let policy = RetryPolicy::no_retry();
        assert_eq!(policy.attempts(), 1);
        assert_eq!(RetryPolicy { max_attempts: 0, ..policy }.attempts(), 1);
    }

    #[test]
    fn deserializes_delays_in_seconds() {
        let json = r#"{"max_attempts": 4, "initial_delay": 0.5}"#;
        let policy: RetryPolicy = serde_json::from_str(json).expect("valid policy");

        assert_eq!(policy.max_attempts, 4);
        assert_eq!(policy.initial_delay, Duration::from_millis(500));
        assert_eq!(policy.increment, Duration::from_secs(2));
    }
}
