//! Declarative backoff configuration.
//!
//! A [`Backoff`](crate::Backoff) is single-use: its counters advance as a
//! retry sequence runs. [`BackoffConfig`] is the reusable half of the story:
//! plain data describing *which* policy to build. Keep a config in your
//! application settings and call [`BackoffConfig::build`] once per retry
//! sequence.
//!
//! With the `serde` feature enabled, configs can be loaded from any serde
//! format:
//!
//! ```toml
//! backwater = { version = "...", features = ["serde"] }
//! ```
//!
//! ```rust,ignore
//! let config: BackoffConfig = serde_json::from_str(r#"{
//!     "strategy": { "kind": "exponential", "base": { "secs": 0, "nanos": 100000000 } },
//!     "max_retries": 5,
//!     "jitter": { "secs": 1, "nanos": 0 }
//! }"#)?;
//! ```

use std::time::Duration;

use crate::backoff::{
    constant, exponential, fibonacci, linear, BackoffExt, BoxBackoff, DEFAULT_MAX_JITTER,
};

/// The base strategy of a [`BackoffConfig`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "kind", rename_all = "snake_case"))]
pub enum Strategy {
    /// Fixed delay between attempts.
    Constant {
        /// Delay between attempts.
        interval: Duration,
    },
    /// Delay increases linearly: base * n.
    Linear {
        /// Base delay duration.
        base: Duration,
    },
    /// Delay doubles: base * 2^(n-1).
    Exponential {
        /// Base delay duration.
        base: Duration,
    },
    /// Delay follows Fibonacci sequence: fib(n) * base.
    Fibonacci {
        /// Base delay duration.
        base: Duration,
    },
}

/// A reusable description of a backoff policy.
///
/// Layers are applied inside-out in a fixed order:
/// strategy, then the delay cap, then jitter, then the retry limit.
///
/// # Examples
///
/// ```rust
/// use backwater::{Backoff, BackoffConfig};
/// use std::time::Duration;
///
/// let config = BackoffConfig::exponential(Duration::from_millis(100))
///     .with_max_delay(Duration::from_millis(300))
///     .with_max_retries(4);
///
/// let mut policy = config.build();
/// assert_eq!(policy.next(), Some(Duration::from_millis(100)));
/// assert_eq!(policy.next(), Some(Duration::from_millis(200)));
/// assert_eq!(policy.next(), Some(Duration::from_millis(300)));
/// assert_eq!(policy.next(), Some(Duration::from_millis(300)));
/// assert_eq!(policy.next(), None);
///
/// // Every build starts a fresh sequence.
/// assert_eq!(config.build().next(), Some(Duration::from_millis(100)));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BackoffConfig {
    /// The base strategy.
    pub strategy: Strategy,
    /// Maximum number of retries (not counting the initial attempt).
    #[cfg_attr(feature = "serde", serde(default))]
    pub max_retries: Option<u32>,
    /// Cap applied to the strategy's delays (before jitter).
    #[cfg_attr(feature = "serde", serde(default))]
    pub max_delay: Option<Duration>,
    /// Exclusive upper bound of random jitter added to every delay.
    #[cfg_attr(feature = "serde", serde(default))]
    pub jitter: Option<Duration>,
}

impl BackoffConfig {
    /// Create a config with the given strategy and no decorators.
    pub fn new(strategy: Strategy) -> Self {
        Self {
            strategy,
            max_retries: None,
            max_delay: None,
            jitter: None,
        }
    }

    /// Constant delay between retries.
    pub fn constant(interval: Duration) -> Self {
        Self::new(Strategy::Constant { interval })
    }

    /// Linearly increasing delay.
    pub fn linear(base: Duration) -> Self {
        Self::new(Strategy::Linear { base })
    }

    /// Exponentially increasing delay.
    pub fn exponential(base: Duration) -> Self {
        Self::new(Strategy::Exponential { base })
    }

    /// Fibonacci-based delay.
    pub fn fibonacci(base: Duration) -> Self {
        Self::new(Strategy::Fibonacci { base })
    }

    /// Set the maximum number of retry attempts.
    ///
    /// This does not include the initial attempt. For example,
    /// `with_max_retries(3)` means up to 4 total attempts.
    pub fn with_max_retries(mut self, n: u32) -> Self {
        self.max_retries = Some(n);
        self
    }

    /// Set the maximum delay cap.
    pub fn with_max_delay(mut self, d: Duration) -> Self {
        self.max_delay = Some(d);
        self
    }

    /// Add up to one second of random jitter.
    pub fn with_jitter(self) -> Self {
        self.with_jitter_up_to(DEFAULT_MAX_JITTER)
    }

    /// Add random jitter in `[0, max)`.
    pub fn with_jitter_up_to(mut self, max: Duration) -> Self {
        self.jitter = Some(max);
        self
    }

    /// Build a fresh policy for one retry sequence.
    pub fn build(&self) -> BoxBackoff {
        let policy = match self.strategy {
            Strategy::Constant { interval } => constant(interval).boxed(),
            Strategy::Linear { base } => linear(base).boxed(),
            Strategy::Exponential { base } => exponential(base).boxed(),
            Strategy::Fibonacci { base } => fibonacci(base).boxed(),
        };

        let policy = match self.max_delay {
            Some(max) => policy.with_max_delay(max).boxed(),
            None => policy,
        };

        let policy = match self.jitter {
            Some(max) => policy.with_jitter_up_to(max).boxed(),
            None => policy,
        };

        match self.max_retries {
            Some(n) => policy.with_max_retries(n).boxed(),
            None => policy,
        }
    }
}

#[cfg(test)]
mod config_tests {
    use super::*;
    use crate::Backoff;

    #[test]
    fn test_build_plain_strategies() {
        let base = Duration::from_millis(10);

        let mut c = BackoffConfig::constant(base).build();
        assert_eq!(c.next(), Some(base));
        assert_eq!(c.next(), Some(base));

        let mut l = BackoffConfig::linear(base).build();
        assert_eq!(l.next(), Some(base));
        assert_eq!(l.next(), Some(base * 2));

        let mut e = BackoffConfig::exponential(base).build();
        assert_eq!(e.next(), Some(base));
        assert_eq!(e.next(), Some(base * 2));
        assert_eq!(e.next(), Some(base * 4));

        let mut f = BackoffConfig::fibonacci(base).build();
        assert_eq!(f.next(), Some(base));
        assert_eq!(f.next(), Some(base));
        assert_eq!(f.next(), Some(base * 2));
    }

    #[test]
    fn test_build_applies_max_retries() {
        let mut policy = BackoffConfig::constant(Duration::from_millis(1))
            .with_max_retries(2)
            .build();

        assert!(policy.next().is_some());
        assert!(policy.next().is_some());
        assert!(policy.next().is_none());
    }

    #[test]
    fn test_build_jitter_sits_outside_cap() {
        let mut policy = BackoffConfig::exponential(Duration::from_millis(100))
            .with_max_delay(Duration::from_millis(100))
            .with_jitter_up_to(Duration::from_millis(50))
            .build();

        for _ in 0..100 {
            let delay = policy.next().unwrap();
            assert!(delay >= Duration::from_millis(100));
            assert!(delay < Duration::from_millis(150));
        }
    }

    #[test]
    fn test_build_returns_independent_policies() {
        let config = BackoffConfig::exponential(Duration::from_millis(1)).with_max_retries(1);

        let mut first = config.build();
        assert!(first.next().is_some());
        assert!(first.next().is_none());

        let mut second = config.build();
        assert_eq!(second.next(), Some(Duration::from_millis(1)));
    }

    #[test]
    fn test_builder_sets_fields() {
        let config = BackoffConfig::linear(Duration::from_millis(5))
            .with_max_retries(3)
            .with_max_delay(Duration::from_secs(1))
            .with_jitter();

        assert_eq!(
            config.strategy,
            Strategy::Linear {
                base: Duration::from_millis(5)
            }
        );
        assert_eq!(config.max_retries, Some(3));
        assert_eq!(config.max_delay, Some(Duration::from_secs(1)));
        assert_eq!(config.jitter, Some(DEFAULT_MAX_JITTER));
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_deserialize_from_json() {
        let config: BackoffConfig = serde_json::from_str(
            r#"{
                "strategy": { "kind": "exponential", "base": { "secs": 0, "nanos": 100000000 } },
                "max_retries": 5
            }"#,
        )
        .unwrap();

        assert_eq!(
            config,
            BackoffConfig::exponential(Duration::from_millis(100)).with_max_retries(5)
        );
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_serialize_tags_strategy_kind() {
        let config = BackoffConfig::constant(Duration::from_secs(2));
        let json = serde_json::to_value(&config).unwrap();

        assert_eq!(json["strategy"]["kind"], "constant");
        assert_eq!(json["max_retries"], serde_json::Value::Null);
    }
}
