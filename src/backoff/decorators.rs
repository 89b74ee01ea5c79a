//! Decorators that bound another policy.

use std::time::Duration;

use super::Backoff;

/// Stops a policy after a fixed number of retries.
///
/// `max` bounds *retries*, not attempts: under [`crate::retry`] an operation
/// that always fails runs `max + 1` times (the initial attempt plus `max`
/// retries). With `max == 0` the first call stops, so the operation runs
/// exactly once.
///
/// Once the limit is reached the inner policy is no longer consulted.
#[derive(Debug, Clone)]
pub struct MaxRetries<B> {
    inner: B,
    max: u32,
    attempt: u32,
}

impl<B> MaxRetries<B> {
    /// Wrap `inner`, allowing at most `max` retries.
    pub fn new(max: u32, inner: B) -> Self {
        Self {
            inner,
            max,
            attempt: 0,
        }
    }

    /// Number of calls forwarded to the inner policy so far.
    ///
    /// This counts forwarded calls even when the inner policy itself stopped.
    pub fn attempts(&self) -> u32 {
        self.attempt
    }

    /// Unwrap the decorated policy.
    pub fn into_inner(self) -> B {
        self.inner
    }
}

impl<B: Backoff> Backoff for MaxRetries<B> {
    fn next(&mut self) -> Option<Duration> {
        if self.attempt >= self.max {
            return None;
        }
        self.attempt += 1;

        self.inner.next()
    }
}

/// Decorate `inner` with a retry limit.
///
/// # Examples
///
/// ```rust
/// use backwater::backoff::{constant, with_max_retries, Backoff};
/// use std::time::Duration;
///
/// let mut policy = with_max_retries(2, constant(Duration::from_millis(10)));
///
/// assert!(policy.next().is_some());
/// assert!(policy.next().is_some());
/// assert!(policy.next().is_none());
/// ```
pub fn with_max_retries<B: Backoff>(max: u32, inner: B) -> MaxRetries<B> {
    MaxRetries::new(max, inner)
}

/// Caps every delay produced by a policy.
///
/// Only the policy it wraps is capped: jitter layered *outside* the cap can
/// still push a delay above `max`.
#[derive(Debug, Clone)]
pub struct MaxDelay<B> {
    inner: B,
    max: Duration,
}

impl<B> MaxDelay<B> {
    /// Wrap `inner`, clamping its delays to `max`.
    pub fn new(max: Duration, inner: B) -> Self {
        Self { inner, max }
    }

    /// Unwrap the decorated policy.
    pub fn into_inner(self) -> B {
        self.inner
    }
}

impl<B: Backoff> Backoff for MaxDelay<B> {
    fn next(&mut self) -> Option<Duration> {
        self.inner.next().map(|delay| delay.min(self.max))
    }
}

/// Decorate `inner` with a delay cap.
///
/// # Examples
///
/// ```rust
/// use backwater::backoff::{exponential, with_max_delay, Backoff};
/// use std::time::Duration;
///
/// let mut policy = with_max_delay(Duration::from_millis(250), exponential(Duration::from_millis(100)));
///
/// // Without cap: 100ms, 200ms, 400ms, 800ms...
/// // With 250ms cap: 100ms, 200ms, 250ms, 250ms...
/// assert_eq!(policy.next(), Some(Duration::from_millis(100)));
/// assert_eq!(policy.next(), Some(Duration::from_millis(200)));
/// assert_eq!(policy.next(), Some(Duration::from_millis(250)));
/// assert_eq!(policy.next(), Some(Duration::from_millis(250)));
/// ```
pub fn with_max_delay<B: Backoff>(max: Duration, inner: B) -> MaxDelay<B> {
    MaxDelay::new(max, inner)
}
