//! Base backoff strategies.
//!
//! All strategies here are unbounded: they never return `None`. Bound them
//! with [`MaxRetries`](super::MaxRetries) or use them under a cancellable
//! [`Context`](crate::Context). Arithmetic saturates at [`Duration::MAX`]
//! rather than wrapping.

use std::time::Duration;

use super::Backoff;

/// Fixed delay between attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Constant {
    interval: Duration,
}

impl Constant {
    /// Create a constant policy.
    pub fn new(interval: Duration) -> Self {
        Self { interval }
    }
}

impl Backoff for Constant {
    fn next(&mut self) -> Option<Duration> {
        Some(self.interval)
    }
}

/// Create a policy that always waits `interval`.
///
/// # Examples
///
/// ```rust
/// use backwater::backoff::{constant, Backoff};
/// use std::time::Duration;
///
/// let mut policy = constant(Duration::from_millis(500));
///
/// // Every retry waits 500ms
/// assert_eq!(policy.next(), Some(Duration::from_millis(500)));
/// assert_eq!(policy.next(), Some(Duration::from_millis(500)));
/// ```
pub fn constant(interval: Duration) -> Constant {
    Constant::new(interval)
}

/// Delay doubles every attempt: `base * 2^(n-1)` for the n-th call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Exponential {
    base: Duration,
    attempt: u32,
}

impl Exponential {
    /// Create an exponential policy starting at `base`.
    pub fn new(base: Duration) -> Self {
        Self { base, attempt: 0 }
    }
}

impl Backoff for Exponential {
    fn next(&mut self) -> Option<Duration> {
        let shift = self.attempt;
        self.attempt = self.attempt.saturating_add(1);

        if self.base.is_zero() {
            return Some(Duration::ZERO);
        }

        let delay = 1u32
            .checked_shl(shift)
            .and_then(|factor| self.base.checked_mul(factor))
            .unwrap_or(Duration::MAX);
        Some(delay)
    }
}

/// Create a policy whose delay doubles each call, starting at `base`.
///
/// # Examples
///
/// ```rust
/// use backwater::backoff::{exponential, Backoff};
/// use std::time::Duration;
///
/// let mut policy = exponential(Duration::from_millis(100));
///
/// // Delay doubles: 100ms, 200ms, 400ms, 800ms
/// assert_eq!(policy.next(), Some(Duration::from_millis(100)));
/// assert_eq!(policy.next(), Some(Duration::from_millis(200)));
/// assert_eq!(policy.next(), Some(Duration::from_millis(400)));
/// assert_eq!(policy.next(), Some(Duration::from_millis(800)));
/// ```
pub fn exponential(base: Duration) -> Exponential {
    Exponential::new(base)
}

/// Delay increases linearly: `base * n` for the n-th call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Linear {
    base: Duration,
    attempt: u32,
}

impl Linear {
    /// Create a linear policy stepping by `base`.
    pub fn new(base: Duration) -> Self {
        Self { base, attempt: 0 }
    }
}

impl Backoff for Linear {
    fn next(&mut self) -> Option<Duration> {
        self.attempt = self.attempt.saturating_add(1);
        Some(self.base.saturating_mul(self.attempt))
    }
}

/// Create a policy whose delay grows by `base` each call.
///
/// # Examples
///
/// ```rust
/// use backwater::backoff::{linear, Backoff};
/// use std::time::Duration;
///
/// let mut policy = linear(Duration::from_millis(100));
///
/// assert_eq!(policy.next(), Some(Duration::from_millis(100)));
/// assert_eq!(policy.next(), Some(Duration::from_millis(200)));
/// assert_eq!(policy.next(), Some(Duration::from_millis(300)));
/// ```
pub fn linear(base: Duration) -> Linear {
    Linear::new(base)
}

/// Delay follows the Fibonacci sequence: `base * fib(n)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fibonacci {
    current: Duration,
    following: Duration,
}

impl Fibonacci {
    /// Create a Fibonacci policy scaled by `base`.
    pub fn new(base: Duration) -> Self {
        Self {
            current: base,
            following: base,
        }
    }
}

impl Backoff for Fibonacci {
    fn next(&mut self) -> Option<Duration> {
        let delay = self.current;
        let after = self.current.saturating_add(self.following);
        self.current = self.following;
        self.following = after;
        Some(delay)
    }
}

/// Create a policy whose delays follow `base * (1, 1, 2, 3, 5, 8, ...)`.
///
/// # Examples
///
/// ```rust
/// use backwater::backoff::{fibonacci, Backoff};
/// use std::time::Duration;
///
/// let mut policy = fibonacci(Duration::from_millis(100));
///
/// assert_eq!(policy.next(), Some(Duration::from_millis(100)));
/// assert_eq!(policy.next(), Some(Duration::from_millis(100)));
/// assert_eq!(policy.next(), Some(Duration::from_millis(200)));
/// assert_eq!(policy.next(), Some(Duration::from_millis(300)));
/// assert_eq!(policy.next(), Some(Duration::from_millis(500)));
/// ```
pub fn fibonacci(base: Duration) -> Fibonacci {
    Fibonacci::new(base)
}
