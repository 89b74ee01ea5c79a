//! Backoff policies: when to retry and how long to wait.
//!
//! A [`Backoff`] is a small state machine. Every call to [`Backoff::next`]
//! advances it by one step and answers a single question: *should the caller
//! try again, and if so, after how long?*
//!
//! - `Some(delay)` - wait `delay`, then retry
//! - `None` - stop, no further attempts
//!
//! Policies are built from a base strategy and layered with decorators:
//!
//! ```rust
//! use backwater::backoff::{exponential, Backoff, BackoffExt};
//! use std::time::Duration;
//!
//! let mut policy = exponential(Duration::from_millis(100))
//!     .with_max_delay(Duration::from_millis(300))
//!     .with_max_retries(3);
//!
//! assert_eq!(policy.next(), Some(Duration::from_millis(100)));
//! assert_eq!(policy.next(), Some(Duration::from_millis(200)));
//! assert_eq!(policy.next(), Some(Duration::from_millis(300))); // capped
//! assert_eq!(policy.next(), None); // max retries reached
//! ```
//!
//! # Base Strategies
//!
//! - [`constant`]: Fixed delay between retries
//! - [`linear`]: Delay increases linearly (100ms, 200ms, 300ms, ...)
//! - [`exponential`]: Delay doubles each retry (100ms, 200ms, 400ms, ...)
//! - [`fibonacci`]: Delay follows the Fibonacci sequence
//!
//! # Decorators
//!
//! - [`MaxRetries`]: stop after a fixed number of retries
//! - [`MaxDelay`]: cap every delay
//! - [`Jitter`]: add a random delay to avoid thundering herds
//!
//! # Single Use
//!
//! Policies are stateful. A policy describes *one* retry sequence; build a
//! fresh one for every sequence. [`crate::retry`] takes its policy by value,
//! so the compiler enforces this for you. Use [`BackoffConfig`](crate::BackoffConfig)
//! when you need a reusable template.

mod decorators;
mod jitter;
mod strategy;

pub use decorators::{with_max_delay, with_max_retries, MaxDelay, MaxRetries};
pub use jitter::{with_jitter, DefaultRng, Jitter, DEFAULT_MAX_JITTER};
pub use strategy::{
    constant, exponential, fibonacci, linear, Constant, Exponential, Fibonacci, Linear,
};

use std::fmt;
use std::time::Duration;

/// A stateful generator of wait-or-stop decisions between retry attempts.
///
/// # Contract
///
/// - Each call advances internal state exactly once.
/// - `None` is terminal: callers must not call `next` again for the same
///   sequence once it has been returned.
///
/// # Example
///
/// ```rust
/// use backwater::Backoff;
/// use std::time::Duration;
///
/// struct Countdown(u32);
///
/// impl Backoff for Countdown {
///     fn next(&mut self) -> Option<Duration> {
///         let remaining = self.0.checked_sub(1)?;
///         self.0 = remaining;
///         Some(Duration::from_millis(10))
///     }
/// }
///
/// let mut policy = Countdown(2);
/// assert!(policy.next().is_some());
/// assert!(policy.next().is_some());
/// assert!(policy.next().is_none());
/// ```
pub trait Backoff {
    /// Returns the delay before the next attempt, or `None` to stop.
    fn next(&mut self) -> Option<Duration>;
}

impl<B: Backoff + ?Sized> Backoff for &mut B {
    fn next(&mut self) -> Option<Duration> {
        (**self).next()
    }
}

impl<B: Backoff + ?Sized> Backoff for Box<B> {
    fn next(&mut self) -> Option<Duration> {
        (**self).next()
    }
}

/// A type-erased, sendable backoff policy.
pub type BoxBackoff = Box<dyn Backoff + Send>;

/// A backoff policy expressed as a closure.
///
/// Created by [`backoff_fn`]. Handy for one-off policies and tests, where a
/// named state-holding type would be overkill.
pub struct BackoffFn<F> {
    f: F,
}

impl<F> Backoff for BackoffFn<F>
where
    F: FnMut() -> Option<Duration>,
{
    fn next(&mut self) -> Option<Duration> {
        (self.f)()
    }
}

impl<F> fmt::Debug for BackoffFn<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BackoffFn").finish_non_exhaustive()
    }
}

/// Wrap a closure as a [`Backoff`].
///
/// # Example
///
/// ```rust
/// use backwater::backoff::{backoff_fn, Backoff};
/// use std::time::Duration;
///
/// let mut calls = 0;
/// let mut policy = backoff_fn(move || {
///     calls += 1;
///     (calls <= 2).then_some(Duration::from_millis(5))
/// });
///
/// assert_eq!(policy.next(), Some(Duration::from_millis(5)));
/// assert_eq!(policy.next(), Some(Duration::from_millis(5)));
/// assert_eq!(policy.next(), None);
/// ```
pub fn backoff_fn<F>(f: F) -> BackoffFn<F>
where
    F: FnMut() -> Option<Duration>,
{
    BackoffFn { f }
}

/// Builder-style decorator methods, available on every [`Backoff`].
///
/// Each method wraps `self` in a decorator, so calls read outer-last:
/// `exponential(b).with_jitter().with_max_retries(3)` is
/// `MaxRetries(Jitter(Exponential))`.
pub trait BackoffExt: Backoff + Sized {
    /// Stop after `max` retries. See [`MaxRetries`].
    fn with_max_retries(self, max: u32) -> MaxRetries<Self> {
        MaxRetries::new(max, self)
    }

    /// Cap every delay at `max`. See [`MaxDelay`].
    fn with_max_delay(self, max: Duration) -> MaxDelay<Self> {
        MaxDelay::new(max, self)
    }

    /// Add up to [`DEFAULT_MAX_JITTER`] of random delay. See [`Jitter`].
    fn with_jitter(self) -> Jitter<Self> {
        Jitter::new(self)
    }

    /// Add up to `max` of random delay.
    fn with_jitter_up_to(self, max: Duration) -> Jitter<Self> {
        Jitter::up_to(self, max)
    }

    /// Erase the concrete policy type.
    fn boxed(self) -> BoxBackoff
    where
        Self: Send + 'static,
    {
        Box::new(self)
    }
}

impl<B: Backoff> BackoffExt for B {}
