//! The retry executor.
//!
//! [`retry`] drives a fallible async operation through repeated attempts,
//! consulting a [`Backoff`](crate::Backoff) policy between failures and
//! racing every wait against a [`Cancellation`](crate::Cancellation) handle.
//!
//! # Quick Start
//!
//! ```rust
//! use backwater::backoff::{exponential, BackoffExt};
//! use backwater::{retry, Context};
//! use std::time::Duration;
//!
//! # tokio_test::block_on(async {
//! let ctx = Context::with_timeout(Duration::from_secs(5));
//! let policy = exponential(Duration::from_millis(10))
//!     .with_jitter_up_to(Duration::from_millis(5))
//!     .with_max_retries(3);
//!
//! let result = retry(&ctx, policy, |_| async { Ok::<_, String>(42) }).await;
//!
//! assert_eq!(result, Ok(42));
//! # });
//! ```
//!
//! # Every Failure Is Retryable
//!
//! The executor does not classify errors. Whether another attempt happens is
//! decided by the policy alone; an operation that wants to give up early
//! should encode that in its own result type (for example by returning
//! `Ok(Err(permanent))`).
//!
//! # Error Types
//!
//! - [`RetryError`]: the terminal failure, either exhaustion or cancellation
//! - [`RetryExhausted`]: the last operation error with attempt metadata

mod error;
mod executor;

pub use error::{RetryError, RetryExhausted};
pub use executor::{retry, retry_notify, RetryEvent};

#[cfg(test)]
mod tests;
