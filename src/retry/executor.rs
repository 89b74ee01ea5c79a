//! The retry loop.
//!
//! ```text
//!            ┌──────────────── wait elapsed ───────────────┐
//!            ▼                                             │
//!   ──► Attempting ──Err, Some(d)──► Waiting(d) ───────────┘
//!        │      │                       │
//!       Ok    Err, None            ctx fired
//!        ▼      ▼                       ▼
//!   Success  Exhausted              Cancelled
//! ```
//!
//! Attempts run strictly one after another. The only place the loop waits on
//! its own is between attempts, and that wait always races the cancellation
//! handle.

use std::future::Future;
use std::time::Duration;

use tokio::time::Instant;

use crate::backoff::Backoff;
use crate::context::Cancellation;
use crate::retry::{RetryError, RetryExhausted};

/// Information about a failed attempt, passed to the hook of [`retry_notify`].
#[derive(Debug)]
pub struct RetryEvent<'a, E> {
    /// Which attempt just failed (1-indexed).
    pub attempt: u32,
    /// The error from the failed attempt.
    pub error: &'a E,
    /// Delay before the next attempt, or `None` if the policy gave up.
    pub next_delay: Option<Duration>,
    /// Total elapsed time since the first attempt.
    pub elapsed: Duration,
}

impl<E> Clone for RetryEvent<'_, E> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<E> Copy for RetryEvent<'_, E> {}

/// Run `operation` until it succeeds, `backoff` gives up, or `ctx` fires.
///
/// The operation receives the cancellation handle on every attempt so it can
/// stop in-flight work cooperatively; the loop itself never interrupts a
/// running attempt.
///
/// # Outcomes
///
/// - `Ok(value)` from the first successful attempt, with no waiting.
/// - [`RetryError::Exhausted`] with the last operation error once the policy
///   returns `None`.
/// - [`RetryError::Cancelled`] with the handle's reason if it fires while
///   waiting between attempts, or before the first attempt.
///
/// The policy is taken by value: one policy drives one sequence. Pass
/// `&mut policy` to inspect it afterwards.
///
/// # Example
///
/// ```rust
/// use backwater::backoff::{exponential, BackoffExt};
/// use backwater::{retry, Context};
/// use std::sync::atomic::{AtomicU32, Ordering};
/// use std::time::Duration;
///
/// # tokio_test::block_on(async {
/// let calls = AtomicU32::new(0);
///
/// let result = retry(
///     &Context::new(),
///     exponential(Duration::from_millis(1)).with_max_retries(5),
///     |_| async {
///         if calls.fetch_add(1, Ordering::SeqCst) < 2 {
///             Err("transient failure")
///         } else {
///             Ok("success")
///         }
///     },
/// )
/// .await;
///
/// assert_eq!(result, Ok("success"));
/// assert_eq!(calls.load(Ordering::SeqCst), 3);
/// # });
/// ```
pub async fn retry<'a, C, B, F, Fut, T, E>(
    ctx: &'a C,
    backoff: B,
    operation: F,
) -> Result<T, RetryError<E, C::Reason>>
where
    C: Cancellation,
    B: Backoff,
    F: FnMut(&'a C) -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    retry_notify(ctx, backoff, operation, |_: &RetryEvent<'_, E>| {}).await
}

/// Like [`retry`], calling `on_retry` after every failed attempt.
///
/// The hook is synchronous and should not block; use it for logging and
/// metrics. It sees every failure, including the last one, whose
/// [`RetryEvent::next_delay`] is `None`. Cancellation during the following
/// wait is not reported to the hook.
///
/// # Example
///
/// ```rust
/// use backwater::backoff::{constant, BackoffExt};
/// use backwater::{retry_notify, Context};
/// use std::time::Duration;
///
/// # tokio_test::block_on(async {
/// let mut seen = Vec::new();
///
/// let result = retry_notify(
///     &Context::new(),
///     constant(Duration::from_millis(1)).with_max_retries(2),
///     |_| async { Err::<(), _>("boom") },
///     |event| seen.push((event.attempt, event.next_delay)),
/// )
/// .await;
///
/// assert!(result.is_err());
/// assert_eq!(
///     seen,
///     vec![
///         (1, Some(Duration::from_millis(1))),
///         (2, Some(Duration::from_millis(1))),
///         (3, None),
///     ]
/// );
/// # });
/// ```
pub async fn retry_notify<'a, C, B, F, Fut, T, E, H>(
    ctx: &'a C,
    mut backoff: B,
    mut operation: F,
    mut on_retry: H,
) -> Result<T, RetryError<E, C::Reason>>
where
    C: Cancellation,
    B: Backoff,
    F: FnMut(&'a C) -> Fut,
    Fut: Future<Output = Result<T, E>>,
    H: FnMut(&RetryEvent<'_, E>),
{
    if let Some(reason) = ctx.reason() {
        #[cfg(feature = "tracing")]
        tracing::debug!("retry cancelled before first attempt");
        return Err(RetryError::Cancelled(reason));
    }

    let start = Instant::now();
    let mut attempt = 0u32;

    loop {
        attempt = attempt.saturating_add(1);

        let error = match operation(ctx).await {
            Ok(value) => return Ok(value),
            Err(error) => error,
        };

        let delay = backoff.next();
        on_retry(&RetryEvent {
            attempt,
            error: &error,
            next_delay: delay,
            elapsed: start.elapsed(),
        });

        let Some(delay) = delay else {
            let elapsed = start.elapsed();
            #[cfg(feature = "tracing")]
            tracing::warn!(attempts = attempt, ?elapsed, "retry exhausted");
            return Err(RetryError::Exhausted(RetryExhausted::new(
                error, attempt, elapsed,
            )));
        };

        #[cfg(feature = "tracing")]
        tracing::debug!(attempt, ?delay, "attempt failed, retrying");

        tokio::select! {
            biased;
            reason = ctx.cancelled() => {
                #[cfg(feature = "tracing")]
                tracing::debug!(attempt, "retry cancelled while waiting");
                return Err(RetryError::Cancelled(reason));
            }
            _ = tokio::time::sleep(delay) => {}
        }
    }
}
