//! Cancellation handles for retry loops.
//!
//! The retry loop never forcibly interrupts anything. Instead it is handed a
//! cancellation handle: it races every inter-attempt wait against the handle,
//! and it passes the handle to the operation so that in-flight work can bail
//! out cooperatively.
//!
//! Any type implementing [`Cancellation`] can play this role. [`Context`] is
//! the batteries-included implementation: a cheaply cloneable handle that
//! fires when [`Context::cancel`] is called or when an optional deadline
//! passes. A plain [`tokio_util::sync::CancellationToken`] works too, for
//! callers that already carry one.
//!
//! # Examples
//!
//! ```
//! use backwater::{CancelReason, Cancellation, Context};
//!
//! let ctx = Context::new();
//! let handle = ctx.clone();
//!
//! assert!(!ctx.is_cancelled());
//! handle.cancel();
//! assert_eq!(ctx.reason(), Some(CancelReason::Cancelled));
//! ```
//!
//! ## With a deadline
//!
//! ```
//! use backwater::{CancelReason, Cancellation, Context};
//! use std::time::Duration;
//!
//! # tokio_test::block_on(async {
//! let ctx = Context::with_timeout(Duration::from_millis(10));
//!
//! assert_eq!(ctx.cancelled().await, CancelReason::DeadlineExceeded);
//! assert!(ctx.is_cancelled());
//! # });
//! ```

use std::error::Error as StdError;
use std::fmt;
use std::future::Future;
use std::sync::{Arc, OnceLock};
use std::time::Duration;

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

/// A source of cooperative cancellation.
///
/// Implementors expose two views of the same signal: a poll
/// ([`reason`](Cancellation::reason)) and a future that resolves once the
/// signal fires ([`cancelled`](Cancellation::cancelled)). Once fired, a handle
/// stays fired and keeps reporting the same reason.
pub trait Cancellation {
    /// Why the handle fired.
    type Reason;

    /// Returns the cancellation reason, or `None` while the handle is live.
    fn reason(&self) -> Option<Self::Reason>;

    /// Returns true once the handle has fired.
    fn is_cancelled(&self) -> bool {
        self.reason().is_some()
    }

    /// Resolves with the reason once the handle fires.
    ///
    /// Resolves immediately if the handle has already fired.
    fn cancelled(&self) -> impl Future<Output = Self::Reason> + Send;
}

/// Why a [`Context`] was cancelled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CancelReason {
    /// [`Context::cancel`] was called.
    Cancelled,
    /// The context's deadline passed.
    DeadlineExceeded,
}

impl CancelReason {
    /// Returns true if the deadline caused the cancellation.
    pub fn is_deadline_exceeded(&self) -> bool {
        matches!(self, Self::DeadlineExceeded)
    }
}

impl fmt::Display for CancelReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Cancelled => write!(f, "context canceled"),
            Self::DeadlineExceeded => write!(f, "context deadline exceeded"),
        }
    }
}

impl StdError for CancelReason {}

/// A cloneable cancellation handle with an optional deadline.
///
/// All clones share state: cancelling one cancels them all. The first cause
/// wins, so a context that hit its deadline keeps reporting
/// [`CancelReason::DeadlineExceeded`] even if [`cancel`](Context::cancel) is
/// called afterwards.
///
/// Deadlines are measured with [`tokio::time::Instant`], so paused-clock
/// tests behave as expected.
#[derive(Debug, Clone)]
pub struct Context {
    inner: Arc<Inner>,
}

#[derive(Debug)]
struct Inner {
    token: CancellationToken,
    reason: OnceLock<CancelReason>,
    deadline: Option<Instant>,
}

impl Context {
    /// Create a context that only fires when [`cancel`](Context::cancel) is called.
    pub fn new() -> Self {
        Self::build(None)
    }

    /// Create a context that fires `timeout` from now.
    pub fn with_timeout(timeout: Duration) -> Self {
        let deadline = Instant::now()
            .checked_add(timeout)
            .unwrap_or_else(far_future);
        Self::build(Some(deadline))
    }

    /// Create a context that fires at `deadline`.
    pub fn with_deadline(deadline: Instant) -> Self {
        Self::build(Some(deadline))
    }

    fn build(deadline: Option<Instant>) -> Self {
        Self {
            inner: Arc::new(Inner {
                token: CancellationToken::new(),
                reason: OnceLock::new(),
                deadline,
            }),
        }
    }

    /// Cancel the context and every clone of it.
    ///
    /// Has no effect if the context already fired.
    pub fn cancel(&self) {
        self.fire(CancelReason::Cancelled);
    }

    /// The deadline, if one was configured.
    pub fn deadline(&self) -> Option<Instant> {
        self.inner.deadline
    }

    /// Record `reason` unless another reason got there first, returning the winner.
    ///
    /// The reason is stored before the token fires, so anyone woken by the
    /// token always finds it set.
    fn fire(&self, reason: CancelReason) -> CancelReason {
        let winner = *self.inner.reason.get_or_init(|| reason);
        self.inner.token.cancel();
        winner
    }

    async fn signalled(&self) -> CancelReason {
        self.inner.token.cancelled().await;
        self.inner
            .reason
            .get()
            .copied()
            .unwrap_or(CancelReason::Cancelled)
    }
}

impl Default for Context {
    fn default() -> Self {
        Self::new()
    }
}

impl Cancellation for Context {
    type Reason = CancelReason;

    fn reason(&self) -> Option<CancelReason> {
        if let Some(reason) = self.inner.reason.get() {
            return Some(*reason);
        }

        match self.inner.deadline {
            Some(deadline) if Instant::now() >= deadline => {
                Some(self.fire(CancelReason::DeadlineExceeded))
            }
            _ => None,
        }
    }

    fn cancelled(&self) -> impl Future<Output = CancelReason> + Send {
        async move {
            match self.inner.deadline {
                Some(deadline) => {
                    tokio::select! {
                        reason = self.signalled() => reason,
                        _ = tokio::time::sleep_until(deadline) => {
                            self.fire(CancelReason::DeadlineExceeded)
                        }
                    }
                }
                None => self.signalled().await,
            }
        }
    }
}

/// A bare token only knows it was cancelled, so it always reports
/// [`CancelReason::Cancelled`].
impl Cancellation for CancellationToken {
    type Reason = CancelReason;

    fn reason(&self) -> Option<CancelReason> {
        CancellationToken::is_cancelled(self).then_some(CancelReason::Cancelled)
    }

    fn cancelled(&self) -> impl Future<Output = CancelReason> + Send {
        async move {
            CancellationToken::cancelled(self).await;
            CancelReason::Cancelled
        }
    }
}

/// Roughly thirty years from now; what tokio itself uses for "never".
fn far_future() -> Instant {
    Instant::now() + Duration::from_secs(86400 * 365 * 30)
}
