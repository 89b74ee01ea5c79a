//! Error types for retry operations.

use std::time::Duration;

/// Error returned when the backoff policy gave up.
///
/// Contains the final operation error along with metadata about the retry
/// sequence.
///
/// # Examples
///
/// ```rust
/// use backwater::backoff::{constant, BackoffExt};
/// use backwater::{retry, Context, RetryError};
/// use std::time::Duration;
///
/// # tokio_test::block_on(async {
/// let policy = constant(Duration::from_millis(1)).with_max_retries(2);
///
/// let result = retry(&Context::new(), policy, |_| async { Err::<(), _>("always fails") }).await;
///
/// match result {
///     Err(RetryError::Exhausted(exhausted)) => {
///         assert_eq!(exhausted.final_error, "always fails");
///         assert_eq!(exhausted.attempts, 3); // 1 initial + 2 retries
///     }
///     _ => panic!("Expected exhaustion"),
/// }
/// # });
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryExhausted<E> {
    /// The error from the final attempt.
    pub final_error: E,
    /// Total number of attempts made (initial + retries).
    pub attempts: u32,
    /// Total time spent retrying.
    pub total_duration: Duration,
}

impl<E> RetryExhausted<E> {
    /// Create a new RetryExhausted error.
    pub fn new(final_error: E, attempts: u32, total_duration: Duration) -> Self {
        Self {
            final_error,
            attempts,
            total_duration,
        }
    }

    /// Extract the final error, discarding metadata.
    pub fn into_error(self) -> E {
        self.final_error
    }

    /// Get a reference to the final error.
    pub fn error(&self) -> &E {
        &self.final_error
    }
}

impl<E: std::fmt::Display> std::fmt::Display for RetryExhausted<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "retry exhausted after {} attempts ({:?}): {}",
            self.attempts, self.total_duration, self.final_error
        )
    }
}

impl<E: std::error::Error + 'static> std::error::Error for RetryExhausted<E> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.final_error)
    }
}

/// The terminal failure of a retry sequence.
///
/// Exactly one of two things ends an unsuccessful sequence:
///
/// - the backoff policy stopped ([`RetryError::Exhausted`]), carrying the
///   last operation error, or
/// - the cancellation handle fired ([`RetryError::Cancelled`]), carrying the
///   handle's own reason. Cancellation takes precedence over any pending
///   operation error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RetryError<E, R> {
    /// The policy signalled stop after the last attempt failed.
    Exhausted(RetryExhausted<E>),
    /// The cancellation handle fired.
    Cancelled(R),
}

impl<E, R> RetryError<E, R> {
    /// Returns true if the policy gave up.
    pub fn is_exhausted(&self) -> bool {
        matches!(self, Self::Exhausted(_))
    }

    /// Returns true if the sequence was cancelled.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled(_))
    }

    /// The cancellation reason, if the sequence was cancelled.
    pub fn cancel_reason(&self) -> Option<&R> {
        match self {
            Self::Cancelled(reason) => Some(reason),
            Self::Exhausted(_) => None,
        }
    }

    /// The last operation error, if the policy gave up.
    pub fn into_operation_error(self) -> Option<E> {
        match self {
            Self::Exhausted(exhausted) => Some(exhausted.final_error),
            Self::Cancelled(_) => None,
        }
    }
}

impl<E: std::fmt::Display, R: std::fmt::Display> std::fmt::Display for RetryError<E, R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Exhausted(exhausted) => write!(f, "{}", exhausted),
            Self::Cancelled(reason) => write!(f, "retry cancelled: {}", reason),
        }
    }
}

impl<E, R> std::error::Error for RetryError<E, R>
where
    E: std::error::Error + 'static,
    R: std::error::Error + 'static,
{
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Exhausted(exhausted) => Some(&exhausted.final_error),
            Self::Cancelled(reason) => Some(reason),
        }
    }
}

#[cfg(test)]
mod error_tests {
    use super::*;
    use crate::CancelReason;
    use std::error::Error;
    use std::fmt;

    #[derive(Debug, PartialEq)]
    struct Refused;

    impl fmt::Display for Refused {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "connection refused")
        }
    }

    impl Error for Refused {}

    #[test]
    fn test_retry_exhausted_display() {
        let err = RetryExhausted::new("connection failed", 3, Duration::from_millis(500));
        let display = format!("{}", err);
        assert!(display.contains("retry exhausted"));
        assert!(display.contains("3 attempts"));
        assert!(display.contains("connection failed"));
    }

    #[test]
    fn test_retry_exhausted_into_error() {
        let err = RetryExhausted::new("test error", 5, Duration::from_secs(1));
        assert_eq!(err.error(), &"test error");
        assert_eq!(err.into_error(), "test error");
    }

    #[test]
    fn test_retry_error_exhausted_accessors() {
        let err: RetryError<_, CancelReason> =
            RetryError::Exhausted(RetryExhausted::new(Refused, 2, Duration::ZERO));

        assert!(err.is_exhausted());
        assert!(!err.is_cancelled());
        assert_eq!(err.cancel_reason(), None);
        assert_eq!(err.into_operation_error(), Some(Refused));
    }

    #[test]
    fn test_retry_error_cancelled_accessors() {
        let err: RetryError<Refused, _> = RetryError::Cancelled(CancelReason::DeadlineExceeded);

        assert!(err.is_cancelled());
        assert!(!err.is_exhausted());
        assert_eq!(err.cancel_reason(), Some(&CancelReason::DeadlineExceeded));
        assert_eq!(err.into_operation_error(), None);
    }

    #[test]
    fn test_retry_error_display() {
        let exhausted: RetryError<_, CancelReason> =
            RetryError::Exhausted(RetryExhausted::new(Refused, 4, Duration::ZERO));
        assert!(exhausted.to_string().contains("connection refused"));

        let cancelled: RetryError<Refused, _> = RetryError::Cancelled(CancelReason::Cancelled);
        assert_eq!(cancelled.to_string(), "retry cancelled: context canceled");
    }

    #[test]
    fn test_retry_error_source() {
        let exhausted: RetryError<_, CancelReason> =
            RetryError::Exhausted(RetryExhausted::new(Refused, 1, Duration::ZERO));
        let source = exhausted.source().map(|s| s.to_string());
        assert_eq!(source.as_deref(), Some("connection refused"));

        let cancelled: RetryError<Refused, _> =
            RetryError::Cancelled(CancelReason::DeadlineExceeded);
        let source = cancelled.source().map(|s| s.to_string());
        assert_eq!(source.as_deref(), Some("context deadline exceeded"));
    }
}
