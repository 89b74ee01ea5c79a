//! Integration tests for retry functionality.

use super::*;
use crate::backoff::{backoff_fn, constant, exponential, with_max_retries, BackoffExt, Jitter};
use crate::{CancelReason, Context};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;

fn always_fails(
    counter: &AtomicU32,
) -> impl std::future::Future<Output = Result<(), &'static str>> + '_ {
    async move {
        counter.fetch_add(1, Ordering::SeqCst);
        Err("something's wrong")
    }
}

#[tokio::test]
async fn test_exit_on_max_attempt() {
    let counter = AtomicU32::new(0);
    let backoff = with_max_retries(3, backoff_fn(|| Some(Duration::from_nanos(1))));

    let result = retry(&Context::new(), backoff, |_| always_fails(&counter)).await;

    assert!(result.is_err());
    assert_eq!(counter.load(Ordering::SeqCst), 4); // 1 initial + 3 retries
}

#[tokio::test]
async fn test_exit_no_error() {
    let counter = AtomicU32::new(0);
    let backoff = with_max_retries(3, backoff_fn(|| Some(Duration::from_millis(1))));

    let result = retry(&Context::new(), backoff, |_| async {
        counter.fetch_add(1, Ordering::SeqCst);
        Ok::<_, &str>(())
    })
    .await;

    assert!(result.is_ok());
    assert_eq!(counter.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_context_deadline_wins_over_long_wait() {
    let ctx = Context::with_timeout(Duration::from_millis(50));
    let backoff = backoff_fn(|| Some(Duration::from_secs(5)));
    let start = Instant::now();

    let result = retry(&ctx, backoff, |_| async { Err::<(), _>("something's wrong") }).await;

    assert_eq!(
        result,
        Err(RetryError::Cancelled(CancelReason::DeadlineExceeded))
    );
    assert!(start.elapsed() < Duration::from_secs(1));
}

#[tokio::test]
async fn test_manual_cancel_wins_over_long_wait() {
    let ctx = Context::new();
    let handle = ctx.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        handle.cancel();
    });
    let start = Instant::now();

    let result = retry(&ctx, constant(Duration::from_secs(5)), |_| async {
        Err::<(), _>("something's wrong")
    })
    .await;

    assert_eq!(result, Err(RetryError::Cancelled(CancelReason::Cancelled)));
    assert!(start.elapsed() < Duration::from_secs(1));
}

#[tokio::test]
async fn test_with_deadline_fires_during_wait() {
    let deadline = tokio::time::Instant::now() + Duration::from_millis(40);
    let ctx = Context::with_deadline(deadline);
    let counter = AtomicU32::new(0);

    let result = retry(&ctx, constant(Duration::from_secs(5)), |_| always_fails(&counter)).await;

    assert_eq!(
        result,
        Err(RetryError::Cancelled(CancelReason::DeadlineExceeded))
    );
    assert_eq!(counter.load(Ordering::SeqCst), 1);
    assert!(tokio::time::Instant::now() >= deadline);
    assert!(tokio::time::Instant::now() < deadline + Duration::from_secs(1));
}

#[tokio::test]
async fn test_cancellation_token_drives_retry() {
    let token = CancellationToken::new();
    let trigger = token.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(30)).await;
        trigger.cancel();
    });
    let counter = AtomicU32::new(0);

    let result = retry(&token, constant(Duration::from_millis(5)), |_| {
        always_fails(&counter)
    })
    .await;

    assert_eq!(result, Err(RetryError::Cancelled(CancelReason::Cancelled)));
    assert!(counter.load(Ordering::SeqCst) >= 2);
}

#[tokio::test]
async fn test_zero_max_retries_runs_once() {
    let counter = AtomicU32::new(0);

    let result = retry(
        &Context::new(),
        constant(Duration::from_millis(1)).with_max_retries(0),
        |_| always_fails(&counter),
    )
    .await;

    match result {
        Err(RetryError::Exhausted(exhausted)) => assert_eq!(exhausted.attempts, 1),
        other => panic!("expected exhaustion, got {:?}", other),
    }
    assert_eq!(counter.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_retry_succeeds_on_third_attempt() {
    let attempts = Arc::new(AtomicU32::new(0));

    let result = retry(
        &Context::new(),
        constant(Duration::from_millis(1)).with_max_retries(5),
        |_| {
            let attempts = attempts.clone();
            async move {
                let n = attempts.fetch_add(1, Ordering::SeqCst);
                if n < 2 {
                    Err("transient failure")
                } else {
                    Ok("success")
                }
            }
        },
    )
    .await;

    assert_eq!(result, Ok("success"));
    assert_eq!(attempts.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn test_composition_order_keeps_attempt_count() {
    let d = Duration::from_millis(1);
    let spread = Duration::from_millis(5);

    let outer_limit = AtomicU32::new(0);
    let _ = retry(
        &Context::new(),
        with_max_retries(3, Jitter::up_to(constant(d), spread)),
        |_| always_fails(&outer_limit),
    )
    .await;

    let inner_limit = AtomicU32::new(0);
    let _ = retry(
        &Context::new(),
        Jitter::up_to(with_max_retries(3, constant(d)), spread),
        |_| always_fails(&inner_limit),
    )
    .await;

    assert_eq!(outer_limit.load(Ordering::SeqCst), 4);
    assert_eq!(inner_limit.load(Ordering::SeqCst), 4);
}

#[tokio::test]
async fn test_policy_borrowed_by_mut_ref_can_be_inspected() {
    let mut policy = exponential(Duration::from_millis(1)).with_max_retries(2);

    let _ = retry(&Context::new(), &mut policy, |_| async {
        Err::<(), _>("boom")
    })
    .await;

    assert_eq!(policy.attempts(), 2);
}

#[tokio::test]
async fn test_waits_between_attempts() {
    let start = Instant::now();

    let _ = retry(
        &Context::new(),
        constant(Duration::from_millis(20)).with_max_retries(2),
        |_| async { Err::<(), _>("boom") },
    )
    .await;

    assert!(start.elapsed() >= Duration::from_millis(40));
}

#[tokio::test]
async fn test_retry_notify_reports_each_failure() {
    let mut events = Vec::new();

    let result = retry_notify(
        &Context::new(),
        constant(Duration::from_millis(1)).with_max_retries(2),
        |_| async { Err::<(), _>("boom") },
        |event| {
            events.push((event.attempt, *event.error, event.next_delay));
        },
    )
    .await;

    assert!(result.unwrap_err().is_exhausted());
    assert_eq!(
        events,
        vec![
            (1, "boom", Some(Duration::from_millis(1))),
            (2, "boom", Some(Duration::from_millis(1))),
            (3, "boom", None),
        ]
    );
}

#[tokio::test]
async fn test_concurrent_sequences_are_independent() {
    let ctx = Context::new();
    let counters: Vec<AtomicU32> = (0..8).map(|_| AtomicU32::new(0)).collect();

    let runs = counters.iter().enumerate().map(|(i, counter)| {
        retry(
            &ctx,
            constant(Duration::from_millis(1)).with_max_retries(i as u32),
            move |_| always_fails(counter),
        )
    });
    futures::future::join_all(runs).await;

    for (i, counter) in counters.iter().enumerate() {
        assert_eq!(counter.load(Ordering::SeqCst), i as u32 + 1);
    }
}
