//! Retry Patterns Example
//!
//! Demonstrates backoff composition and the cancellable retry loop.
//! Shows practical patterns including:
//! - Basic retry with exponential backoff
//! - Comparing backoff strategies
//! - Layering decorators (cap, jitter, retry limit)
//! - Observability hooks
//! - Deadlines and manual cancellation
//! - Loading a policy from configuration
//!
//! Run with `cargo run --example retry_patterns --features tracing` to see the
//! loop's own trace events as well.

use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use backwater::prelude::*;
use backwater::BoxBackoff;

// ==================== Basic Retry ====================

/// Example 1: Basic retry with exponential backoff
///
/// Demonstrates retrying an operation that fails transiently.
async fn example_basic_retry() {
    println!("\n=== Example 1: Basic Retry ===");

    let attempts = AtomicU32::new(0);

    let result = retry(
        &Context::new(),
        exponential(Duration::from_millis(100)).with_max_retries(5),
        |_| async {
            let n = attempts.fetch_add(1, Ordering::SeqCst);
            println!("  Attempt {}", n + 1);
            if n < 2 {
                Err("transient failure")
            } else {
                Ok("success!")
            }
        },
    )
    .await;

    match result {
        Ok(value) => println!(
            "Success after {} attempts: {}",
            attempts.load(Ordering::SeqCst),
            value
        ),
        Err(err) => println!("Failed: {}", err),
    }
}

// ==================== Different Backoff Strategies ====================

/// Example 2: Comparing different backoff strategies
///
/// Shows how delay increases with different strategies.
fn example_backoff_strategies() {
    println!("\n=== Example 2: Backoff Strategies ===");

    let base = Duration::from_millis(100);
    let strategies: Vec<(&str, BoxBackoff)> = vec![
        ("Constant", constant(base).boxed()),
        ("Linear", linear(base).boxed()),
        ("Exponential", exponential(base).boxed()),
        ("Fibonacci", fibonacci(base).boxed()),
    ];

    for (name, mut policy) in strategies {
        let delays: Vec<_> = (0..6).filter_map(|_| policy.next()).collect();
        println!("  {:<12} {:?}", name, delays);
    }
}

// ==================== Decorators ====================

/// Example 3: Layering decorators
///
/// Cap the exponential growth, spread clients out with jitter, and stop
/// after a bounded number of retries.
fn example_decorators() {
    println!("\n=== Example 3: Decorators ===");

    let mut policy = exponential(Duration::from_millis(100))
        .with_max_delay(Duration::from_millis(500))
        .with_jitter_up_to(Duration::from_millis(50))
        .with_max_retries(6);

    let mut n = 0;
    while let Some(delay) = policy.next() {
        n += 1;
        println!("  Retry {} after {:?}", n, delay);
    }
    println!("  Policy stopped after {} retries", n);
}

// ==================== Hooks ====================

/// Example 4: Observing failures with retry_notify
async fn example_hooks() {
    println!("\n=== Example 4: Retry Hooks ===");

    let result = retry_notify(
        &Context::new(),
        constant(Duration::from_millis(20)).with_max_retries(3),
        |_| async { Err::<(), _>("service unavailable") },
        |event| match event.next_delay {
            Some(delay) => println!(
                "  Attempt {} failed ({}), retrying in {:?} [elapsed {:?}]",
                event.attempt, event.error, delay, event.elapsed
            ),
            None => println!(
                "  Attempt {} failed ({}), giving up",
                event.attempt, event.error
            ),
        },
    )
    .await;

    if let Err(RetryError::Exhausted(exhausted)) = result {
        println!("Exhausted: {}", exhausted);
    }
}

// ==================== Cancellation ====================

/// Example 5: Deadlines and manual cancellation
///
/// Cancellation wins over a pending wait, and the caller sees the
/// cancellation reason rather than the operation's last error.
async fn example_cancellation() {
    println!("\n=== Example 5: Cancellation ===");

    let ctx = Context::with_timeout(Duration::from_millis(150));
    let result = retry(&ctx, constant(Duration::from_secs(5)), |_| async {
        Err::<(), _>("still down")
    })
    .await;
    println!("  With deadline: {:?}", result);

    let ctx = Context::new();
    let canceller = ctx.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(100)).await;
        println!("  Shutting down...");
        canceller.cancel();
    });

    let result = retry(&ctx, constant(Duration::from_millis(30)), |ctx| async move {
        if ctx.is_cancelled() {
            return Err::<(), _>("aborted");
        }
        Err("still down")
    })
    .await;
    match result {
        Err(RetryError::Cancelled(reason)) => println!("  Cancelled: {}", reason),
        other => println!("  Unexpected: {:?}", other),
    }
}

// ==================== Configuration ====================

/// Example 6: One config, many sequences
///
/// `BackoffConfig` is plain data; every `build()` starts a fresh policy.
async fn example_config() {
    println!("\n=== Example 6: Configuration ===");

    let config = BackoffConfig::fibonacci(Duration::from_millis(10))
        .with_max_delay(Duration::from_millis(50))
        .with_jitter_up_to(Duration::from_millis(5))
        .with_max_retries(4);
    println!("  {:?}", config);

    for job in ["alpha", "beta"] {
        let attempts = AtomicU32::new(0);
        let result = retry(&Context::new(), config.build(), |_| async {
            attempts.fetch_add(1, Ordering::SeqCst);
            Err::<(), _>(format!("{} failed", job))
        })
        .await;
        println!(
            "  {}: {} attempts, error = {}",
            job,
            attempts.load(Ordering::SeqCst),
            result.unwrap_err()
        );
    }
}

#[tokio::main]
async fn main() {
    #[cfg(feature = "tracing")]
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    println!("Backwater Retry Patterns");
    println!("========================");

    example_basic_retry().await;
    example_backoff_strategies();
    example_decorators();
    example_hooks().await;
    example_cancellation().await;
    example_config().await;

    println!("\nAll examples completed!");
}
