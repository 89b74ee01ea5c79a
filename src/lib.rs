//! # Backwater
//!
//! > *Where failed calls wait for the tide to turn.*
//!
//! A small Rust library for retrying operations that fail transiently.
//!
//! ## Philosophy
//!
//! **Backwater** separates *when to retry* from *what to retry*:
//! - **Backoff** = a stateful policy that says "wait this long" or "stop"
//! - **Retry** = a loop that runs your operation against a policy, racing
//!   every wait against a cancellation handle
//!
//! Policies are composed from small decorators instead of one large
//! configuration struct, so every layer does exactly one thing.
//!
//! ## Quick Example
//!
//! ```rust
//! use backwater::prelude::*;
//! use std::time::Duration;
//!
//! # tokio_test::block_on(async {
//! let ctx = Context::with_timeout(Duration::from_secs(10));
//!
//! // 100ms, 200ms, 400ms ... plus up to 1s of jitter, at most 5 retries
//! let policy = exponential(Duration::from_millis(100))
//!     .with_jitter()
//!     .with_max_retries(5);
//!
//! let result = retry(&ctx, policy, |_ctx| async {
//!     // talk to a flaky service here
//!     Ok::<_, std::io::Error>("response")
//! })
//! .await;
//!
//! match result {
//!     Ok(body) => println!("got {}", body),
//!     Err(RetryError::Exhausted(e)) => println!("gave up after {} attempts: {}", e.attempts, e.final_error),
//!     Err(RetryError::Cancelled(reason)) => println!("cancelled: {}", reason),
//! }
//! # });
//! ```
//!
//! ## Features
//!
//! - `tracing`: emit `tracing` events from the retry loop
//! - `serde`: `Serialize`/`Deserialize` for [`BackoffConfig`]

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]

pub mod backoff;
pub mod config;
pub mod context;
pub mod retry;

// Re-exports
pub use backoff::{Backoff, BackoffExt, BoxBackoff};
pub use config::{BackoffConfig, Strategy};
pub use context::{CancelReason, Cancellation, Context};
pub use retry::{retry, retry_notify, RetryError, RetryEvent, RetryExhausted};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::backoff::{
        backoff_fn, constant, exponential, fibonacci, linear, with_jitter, with_max_delay,
        with_max_retries, Backoff, BackoffExt,
    };
    pub use crate::config::BackoffConfig;
    pub use crate::context::{CancelReason, Cancellation, Context};
    pub use crate::retry::{retry, retry_notify, RetryError, RetryExhausted};
}
