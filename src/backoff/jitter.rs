//! Randomized jitter for backoff delays.
//!
//! Clients that fail together tend to retry together. [`Jitter`] adds a
//! uniformly distributed extra delay to every wait so that a crowd of
//! clients spreads out instead of hammering a recovering service in lockstep.
//!
//! Randomness does not need to be cryptographically secure. By default it
//! comes from `rand`'s thread-local generator via [`DefaultRng`]; inject a
//! seeded generator with [`Jitter::with_rng`] for reproducible tests.

use std::time::Duration;

use rand::{Rng, RngCore};

use super::Backoff;

/// Upper bound (exclusive) of the extra delay added by [`Jitter::new`].
pub const DEFAULT_MAX_JITTER: Duration = Duration::from_millis(1000);

/// Handle onto `rand`'s thread-local generator.
///
/// Zero-sized, `Copy`, `Send` and `Sync`: every call borrows the generator of
/// the current thread, so jittered policies stay movable across tasks.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultRng;

impl RngCore for DefaultRng {
    fn next_u32(&mut self) -> u32 {
        rand::rng().next_u32()
    }

    fn next_u64(&mut self) -> u64 {
        rand::rng().next_u64()
    }

    fn fill_bytes(&mut self, dst: &mut [u8]) {
        rand::rng().fill_bytes(dst)
    }
}

/// Adds a random delay in `[0, max)` to every delay of the wrapped policy.
///
/// A stop (`None`) from the inner policy is passed through untouched; jitter
/// never turns a stop into a wait.
#[derive(Debug, Clone)]
pub struct Jitter<B, R = DefaultRng> {
    inner: B,
    max: Duration,
    rng: R,
}

impl<B> Jitter<B> {
    /// Wrap `inner`, adding up to [`DEFAULT_MAX_JITTER`].
    pub fn new(inner: B) -> Self {
        Self::up_to(inner, DEFAULT_MAX_JITTER)
    }

    /// Wrap `inner`, adding up to `max` (exclusive). A zero `max` adds nothing.
    pub fn up_to(inner: B, max: Duration) -> Self {
        Self {
            inner,
            max,
            rng: DefaultRng,
        }
    }
}

impl<B, R> Jitter<B, R> {
    /// Replace the random source.
    ///
    /// # Example
    ///
    /// ```rust
    /// use backwater::backoff::{constant, Backoff, Jitter};
    /// use rand::{rngs::StdRng, SeedableRng};
    /// use std::time::Duration;
    ///
    /// let mut a = Jitter::new(constant(Duration::ZERO)).with_rng(StdRng::seed_from_u64(7));
    /// let mut b = Jitter::new(constant(Duration::ZERO)).with_rng(StdRng::seed_from_u64(7));
    ///
    /// assert_eq!(a.next(), b.next());
    /// ```
    pub fn with_rng<R2: RngCore>(self, rng: R2) -> Jitter<B, R2> {
        Jitter {
            inner: self.inner,
            max: self.max,
            rng,
        }
    }

    /// The exclusive upper bound of the added delay.
    pub fn max_jitter(&self) -> Duration {
        self.max
    }

    /// Unwrap the decorated policy.
    pub fn into_inner(self) -> B {
        self.inner
    }
}

impl<B: Backoff, R: RngCore> Backoff for Jitter<B, R> {
    fn next(&mut self) -> Option<Duration> {
        let delay = self.inner.next()?;
        if self.max.is_zero() {
            return Some(delay);
        }

        let extra = self.rng.random_range(Duration::ZERO..self.max);
        Some(delay.saturating_add(extra))
    }
}

/// Decorate `inner` with up to one second of random extra delay.
///
/// # Examples
///
/// ```rust
/// use backwater::backoff::{constant, with_jitter, Backoff};
/// use std::time::Duration;
///
/// let base = Duration::from_millis(100);
/// let mut policy = with_jitter(constant(base));
///
/// let delay = policy.next().unwrap();
/// assert!(delay >= base && delay < base + Duration::from_millis(1000));
/// ```
pub fn with_jitter<B: Backoff>(inner: B) -> Jitter<B> {
    Jitter::new(inner)
}
