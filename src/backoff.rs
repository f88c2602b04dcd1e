//! Backoff policies consulted between attempts.

use std::time::Duration;

use rand::Rng;

/// Decides whether another attempt may be issued and how long to wait first.
///
/// Implementations hold configuration only. All per-call state is owned by the
/// retry engine, so a single policy can serve concurrent calls.
pub trait Backoff: Send + Sync {
    /// Whether another call may follow `calls_made` completed calls.
    fn permits(&self, calls_made: u32) -> bool;

    /// Delay before the call that follows `calls_made` completed calls.
    fn delay(&self, calls_made: u32) -> Duration;
}

impl<B: Backoff + ?Sized> Backoff for std::sync::Arc<B> {
    fn permits(&self, calls_made: u32) -> bool {
        (**self).permits(calls_made)
    }

    fn delay(&self, calls_made: u32) -> Duration {
        (**self).delay(calls_made)
    }
}

/// Exponential backoff with optional jitter, bounded by a total call count.
#[derive(Clone, Debug, PartialEq)]
pub struct ExponentialBackoff {
    /// Total number of calls allowed, including the first one.
    pub max_calls: u32,
    /// Delay before the first retry.
    pub initial_delay: Duration,
    /// Upper bound on any single delay, before jitter.
    pub max_delay: Duration,
    /// Growth factor applied per completed call.
    pub multiplier: u32,
    /// Fraction of the delay added as random jitter (0.0 to 1.0).
    pub jitter: f64,
}

impl Default for ExponentialBackoff {
    fn default() -> Self {
        Self {
            max_calls: 1,
            initial_delay: Duration::from_millis(250),
            max_delay: Duration::from_secs(10),
            multiplier: 2,
            jitter: 0.1,
        }
    }
}

impl ExponentialBackoff {
    /// Default growth with at most `max_calls` calls in total.
    pub fn max_calls(max_calls: u32) -> Self {
        Self {
            max_calls,
            ..Self::default()
        }
    }

    pub fn with_initial_delay(mut self, delay: Duration) -> Self {
        self.initial_delay = delay;
        self
    }

    pub fn with_max_delay(mut self, delay: Duration) -> Self {
        self.max_delay = delay;
        self
    }

    pub fn with_multiplier(mut self, multiplier: u32) -> Self {
        self.multiplier = multiplier.max(1);
        self
    }

    pub fn with_jitter(mut self, jitter: f64) -> Self {
        self.jitter = if jitter.is_nan() {
            0.0
        } else {
            jitter.clamp(0.0, 1.0)
        };
        self
    }

    fn base_delay(&self, calls_made: u32) -> Duration {
        let exp = calls_made.saturating_sub(1).min(16);
        let factor = self.multiplier.saturating_pow(exp);
        self.initial_delay
            .saturating_mul(factor)
            .min(self.max_delay)
    }
}

impl Backoff for ExponentialBackoff {
    fn permits(&self, calls_made: u32) -> bool {
        calls_made < self.max_calls
    }

    fn delay(&self, calls_made: u32) -> Duration {
        let delay = self.base_delay(calls_made);
        let jitter_range = delay.as_millis() as f64 * self.jitter;
        // `jitter` is public, so NaN and infinities can still reach here.
        if !(jitter_range >= 1.0) || !jitter_range.is_finite() {
            return delay;
        }
        let jitter = rand::thread_rng().gen_range(0.0..jitter_range);
        delay + Duration::from_millis(jitter as u64)
    }
}

/// Fixed delay between attempts.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConstantBackoff {
    pub max_calls: u32,
    pub delay: Duration,
}

impl ConstantBackoff {
    pub fn new(max_calls: u32, delay: Duration) -> Self {
        Self { max_calls, delay }
    }
}

impl Backoff for ConstantBackoff {
    fn permits(&self, calls_made: u32) -> bool {
        calls_made < self.max_calls
    }

    fn delay(&self, _calls_made: u32) -> Duration {
        self.delay
    }
}
