//! Request throttling for the text-generation service.
//!
//! Upstream LLM quotas are enforced per API key, so every role client is
//! wrapped in a [`ThrottledProvider`] that waits on a shared [`RateLimiter`]
//! before each call and bounds the call with a timeout.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tokio::time::Instant;

use crate::error::LlmError;
use crate::llm::{GenerationRequest, GenerationResponse, LlmProvider};

/// Slack for float rounding after a refill sleep.
const TOKEN_EPSILON: f64 = 1e-9;

/// How calls through a limiter are paced.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum RateLimitPolicy {
    /// No pacing at all.
    #[default]
    Unlimited,
    /// At most one call per interval.
    FixedInterval(Duration),
    /// Bursts up to `capacity`, refilled continuously at `refill_per_second`.
    TokenBucket { capacity: u32, refill_per_second: f64 },
}

impl RateLimitPolicy {
    /// Builds a token bucket from a per-minute budget. Zero means unlimited.
    pub fn per_minute(requests: u32, burst: u32) -> Self {
        if requests == 0 {
            return RateLimitPolicy::Unlimited;
        }
        RateLimitPolicy::TokenBucket {
            capacity: burst.max(1),
            refill_per_second: f64::from(requests) / 60.0,
        }
    }

    /// Returns `(capacity, refill rate per second)`, or `None` when unlimited.
    fn bucket_shape(&self) -> Option<(f64, f64)> {
        match *self {
            RateLimitPolicy::Unlimited => None,
            RateLimitPolicy::FixedInterval(interval) if interval.is_zero() => None,
            RateLimitPolicy::FixedInterval(interval) => Some((1.0, 1.0 / interval.as_secs_f64())),
            RateLimitPolicy::TokenBucket {
                refill_per_second, ..
            } if refill_per_second <= 0.0 => None,
            RateLimitPolicy::TokenBucket {
                capacity,
                refill_per_second,
            } => Some((f64::from(capacity.max(1)), refill_per_second)),
        }
    }
}

#[derive(Debug)]
struct BucketState {
    tokens: f64,
    last_refill: Instant,
}

/// Async token-bucket limiter. `acquire` waits until a token is available.
#[derive(Debug)]
pub struct RateLimiter {
    policy: RateLimitPolicy,
    state: Mutex<BucketState>,
}

impl RateLimiter {
    /// Creates a limiter with a full bucket.
    pub fn new(policy: RateLimitPolicy) -> Self {
        let tokens = policy.bucket_shape().map(|(cap, _)| cap).unwrap_or(0.0);
        Self {
            policy,
            state: Mutex::new(BucketState {
                tokens,
                last_refill: Instant::now(),
            }),
        }
    }

    /// Creates a limiter that never waits.
    pub fn unlimited() -> Self {
        Self::new(RateLimitPolicy::Unlimited)
    }

    /// Returns the configured policy.
    pub fn policy(&self) -> RateLimitPolicy {
        self.policy
    }

    /// Waits for a token and consumes it. Returns the time spent waiting.
    pub async fn acquire(&self) -> Duration {
        let Some((capacity, rate)) = self.policy.bucket_shape() else {
            return Duration::ZERO;
        };

        let started = Instant::now();
        loop {
            let wait = {
                let mut state = self.state.lock().await;
                let now = Instant::now();
                let elapsed = now.duration_since(state.last_refill).as_secs_f64();
                state.tokens = (state.tokens + elapsed * rate).min(capacity);
                state.last_refill = now;

                if state.tokens + TOKEN_EPSILON >= 1.0 {
                    state.tokens = (state.tokens - 1.0).max(0.0);
                    return started.elapsed();
                }

                Duration::from_secs_f64((1.0 - state.tokens) / rate)
            };

            tokio::time::sleep(wait).await;
        }
    }

    /// Current token count, after refilling for elapsed time.
    pub async fn available_tokens(&self) -> f64 {
        let Some((capacity, rate)) = self.policy.bucket_shape() else {
            return f64::INFINITY;
        };
        let state = self.state.lock().await;
        let elapsed = Instant::now()
            .duration_since(state.last_refill)
            .as_secs_f64();
        (state.tokens + elapsed * rate).min(capacity)
    }
}

/// `LlmProvider` decorator adding pacing and a per-call timeout.
pub struct ThrottledProvider {
    inner: Arc<dyn LlmProvider>,
    limiter: Arc<RateLimiter>,
    call_timeout: Option<Duration>,
    label: String,
}

impl std::fmt::Debug for ThrottledProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ThrottledProvider")
            .field("label", &self.label)
            .field("policy", &self.limiter.policy())
            .field("call_timeout", &self.call_timeout)
            .finish_non_exhaustive()
    }
}

impl ThrottledProvider {
    /// Wraps `inner` with the given limiter and timeout.
    pub fn new(
        inner: Arc<dyn LlmProvider>,
        limiter: Arc<RateLimiter>,
        call_timeout: Option<Duration>,
    ) -> Self {
        Self {
            inner,
            limiter,
            call_timeout,
            label: "llm".to_string(),
        }
    }

    /// Sets the label used in log lines (usually the role name).
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    /// Returns the shared limiter.
    pub fn limiter(&self) -> &Arc<RateLimiter> {
        &self.limiter
    }
}

#[async_trait]
impl LlmProvider for ThrottledProvider {
    async fn generate(&self, request: GenerationRequest) -> Result<GenerationResponse, LlmError> {
        let waited = self.limiter.acquire().await;
        if !waited.is_zero() {
            tracing::debug!(
                role = %self.label,
                waited_ms = waited.as_millis() as u64,
                "Throttled LLM call"
            );
        }

        match self.call_timeout {
            Some(limit) => tokio::time::timeout(limit, self.inner.generate(request))
                .await
                .map_err(|_| {
                    tracing::warn!(role = %self.label, seconds = limit.as_secs(), "LLM call timed out");
                    LlmError::Timeout {
                        seconds: limit.as_secs(),
                    }
                })?,
            None => self.inner.generate(request).await,
        }
    }
}
