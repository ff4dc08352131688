//! Retry classification and backoff.
//!
//! Each attempt of a logical call ends in one of the [`Outcome`]s below.
//! Rate limits (429), server errors (5xx), 401 and network failures are
//! retried until their attempt budget is spent; every other 4xx is fatal on
//! the spot.
//!
//! The delay before retry *k* of a call is `backoff_unit * base^k`. A random
//! addend of at most `jitter_ceiling` is drawn when the client goes from
//! healthy to failing and added to every delay of that failure run, so that
//! many clients hitting the same limit at once do not retry in lockstep.
//! After `cooldown_successes` consecutive successful calls the backoff timer
//! returns to zero and the next failure draws a new addend.

use crate::{Error, Result};
use http::StatusCode;
use rand::Rng;
use std::collections::HashMap;
use std::time::Duration;

/// Classification of one attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// 2xx/3xx.
    Success,
    /// Network failure with budget remaining.
    RetryableNetwork,
    /// Retryable status with budget remaining.
    RetryableHttp,
    /// Non-retryable status, or retryable status with the budget spent.
    FatalHttp,
    /// Network failure with the budget spent.
    FatalNetwork,
}

impl Outcome {
    /// Whether the call should be re-issued.
    pub fn is_retryable(self) -> bool {
        matches!(self, Outcome::RetryableNetwork | Outcome::RetryableHttp)
    }
}

/// Retry and backoff settings.
///
/// # Examples
///
/// ```
/// use pdrest::RetryConfig;
/// use http::StatusCode;
/// use std::time::Duration;
///
/// let config = RetryConfig::default()
///     .max_http_attempts(5)
///     .backoff_base(1.5)
///     .backoff_unit(Duration::from_millis(500))
///     .jitter_ceiling(Duration::from_secs(2))
///     // never retry authentication failures
///     .retry_status(StatusCode::UNAUTHORIZED, 0);
///
/// assert_eq!(config.delay_for_retry(2), Duration::from_millis(1125));
/// ```
#[derive(Debug, Clone)]
pub struct RetryConfig {
    max_http_attempts: u32,
    max_network_attempts: u32,
    backoff_base: f64,
    backoff_unit: Duration,
    jitter_ceiling: Duration,
    cooldown_successes: u32,
    status_overrides: HashMap<StatusCode, u32>,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_http_attempts: 10,
            max_network_attempts: 3,
            backoff_base: 2.0,
            backoff_unit: Duration::from_secs(1),
            jitter_ceiling: Duration::ZERO,
            cooldown_successes: 3,
            status_overrides: HashMap::new(),
        }
    }
}

impl RetryConfig {
    /// Maximum number of failed HTTP attempts (429, 5xx, 401) per call before
    /// the failure is surfaced. Default 10.
    pub fn max_http_attempts(mut self, attempts: u32) -> Self {
        self.max_http_attempts = attempts;
        self
    }

    /// Maximum number of failed network attempts per call. Default 3.
    pub fn max_network_attempts(mut self, attempts: u32) -> Self {
        self.max_network_attempts = attempts;
        self
    }

    /// The exponential backoff base; must be greater than 1. Default 2.0.
    pub fn backoff_base(mut self, base: f64) -> Self {
        self.backoff_base = base;
        self
    }

    /// The unit the exponential term is multiplied by. Default one second.
    pub fn backoff_unit(mut self, unit: Duration) -> Self {
        self.backoff_unit = unit;
        self
    }

    /// Upper bound of the random addend drawn when a healthy client starts
    /// failing. The addend is kept for every delay until the next cooldown.
    /// Default zero (no jitter).
    pub fn jitter_ceiling(mut self, ceiling: Duration) -> Self {
        self.jitter_ceiling = ceiling;
        self
    }

    /// Number of consecutive successful calls after which the backoff timer
    /// resets. Default 3.
    pub fn cooldown_successes(mut self, successes: u32) -> Self {
        self.cooldown_successes = successes;
        self
    }

    /// Retries responses with `status` at most `retries` times per call,
    /// overriding the default classification. Any status may be listed,
    /// e.g. a 404 expected to appear shortly after creation; `0` disables
    /// retrying a status that is normally retried. The HTTP attempt budget
    /// still applies.
    pub fn retry_status(mut self, status: StatusCode, retries: u32) -> Self {
        self.status_overrides.insert(status, retries);
        self
    }

    /// The configured jitter ceiling.
    pub fn jitter(&self) -> Duration {
        self.jitter_ceiling
    }

    pub(crate) fn validate(&self) -> Result<()> {
        if self.backoff_base.is_nan() || self.backoff_base <= 1.0 || self.backoff_base.is_infinite() {
            return Err(Error::ConfigurationError(format!(
                "Backoff base must be a finite number greater than 1, got {}",
                self.backoff_base
            )));
        }
        if self.max_http_attempts == 0 || self.max_network_attempts == 0 {
            return Err(Error::ConfigurationError(
                "Attempt limits must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// The delay before retry `retry` (1-indexed) of a call, without jitter.
    pub fn delay_for_retry(&self, retry: u32) -> Duration {
        let exponent = i32::try_from(retry).unwrap_or(i32::MAX);
        let nanos = self.backoff_unit.as_nanos() as f64 * self.backoff_base.powi(exponent);
        if nanos >= u64::MAX as f64 {
            Duration::MAX
        } else {
            Duration::from_nanos(nanos.round() as u64)
        }
    }

    /// Upper bound on the delay before retry `retry`, jitter included.
    pub fn max_delay_for_retry(&self, retry: u32) -> Duration {
        self.delay_for_retry(retry).saturating_add(self.jitter_ceiling)
    }

    /// Classifies a response status, counting it against `attempts`.
    pub fn classify_status(&self, status: StatusCode, attempts: &mut AttemptCounter) -> Outcome {
        if !status.is_client_error() && !status.is_server_error() {
            return Outcome::Success;
        }

        let retryable = match self.status_overrides.get(&status) {
            Some(&retries) => {
                let seen = attempts.per_status.entry(status).or_default();
                *seen += 1;
                *seen <= retries
            }
            None => {
                status == StatusCode::TOO_MANY_REQUESTS
                    || status == StatusCode::UNAUTHORIZED
                    || status.is_server_error()
            }
        };
        if !retryable {
            return Outcome::FatalHttp;
        }

        attempts.http_failures += 1;
        if attempts.http_failures >= self.max_http_attempts {
            Outcome::FatalHttp
        } else {
            Outcome::RetryableHttp
        }
    }

    /// Classifies a network-level failure, counting it against `attempts`.
    pub fn classify_network_failure(&self, attempts: &mut AttemptCounter) -> Outcome {
        attempts.network_failures += 1;
        if attempts.network_failures >= self.max_network_attempts {
            Outcome::FatalNetwork
        } else {
            Outcome::RetryableNetwork
        }
    }
}

/// Attempt counters for one logical call.
#[derive(Debug, Clone, Default)]
pub struct AttemptCounter {
    http_failures: u32,
    network_failures: u32,
    per_status: HashMap<StatusCode, u32>,
    retries: u32,
}

impl AttemptCounter {
    /// Creates fresh counters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests issued so far: the first attempt plus every retry.
    pub fn attempts(&self) -> u32 {
        self.retries + 1
    }

    /// Retries taken so far.
    pub fn retries(&self) -> u32 {
        self.retries
    }

    fn next_retry(&mut self) -> u32 {
        self.retries += 1;
        self.retries
    }
}

/// Backoff state carried across calls by one client session.
#[derive(Debug, Clone, Default)]
pub struct BackoffState {
    timer: Duration,
    in_failure_run: bool,
    jitter: Duration,
    consecutive_successes: u32,
}

impl BackoffState {
    /// The most recent backoff delay, or zero once cooled down.
    pub fn timer(&self) -> Duration {
        self.timer
    }

    /// Whether the session has retried since it last cooled down.
    pub fn in_failure_run(&self) -> bool {
        self.in_failure_run
    }

    /// The jitter addend of the current failure run.
    pub fn jitter(&self) -> Duration {
        self.jitter
    }

    /// Computes the delay before the next retry of the call tracked by
    /// `attempts`, and advances the state.
    pub fn next_delay(&mut self, config: &RetryConfig, attempts: &mut AttemptCounter) -> Duration {
        if !self.in_failure_run {
            self.jitter = if config.jitter_ceiling.is_zero() {
                Duration::ZERO
            } else {
                let secs = rand::thread_rng().gen_range(0.0..=config.jitter_ceiling.as_secs_f64());
                Duration::from_secs_f64(secs).min(config.jitter_ceiling)
            };
        }
        let retry = attempts.next_retry();
        let delay = config.delay_for_retry(retry).saturating_add(self.jitter);
        self.in_failure_run = true;
        self.consecutive_successes = 0;
        self.timer = delay;
        delay
    }

    /// Records a successful call; after enough in a row the timer resets.
    pub fn record_success(&mut self, config: &RetryConfig) {
        self.consecutive_successes = self.consecutive_successes.saturating_add(1);
        if self.consecutive_successes >= config.cooldown_successes {
            if self.in_failure_run {
                tracing::debug!(
                    successes = self.consecutive_successes,
                    "Backoff cooled down"
                );
            }
            self.timer = Duration::ZERO;
            self.jitter = Duration::ZERO;
            self.in_failure_run = false;
        }
    }
}
