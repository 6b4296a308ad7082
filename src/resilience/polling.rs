//! Bounded, cancellable polling loop.
//!
//! # Responsibilities
//! - Run an attempt function until a stop predicate accepts its value
//! - Pause between attempts (fixed interval or exponential backoff)
//! - Stop after `max_attempts` and hand back the last value
//! - Observe a [`CancelSignal`] both during attempts and pauses

use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;

use crate::config::{PollingConfig, RetryConfig};
use crate::lifecycle::CancelSignal;
use crate::observability::metrics;
use crate::resilience::backoff::calculate_backoff;

/// Pause strategy between attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delay {
    Fixed(Duration),
    Backoff { base_ms: u64, max_ms: u64 },
}

/// How many times to try and how long to wait in between.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    pub max_attempts: u32,
    pub delay: Delay,
}

impl PollPolicy {
    pub fn fixed(max_attempts: u32, interval: Duration) -> Self {
        Self {
            max_attempts,
            delay: Delay::Fixed(interval),
        }
    }

    pub fn backoff(max_attempts: u32, base_ms: u64, max_ms: u64) -> Self {
        Self {
            max_attempts,
            delay: Delay::Backoff { base_ms, max_ms },
        }
    }

    /// Pause after the `attempt`-th failed attempt.
    pub fn delay_after(&self, attempt: u32) -> Duration {
        match self.delay {
            Delay::Fixed(interval) => interval,
            Delay::Backoff { base_ms, max_ms } => calculate_backoff(attempt, base_ms, max_ms),
        }
    }
}

impl Default for PollPolicy {
    /// 20 attempts, one second apart.
    fn default() -> Self {
        Self::fixed(20, Duration::from_secs(1))
    }
}

impl From<&PollingConfig> for PollPolicy {
    fn from(config: &PollingConfig) -> Self {
        Self::fixed(config.max_attempts, Duration::from_millis(config.interval_ms))
    }
}

impl From<&RetryConfig> for PollPolicy {
    fn from(config: &RetryConfig) -> Self {
        Self::backoff(config.max_attempts, config.base_delay_ms, config.max_delay_ms)
    }
}

/// How a polling loop ended.
#[derive(Debug, Clone, PartialEq)]
pub enum PollOutcome<T> {
    /// The stop predicate accepted `value`.
    Ready { value: T, attempts: u32 },
    /// Every attempt ran; `last` is the final rejected value.
    Exhausted { last: T, attempts: u32 },
    /// Cancelled before the predicate accepted a value.
    Cancelled { last: Option<T>, attempts: u32 },
}

impl<T> PollOutcome<T> {
    pub fn attempts(&self) -> u32 {
        match self {
            PollOutcome::Ready { attempts, .. }
            | PollOutcome::Exhausted { attempts, .. }
            | PollOutcome::Cancelled { attempts, .. } => *attempts,
        }
    }

    /// The most recent value produced by an attempt.
    pub fn into_last(self) -> Option<T> {
        match self {
            PollOutcome::Ready { value, .. } => Some(value),
            PollOutcome::Exhausted { last, .. } => Some(last),
            PollOutcome::Cancelled { last, .. } => last,
        }
    }
}

/// Call `attempt` until `done` accepts its value, the policy runs out, or
/// `cancel` fires.
///
/// `attempt` receives the 1-based attempt number. An `Err` from `attempt`
/// ends the loop immediately and is returned as is.
pub async fn poll_until<T, E, F, Fut, P>(
    policy: &PollPolicy,
    flow: &'static str,
    cancel: &mut CancelSignal,
    mut attempt: F,
    mut done: P,
) -> Result<PollOutcome<T>, E>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, E>>,
    P: FnMut(&T) -> bool,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut last = None;
    let mut attempts = 0;

    loop {
        let value = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                metrics::record_poll_outcome(flow, "cancelled");
                return Ok(PollOutcome::Cancelled { last, attempts });
            }
            result = attempt(attempts + 1) => result?,
        };
        attempts += 1;
        metrics::record_poll_attempt(flow);

        if done(&value) {
            metrics::record_poll_outcome(flow, "ready");
            return Ok(PollOutcome::Ready { value, attempts });
        }

        if attempts >= max_attempts {
            tracing::warn!(flow = flow, attempts = attempts, "Polling attempts exhausted");
            metrics::record_poll_outcome(flow, "exhausted");
            return Ok(PollOutcome::Exhausted { last: value, attempts });
        }

        tracing::debug!(flow = flow, attempt = attempts, "Not ready, polling again");
        last = Some(value);

        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                metrics::record_poll_outcome(flow, "cancelled");
                return Ok(PollOutcome::Cancelled { last, attempts });
            }
            _ = sleep(policy.delay_after(attempts)) => {}
        }
    }
}
