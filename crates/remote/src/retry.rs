// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Bounded exponential-backoff retry around single remote calls.
//!
//! Only transient failures (see [`RemoteError::is_transient`]) are retried.
//! Callers must only wrap calls that are safe to repeat: reads, and writes that
//! are idempotent or upsert-shaped.

use std::time::Duration;

use backon::BlockingRetryable;
use diagnostics::*;
use rand::Rng;

use crate::error::{RemoteError, Result};

/// Retry bounds and delays.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Retries after the first attempt; 4 means up to 5 calls in total.
    pub max_retries: usize,
    /// Delay before the first retry; doubles for each following retry.
    pub base_delay: Duration,
    /// Upper bound of the uniform random delay added to each wait.
    pub max_jitter: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 4,
            base_delay: Duration::from_millis(500),
            max_jitter: Duration::from_millis(250),
        }
    }
}

impl RetryPolicy {
    /// A policy that retries without sleeping, for tests and fakes.
    pub fn immediate(max_retries: usize) -> Self {
        Self {
            max_retries,
            base_delay: Duration::ZERO,
            max_jitter: Duration::ZERO,
        }
    }

    /// Delay before retry number `retry` (zero based), without jitter.
    pub fn delay_for(&self, retry: usize) -> Duration {
        let factor = 1u32.checked_shl(retry as u32).unwrap_or(u32::MAX);
        self.base_delay.saturating_mul(factor)
    }
}

/// Delay sequence fed to backon: `base * 2^n + U(0, max_jitter)` for n in 0..max_retries.
#[derive(Debug, Clone)]
pub struct JitteredBackoff {
    policy: RetryPolicy,
    next: usize,
}

impl JitteredBackoff {
    pub fn new(policy: RetryPolicy) -> Self {
        Self { policy, next: 0 }
    }
}

impl Iterator for JitteredBackoff {
    type Item = Duration;

    fn next(&mut self) -> Option<Duration> {
        if self.next >= self.policy.max_retries {
            return None;
        }
        let delay = self.policy.delay_for(self.next);
        self.next += 1;

        let jitter_max = self.policy.max_jitter.as_secs_f64();
        let jitter = if jitter_max > 0.0 {
            Duration::from_secs_f64(rand::thread_rng().gen_range(0.0..=jitter_max))
        } else {
            Duration::ZERO
        };
        Some(delay + jitter)
    }
}

/// Wraps remote calls with the retry policy.
#[derive(Debug, Clone, Default)]
pub struct RetryExecutor {
    policy: RetryPolicy,
}

impl RetryExecutor {
    pub fn new(policy: RetryPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Run `op`, which performs exactly one remote call, retrying transient
    /// failures. After the last retry the final transient error is returned.
    pub fn execute<T, F>(&self, operation: &str, op: F) -> Result<T>
    where
        F: FnMut() -> Result<T>,
    {
        let mut attempt = 0usize;
        op.retry(JitteredBackoff::new(self.policy.clone()))
            .sleep(std::thread::sleep)
            .when(RemoteError::is_transient)
            .notify(|e: &RemoteError, delay: Duration| {
                attempt += 1;
                let reason = e.to_string();
                let delay_ms = delay.as_millis() as u64;
                warn!("Retrying {operation} (retry {attempt}) in {delay_ms}ms: {reason}");
            })
            .call()
    }
}
