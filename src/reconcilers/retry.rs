// Copyright (c) 2025 News Operator Authors
// SPDX-License-Identifier: MIT

//! Exponential backoff for requeueing failed reconciliations.
//!
//! The controller's error policy asks [`RequeueBackoff`] for the next delay of
//! the failing object. Each object gets its own schedule so one broken `Feed`
//! does not slow down the others, and a successful reconcile resets it.
//!
//! With the default settings (500ms initial, 5 minute cap) the delays are:
//!
//! 1. 500ms
//! 2. 1s
//! 3. 2s
//! 4. 4s
//! 5. ... doubling until capped at 5 minutes

use kube::{Resource, ResourceExt};
use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;
use tracing::debug;

/// Backoff multiplier (exponential growth factor)
const BACKOFF_MULTIPLIER: f64 = 2.0;

/// Simple exponential backoff without jitter.
#[derive(Debug, Clone)]
pub struct ExponentialBackoff {
    /// Interval returned by the next call to [`next_backoff`](Self::next_backoff)
    pub current_interval: Duration,
    /// Interval restored by [`reset`](Self::reset)
    pub initial_interval: Duration,
    /// Upper bound of any returned interval
    pub max_interval: Duration,
    /// Growth factor applied after every call
    pub multiplier: f64,
}

impl ExponentialBackoff {
    #[must_use]
    pub fn new(initial_interval: Duration, max_interval: Duration, multiplier: f64) -> Self {
        let initial_interval = initial_interval.min(max_interval);
        Self {
            current_interval: initial_interval,
            initial_interval,
            max_interval,
            multiplier,
        }
    }

    /// Get the next backoff interval and grow the following one.
    pub fn next_backoff(&mut self) -> Duration {
        let interval = self.current_interval;
        let next = interval.as_secs_f64() * self.multiplier;
        self.current_interval = Duration::from_secs_f64(next).min(self.max_interval);
        interval
    }

    pub fn reset(&mut self) {
        self.current_interval = self.initial_interval;
    }
}

/// Per-object requeue delays shared by the controllers.
#[derive(Debug)]
pub struct RequeueBackoff {
    initial_interval: Duration,
    max_interval: Duration,
    state: Mutex<HashMap<String, ExponentialBackoff>>,
}

impl RequeueBackoff {
    #[must_use]
    pub fn new(initial_interval: Duration, max_interval: Duration) -> Self {
        Self {
            initial_interval,
            max_interval,
            state: Mutex::new(HashMap::new()),
        }
    }

    /// Stable key of an object: `Kind/namespace/name`.
    #[must_use]
    pub fn key_for<K>(obj: &K) -> String
    where
        K: Resource<DynamicType = ()> + ResourceExt,
    {
        format!(
            "{}/{}/{}",
            K::kind(&()),
            obj.namespace().unwrap_or_default(),
            obj.name_any()
        )
    }

    /// Delay before the next attempt for `key`; each call doubles the next one.
    pub fn next_delay(&self, key: &str) -> Duration {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        let backoff = state.entry(key.to_string()).or_insert_with(|| {
            ExponentialBackoff::new(self.initial_interval, self.max_interval, BACKOFF_MULTIPLIER)
        });
        let delay = backoff.next_backoff();
        debug!(object = %key, delay = ?delay, "Computed error requeue delay");
        delay
    }

    /// Forget the failure history of `key` after a successful reconcile.
    pub fn reset(&self, key: &str) {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(key);
    }

    /// Number of objects currently backing off.
    #[must_use]
    pub fn tracked(&self) -> usize {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

#[cfg(test)]
#[path = "retry_tests.rs"]
mod retry_tests;
