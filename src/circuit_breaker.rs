//! # Circuit Breaker
//!
//! Trips after repeated failures of an outbound HTTP dependency (the OCR
//! service or the drug-safety registry) and blocks further calls until a
//! reset timeout elapses, so a dead upstream fails fast instead of eating
//! retry budgets on every document.

use parking_lot::Mutex;
use std::time::{Duration, Instant};

use crate::config::RecoveryConfig;

#[derive(Debug, Default)]
struct BreakerState {
    failure_count: u32,
    last_failure_time: Option<Instant>,
}

/// Failure-counting circuit breaker.
///
/// Opens when consecutive failures reach `circuit_breaker_threshold` and
/// closes again once `circuit_breaker_reset_secs` has passed since the last
/// failure, letting the next call probe the upstream.
#[derive(Debug)]
pub struct CircuitBreaker {
    state: Mutex<BreakerState>,
    threshold: u32,
    reset_timeout: Duration,
}

impl CircuitBreaker {
    pub fn new(config: &RecoveryConfig) -> Self {
        Self {
            state: Mutex::new(BreakerState::default()),
            threshold: config.circuit_breaker_threshold,
            reset_timeout: Duration::from_secs(config.circuit_breaker_reset_secs),
        }
    }

    /// Whether calls should currently be blocked.
    ///
    /// Resets the breaker as a side effect when the reset timeout has
    /// elapsed, so the caller's next attempt goes through.
    pub fn is_open(&self) -> bool {
        let mut state = self.state.lock();
        if state.failure_count < self.threshold {
            return false;
        }
        match state.last_failure_time {
            Some(last) if last.elapsed() < self.reset_timeout => true,
            _ => {
                state.failure_count = 0;
                state.last_failure_time = None;
                false
            }
        }
    }

    pub fn record_failure(&self) {
        let mut state = self.state.lock();
        state.failure_count += 1;
        state.last_failure_time = Some(Instant::now());
    }

    pub fn record_success(&self) {
        let mut state = self.state.lock();
        state.failure_count = 0;
        state.last_failure_time = None;
    }
}
