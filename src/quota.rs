//! Rolling-window call quota for the external service
//!
//! Every outbound call passes through [`QuotaGovernor::allow_call`], which
//! blocks until the trailing window holds fewer than `max_calls` calls and
//! then records the new one.

use crate::config::schema::QuotaConfig;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Monotonic time source
pub trait Clock: Send + Sync {
    /// Current monotonic instant
    fn now(&self) -> Instant;

    /// Block the caller for `duration`
    fn sleep(&self, duration: Duration);
}

/// Wall-clock implementation backed by `Instant` and `thread::sleep`
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn sleep(&self, duration: Duration) {
        if !duration.is_zero() {
            std::thread::sleep(duration);
        }
    }
}

/// Blocking rolling-window rate limiter
pub struct QuotaGovernor {
    clock: Arc<dyn Clock>,
    max_calls: usize,
    window: Duration,
    /// Start instants of the calls inside the trailing window, oldest first
    calls: Mutex<VecDeque<Instant>>,
}

impl QuotaGovernor {
    /// Create a governor allowing `max_calls` per `window`
    pub fn new(max_calls: u32, window: Duration, clock: Arc<dyn Clock>) -> Self {
        let max_calls = max_calls.max(1) as usize;
        Self {
            clock,
            max_calls,
            window,
            calls: Mutex::new(VecDeque::with_capacity(max_calls)),
        }
    }

    /// Create a governor from config using the system clock
    pub fn from_config(config: &QuotaConfig) -> Self {
        Self::new(config.max_calls, config.window(), Arc::new(SystemClock))
    }

    /// Block until a call may proceed, then record it
    pub fn allow_call(&self) {
        let mut calls = self
            .calls
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        let now = self.clock.now();
        self.evict(&mut calls, now);

        if calls.len() >= self.max_calls {
            if let Some(&oldest) = calls.front() {
                let wait = self
                    .window
                    .saturating_sub(now.saturating_duration_since(oldest));
                warn!(
                    "Rate limit reached ({} calls in {:?}). Waiting for {:.2} seconds",
                    self.max_calls,
                    self.window,
                    wait.as_secs_f64()
                );
                self.clock.sleep(wait);
            }
            let now = self.clock.now();
            self.evict(&mut calls, now);
        }

        calls.push_back(self.clock.now());
        debug!("Quota: {}/{} calls in window", calls.len(), self.max_calls);
    }

    /// Cooperative pause on the governor's clock
    pub fn pause(&self, duration: Duration) {
        self.clock.sleep(duration);
    }

    /// Calls recorded inside the trailing window as of now
    pub fn calls_in_window(&self) -> usize {
        let mut calls = self
            .calls
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let now = self.clock.now();
        self.evict(&mut calls, now);
        calls.len()
    }

    fn evict(&self, calls: &mut VecDeque<Instant>, now: Instant) {
        while let Some(&oldest) = calls.front() {
            if now.saturating_duration_since(oldest) >= self.window {
                calls.pop_front();
            } else {
                break;
            }
        }
    }
}


#[cfg(test)]
mod tests {
    use super::test_clock::ManualClock;
    use super::*;

    fn governor(max: u32, window_secs: u64) -> (QuotaGovernor, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new());
        let gov = QuotaGovernor::new(max, Duration::from_secs(window_secs), clock.clone());
        (gov, clock)
    }

    #[test]
    fn under_limit_does_not_block() {
        let (gov, clock) = governor(5, 60);
        for _ in 0..5 {
            gov.allow_call();
        }
        assert_eq!(clock.slept(), Duration::ZERO);
        assert_eq!(gov.calls_in_window(), 5);
    }

    #[test]
    fn blocks_for_remaining_window() {
        let (gov, clock) = governor(3, 60);
        for _ in 0..3 {
            gov.allow_call();
            clock.advance(Duration::from_secs(10));
        }
        // oldest call was 30s ago; the fourth call must wait the other 30s
        gov.allow_call();
        assert_eq!(clock.slept(), Duration::from_secs(30));
    }

    #[test]
    fn window_expiry_resets_without_waiting() {
        let (gov, clock) = governor(2, 60);
        gov.allow_call();
        gov.allow_call();
        clock.advance(Duration::from_secs(61));
        gov.allow_call();
        assert_eq!(clock.slept(), Duration::ZERO);
        assert_eq!(gov.calls_in_window(), 1);
    }

    #[test]
    fn rolling_window_bound_holds() {
        let (gov, clock) = governor(150, 60);
        let mut stamps = Vec::new();
        for i in 0..500 {
            gov.allow_call();
            stamps.push(clock.elapsed());
            // uneven pacing: bursts then slow stretches
            let step = if i % 50 < 40 { 50 } else { 900 };
            clock.advance(Duration::from_millis(step));
        }

        let window = Duration::from_secs(60);
        for (i, start) in stamps.iter().enumerate() {
            let in_window = stamps[i..]
                .iter()
                .take_while(|t| **t - *start < window)
                .count();
            assert!(in_window <= 150, "{} calls within 60s from {:?}", in_window, start);
        }
    }

    #[test]
    fn zero_max_is_treated_as_one() {
        let (gov, clock) = governor(0, 10);
        gov.allow_call();
        gov.allow_call();
        assert_eq!(clock.slept(), Duration::from_secs(10));
    }

    #[test]
    fn pause_uses_clock() {
        let (gov, clock) = governor(1, 1);
        gov.pause(Duration::from_millis(500));
        assert_eq!(clock.slept(), Duration::from_millis(500));
    }
}
