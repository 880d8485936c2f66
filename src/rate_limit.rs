//! Sliding-window attempt limiter with a persisted cooldown.
//!
//! Attempts live in memory and are pruned to the window. Once the window is
//! full the limiter writes a cooldown marker to the store; the marker blocks
//! every submission until it expires, whatever the attempt count says.

use serde::Serialize;
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use crate::clock::Clock;
use crate::storage::{COOLDOWN_KEY, KeyValueStore, LAST_SUBMIT_KEY};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitConfig {
    pub max_attempts: usize,
    pub window: Duration,
    pub cooldown: Duration,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            window: Duration::from_secs(60),
            cooldown: Duration::from_secs(300),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RateDecision {
    pub allowed: bool,
    pub wait_seconds: Option<u64>,
}

impl RateDecision {
    pub fn allow() -> Self {
        Self {
            allowed: true,
            wait_seconds: None,
        }
    }

    pub fn deny(wait_seconds: u64) -> Self {
        Self {
            allowed: false,
            wait_seconds: Some(wait_seconds),
        }
    }

    // Status line for the visitor, None when allowed
    pub fn message(&self) -> Option<String> {
        if self.allowed {
            return None;
        }
        let secs = self.wait_seconds.unwrap_or_default();
        Some(if secs >= 60 && secs % 60 == 0 {
            let mins = secs / 60;
            format!(
                "Too many attempts. Please wait {} minute{}.",
                mins,
                if mins == 1 { "" } else { "s" }
            )
        } else {
            format!("Too many attempts. Please wait {} seconds.", secs)
        })
    }
}

pub struct RateLimiter {
    config: RateLimitConfig,
    attempts: VecDeque<i64>,
    // last cooldown this limiter set, still enforced if the store lost it
    cooldown_until: Option<i64>,
    store: Arc<dyn KeyValueStore>,
    clock: Arc<dyn Clock>,
}

impl RateLimiter {
    pub fn new(config: RateLimitConfig, store: Arc<dyn KeyValueStore>, clock: Arc<dyn Clock>) -> Self {
        Self {
            config,
            attempts: VecDeque::new(),
            cooldown_until: None,
            store,
            clock,
        }
    }

    pub fn can_submit(&mut self) -> RateDecision {
        let now = self.clock.now_ms();

        if let Some(until) = self.active_cooldown(now) {
            let remaining = until.saturating_sub(now).saturating_add(999) / 1000;
            return RateDecision::deny(remaining as u64);
        }

        self.prune(now);
        if self.attempts.len() >= self.config.max_attempts {
            let until = now.saturating_add(self.config.cooldown.as_millis() as i64);
            self.cooldown_until = Some(until);
            if let Err(e) = self.store.set(COOLDOWN_KEY, &until.to_string()) {
                tracing::warn!(error = %e, "failed to persist cooldown marker");
            }
            tracing::info!(
                attempts = self.attempts.len(),
                cooldown_secs = self.config.cooldown.as_secs(),
                "attempt limit reached, cooling down"
            );
            return RateDecision::deny(self.config.cooldown.as_secs());
        }

        RateDecision::allow()
    }

    pub fn record_attempt(&mut self) {
        let now = self.clock.now_ms();
        self.prune(now);
        self.attempts.push_back(now);
        if let Err(e) = self.store.set(LAST_SUBMIT_KEY, &now.to_string()) {
            tracing::warn!(error = %e, "failed to persist last submit time");
        }
    }

    /// True when the limiter carries no state worth keeping: nothing in the
    /// window and no cooldown running.
    pub fn is_idle(&mut self) -> bool {
        let now = self.clock.now_ms();
        self.prune(now);
        self.attempts.is_empty() && self.active_cooldown(now).is_none()
    }

    // Drop this limiter's keys from the store. Only meaningful once idle,
    // an expired marker and the diagnostic stamp are all that is left.
    pub fn clear_stored(&self) {
        for key in [COOLDOWN_KEY, LAST_SUBMIT_KEY] {
            if let Err(e) = self.store.remove(key) {
                tracing::warn!(error = %e, key, "failed to remove stored key");
            }
        }
    }

    fn active_cooldown(&self, now: i64) -> Option<i64> {
        // an unparsable marker counts as no marker
        let stored = self
            .store
            .get(COOLDOWN_KEY)
            .and_then(|v| v.trim().parse::<i64>().ok());
        [stored, self.cooldown_until]
            .into_iter()
            .flatten()
            .filter(|until| now < *until)
            .max()
    }

    fn prune(&mut self, now: i64) {
        let window = self.config.window.as_millis() as i64;
        while let Some(&oldest) = self.attempts.front() {
            if now.saturating_sub(oldest) < window {
                break;
            }
            self.attempts.pop_front();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::error::StorageError;
    use crate::storage::MemoryStore;

    const START: i64 = 1_700_000_000_000;

    fn limiter() -> (RateLimiter, Arc<ManualClock>, Arc<MemoryStore>) {
        let clock = Arc::new(ManualClock::new(START));
        let store = Arc::new(MemoryStore::new());
        let limiter = RateLimiter::new(RateLimitConfig::default(), store.clone(), clock.clone());
        (limiter, clock, store)
    }

    #[test]
    fn allows_until_window_is_full() {
        let (mut limiter, clock, _) = limiter();
        for _ in 0..3 {
            assert!(limiter.can_submit().allowed);
            limiter.record_attempt();
            clock.advance_secs(5);
        }
        let denied = limiter.can_submit();
        assert!(!denied.allowed);
        assert_eq!(denied.wait_seconds, Some(300));
    }

    #[test]
    fn cooldown_counts_down_and_persists() {
        let (mut limiter, clock, store) = limiter();
        for _ in 0..3 {
            limiter.record_attempt();
        }
        assert!(!limiter.can_submit().allowed);
        assert_eq!(store.get(COOLDOWN_KEY), Some((START + 300_000).to_string()));

        clock.advance_secs(100);
        let first = limiter.can_submit();
        clock.advance_ms(50_500);
        let second = limiter.can_submit();
        assert!(!first.allowed && !second.allowed);
        assert_eq!(first.wait_seconds, Some(200));
        assert_eq!(second.wait_seconds, Some(150));
    }

    #[test]
    fn allowed_again_after_cooldown() {
        let (mut limiter, clock, _) = limiter();
        for _ in 0..3 {
            limiter.record_attempt();
        }
        assert!(!limiter.can_submit().allowed);
        clock.advance_secs(299);
        assert!(!limiter.can_submit().allowed);
        clock.advance_secs(1);
        assert!(limiter.can_submit().allowed);
    }

    #[test]
    fn attempts_slide_out_of_window() {
        let (mut limiter, clock, _) = limiter();
        limiter.record_attempt();
        limiter.record_attempt();
        clock.advance_secs(60);
        assert!(limiter.is_idle());
        limiter.record_attempt();
        assert!(limiter.can_submit().allowed);
    }

    #[test]
    fn cooldown_marker_from_previous_session_is_honoured() {
        let clock = Arc::new(ManualClock::new(START));
        let store = Arc::new(MemoryStore::new());
        store.set(COOLDOWN_KEY, &(START + 10_500).to_string()).unwrap();
        let mut limiter = RateLimiter::new(RateLimitConfig::default(), store, clock);
        assert_eq!(limiter.can_submit(), RateDecision::deny(11));
    }

    #[test]
    fn far_future_marker_does_not_overflow() {
        let (mut limiter, _, store) = limiter();
        store.set(COOLDOWN_KEY, &i64::MAX.to_string()).unwrap();
        let decision = limiter.can_submit();
        assert!(!decision.allowed);
        assert_eq!(decision.wait_seconds, Some(((i64::MAX - START) / 1000) as u64 + 1));
    }

    #[test]
    fn garbage_marker_is_ignored() {
        let (mut limiter, _, store) = limiter();
        store.set(COOLDOWN_KEY, "soon").unwrap();
        assert!(limiter.can_submit().allowed);
    }

    #[test]
    fn record_attempt_stamps_last_submit() {
        let (mut limiter, _, store) = limiter();
        limiter.record_attempt();
        assert_eq!(store.get(LAST_SUBMIT_KEY), Some(START.to_string()));
    }

    struct BrokenStore;

    impl KeyValueStore for BrokenStore {
        fn get(&self, _key: &str) -> Option<String> {
            None
        }

        fn set(&self, _key: &str, _value: &str) -> Result<(), StorageError> {
            Err(std::io::Error::other("disk full").into())
        }

        fn remove(&self, _key: &str) -> Result<(), StorageError> {
            Ok(())
        }
    }

    #[test]
    fn cooldown_holds_when_store_fails() {
        let clock = Arc::new(ManualClock::new(START));
        let mut limiter = RateLimiter::new(RateLimitConfig::default(), Arc::new(BrokenStore), clock.clone());
        for _ in 0..3 {
            limiter.record_attempt();
        }
        assert!(!limiter.can_submit().allowed);
        clock.advance_secs(120);
        assert_eq!(limiter.can_submit().wait_seconds, Some(180));
    }

    #[test]
    fn idle_only_without_attempts_or_cooldown() {
        let (mut limiter, clock, _) = limiter();
        assert!(limiter.is_idle());
        limiter.record_attempt();
        assert!(!limiter.is_idle());
        clock.advance_secs(61);
        assert!(limiter.is_idle());
    }

    #[test]
    fn clear_stored_removes_both_keys() {
        let (mut limiter, clock, store) = limiter();
        for _ in 0..3 {
            limiter.record_attempt();
        }
        limiter.can_submit();
        clock.advance_secs(300);
        assert!(limiter.is_idle());
        limiter.clear_stored();
        assert_eq!(store.get(COOLDOWN_KEY), None);
        assert_eq!(store.get(LAST_SUBMIT_KEY), None);
    }

    #[test]
    fn messages() {
        assert_eq!(RateDecision::allow().message(), None);
        assert_eq!(
            RateDecision::deny(300).message().unwrap(),
            "Too many attempts. Please wait 5 minutes."
        );
        assert_eq!(
            RateDecision::deny(42).message().unwrap(),
            "Too many attempts. Please wait 42 seconds."
        );
    }
}
