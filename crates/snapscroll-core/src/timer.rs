//! Keyed one-shot timers
//!
//! Each key holds at most one deadline. Scheduling a key that is already
//! pending moves its deadline, which gives debounce semantics for free, and
//! teardown cancels keys instead of letting stale callbacks fire.

use std::time::{Duration, Instant};

#[derive(Debug, Clone)]
pub struct Scheduler<K> {
    tasks: Vec<(K, Instant)>,
}

impl<K> Default for Scheduler<K> {
    fn default() -> Self {
        Self { tasks: Vec::new() }
    }
}

impl<K: Copy + Eq + std::fmt::Debug> Scheduler<K> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arm `key` to fire `delay` after `now`, replacing a pending deadline
    pub fn schedule(&mut self, key: K, now: Instant, delay: Duration) {
        let deadline = now + delay;
        match self.tasks.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = deadline,
            None => self.tasks.push((key, deadline)),
        }
        tracing::trace!(?key, delay_ms = delay.as_millis(), "Timer armed");
    }

    /// Disarm `key`; returns whether it was pending
    pub fn cancel(&mut self, key: K) -> bool {
        let before = self.tasks.len();
        self.tasks.retain(|(k, _)| *k != key);
        before != self.tasks.len()
    }

    pub fn cancel_all(&mut self) {
        self.tasks.clear();
    }

    pub fn is_pending(&self, key: K) -> bool {
        self.tasks.iter().any(|(k, _)| *k == key)
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Earliest pending deadline
    pub fn next_deadline(&self) -> Option<Instant> {
        self.tasks.iter().map(|(_, at)| *at).min()
    }

    /// Remove and return every key due at `now`, earliest first
    pub fn take_due(&mut self, now: Instant) -> Vec<K> {
        let mut due: Vec<(K, Instant)> = Vec::new();
        self.tasks.retain(|(k, at)| {
            if *at <= now {
                due.push((*k, *at));
                false
            } else {
                true
            }
        });
        due.sort_by_key(|(_, at)| *at);
        due.into_iter().map(|(k, _)| k).collect()
    }
}
