//! Wheel gesture classification
//!
//! Touchpads and free-spinning wheels keep emitting wheel events long after
//! the user stopped pushing. The classifier turns the raw stream into a
//! discrete intent: an isolated tick, a reversal, or a fresh acceleration is
//! directional; the decaying (or flat) tail of a stream is indeterminate.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use crate::config::GestureConfig;

/// Result of classifying one wheel event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// Deliberate scroll towards the start of the sequence
    Up,
    /// Deliberate scroll towards the end of the sequence
    Down,
    /// Inertial or otherwise ambiguous input
    Indeterminate,
}

/// A classified wheel event, consumed synchronously by the router
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GestureSample {
    pub verdict: Verdict,
    /// Raw vertical delta; positive scrolls down
    pub delta_y: f64,
}

#[derive(Debug, Clone, Copy)]
struct WheelSample {
    delta_y: f64,
    at: Instant,
}

/// Stateful wheel classifier, one per engine
#[derive(Debug, Clone)]
pub struct GestureClassifier {
    history: VecDeque<WheelSample>,
    depth: usize,
    window: Duration,
    stability: f64,
}

impl Default for GestureClassifier {
    fn default() -> Self {
        Self::new(&GestureConfig::default())
    }
}

impl GestureClassifier {
    pub fn new(config: &GestureConfig) -> Self {
        let depth = config.history_depth.max(1);
        Self {
            history: VecDeque::with_capacity(depth),
            depth,
            window: config.window(),
            stability: config.stability.abs(),
        }
    }

    /// Classify a wheel delta observed at `now` and record it
    pub fn classify(&mut self, delta_y: f64, now: Instant) -> GestureSample {
        let verdict = self.judge(delta_y, now);
        self.record(delta_y, now);
        tracing::trace!(delta_y, ?verdict, "Wheel classified");
        GestureSample { verdict, delta_y }
    }

    /// Forget all recorded samples
    pub fn reset(&mut self) {
        self.history.clear();
    }

    /// Number of samples currently remembered
    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    fn judge(&mut self, delta_y: f64, now: Instant) -> Verdict {
        if delta_y == 0.0 || delta_y.is_nan() {
            return Verdict::Indeterminate;
        }

        self.prune(now);
        let direction = if delta_y > 0.0 { Verdict::Down } else { Verdict::Up };

        let Some(last) = self.history.back() else {
            // Nothing recent: an isolated, deliberate tick
            return direction;
        };

        if last.delta_y.signum() != delta_y.signum() {
            return direction;
        }

        let (sum, count) = self
            .history
            .iter()
            .filter(|s| s.delta_y.signum() == delta_y.signum())
            .fold((0.0, 0usize), |(sum, count), s| (sum + s.delta_y.abs(), count + 1));
        let average = sum / count as f64;

        if delta_y.abs() > average * (1.0 + self.stability) {
            direction
        } else {
            Verdict::Indeterminate
        }
    }

    fn record(&mut self, delta_y: f64, now: Instant) {
        if delta_y == 0.0 || delta_y.is_nan() {
            return;
        }
        if self.history.len() == self.depth {
            self.history.pop_front();
        }
        self.history.push_back(WheelSample { delta_y, at: now });
    }

    fn prune(&mut self, now: Instant) {
        while let Some(front) = self.history.front() {
            if now.saturating_duration_since(front.at) > self.window {
                self.history.pop_front();
            } else {
                break;
            }
        }
    }
}
