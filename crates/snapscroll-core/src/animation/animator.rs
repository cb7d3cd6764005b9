//! L3 Molecular Layer: Transition animation task
//!
//! Combines easing functions and timing utilities to move one scroll resource
//! towards a target. A new request supersedes the one in flight; only the
//! latest animation ever reports completion.

use std::time::{Duration, Instant};

use super::easing::{EasingType, EasingTypeExt};
use super::timing::{is_complete, lerp, progress};

/// Identifies one `animate` request so completions can be matched to callers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AnimationId(u64);

/// One step of an animation, produced by [`TransitionAnimator::update`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnimationFrame {
    pub id: AnimationId,
    /// Interpolated scroll offset to apply this frame
    pub offset: f64,
    /// Linear time fraction in [0, 1]
    pub progress: f64,
    /// True on the final frame only; reported exactly once per animation
    pub finished: bool,
}

/// Active animation state
#[derive(Debug, Clone)]
struct ActiveAnimation {
    id: AnimationId,
    /// Animation start time
    start: Instant,
    /// Starting scroll position
    from: f64,
    /// Target scroll position
    to: f64,
    /// Animation duration
    duration: Duration,
}

/// Animation controller for a single scroll resource
///
/// Call [`animate`](Self::animate) to begin an animation, then
/// [`update`](Self::update) each frame to get the interpolated offset.
#[derive(Debug, Clone)]
pub struct TransitionAnimator {
    /// Current active animation (if any)
    animation: Option<ActiveAnimation>,
    /// Easing function for the offset
    easing: EasingType,
    next_id: u64,
}

impl Default for TransitionAnimator {
    fn default() -> Self {
        Self::new(EasingType::default())
    }
}

impl TransitionAnimator {
    /// Create a new animator with the given easing
    pub fn new(easing: EasingType) -> Self {
        Self {
            animation: None,
            easing,
            next_id: 0,
        }
    }

    /// Check if an animation is currently active
    #[inline]
    pub fn is_animating(&self) -> bool {
        self.animation.is_some()
    }

    /// Target of the animation in flight
    pub fn target(&self) -> Option<f64> {
        self.animation.as_ref().map(|a| a.to)
    }

    /// Id of the animation in flight
    pub fn active_id(&self) -> Option<AnimationId> {
        self.animation.as_ref().map(|a| a.id)
    }

    /// Start animating from `from` to `to`, replacing any animation in flight
    ///
    /// A zero duration still produces exactly one (finished) frame on the
    /// next `update`.
    pub fn animate(&mut self, from: f64, to: f64, duration: Duration, now: Instant) -> AnimationId {
        let id = AnimationId(self.next_id);
        self.next_id += 1;

        if let Some(previous) = self.animation.take() {
            tracing::trace!(superseded = previous.id.0, by = id.0, "Animation superseded");
        }

        self.animation = Some(ActiveAnimation {
            id,
            start: now,
            from,
            to,
            duration,
        });
        id
    }

    /// Advance the animation in flight and return its frame
    ///
    /// Returns `None` when idle. The finished frame clears the animation, so
    /// completion is observed once.
    pub fn update(&mut self, now: Instant) -> Option<AnimationFrame> {
        let anim = self.animation.as_ref()?;

        if is_complete(anim.start, anim.duration, now) {
            let frame = AnimationFrame {
                id: anim.id,
                offset: anim.to,
                progress: 1.0,
                finished: true,
            };
            self.animation = None;
            return Some(frame);
        }

        let t = progress(anim.start, anim.duration, now);
        let eased_t = self.easing.apply(t);
        Some(AnimationFrame {
            id: anim.id,
            offset: lerp(anim.from, anim.to, eased_t),
            progress: t,
            finished: false,
        })
    }

    /// Cancel any active animation and stop at the current position
    pub fn cancel(&mut self) {
        self.animation = None;
    }
}
