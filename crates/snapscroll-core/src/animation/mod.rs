//! Transition animation for snap scrolling
//!
//! Drives the scroll offset of one resource (the section container or the
//! document) towards a target over a fixed duration and reports per-frame
//! progress for the content parallax effect.
//!
//! # Architecture
//!
//! ## L4 Atomic Layer
//! - `easing` - Pure easing functions and the parallax curve
//! - `timing` - Time calculation utilities (progress, interpolation)
//!
//! ## L3 Molecular Layer
//! - `animator` - Animation task combining atoms, superseded by each new request
//!
//! # Usage
//!
//! ```ignore
//! use snapscroll_core::animation::TransitionAnimator;
//!
//! let mut animator = TransitionAnimator::new(EasingType::Swing);
//! let id = animator.animate(0.0, 800.0, Duration::from_millis(750), now);
//!
//! // Each frame
//! if let Some(frame) = animator.update(now) {
//!     surface.set_scroll_top(frame.offset);
//!     if frame.finished { /* completion, fires exactly once */ }
//! }
//! ```

// L4 Atomic Layer
pub mod easing;
pub mod timing;

// L3 Molecular Layer
pub mod animator;

// Re-exports for convenient access
pub use animator::{AnimationFrame, AnimationId, TransitionAnimator};
pub use easing::{parallax_offset, EasingTypeExt};
