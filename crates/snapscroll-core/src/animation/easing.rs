//! L4 Atomic Layer: Pure easing functions for snap transitions
//!
//! Provides mathematical easing functions that map input [0, 1] to output [0, 1]
//! with various acceleration curves, plus the parallax curve applied to the
//! content of the section being entered.

use std::f64::consts::PI;

// Re-export EasingType from config
pub use crate::config::EasingType;

/// Extension trait for EasingType with calculation methods
pub trait EasingTypeExt {
    /// Apply the easing function to a progress value
    ///
    /// # Arguments
    /// * `t` - Progress value in range [0, 1]
    ///
    /// # Returns
    /// Eased value in range [0, 1]
    fn apply(&self, t: f64) -> f64;
}

impl EasingTypeExt for EasingType {
    #[inline]
    fn apply(&self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);
        match self {
            EasingType::None => {
                if t < 1.0 {
                    0.0
                } else {
                    1.0
                }
            }
            EasingType::Linear => t,
            EasingType::Swing => swing(t),
            EasingType::Cubic => cubic_ease_out(t),
            EasingType::Quintic => quintic_ease_out(t),
            EasingType::EaseOut => exponential_ease_out(t),
        }
    }
}

/// Swing: f(t) = 0.5 - cos(πt) / 2
#[inline]
fn swing(t: f64) -> f64 {
    0.5 - (t * PI).cos() / 2.0
}

/// Cubic ease-out: f(t) = 1 - (1-t)³
#[inline]
fn cubic_ease_out(t: f64) -> f64 {
    let inv = 1.0 - t;
    1.0 - inv * inv * inv
}

/// Quintic ease-out: f(t) = 1 - (1-t)⁵
#[inline]
fn quintic_ease_out(t: f64) -> f64 {
    let inv = 1.0 - t;
    1.0 - inv * inv * inv * inv * inv
}

/// Exponential ease-out: f(t) = 1 - 2^(-10t)
#[inline]
fn exponential_ease_out(t: f64) -> f64 {
    if t >= 1.0 {
        1.0
    } else {
        1.0 - 2.0_f64.powf(-10.0 * t)
    }
}

/// Vertical content offset, in percent of the content height, for a
/// transition at linear progress `progress`.
///
/// `max(0, (1 - p) * 100 * sin(1 - p))`: starts near 84% and settles to 0,
/// decelerating on the way in.
#[inline]
pub fn parallax_offset(progress: f64) -> f64 {
    let remaining = 1.0 - progress.clamp(0.0, 1.0);
    (remaining * 100.0 * remaining.sin()).max(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_easing_boundaries() {
        for easing in [
            EasingType::None,
            EasingType::Linear,
            EasingType::Swing,
            EasingType::Cubic,
            EasingType::Quintic,
            EasingType::EaseOut,
        ] {
            // t=0 should give 0 (except None which jumps)
            if easing != EasingType::None {
                assert!((easing.apply(0.0) - 0.0).abs() < 0.001, "{:?} at t=0", easing);
            }
            // t=1 should give 1
            assert!((easing.apply(1.0) - 1.0).abs() < 0.001, "{:?} at t=1", easing);
        }
    }

    #[test]
    fn test_easing_monotonic() {
        for easing in [
            EasingType::Linear,
            EasingType::Swing,
            EasingType::Cubic,
            EasingType::Quintic,
            EasingType::EaseOut,
        ] {
            let mut prev = 0.0;
            for i in 0..=10 {
                let t = i as f64 / 10.0;
                let v = easing.apply(t);
                assert!(v >= prev, "{:?} not monotonic at t={}", easing, t);
                prev = v;
            }
        }
    }

    #[test]
    fn test_swing_midpoint() {
        assert!((EasingType::Swing.apply(0.5) - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_parallax_offset_curve() {
        // sin(1) * 100 at the very start
        assert!((parallax_offset(0.0) - 84.147).abs() < 0.01);
        assert_eq!(parallax_offset(1.0), 0.0);
        // Out-of-range progress is clamped rather than going negative
        assert_eq!(parallax_offset(1.5), 0.0);

        let mut prev = parallax_offset(0.0);
        for i in 1..=10 {
            let v = parallax_offset(i as f64 / 10.0);
            assert!(v <= prev, "parallax should settle towards zero");
            prev = v;
        }
    }
}
