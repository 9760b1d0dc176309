//! Built-in easing functions.
//!
//! Every function except [`bounce_out`] is the "ease in" shape of its family:
//! it maps a completion fraction `p` in `[0, 1]` to a progress fraction that
//! starts at 0 and ends at 1. The OUT, IN_OUT and BOUNCING shapes are derived
//! from these by [`CallStyle`](super::CallStyle).

use core::f32::consts::{FRAC_PI_2, PI};

use libm::{cosf, powf, sinf, sqrtf};

/// Identity.
#[inline]
pub fn linear(p: f32) -> f32 {
    p
}

/// `p²`
#[inline]
pub fn quadratic_in(p: f32) -> f32 {
    p * p
}

/// `p³`
#[inline]
pub fn cubic_in(p: f32) -> f32 {
    p * p * p
}

/// `p⁴`
#[inline]
pub fn quartic_in(p: f32) -> f32 {
    let sq = p * p;
    sq * sq
}

/// Quarter cosine wave, `1 - cos(p·π/2)`.
#[inline]
pub fn sine_in(p: f32) -> f32 {
    1.0 - cosf(p * FRAC_PI_2)
}

/// Quarter circle, `1 - sqrt(1 - p²)`.
#[inline]
pub fn circular_in(p: f32) -> f32 {
    1.0 - sqrtf(1.0 - p * p)
}

/// Cubic with a dip below zero before accelerating to 1.
#[inline]
pub fn back_in(p: f32) -> f32 {
    p * p * p - p * sinf(p * PI)
}

/// Exponentially growing sine oscillation. Leaves `[0, 1]` near the end.
#[inline]
pub fn elastic_in(p: f32) -> f32 {
    sinf(13.0 * FRAC_PI_2 * p) * powf(2.0, 10.0 * (p - 1.0))
}

/// Bouncing ball landing at 1.
///
/// Unlike the other functions this one is already an OUT shape: four parabolic
/// arcs of decreasing height, each touching 1 at its interval boundary.
pub fn bounce_out(p: f32) -> f32 {
    if p < 4.0 / 11.0 {
        (121.0 * p * p) / 16.0
    } else if p < 8.0 / 11.0 {
        (363.0 / 40.0 * p * p) - (99.0 / 10.0 * p) + 17.0 / 5.0
    } else if p < 9.0 / 10.0 {
        (4356.0 / 361.0 * p * p) - (35442.0 / 1805.0 * p) + 16061.0 / 1805.0
    } else {
        (54.0 / 5.0 * p * p) - (513.0 / 25.0 * p) + 268.0 / 25.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f32 = 1e-4;

    #[test]
    fn test_polynomial_values() {
        assert!((quadratic_in(0.5) - 0.25).abs() < EPS);
        assert!((cubic_in(0.5) - 0.125).abs() < EPS);
        assert!((quartic_in(0.5) - 0.0625).abs() < EPS);
    }

    #[test]
    fn test_endpoints() {
        for f in [linear, quadratic_in, cubic_in, quartic_in, sine_in, circular_in, back_in, elastic_in] {
            assert!(f(0.0).abs() < EPS);
            assert!((f(1.0) - 1.0).abs() < EPS);
        }
    }

    #[test]
    fn test_back_dips_below_zero() {
        assert!(back_in(0.3) < 0.0);
    }

    #[test]
    fn test_elastic_leaves_unit_range() {
        let min = (0..=100)
            .map(|i| elastic_in(i as f32 / 100.0))
            .fold(f32::MAX, f32::min);
        assert!(min < 0.0);
    }

    #[test]
    fn test_bounce_out_touches_one_at_boundaries() {
        assert!(bounce_out(0.0).abs() < EPS);
        assert!((bounce_out(4.0 / 11.0) - 1.0).abs() < 1e-3);
        assert!((bounce_out(8.0 / 11.0) - 1.0).abs() < 1e-3);
        assert!((bounce_out(0.9) - 1.0).abs() < 1e-3);
        assert!((bounce_out(1.0) - 1.0).abs() < 1e-3);
    }

    #[test]
    fn test_bounce_out_continuous() {
        for boundary in [4.0 / 11.0, 8.0 / 11.0, 0.9f32] {
            let before = bounce_out(boundary - 1e-4);
            let after = bounce_out(boundary + 1e-4);
            assert!((before - after).abs() < 1e-2);
        }
    }
}
