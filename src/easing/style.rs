//! Call styles: deriving OUT, IN_OUT and BOUNCING curves from an ease-in function.

use serde::Deserialize;

use super::Easing;

/// How an ease-in function is called to produce the final progress curve.
///
/// The discriminant is the value of the style bits in a packed easing code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CallStyle {
    /// `f(p)`.
    #[default]
    Direct = 0x00,
    /// `1 - f(1 - p)`.
    Out = 0x20,
    /// Ease in over the first half, ease out over the second.
    InOut = 0x40,
    /// OUT at double speed to the target, then mirrored back to the start.
    Bouncing = 0x60,
}

impl CallStyle {
    /// Mask selecting the style bits of a packed easing code.
    pub const MASK: u8 = 0xE0;

    /// Decode the style bits of a packed easing code.
    ///
    /// Returns `None` for the unassigned values `0x80`, `0xA0`, `0xC0` and `0xE0`.
    pub fn from_code(code: u8) -> Option<Self> {
        match code & Self::MASK {
            0x00 => Some(CallStyle::Direct),
            0x20 => Some(CallStyle::Out),
            0x40 => Some(CallStyle::InOut),
            0x60 => Some(CallStyle::Bouncing),
            _ => None,
        }
    }

    /// Style bits for a packed easing code.
    #[inline]
    pub const fn code(self) -> u8 {
        self as u8
    }

    /// Whether the curve ends back at its starting value.
    #[inline]
    pub fn returns_to_start(self) -> bool {
        self == CallStyle::Bouncing
    }

    /// Apply this style to `f` at completion fraction `p`.
    pub fn apply<E: Easing + ?Sized>(self, f: &E, p: f32) -> f32 {
        match self {
            CallStyle::Direct => f.ease(p),
            CallStyle::Out => 1.0 - f.ease(1.0 - p),
            CallStyle::InOut => {
                if p < 0.5 {
                    0.5 * f.ease(2.0 * p)
                } else {
                    1.0 - 0.5 * f.ease(2.0 - 2.0 * p)
                }
            }
            CallStyle::Bouncing => {
                if p < 0.5 {
                    1.0 - f.ease(1.0 - 2.0 * p)
                } else {
                    1.0 - f.ease(2.0 * p - 1.0)
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::easing::functions::{cubic_in, quadratic_in};

    const EPS: f32 = 1e-5;

    #[test]
    fn test_out_mirrors_in() {
        let f = quadratic_in;
        for i in 0..=10 {
            let p = i as f32 / 10.0;
            let expected = 1.0 - (1.0 - p) * (1.0 - p);
            assert!((CallStyle::Out.apply(&f, p) - expected).abs() < EPS);
        }
    }

    #[test]
    fn test_in_out_continuity() {
        let f = cubic_in;
        let below = CallStyle::InOut.apply(&f, 0.5 - 1e-6);
        let at = CallStyle::InOut.apply(&f, 0.5);
        assert!((at - 0.5).abs() < EPS);
        assert!((below - at).abs() < 1e-4);
        assert!(CallStyle::InOut.apply(&f, 0.0).abs() < EPS);
        assert!((CallStyle::InOut.apply(&f, 1.0) - 1.0).abs() < EPS);
    }

    #[test]
    fn test_bouncing_returns_to_start() {
        let f = quadratic_in;
        assert!(CallStyle::Bouncing.apply(&f, 0.0).abs() < EPS);
        assert!((CallStyle::Bouncing.apply(&f, 0.5) - 1.0).abs() < EPS);
        assert!(CallStyle::Bouncing.apply(&f, 1.0).abs() < EPS);
        // first half is the OUT curve at double speed
        let out = CallStyle::Out.apply(&f, 0.5);
        assert!((CallStyle::Bouncing.apply(&f, 0.25) - out).abs() < EPS);
    }

    #[test]
    fn test_code_round_trip() {
        for style in [CallStyle::Direct, CallStyle::Out, CallStyle::InOut, CallStyle::Bouncing] {
            assert_eq!(CallStyle::from_code(style.code() | 0x03), Some(style));
        }
    }

    #[test]
    fn test_unassigned_style_bits() {
        for bits in [0x80, 0xA0, 0xC0, 0xE0] {
            assert_eq!(CallStyle::from_code(bits), None);
            assert_eq!(CallStyle::from_code(bits | 0x03), None);
        }
    }
}
