//! Unit types for physical quantities.
//!
//! Provides type-safe representations of servo angles and angular speeds to
//! keep them apart from raw pulse values.

use serde::Deserialize;

/// Servo angle in degrees.
///
/// Servo angles live in `[0, 180]`; out-of-range values are clamped by the
/// pulse mapper rather than rejected. NaN is treated as 0°.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Deserialize)]
#[serde(transparent)]
pub struct Degrees(pub f32);

impl Degrees {
    /// Lowest servo angle.
    pub const MIN: Self = Self(0.0);
    /// Highest servo angle.
    pub const MAX: Self = Self(180.0);

    /// Create a new Degrees value.
    #[inline]
    pub const fn new(value: f32) -> Self {
        Self(value)
    }

    /// Get the raw value.
    #[inline]
    pub const fn value(self) -> f32 {
        self.0
    }

    /// Clamp to the servo range `[0, 180]`, mapping NaN to [`Degrees::MIN`].
    #[inline]
    pub fn clamped(self) -> Self {
        if self.0.is_nan() {
            return Self::MIN;
        }
        Self(self.0.clamp(Self::MIN.0, Self::MAX.0))
    }

    /// Absolute angular distance to `other`.
    #[inline]
    pub fn distance(self, other: Self) -> f32 {
        libm::fabsf(self.0 - other.0)
    }
}

/// Angular speed in degrees per second.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Deserialize)]
#[serde(transparent)]
pub struct DegreesPerSec(pub f32);

impl DegreesPerSec {
    /// Create a new DegreesPerSec value.
    #[inline]
    pub const fn new(value: f32) -> Self {
        Self(value)
    }

    /// Get the raw value.
    #[inline]
    pub const fn value(self) -> f32 {
        self.0
    }

    /// Milliseconds needed to cover `distance` degrees, rounded.
    ///
    /// Returns `None` for a speed that is not strictly positive.
    pub fn millis_for(self, distance: f32) -> Option<u32> {
        if self.0.is_nan() || self.0 <= 0.0 {
            return None;
        }
        Some(libm::roundf(distance * 1000.0 / self.0) as u32)
    }
}

/// Extension trait for creating unit types from primitives.
pub trait UnitExt {
    /// Convert to Degrees.
    fn degrees(self) -> Degrees;
    /// Convert to DegreesPerSec.
    fn degrees_per_sec(self) -> DegreesPerSec;
}

impl UnitExt for f32 {
    #[inline]
    fn degrees(self) -> Degrees {
        Degrees(self)
    }

    #[inline]
    fn degrees_per_sec(self) -> DegreesPerSec {
        DegreesPerSec(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamped() {
        assert_eq!(Degrees(-10.0).clamped(), Degrees::MIN);
        assert_eq!(Degrees(200.0).clamped(), Degrees::MAX);
        assert_eq!(Degrees(45.0).clamped(), Degrees(45.0));
        assert_eq!(Degrees(f32::NAN).clamped(), Degrees::MIN);
    }

    #[test]
    fn test_millis_for() {
        assert_eq!(DegreesPerSec(90.0).millis_for(90.0), Some(1000));
        assert_eq!(DegreesPerSec(60.0).millis_for(45.0), Some(750));
        assert_eq!(DegreesPerSec(0.0).millis_for(45.0), None);
        assert_eq!(DegreesPerSec(-5.0).millis_for(45.0), None);
    }

    #[test]
    fn test_unit_ext() {
        assert_eq!(90.0f32.degrees(), Degrees(90.0));
        assert_eq!(20.0f32.degrees_per_sec(), DegreesPerSec(20.0));
    }
}
