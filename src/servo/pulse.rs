//! Angle to pulse mapping.
//!
//! Pulses are in whatever unit the output backend uses (microseconds for PWM
//! pins, counts for the PCA9685). The mapping is linear between two calibrated
//! endpoints.

use libm::roundf;

use crate::config::units::Degrees;
use crate::config::{DEFAULT_MICROSECONDS_FOR_0_DEGREE, DEFAULT_MICROSECONDS_FOR_180_DEGREE};

/// Map an angle to a pulse between `zero` (0°) and `one_eighty` (180°).
///
/// The angle is clamped to `[0, 180]` and NaN maps to 0°. When `reversed`,
/// `180 - angle` is mapped instead.
pub fn angle_to_pulse(angle: Degrees, reversed: bool, zero: u16, one_eighty: u16) -> u16 {
    let mut angle = angle.clamped().0;
    if reversed {
        angle = 180.0 - angle;
    }
    let span = one_eighty as f32 - zero as f32;
    clamp_pulse(roundf(zero as f32 + span * angle / 180.0))
}

/// Inverse of [`angle_to_pulse`], clamped to `[0, 180]`.
pub fn pulse_to_angle(pulse: u16, reversed: bool, zero: u16, one_eighty: u16) -> Degrees {
    let span = one_eighty as f32 - zero as f32;
    if span == 0.0 {
        return Degrees::MIN;
    }
    let angle = Degrees((pulse as f32 - zero as f32) * 180.0 / span).clamped();
    if reversed {
        Degrees(180.0 - angle.0)
    } else {
        angle
    }
}

/// Saturate a computed pulse into the `u16` range.
#[inline]
pub(crate) fn clamp_pulse(value: f32) -> u16 {
    value.clamp(0.0, u16::MAX as f32) as u16
}

/// Calibration of one servo: endpoints, direction and trim.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PulseMapper {
    zero: u16,
    one_eighty: u16,
    reversed: bool,
    trim: i16,
}

impl Default for PulseMapper {
    fn default() -> Self {
        Self::new(
            DEFAULT_MICROSECONDS_FOR_0_DEGREE,
            DEFAULT_MICROSECONDS_FOR_180_DEGREE,
        )
    }
}

impl PulseMapper {
    /// Create a mapper for the given endpoints, not reversed, without trim.
    pub const fn new(zero: u16, one_eighty: u16) -> Self {
        Self {
            zero,
            one_eighty,
            reversed: false,
            trim: 0,
        }
    }

    /// Pulse for 0 degrees.
    #[inline]
    pub fn zero_pulse(&self) -> u16 {
        self.zero
    }

    /// Pulse for 180 degrees.
    #[inline]
    pub fn one_eighty_pulse(&self) -> u16 {
        self.one_eighty
    }

    /// Whether the angle range is mirrored.
    #[inline]
    pub fn is_reversed(&self) -> bool {
        self.reversed
    }

    /// Output-only pulse offset.
    #[inline]
    pub fn trim(&self) -> i16 {
        self.trim
    }

    /// Mirror the angle range.
    pub fn set_reversed(&mut self, reversed: bool) {
        self.reversed = reversed;
    }

    /// Set the output-only pulse offset.
    pub fn set_trim(&mut self, trim: i16) {
        self.trim = trim;
    }

    /// Untrimmed pulse for an angle.
    #[inline]
    pub fn pulse_for(&self, angle: Degrees) -> u16 {
        angle_to_pulse(angle, self.reversed, self.zero, self.one_eighty)
    }

    /// Angle for an untrimmed pulse.
    #[inline]
    pub fn angle_for(&self, pulse: u16) -> Degrees {
        pulse_to_angle(pulse, self.reversed, self.zero, self.one_eighty)
    }

    /// Pulse as handed to the output: `pulse + trim`, saturated.
    #[inline]
    pub fn output_pulse(&self, pulse: u16) -> u16 {
        pulse.saturating_add_signed(self.trim)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoints() {
        assert_eq!(angle_to_pulse(Degrees(0.0), false, 544, 2400), 544);
        assert_eq!(angle_to_pulse(Degrees(90.0), false, 544, 2400), 1472);
        assert_eq!(angle_to_pulse(Degrees(180.0), false, 544, 2400), 2400);
    }

    #[test]
    fn test_reversed_matches_mirrored_angle() {
        for a in [0.0, 13.0, 45.5, 90.0, 179.0, 180.0] {
            assert_eq!(
                angle_to_pulse(Degrees(a), true, 544, 2400),
                angle_to_pulse(Degrees(180.0 - a), false, 544, 2400)
            );
        }
    }

    #[test]
    fn test_out_of_range_is_clamped() {
        assert_eq!(angle_to_pulse(Degrees(-20.0), false, 544, 2400), 544);
        assert_eq!(angle_to_pulse(Degrees(250.0), false, 544, 2400), 2400);
        assert_eq!(pulse_to_angle(100, false, 544, 2400), Degrees(0.0));
        assert_eq!(pulse_to_angle(3000, false, 544, 2400), Degrees(180.0));
    }

    #[test]
    fn test_nan_angle_maps_to_zero_degrees() {
        assert_eq!(angle_to_pulse(Degrees(f32::NAN), false, 544, 2400), 544);
        assert_eq!(angle_to_pulse(Degrees(f32::NAN), true, 544, 2400), 2400);
    }

    #[test]
    fn test_inverse() {
        let mapper = PulseMapper::default();
        assert!((mapper.angle_for(mapper.pulse_for(Degrees(90.0))).0 - 90.0).abs() < 0.1);

        let mut reversed = PulseMapper::new(111, 491);
        reversed.set_reversed(true);
        let pulse = reversed.pulse_for(Degrees(30.0));
        assert!((reversed.angle_for(pulse).0 - 30.0).abs() < 0.5);
    }

    #[test]
    fn test_trim_only_affects_output() {
        let mut mapper = PulseMapper::default();
        mapper.set_trim(-10);
        assert_eq!(mapper.pulse_for(Degrees(0.0)), 544);
        assert_eq!(mapper.output_pulse(544), 534);
        assert_eq!(mapper.angle_for(544), Degrees(0.0));
    }
}
