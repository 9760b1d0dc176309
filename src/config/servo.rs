//! Servo configuration from TOML.

use heapless::String;
use serde::Deserialize;

use super::units::DegreesPerSec;
use crate::easing::{CallStyle, EaseFamily, EasingType};
use crate::error::ConfigError;
use crate::output::pca9685;

/// Default pulse width for 0 degrees, in microseconds.
pub const DEFAULT_MICROSECONDS_FOR_0_DEGREE: u16 = 544;
/// Default pulse width for 180 degrees, in microseconds.
pub const DEFAULT_MICROSECONDS_FOR_180_DEGREE: u16 = 2400;

/// Unit of the pulse values handed to the output backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PulseScale {
    /// Pulse width in microseconds (direct PWM pins).
    #[default]
    Microseconds,
    /// PCA9685 counts, 4096 per 20 ms period.
    Pca9685Units,
}

impl PulseScale {
    /// Convert a pulse width in microseconds to this scale.
    #[inline]
    pub fn scale_micros(self, micros: u16) -> u16 {
        match self {
            PulseScale::Microseconds => micros,
            PulseScale::Pca9685Units => pca9685::microseconds_to_units(micros),
        }
    }
}

/// Complete servo configuration from TOML.
#[derive(Debug, Clone, Deserialize)]
pub struct ServoConfig {
    /// Human-readable name (max 32 chars).
    pub name: String<32>,

    /// Output channel (PWM pin index or expander channel, 0-15).
    pub channel: u8,

    /// Pulse width for 0 degrees in microseconds.
    #[serde(default = "default_min_pulse", rename = "min_pulse_us")]
    pub min_pulse: u16,

    /// Pulse width for 180 degrees in microseconds.
    #[serde(default = "default_max_pulse", rename = "max_pulse_us")]
    pub max_pulse: u16,

    /// Scale of the values sent to the output backend.
    #[serde(default)]
    pub pulse_scale: PulseScale,

    /// Mirror the angle range (0 becomes 180).
    #[serde(default)]
    pub reversed: bool,

    /// Output-only pulse offset, in the units of `pulse_scale`.
    #[serde(default)]
    pub trim: i16,

    /// Easing family.
    #[serde(default)]
    pub easing: EaseFamily,

    /// Call style applied to the easing family.
    #[serde(default)]
    pub call_style: CallStyle,

    /// Default speed for moves and synchronized groups.
    #[serde(default = "default_speed", rename = "speed_deg_per_sec")]
    pub speed: DegreesPerSec,
}

fn default_min_pulse() -> u16 {
    DEFAULT_MICROSECONDS_FOR_0_DEGREE
}

fn default_max_pulse() -> u16 {
    DEFAULT_MICROSECONDS_FOR_180_DEGREE
}

fn default_speed() -> DegreesPerSec {
    DegreesPerSec(60.0)
}

impl ServoConfig {
    /// Pulse value for 0 degrees in output units.
    pub fn zero_pulse(&self) -> u16 {
        self.pulse_scale.scale_micros(self.min_pulse)
    }

    /// Pulse value for 180 degrees in output units.
    pub fn one_eighty_pulse(&self) -> u16 {
        self.pulse_scale.scale_micros(self.max_pulse)
    }

    /// Validated easing type for this servo.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidEasing` for unsupported pairings such as
    /// linear with a non-direct call style.
    pub fn easing_type(&self) -> Result<EasingType, ConfigError> {
        EasingType::new(self.easing, self.call_style)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_test_config(scale: PulseScale) -> ServoConfig {
        ServoConfig {
            name: String::try_from("test").unwrap(),
            channel: 0,
            min_pulse: DEFAULT_MICROSECONDS_FOR_0_DEGREE,
            max_pulse: DEFAULT_MICROSECONDS_FOR_180_DEGREE,
            pulse_scale: scale,
            reversed: false,
            trim: 0,
            easing: EaseFamily::Cubic,
            call_style: CallStyle::InOut,
            speed: DegreesPerSec(60.0),
        }
    }

    #[test]
    fn test_microsecond_pulses() {
        let config = make_test_config(PulseScale::Microseconds);
        assert_eq!(config.zero_pulse(), 544);
        assert_eq!(config.one_eighty_pulse(), 2400);
    }

    #[test]
    fn test_pca9685_pulses() {
        let config = make_test_config(PulseScale::Pca9685Units);
        assert_eq!(config.zero_pulse(), 111);
        assert_eq!(config.one_eighty_pulse(), 491);
    }

    #[test]
    fn test_easing_type() {
        let mut config = make_test_config(PulseScale::Microseconds);
        assert_eq!(config.easing_type().unwrap(), EasingType::CUBIC_IN_OUT);

        config.easing = EaseFamily::Linear;
        assert!(config.easing_type().is_err());
    }
}
