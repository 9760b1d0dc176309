//! Configuration validation.

use crate::error::{ConfigError, Error, Result};
use crate::output::MAX_CHANNELS;

use super::{ServoConfig, SystemConfig};

/// Validate a system configuration.
///
/// Checks:
/// - Channels are in range and not shared between servos
/// - Pulse endpoints are non-zero and distinct
/// - Easing family and call style form a supported pair
/// - Default speed is positive
pub fn validate_config(config: &SystemConfig) -> Result<()> {
    let mut seen: u32 = 0;

    for (name, servo) in config.iter() {
        validate_servo(name, servo)?;

        let bit = 1u32 << servo.channel;
        if seen & bit != 0 {
            return Err(Error::Config(ConfigError::DuplicateChannel(servo.channel)));
        }
        seen |= bit;
    }

    Ok(())
}

/// Validate a single servo entry.
pub fn validate_servo(_name: &str, servo: &ServoConfig) -> Result<()> {
    if servo.channel >= MAX_CHANNELS {
        return Err(Error::Config(ConfigError::InvalidChannel(servo.channel)));
    }

    let (zero, one_eighty) = (servo.zero_pulse(), servo.one_eighty_pulse());
    if zero == 0 || one_eighty == 0 || zero == one_eighty {
        return Err(Error::Config(ConfigError::InvalidPulseRange { zero, one_eighty }));
    }

    servo.easing_type()?;

    if servo.speed.0.is_nan() || servo.speed.0 <= 0.0 {
        return Err(Error::Config(ConfigError::InvalidSpeed(servo.speed.0)));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::units::DegreesPerSec;
    use crate::config::PulseScale;
    use crate::easing::{CallStyle, EaseFamily};

    fn make_servo(channel: u8) -> ServoConfig {
        ServoConfig {
            name: heapless::String::try_from("test").unwrap(),
            channel,
            min_pulse: 544,
            max_pulse: 2400,
            pulse_scale: PulseScale::Microseconds,
            reversed: false,
            trim: 0,
            easing: EaseFamily::Quadratic,
            call_style: CallStyle::InOut,
            speed: DegreesPerSec(60.0),
        }
    }

    #[test]
    fn test_invalid_channel() {
        let result = validate_servo("test", &make_servo(16));
        assert!(matches!(
            result,
            Err(Error::Config(ConfigError::InvalidChannel(16)))
        ));
    }

    #[test]
    fn test_equal_pulses() {
        let mut servo = make_servo(0);
        servo.max_pulse = servo.min_pulse;
        assert!(matches!(
            validate_servo("test", &servo),
            Err(Error::Config(ConfigError::InvalidPulseRange { .. }))
        ));
    }

    #[test]
    fn test_zero_speed() {
        let mut servo = make_servo(0);
        servo.speed = DegreesPerSec(0.0);
        assert!(matches!(
            validate_servo("test", &servo),
            Err(Error::Config(ConfigError::InvalidSpeed(_)))
        ));
    }

    #[test]
    fn test_duplicate_channel() {
        let mut config = SystemConfig::default();
        let _ = config
            .servos
            .insert(heapless::String::try_from("a").unwrap(), make_servo(2));
        let _ = config
            .servos
            .insert(heapless::String::try_from("b").unwrap(), make_servo(2));

        assert!(matches!(
            validate_config(&config),
            Err(Error::Config(ConfigError::DuplicateChannel(2)))
        ));
    }
}
