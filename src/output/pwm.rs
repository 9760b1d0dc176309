//! Direct PWM pin output.

use embedded_hal::pwm::SetDutyCycle;
use heapless::Vec;

use super::{PulseOutput, REFRESH_INTERVAL_US};
use crate::error::{OutputError, Result};

/// Drives servos from PWM channels running at the 50 Hz refresh rate.
///
/// Channel `n` is the `n`th pin passed to [`PwmOutput::new`]. Pulses are in
/// microseconds and are converted to a duty cycle fraction of the 20 ms period.
pub struct PwmOutput<P: SetDutyCycle, const N: usize> {
    pins: Vec<P, N>,
}

impl<P: SetDutyCycle, const N: usize> PwmOutput<P, N> {
    /// Bind the given pins to channels `0..pins.len()`.
    pub fn new(pins: Vec<P, N>) -> Self {
        Self { pins }
    }

    /// Number of bound channels.
    pub fn channels(&self) -> usize {
        self.pins.len()
    }

    /// Give the pins back.
    pub fn release(self) -> Vec<P, N> {
        self.pins
    }
}

impl<P: SetDutyCycle, const N: usize> PulseOutput for PwmOutput<P, N> {
    fn write_pulse(&mut self, channel: u8, pulse: u16) -> Result<()> {
        let pin = self
            .pins
            .get_mut(channel as usize)
            .ok_or(OutputError::UnboundChannel(channel))?;
        if pulse as u32 > REFRESH_INTERVAL_US {
            crate::log_warn!("channel {}: pulse {} exceeds the PWM period", channel, pulse);
        }
        let pulse = (pulse as u32).min(REFRESH_INTERVAL_US);
        pin.set_duty_cycle_fraction(pulse as u16, REFRESH_INTERVAL_US as u16)
            .map_err(|_| OutputError::Pwm)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use core::convert::Infallible;
    use embedded_hal::pwm::ErrorType;

    struct FakePin {
        max: u16,
        duty: u16,
    }

    impl ErrorType for FakePin {
        type Error = Infallible;
    }

    impl SetDutyCycle for FakePin {
        fn max_duty_cycle(&self) -> u16 {
            self.max
        }

        fn set_duty_cycle(&mut self, duty: u16) -> core::result::Result<(), Self::Error> {
            self.duty = duty;
            Ok(())
        }
    }

    fn make_output() -> PwmOutput<FakePin, 2> {
        let mut pins = Vec::new();
        pins.push(FakePin { max: 20_000, duty: 0 }).ok();
        pins.push(FakePin { max: 4000, duty: 0 }).ok();
        PwmOutput::new(pins)
    }

    #[test]
    fn test_pulse_to_duty() {
        let mut out = make_output();
        out.write_pulse(0, 1500).unwrap();
        out.write_pulse(1, 1500).unwrap();
        let pins = out.release();
        assert_eq!(pins[0].duty, 1500);
        assert_eq!(pins[1].duty, 300);
    }

    #[test]
    fn test_unbound_channel() {
        let mut out = make_output();
        assert_eq!(out.channels(), 2);
        assert_eq!(
            out.write_pulse(2, 1500),
            Err(Error::Output(OutputError::UnboundChannel(2)))
        );
    }
}
