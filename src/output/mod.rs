//! Pulse output backends.
//!
//! The group computes pulses; a [`PulseOutput`] puts them on the wire. Two
//! backends are provided: plain PWM pins and the PCA9685 I2C expander.

pub mod pca9685;
mod pwm;

pub use pca9685::Pca9685;
pub use pwm::PwmOutput;

use crate::error::Result;

/// Number of channels a group or expander can drive.
pub const MAX_CHANNELS: u8 = 16;

/// Servo refresh period in microseconds (50 Hz).
pub const REFRESH_INTERVAL_US: u32 = 20_000;

/// Servo refresh period in milliseconds.
pub const REFRESH_INTERVAL_MS: u32 = REFRESH_INTERVAL_US / 1000;

/// Something that can hold a servo pulse on a channel.
pub trait PulseOutput {
    /// Set the pulse of `channel`. The unit is backend specific.
    fn write_pulse(&mut self, channel: u8, pulse: u16) -> Result<()>;
}

impl<T: PulseOutput + ?Sized> PulseOutput for &mut T {
    #[inline]
    fn write_pulse(&mut self, channel: u8, pulse: u16) -> Result<()> {
        (**self).write_pulse(channel, pulse)
    }
}
