//! PCA9685 16-channel I2C PWM expander.
//!
//! The expander is clocked so that one period is 20 ms and split into 4096
//! counts, so pulses handed to it are in counts rather than microseconds.
//! Use [`microseconds_to_units`] or `PulseScale::Pca9685Units` to calibrate
//! servos attached to it.

use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::I2c;

use super::{PulseOutput, MAX_CHANNELS, REFRESH_INTERVAL_US};
use crate::error::{OutputError, Result};

/// Default 7-bit device address.
pub const DEFAULT_ADDRESS: u8 = 0x40;

/// Counts per PWM period.
pub const UNITS_PER_PERIOD: u32 = 4096;

const GENERAL_CALL_ADDRESS: u8 = 0x00;
const SOFTWARE_RESET: u8 = 0x06;

const MODE1: u8 = 0x00;
const MODE1_AUTO_INCREMENT: u8 = 1 << 5;
const MODE1_SLEEP: u8 = 1 << 4;
const PRESCALE: u8 = 0xFE;
const LED0_ON_L: u8 = 0x06;

/// Highest OFF count. Bit 12 of LEDn_OFF is the full-off flag.
const MAX_OFF_COUNT: u16 = 0x0FFF;

/// 25 MHz / (4096 * 50 Hz) - 1, rounded.
const PRESCALE_50HZ: u8 = 121;

/// Oscillator needs at least 500 us before the device is woken.
const OSCILLATOR_STARTUP_US: u32 = 2000;

/// Convert a pulse width in microseconds to expander counts.
#[inline]
pub fn microseconds_to_units(micros: u16) -> u16 {
    (UNITS_PER_PERIOD * micros as u32 / REFRESH_INTERVAL_US) as u16
}

/// PCA9685 driver over an embedded-hal 1.0 I2C bus.
pub struct Pca9685<I2C> {
    i2c: I2C,
    address: u8,
}

impl<I2C: I2c> Pca9685<I2C> {
    /// Wrap a bus. Call [`Pca9685::init`] before writing pulses.
    pub fn new(i2c: I2C, address: u8) -> Self {
        Self { i2c, address }
    }

    /// Device address.
    pub fn address(&self) -> u8 {
        self.address
    }

    /// Reset the expander and set it up for 50 Hz output.
    ///
    /// Issues a general-call software reset, which resets every PCA9685 on
    /// the bus.
    ///
    /// # Errors
    ///
    /// Returns `OutputError::Bus` when any register write fails.
    pub fn init(&mut self, delay: &mut impl DelayNs) -> Result<()> {
        self.i2c
            .write(GENERAL_CALL_ADDRESS, &[SOFTWARE_RESET])
            .map_err(|_| OutputError::Bus)?;
        // prescale can only be written while asleep
        self.write_register(MODE1, MODE1_SLEEP)?;
        self.write_register(PRESCALE, PRESCALE_50HZ)?;
        delay.delay_us(OSCILLATOR_STARTUP_US);
        self.write_register(MODE1, MODE1_AUTO_INCREMENT)?;

        crate::log_info!("PCA9685 at {=u8:#x} initialized", self.address);
        Ok(())
    }

    /// Give the bus back.
    pub fn release(self) -> I2C {
        self.i2c
    }

    fn write_register(&mut self, register: u8, value: u8) -> Result<()> {
        self.i2c
            .write(self.address, &[register, value])
            .map_err(|_| OutputError::Bus)?;
        Ok(())
    }
}

impl<I2C: I2c> PulseOutput for Pca9685<I2C> {
    /// Pulse starts at count 0 and ends at count `pulse`, capped at 4095.
    fn write_pulse(&mut self, channel: u8, pulse: u16) -> Result<()> {
        if channel >= MAX_CHANNELS {
            return Err(OutputError::UnboundChannel(channel).into());
        }
        if pulse > MAX_OFF_COUNT {
            crate::log_warn!("channel {}: pulse {} exceeds the PWM period", channel, pulse);
        }
        let [off_lo, off_hi] = pulse.min(MAX_OFF_COUNT).to_le_bytes();
        self.i2c
            .write(
                self.address,
                &[LED0_ON_L + 4 * channel, 0, 0, off_lo, off_hi],
            )
            .map_err(|_| OutputError::Bus)?;
        Ok(())
    }
}
