//! Servo registry: attach-ordered slots and per-servo operations.

use core::sync::atomic::{AtomicU16, Ordering};

use heapless::Vec;

use crate::config::units::{Degrees, DegreesPerSec};
use crate::config::{validate_servo, PulseScale, ServoConfig, SystemConfig};
use crate::config::{DEFAULT_MICROSECONDS_FOR_0_DEGREE, DEFAULT_MICROSECONDS_FOR_180_DEGREE};
use crate::easing::EasingType;
use crate::error::{ConfigError, Error, MotionError, Result, ServoError};
use crate::output::{PulseOutput, MAX_CHANNELS};
use crate::servo::{MoveTiming, PulseMapper, ServoReport, Trajectory, UserEasing};

/// Default maximum number of servos in a group.
pub const DEFAULT_CAPACITY: usize = MAX_CHANNELS as usize;

/// Default speed of servos attached without a configuration.
pub const DEFAULT_SPEED: DegreesPerSec = DegreesPerSec(60.0);

/// Refers to a servo attached to a [`ServoGroup`].
///
/// Handles are the attach order, and stay valid for the life of the group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ServoHandle(u8);

impl ServoHandle {
    /// Slot index in the group.
    #[inline]
    pub fn index(self) -> u8 {
        self.0
    }
}

/// One attached servo.
#[derive(Debug)]
pub(super) struct Slot {
    pub(super) trajectory: Trajectory,
    pub(super) next_position: Degrees,
    pub(super) speed: DegreesPerSec,
    /// Untrimmed pulse the output last accepted for this servo.
    pub(super) written: AtomicU16,
}

impl Slot {
    /// Record that the output now holds the current pulse.
    pub(super) fn mark_written(&self) {
        self.written
            .store(self.trajectory.current_pulse(), Ordering::Release);
    }

    /// Whether the output lags behind the current pulse.
    pub(super) fn is_stale(&self) -> bool {
        self.written.load(Ordering::Acquire) != self.trajectory.current_pulse()
    }
}

/// A fixed-capacity collection of servos moved together.
///
/// Pulse widths passed to [`ServoGroup::attach_with_pulses`] are in
/// microseconds and converted with the group's [`PulseScale`]. Build the
/// group with [`ServoGroup::with_pulse_scale`] when it drives a PCA9685.
///
/// # Example
///
/// ```rust,ignore
/// use servo_easing::{Degrees, DegreesPerSec, EasingType, ServoGroup};
///
/// let mut group: ServoGroup = ServoGroup::new();
/// let arm = group.attach(0)?;
/// group.set_easing(arm, EasingType::CUBIC_IN_OUT)?;
/// group.start_ease_to(arm, Degrees(135.0), DegreesPerSec(45.0), now)?;
///
/// // from a 20 ms timer
/// group.tick_all(now, &mut output)?;
/// ```
#[derive(Debug)]
pub struct ServoGroup<const N: usize = DEFAULT_CAPACITY> {
    pub(super) slots: Vec<Slot, N>,
    pulse_scale: PulseScale,
}

impl<const N: usize> Default for ServoGroup<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> ServoGroup<N> {
    /// Create an empty group for outputs taking microseconds.
    pub const fn new() -> Self {
        Self::with_pulse_scale(PulseScale::Microseconds)
    }

    /// Create an empty group whose output takes pulses in `scale`.
    pub const fn with_pulse_scale(scale: PulseScale) -> Self {
        Self {
            slots: Vec::new(),
            pulse_scale: scale,
        }
    }

    /// Unit of the pulses handed to the output.
    #[inline]
    pub fn pulse_scale(&self) -> PulseScale {
        self.pulse_scale
    }

    /// Number of attached servos.
    #[inline]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Whether no servo is attached.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Handles of all attached servos, in attach order.
    pub fn handles(&self) -> impl Iterator<Item = ServoHandle> + '_ {
        (0..self.slots.len()).map(|i| ServoHandle(i as u8))
    }

    /// Attach a servo with the default 544/2400 us calibration.
    ///
    /// # Errors
    ///
    /// - `ServoError::InvalidChannel` for channels >= 16
    /// - `ServoError::ChannelInUse` when the channel is already attached
    /// - `ServoError::RegistryFull` when all slots are taken
    pub fn attach(&mut self, channel: u8) -> Result<ServoHandle> {
        self.attach_with_pulses(
            channel,
            DEFAULT_MICROSECONDS_FOR_0_DEGREE,
            DEFAULT_MICROSECONDS_FOR_180_DEGREE,
        )
    }

    /// Attach a servo with explicit pulse widths for 0 and 180 degrees.
    ///
    /// Widths are in microseconds and converted to the group's pulse scale.
    /// `one_eighty_us` may be below `zero_us`.
    ///
    /// # Errors
    ///
    /// As [`ServoGroup::attach`], plus `ConfigError::InvalidPulseRange` when
    /// the pulses are equal or zero.
    pub fn attach_with_pulses(
        &mut self,
        channel: u8,
        zero_us: u16,
        one_eighty_us: u16,
    ) -> Result<ServoHandle> {
        if zero_us == 0 || one_eighty_us == 0 || zero_us == one_eighty_us {
            return Err(ConfigError::InvalidPulseRange {
                zero: zero_us,
                one_eighty: one_eighty_us,
            }
            .into());
        }
        self.attach_units(
            channel,
            self.pulse_scale.scale_micros(zero_us),
            self.pulse_scale.scale_micros(one_eighty_us),
        )
    }

    /// Attach with endpoints already in output units.
    fn attach_units(&mut self, channel: u8, zero: u16, one_eighty: u16) -> Result<ServoHandle> {
        if channel >= MAX_CHANNELS {
            return Err(ServoError::InvalidChannel(channel).into());
        }
        if zero == 0 || one_eighty == 0 || zero == one_eighty {
            return Err(ConfigError::InvalidPulseRange { zero, one_eighty }.into());
        }
        if self
            .slots
            .iter()
            .any(|s| s.trajectory.channel() == channel)
        {
            return Err(ServoError::ChannelInUse(channel).into());
        }

        let index = self.slots.len();
        if index >= N || index > u8::MAX as usize {
            return Err(ServoError::RegistryFull.into());
        }
        let trajectory = Trajectory::new(index as u8, channel, PulseMapper::new(zero, one_eighty));
        let next_position = trajectory.current_angle();
        let written = AtomicU16::new(trajectory.current_pulse());
        self.slots
            .push(Slot {
                trajectory,
                next_position,
                speed: DEFAULT_SPEED,
                written,
            })
            .map_err(|_| Error::Servo(ServoError::RegistryFull))?;

        crate::log_debug!(
            "attached servo {} on channel {} ({}..{})",
            index as u8,
            channel,
            zero,
            one_eighty
        );
        Ok(ServoHandle(index as u8))
    }

    /// Attach a servo described by a configuration entry.
    ///
    /// Applies calibration, direction, trim, easing and default speed. The
    /// entry's own `pulse_scale` is used instead of the group's.
    ///
    /// # Errors
    ///
    /// Configuration errors from validation, then the errors of
    /// [`ServoGroup::attach_with_pulses`].
    pub fn attach_config(&mut self, config: &ServoConfig) -> Result<ServoHandle> {
        validate_servo(config.name.as_str(), config)?;
        let easing = config.easing_type()?;
        if easing.family() == crate::easing::EaseFamily::User {
            return Err(ServoError::NoUserEasing.into());
        }

        let handle =
            self.attach_units(config.channel, config.zero_pulse(), config.one_eighty_pulse())?;
        let slot = self.slot_mut(handle)?;
        slot.trajectory.set_reversed(config.reversed);
        slot.trajectory.set_trim(config.trim);
        slot.trajectory.set_easing(easing)?;
        slot.speed = config.speed;
        // reversal moves the resting pulse
        let rest = slot.trajectory.mapper().pulse_for(Degrees(90.0));
        slot.trajectory.write_pulse(rest);
        *slot.written.get_mut() = rest;
        slot.next_position = slot.trajectory.current_angle();
        Ok(handle)
    }

    /// Attach the servo named `name` in `config`.
    ///
    /// # Errors
    ///
    /// `ConfigError::ServoNotFound` for unknown names, then the errors of
    /// [`ServoGroup::attach_config`].
    pub fn attach_named(&mut self, config: &SystemConfig, name: &str) -> Result<ServoHandle> {
        let servo = config.servo(name).ok_or_else(|| {
            let mut missing = heapless::String::new();
            for c in name.chars() {
                if missing.push(c).is_err() {
                    break;
                }
            }
            Error::Config(ConfigError::ServoNotFound(missing))
        })?;
        self.attach_config(servo)
    }

    pub(super) fn slot(&self, handle: ServoHandle) -> Result<&Slot> {
        self.slots
            .get(handle.0 as usize)
            .ok_or(Error::Servo(ServoError::UnknownServo(handle.0)))
    }

    pub(super) fn slot_mut(&mut self, handle: ServoHandle) -> Result<&mut Slot> {
        self.slots
            .get_mut(handle.0 as usize)
            .ok_or(Error::Servo(ServoError::UnknownServo(handle.0)))
    }

    /// Trajectory of a servo, for inspection.
    pub fn trajectory(&self, handle: ServoHandle) -> Result<&Trajectory> {
        Ok(&self.slot(handle)?.trajectory)
    }

    /// Mirror the angle range of a servo.
    pub fn set_reversed(&mut self, handle: ServoHandle, reversed: bool) -> Result<()> {
        self.slot_mut(handle)?.trajectory.set_reversed(reversed);
        Ok(())
    }

    /// Set the output-only pulse offset of a servo.
    pub fn set_trim(&mut self, handle: ServoHandle, trim: i16) -> Result<()> {
        self.slot_mut(handle)?.trajectory.set_trim(trim);
        Ok(())
    }

    /// Select the easing of a servo.
    ///
    /// # Errors
    ///
    /// `ServoError::NoUserEasing` when the user family is selected before a
    /// curve was registered for this servo.
    pub fn set_easing(&mut self, handle: ServoHandle, easing: EasingType) -> Result<()> {
        self.slot_mut(handle)?.trajectory.set_easing(easing)
    }

    /// Register the user easing curve of a servo.
    pub fn register_user_easing(&mut self, handle: ServoHandle, easing: UserEasing) -> Result<()> {
        self.slot_mut(handle)?.trajectory.register_user_easing(easing);
        Ok(())
    }

    /// Set the default speed used by group moves.
    ///
    /// # Errors
    ///
    /// `MotionError::ZeroSpeed` for a non-positive speed.
    pub fn set_speed(&mut self, handle: ServoHandle, speed: DegreesPerSec) -> Result<()> {
        if speed.0.is_nan() || speed.0 <= 0.0 {
            return Err(MotionError::ZeroSpeed.into());
        }
        self.slot_mut(handle)?.speed = speed;
        Ok(())
    }

    /// Default speed used by group moves.
    pub fn speed(&self, handle: ServoHandle) -> Result<DegreesPerSec> {
        Ok(self.slot(handle)?.speed)
    }

    /// Configure and start a move at `speed`.
    ///
    /// # Errors
    ///
    /// Motion errors from [`Trajectory::configure_by_speed`] and
    /// [`Trajectory::start`]. Nothing changes on error.
    pub fn start_ease_to(
        &mut self,
        handle: ServoHandle,
        target: Degrees,
        speed: DegreesPerSec,
        now_ms: u32,
    ) -> Result<()> {
        let trajectory = &mut self.slot_mut(handle)?.trajectory;
        trajectory.configure_by_speed(target, speed)?;
        trajectory.start(now_ms)
    }

    /// Configure and start a move lasting `duration_ms`.
    ///
    /// # Errors
    ///
    /// Motion errors from [`Trajectory::configure_by_duration`] and
    /// [`Trajectory::start`]. Nothing changes on error.
    pub fn start_ease_to_duration(
        &mut self,
        handle: ServoHandle,
        target: Degrees,
        duration_ms: u32,
        now_ms: u32,
    ) -> Result<()> {
        let trajectory = &mut self.slot_mut(handle)?.trajectory;
        trajectory.configure_by_duration(target, duration_ms)?;
        trajectory.start(now_ms)
    }

    /// Move a servo to `angle` immediately, cancelling any move.
    pub fn write_angle<O: PulseOutput>(
        &mut self,
        handle: ServoHandle,
        angle: Degrees,
        output: &mut O,
    ) -> Result<()> {
        let slot = self.slot_mut(handle)?;
        slot.trajectory.write_angle(angle);
        output.write_pulse(slot.trajectory.channel(), slot.trajectory.output_pulse())?;
        slot.mark_written();
        Ok(())
    }

    /// Move a servo to `pulse` (untrimmed, output units) immediately,
    /// cancelling any move.
    pub fn write_pulse<O: PulseOutput>(
        &mut self,
        handle: ServoHandle,
        pulse: u16,
        output: &mut O,
    ) -> Result<()> {
        let slot = self.slot_mut(handle)?;
        slot.trajectory.write_pulse(pulse);
        output.write_pulse(slot.trajectory.channel(), slot.trajectory.output_pulse())?;
        slot.mark_written();
        Ok(())
    }

    /// Current angle of a servo, excluding trim.
    pub fn current_angle(&self, handle: ServoHandle) -> Result<Degrees> {
        Ok(self.slot(handle)?.trajectory.current_angle())
    }

    /// Whether a servo is moving.
    pub fn is_moving(&self, handle: ServoHandle) -> Result<bool> {
        Ok(self.slot(handle)?.trajectory.is_moving())
    }

    /// Duration of the last configured move of a servo.
    pub fn move_duration(&self, handle: ServoHandle) -> Result<u32> {
        Ok(self.slot(handle)?.trajectory.move_duration())
    }

    /// Duration a move to `target` would take, without configuring it.
    pub fn planned_duration(
        &self,
        handle: ServoHandle,
        target: Degrees,
        timing: MoveTiming,
    ) -> Result<u32> {
        self.slot(handle)?.trajectory.planned_duration(target, timing)
    }

    /// Diagnostic snapshot of a servo.
    pub fn report(&self, handle: ServoHandle) -> Result<ServoReport> {
        Ok(self.slot(handle)?.trajectory.report())
    }

    /// Diagnostic snapshots of all servos, in attach order.
    pub fn reports(&self) -> impl Iterator<Item = ServoReport> + '_ {
        self.slots.iter().map(|s| s.trajectory.report())
    }
}
