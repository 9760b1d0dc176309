//! Per-servo eased trajectory.
//!
//! A trajectory interpolates from a start pulse to an end pulse over a fixed
//! duration. Every tick recomputes the pulse from the elapsed time, so the
//! result never drifts and the last tick lands exactly on the final pulse.

use libm::roundf;

use crate::config::units::{Degrees, DegreesPerSec};
use crate::easing::{Easing, EasingType};
use crate::error::{MotionError, Result, ServoError};

use super::pulse::{clamp_pulse, PulseMapper};
use super::report::ServoReport;
use super::state::{MotionState, SharedState};

/// User easing curve, shared for the lifetime of the program.
pub type UserEasing = &'static (dyn Easing + Sync);

/// How the duration of a move is determined.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MoveTiming {
    /// Derived from the angular distance at this speed.
    Speed(DegreesPerSec),
    /// Given directly, in milliseconds.
    Millis(u32),
}

/// Outcome of a single tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tick {
    /// Not moving; nothing changed.
    Idle,
    /// Still moving; the pulse computed for this tick.
    Moving(u16),
    /// The move completed on this tick; the final pulse.
    Finished(u16),
}

impl Tick {
    /// `true` unless the trajectory is still moving.
    #[inline]
    pub fn is_finished(self) -> bool {
        !matches!(self, Tick::Moving(_))
    }

    /// Pulse produced by this tick, if any.
    #[inline]
    pub fn pulse(self) -> Option<u16> {
        match self {
            Tick::Idle => None,
            Tick::Moving(p) | Tick::Finished(p) => Some(p),
        }
    }
}

/// Eased move state of one servo.
pub struct Trajectory {
    /// Slot in the owning group.
    index: u8,
    /// Output channel.
    channel: u8,
    /// Calibration.
    mapper: PulseMapper,
    /// Current pulse and moving flag, written by `tick`.
    shared: SharedState,
    start: u16,
    end: u16,
    /// Always `end - start`.
    delta: i32,
    easing: EasingType,
    user_easing: Option<UserEasing>,
    start_ms: u32,
    duration_ms: u32,
    /// A configured move is waiting for `start`.
    pending: bool,
}

impl Trajectory {
    /// Create an idle trajectory resting at 90 degrees.
    pub fn new(index: u8, channel: u8, mapper: PulseMapper) -> Self {
        let rest = mapper.pulse_for(Degrees(90.0));
        Self {
            index,
            channel,
            mapper,
            shared: SharedState::new(rest),
            start: rest,
            end: rest,
            delta: 0,
            easing: EasingType::LINEAR,
            user_easing: None,
            start_ms: 0,
            duration_ms: 0,
            pending: false,
        }
    }

    /// Slot in the owning group.
    #[inline]
    pub fn index(&self) -> u8 {
        self.index
    }

    /// Output channel.
    #[inline]
    pub fn channel(&self) -> u8 {
        self.channel
    }

    /// Calibration.
    #[inline]
    pub fn mapper(&self) -> &PulseMapper {
        &self.mapper
    }

    /// Mirror the angle range. Call before issuing moves.
    pub fn set_reversed(&mut self, reversed: bool) {
        self.mapper.set_reversed(reversed);
    }

    /// Set the output-only pulse offset. Call before issuing moves.
    pub fn set_trim(&mut self, trim: i16) {
        self.mapper.set_trim(trim);
    }

    /// Easing used for subsequent ticks.
    #[inline]
    pub fn easing(&self) -> EasingType {
        self.easing
    }

    /// Select the easing type.
    ///
    /// # Errors
    ///
    /// Returns `ServoError::NoUserEasing` when the user family is selected
    /// before a user curve was registered.
    pub fn set_easing(&mut self, easing: EasingType) -> Result<()> {
        if easing.family() == crate::easing::EaseFamily::User && self.user_easing.is_none() {
            return Err(ServoError::NoUserEasing.into());
        }
        self.easing = easing;
        Ok(())
    }

    /// Whether a user curve is registered.
    #[inline]
    pub fn has_user_easing(&self) -> bool {
        self.user_easing.is_some()
    }

    /// Register the curve used when the user family is selected.
    pub fn register_user_easing(&mut self, easing: UserEasing) {
        self.user_easing = Some(easing);
    }

    /// Current (untrimmed) pulse.
    #[inline]
    pub fn current_pulse(&self) -> u16 {
        self.shared.current()
    }

    /// Current pulse plus trim, as sent to the output.
    #[inline]
    pub fn output_pulse(&self) -> u16 {
        self.mapper.output_pulse(self.shared.current())
    }

    /// Current angle, excluding trim.
    #[inline]
    pub fn current_angle(&self) -> Degrees {
        self.mapper.angle_for(self.shared.current())
    }

    /// Whether a move is in progress.
    #[inline]
    pub fn is_moving(&self) -> bool {
        self.shared.is_moving()
    }

    /// Current phase.
    #[inline]
    pub fn state(&self) -> MotionState {
        self.shared.state()
    }

    /// Duration of the configured or running move in milliseconds.
    #[inline]
    pub fn move_duration(&self) -> u32 {
        self.duration_ms
    }

    /// Start pulse of the configured or running move.
    #[inline]
    pub fn start_pulse(&self) -> u16 {
        self.start
    }

    /// End pulse of the configured or running move.
    #[inline]
    pub fn end_pulse(&self) -> u16 {
        self.end
    }

    /// Signed pulse distance of the configured or running move.
    #[inline]
    pub fn delta(&self) -> i32 {
        self.delta
    }

    /// Pulse the move settles on: the end, or the start for bouncing moves.
    #[inline]
    pub fn final_pulse(&self) -> u16 {
        if self.easing.style().returns_to_start() {
            self.start
        } else {
            self.end
        }
    }

    /// Duration a move to `target` would take, without configuring it.
    ///
    /// May be zero when the target is the current position.
    ///
    /// # Errors
    ///
    /// Returns `MotionError::ZeroSpeed` for a non-positive speed.
    pub fn planned_duration(&self, target: Degrees, timing: MoveTiming) -> Result<u32> {
        match timing {
            MoveTiming::Millis(ms) => Ok(ms),
            MoveTiming::Speed(speed) => {
                let distance = target.clamped().distance(self.current_angle());
                speed
                    .millis_for(distance)
                    .ok_or_else(|| MotionError::ZeroSpeed.into())
            }
        }
    }

    /// Configure a move from the current pulse to `target` lasting `duration_ms`.
    ///
    /// # Errors
    ///
    /// - `MotionError::AlreadyMoving` while a move runs
    /// - `MotionError::ZeroDuration` for a zero duration
    pub fn configure(&mut self, target: Degrees, duration_ms: u32) -> Result<()> {
        if self.is_moving() {
            return Err(MotionError::AlreadyMoving.into());
        }
        if duration_ms == 0 {
            return Err(MotionError::ZeroDuration.into());
        }

        self.start = self.shared.current();
        self.end = self.mapper.pulse_for(target);
        self.delta = self.end as i32 - self.start as i32;
        self.duration_ms = duration_ms;
        self.pending = true;
        Ok(())
    }

    /// Configure a move to `target` at `speed`.
    ///
    /// # Errors
    ///
    /// Fails without changing state when moving, when the speed is not
    /// positive, or when the target equals the current angle.
    pub fn configure_by_speed(&mut self, target: Degrees, speed: DegreesPerSec) -> Result<()> {
        let duration = self.planned_duration(target, MoveTiming::Speed(speed))?;
        self.configure(target, duration)
    }

    /// Configure a move to `target` lasting `duration_ms`.
    ///
    /// # Errors
    ///
    /// Fails without changing state when moving or when the duration is zero.
    pub fn configure_by_duration(&mut self, target: Degrees, duration_ms: u32) -> Result<()> {
        self.configure(target, duration_ms)
    }

    /// Whether a configured move is waiting for [`Trajectory::start`].
    #[inline]
    pub fn is_pending(&self) -> bool {
        self.pending
    }

    /// Change the duration of the configured move, keeping its end points.
    ///
    /// # Errors
    ///
    /// - `MotionError::AlreadyMoving` while a move runs
    /// - `MotionError::NotConfigured` when no move is waiting
    /// - `MotionError::ZeroDuration` for a zero duration
    pub fn set_duration(&mut self, duration_ms: u32) -> Result<()> {
        if self.is_moving() {
            return Err(MotionError::AlreadyMoving.into());
        }
        if !self.pending {
            return Err(MotionError::NotConfigured.into());
        }
        if duration_ms == 0 {
            return Err(MotionError::ZeroDuration.into());
        }
        self.duration_ms = duration_ms;
        Ok(())
    }

    /// Start the configured move at `now_ms`.
    ///
    /// # Errors
    ///
    /// - `MotionError::AlreadyMoving` while a move runs
    /// - `MotionError::NotConfigured` when no move is waiting
    pub fn start(&mut self, now_ms: u32) -> Result<()> {
        if self.is_moving() {
            return Err(MotionError::AlreadyMoving.into());
        }
        if !self.pending {
            return Err(MotionError::NotConfigured.into());
        }

        self.start_ms = now_ms;
        self.pending = false;
        crate::log_debug!(
            "servo {}: {} -> {} in {} ms",
            self.index,
            self.start,
            self.end,
            self.duration_ms
        );
        self.shared.set_current(self.start);
        self.shared.begin();
        Ok(())
    }

    /// Advance the move to `now_ms`.
    ///
    /// Safe to call from a periodic interrupt: it only writes the current
    /// pulse and the moving flag. Timestamps wrap at `u32::MAX`.
    pub fn tick(&self, now_ms: u32) -> Tick {
        if !self.shared.is_moving() {
            return Tick::Idle;
        }

        let elapsed = now_ms.wrapping_sub(self.start_ms);
        if elapsed >= self.duration_ms {
            let pulse = self.final_pulse();
            self.shared.finish(pulse);
            return Tick::Finished(pulse);
        }

        let p = elapsed as f32 / self.duration_ms as f32;
        let user = self.user_easing.map(|e| e as &dyn Easing);
        let eased = self.easing.progress_with(user, p);
        let pulse = clamp_pulse(roundf(self.start as f32 + self.delta as f32 * eased));
        self.shared.set_current(pulse);
        Tick::Moving(pulse)
    }

    /// Jump to `angle` immediately, cancelling any move.
    ///
    /// Returns the new untrimmed pulse.
    pub fn write_angle(&mut self, angle: Degrees) -> u16 {
        let pulse = self.mapper.pulse_for(angle);
        self.write_pulse(pulse);
        pulse
    }

    /// Jump to `pulse` immediately, cancelling any move.
    pub fn write_pulse(&mut self, pulse: u16) {
        self.pending = false;
        self.shared.finish(pulse);
    }

    /// Stop where the servo currently is.
    pub fn stop(&mut self) {
        self.pending = false;
        self.shared.stop();
    }

    /// Snapshot for diagnostics.
    pub fn report(&self) -> ServoReport {
        ServoReport {
            index: self.index,
            channel: self.channel,
            zero_pulse: self.mapper.zero_pulse(),
            one_eighty_pulse: self.mapper.one_eighty_pulse(),
            reversed: self.mapper.is_reversed(),
            trim: self.mapper.trim(),
            easing: self.easing,
            state: self.state(),
            current_pulse: self.current_pulse(),
            current_angle: self.current_angle(),
            start_pulse: self.start,
            end_pulse: self.end,
            delta: self.delta,
            start_ms: self.start_ms,
            duration_ms: self.duration_ms,
        }
    }
}

impl core::fmt::Debug for Trajectory {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Trajectory")
            .field("index", &self.index)
            .field("channel", &self.channel)
            .field("mapper", &self.mapper)
            .field("shared", &self.shared)
            .field("start", &self.start)
            .field("end", &self.end)
            .field("easing", &self.easing)
            .field("user_easing", &self.user_easing.is_some())
            .field("duration_ms", &self.duration_ms)
            .finish()
    }
}
