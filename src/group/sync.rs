//! Synchronized moves.
//!
//! Servos in a synchronized move share one duration, the longest any member
//! needs at its own speed, so they all start and finish on the same tick.

use super::registry::{ServoGroup, ServoHandle};
use crate::config::units::{Degrees, DegreesPerSec};
use crate::error::{Error, MotionError, Result};
use crate::servo::MoveTiming;

/// One member of a synchronized move.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MoveRequest {
    /// Servo to move.
    pub servo: ServoHandle,
    /// Target angle.
    pub target: Degrees,
    /// Speed or duration this member would need on its own.
    pub timing: MoveTiming,
}

impl MoveRequest {
    /// Move `servo` to `target` at `speed`.
    pub fn at_speed(servo: ServoHandle, target: Degrees, speed: DegreesPerSec) -> Self {
        Self {
            servo,
            target,
            timing: MoveTiming::Speed(speed),
        }
    }

    /// Move `servo` to `target` in `duration_ms`.
    pub fn in_millis(servo: ServoHandle, target: Degrees, duration_ms: u32) -> Self {
        Self {
            servo,
            target,
            timing: MoveTiming::Millis(duration_ms),
        }
    }
}

impl<const N: usize> ServoGroup<N> {
    /// Start all `requests` together with a common duration.
    ///
    /// Members already at their target are allowed and hold still for the
    /// duration. Returns the common duration.
    ///
    /// # Errors
    ///
    /// Fails before touching any servo when a handle is unknown, a member is
    /// moving, a speed is not positive, or the common duration is zero.
    pub fn synchronize_group(&mut self, requests: &[MoveRequest], now_ms: u32) -> Result<u32> {
        let mut common = 0u32;
        for request in requests {
            let trajectory = &self.slot(request.servo)?.trajectory;
            if trajectory.is_moving() {
                return Err(MotionError::AlreadyMoving.into());
            }
            let duration = trajectory.planned_duration(request.target, request.timing)?;
            common = common.max(duration);
        }
        if common == 0 {
            return Err(MotionError::ZeroDuration.into());
        }

        for request in requests {
            self.slot_mut(request.servo)?
                .trajectory
                .configure_by_duration(request.target, common)?;
        }
        for request in requests {
            let trajectory = &mut self.slot_mut(request.servo)?.trajectory;
            // a servo listed twice is started once, with its last target
            if trajectory.is_pending() {
                trajectory.start(now_ms)?;
            }
        }

        crate::log_info!("synchronized {} servos over {} ms", requests.len(), common);
        Ok(common)
    }

    /// Remember a target for the next group move.
    pub fn set_next_position(&mut self, handle: ServoHandle, angle: Degrees) -> Result<()> {
        self.slot_mut(handle)?.next_position = angle.clamped();
        Ok(())
    }

    /// Target remembered for the next group move.
    pub fn next_position(&self, handle: ServoHandle) -> Result<Degrees> {
        Ok(self.slot(handle)?.next_position)
    }

    /// Remember targets for the first `angles.len()` servos, in attach order.
    pub fn set_next_positions(&mut self, angles: &[Degrees]) {
        for (slot, angle) in self.slots.iter_mut().zip(angles) {
            slot.next_position = angle.clamped();
        }
    }

    /// Configure every servo to move to its next position without starting.
    ///
    /// Uses `speed`, or each servo's default speed when `None`. Servos
    /// already at their next position are left unconfigured. Returns the
    /// number of configured servos.
    ///
    /// # Errors
    ///
    /// Fails before configuring anything when a servo is moving or a speed
    /// is not positive.
    pub fn set_ease_to_for_all(&mut self, speed: Option<DegreesPerSec>) -> Result<usize> {
        let mut durations = [0u32; N];
        for (slot, duration) in self.slots.iter().zip(durations.iter_mut()) {
            if slot.trajectory.is_moving() {
                return Err(MotionError::AlreadyMoving.into());
            }
            let timing = MoveTiming::Speed(speed.unwrap_or(slot.speed));
            *duration = slot.trajectory.planned_duration(slot.next_position, timing)?;
        }

        let mut configured = 0;
        for (slot, &duration) in self.slots.iter_mut().zip(durations.iter()) {
            if duration > 0 {
                slot.trajectory
                    .configure_by_duration(slot.next_position, duration)?;
                configured += 1;
            } else {
                slot.trajectory.stop();
            }
        }
        Ok(configured)
    }

    /// Stretch every configured move to the longest of them and start them
    /// together. Returns the common duration.
    ///
    /// # Errors
    ///
    /// - `MotionError::AlreadyMoving` when any servo is moving
    /// - `MotionError::NotConfigured` when no move is configured
    pub fn synchronize_and_start(&mut self, now_ms: u32) -> Result<u32> {
        if self.slots.iter().any(|s| s.trajectory.is_moving()) {
            return Err(MotionError::AlreadyMoving.into());
        }
        let common = self
            .slots
            .iter()
            .filter(|s| s.trajectory.is_pending())
            .map(|s| s.trajectory.move_duration())
            .max()
            .ok_or(Error::Motion(MotionError::NotConfigured))?;

        for slot in self.slots.iter_mut().filter(|s| s.trajectory.is_pending()) {
            slot.trajectory.set_duration(common)?;
            slot.trajectory.start(now_ms)?;
        }
        crate::log_info!("started configured servos over {} ms", common);
        Ok(common)
    }
}
