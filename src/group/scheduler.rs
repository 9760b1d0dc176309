//! Periodic update of all servos and the blocking wait loops built on it.

use embedded_hal::delay::DelayNs;

use super::registry::{ServoGroup, ServoHandle, Slot};
use crate::config::units::{Degrees, DegreesPerSec};
use crate::easing::{EaseFamily, EasingType};
use crate::error::{MotionError, Result, ServoError};
use crate::output::{PulseOutput, REFRESH_INTERVAL_MS};
use crate::servo::{MoveTiming, Tick};

/// Tick one servo and write its pulse if the output does not hold it yet.
///
/// A failed write is retried on the next tick, even after the move ended.
/// Returns whether the servo is still moving.
fn tick_one<O: PulseOutput>(slot: &Slot, now_ms: u32, output: &mut O) -> Result<bool> {
    let trajectory = &slot.trajectory;
    let tick = trajectory.tick(now_ms);
    if let Tick::Finished(_) = tick {
        crate::log_debug!("servo {} reached its target", trajectory.index());
    }
    if slot.is_stale() {
        output.write_pulse(trajectory.channel(), trajectory.output_pulse())?;
        slot.mark_written();
    }
    Ok(matches!(tick, Tick::Moving(_)))
}

impl<const N: usize> ServoGroup<N> {
    /// Tick every servo once, in attach order, writing changed pulses.
    ///
    /// Never blocks and only needs `&self`, so it can run from a periodic
    /// interrupt. Returns whether any servo is still moving.
    ///
    /// # Errors
    ///
    /// Returns the first output error, after every servo has been ticked.
    /// Pulses that failed to write are written again on the next call.
    pub fn tick_all<O: PulseOutput>(&self, now_ms: u32, output: &mut O) -> Result<bool> {
        let mut any_moving = false;
        let mut first_error = None;
        for slot in self.slots.iter() {
            match tick_one(slot, now_ms, output) {
                Ok(moving) => any_moving |= moving,
                Err(e) => {
                    crate::log_warn!("servo {}: output write failed", slot.trajectory.index());
                    any_moving |= slot.trajectory.is_moving();
                    first_error.get_or_insert(e);
                }
            }
        }
        match first_error {
            Some(e) => Err(e),
            None => Ok(any_moving),
        }
    }

    /// Polled form of [`ServoGroup::tick_all`].
    #[inline]
    pub fn update_all<O: PulseOutput>(&self, now_ms: u32, output: &mut O) -> Result<bool> {
        self.tick_all(now_ms, output)
    }

    /// Tick a single servo. Returns `true` once it has stopped.
    pub fn update<O: PulseOutput>(
        &self,
        handle: ServoHandle,
        now_ms: u32,
        output: &mut O,
    ) -> Result<bool> {
        let moving = tick_one(self.slot(handle)?, now_ms, output)?;
        Ok(!moving)
    }

    /// Whether any servo is moving.
    pub fn is_any_moving(&self) -> bool {
        self.slots.iter().any(|s| s.trajectory.is_moving())
    }

    /// Stop every servo where it is.
    pub fn stop_all(&mut self) {
        for slot in self.slots.iter_mut() {
            slot.trajectory.stop();
        }
        crate::log_info!("all servos stopped");
    }

    /// Select the same easing for every servo.
    ///
    /// # Errors
    ///
    /// `ServoError::NoUserEasing` when the user family is selected and a
    /// servo has no curve registered. No servo is changed in that case.
    pub fn set_easing_for_all(&mut self, easing: EasingType) -> Result<()> {
        if easing.family() == EaseFamily::User
            && self.slots.iter().any(|s| !s.trajectory.has_user_easing())
        {
            return Err(ServoError::NoUserEasing.into());
        }
        for slot in self.slots.iter_mut() {
            slot.trajectory.set_easing(easing)?;
        }
        Ok(())
    }

    /// Tick every `REFRESH_INTERVAL_MS` until no servo moves.
    ///
    /// `now_ms` is the current time; it advances by the refresh interval per
    /// iteration. Returns the time at which the last servo stopped.
    pub fn update_and_wait_for_all_to_stop<O, D>(
        &self,
        mut now_ms: u32,
        output: &mut O,
        delay: &mut D,
    ) -> Result<u32>
    where
        O: PulseOutput,
        D: DelayNs,
    {
        while self.tick_all(now_ms, output)? {
            delay.delay_ms(REFRESH_INTERVAL_MS);
            now_ms = now_ms.wrapping_add(REFRESH_INTERVAL_MS);
        }
        Ok(now_ms)
    }

    /// [`ServoGroup::synchronize_and_start`], then wait for all servos to stop.
    pub fn synchronize_all_start_and_wait<O, D>(
        &mut self,
        now_ms: u32,
        output: &mut O,
        delay: &mut D,
    ) -> Result<u32>
    where
        O: PulseOutput,
        D: DelayNs,
    {
        self.synchronize_and_start(now_ms)?;
        self.update_and_wait_for_all_to_stop(now_ms, output, delay)
    }

    /// Move every servo to its next position together and wait.
    ///
    /// Uses `speed`, or each servo's default speed when `None`. Returns
    /// `now_ms` unchanged when every servo is already in place.
    pub fn synchronize_and_ease_to_array_positions<O, D>(
        &mut self,
        speed: Option<DegreesPerSec>,
        now_ms: u32,
        output: &mut O,
        delay: &mut D,
    ) -> Result<u32>
    where
        O: PulseOutput,
        D: DelayNs,
    {
        if self.set_ease_to_for_all(speed)? == 0 {
            return Ok(now_ms);
        }
        self.synchronize_all_start_and_wait(now_ms, output, delay)
    }

    /// Move one servo at `speed` and wait for it to arrive.
    ///
    /// Other servos keep being ticked while waiting. Returns the time of
    /// arrival, or `now_ms` when the servo is idle and already at `target`.
    ///
    /// # Errors
    ///
    /// `MotionError::AlreadyMoving` while the servo is moving, even when
    /// `target` is its current angle.
    pub fn ease_to<O, D>(
        &mut self,
        handle: ServoHandle,
        target: Degrees,
        speed: DegreesPerSec,
        now_ms: u32,
        output: &mut O,
        delay: &mut D,
    ) -> Result<u32>
    where
        O: PulseOutput,
        D: DelayNs,
    {
        if self.is_moving(handle)? {
            return Err(MotionError::AlreadyMoving.into());
        }
        if self.planned_duration(handle, target, MoveTiming::Speed(speed))? == 0 {
            return Ok(now_ms);
        }
        self.start_ease_to(handle, target, speed, now_ms)?;
        self.wait_for(handle, now_ms, output, delay)
    }

    /// Move one servo over `duration_ms` and wait for it to arrive.
    pub fn ease_to_duration<O, D>(
        &mut self,
        handle: ServoHandle,
        target: Degrees,
        duration_ms: u32,
        now_ms: u32,
        output: &mut O,
        delay: &mut D,
    ) -> Result<u32>
    where
        O: PulseOutput,
        D: DelayNs,
    {
        self.start_ease_to_duration(handle, target, duration_ms, now_ms)?;
        self.wait_for(handle, now_ms, output, delay)
    }

    fn wait_for<O, D>(
        &self,
        handle: ServoHandle,
        mut now_ms: u32,
        output: &mut O,
        delay: &mut D,
    ) -> Result<u32>
    where
        O: PulseOutput,
        D: DelayNs,
    {
        let trajectory = &self.slot(handle)?.trajectory;
        loop {
            self.tick_all(now_ms, output)?;
            if !trajectory.is_moving() {
                return Ok(now_ms);
            }
            delay.delay_ms(REFRESH_INTERVAL_MS);
            now_ms = now_ms.wrapping_add(REFRESH_INTERVAL_MS);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{Error, OutputError};
    use crate::servo::UserEasing;
    use embedded_hal_mock::eh1::delay::NoopDelay;
    use heapless::Vec;

    #[derive(Default)]
    struct Recorder {
        writes: Vec<(u8, u16), 256>,
    }

    impl PulseOutput for Recorder {
        fn write_pulse(&mut self, channel: u8, pulse: u16) -> Result<()> {
            self.writes.push((channel, pulse)).ok();
            Ok(())
        }
    }

    struct Broken;

    /// Fails the `n`th write (0-based) on one channel, then records like
    /// [`Recorder`].
    struct FailsOnce {
        channel: u8,
        remaining: usize,
        failed: bool,
        writes: Vec<(u8, u16), 64>,
    }

    impl FailsOnce {
        fn new(channel: u8, n: usize) -> Self {
            Self {
                channel,
                remaining: n,
                failed: false,
                writes: Vec::new(),
            }
        }
    }

    impl PulseOutput for FailsOnce {
        fn write_pulse(&mut self, channel: u8, pulse: u16) -> Result<()> {
            if channel == self.channel && !self.failed {
                if self.remaining == 0 {
                    self.failed = true;
                    return Err(OutputError::Bus.into());
                }
                self.remaining -= 1;
            }
            self.writes.push((channel, pulse)).ok();
            Ok(())
        }
    }

    impl PulseOutput for Broken {
        fn write_pulse(&mut self, _channel: u8, _pulse: u16) -> Result<()> {
            Err(OutputError::Bus.into())
        }
    }

    #[test]
    fn test_tick_all_writes_changes_only() {
        let mut group: ServoGroup<4> = ServoGroup::new();
        let a = group.attach(0).unwrap();
        let b = group.attach(1).unwrap();
        group.set_trim(a, 10).unwrap();
        group.start_ease_to_duration(a, Degrees(180.0), 1000, 0).unwrap();

        let mut out = Recorder::default();
        assert!(group.tick_all(0, &mut out).unwrap());
        assert!(out.writes.is_empty());
        assert!(group.tick_all(500, &mut out).unwrap());
        assert!(!group.tick_all(1000, &mut out).unwrap());
        assert!(!group.tick_all(1020, &mut out).unwrap());

        assert_eq!(out.writes.as_slice(), &[(0, 1946), (0, 2410)]);
        assert!(!group.is_moving(b).unwrap());
    }

    #[test]
    fn test_update_reports_finished() {
        let mut group: ServoGroup<2> = ServoGroup::new();
        let a = group.attach(3).unwrap();
        group.start_ease_to_duration(a, Degrees(0.0), 100, 50).unwrap();
        let mut out = Recorder::default();
        assert!(!group.update(a, 100, &mut out).unwrap());
        assert!(group.update(a, 150, &mut out).unwrap());
        assert!(group.update(a, 170, &mut out).unwrap());
        assert_eq!(out.writes.last(), Some(&(3, 544)));
    }

    #[test]
    fn test_wait_for_all_to_stop() {
        let mut group: ServoGroup<2> = ServoGroup::new();
        let a = group.attach(0).unwrap();
        let b = group.attach(1).unwrap();
        group.start_ease_to_duration(a, Degrees(0.0), 100, 1000).unwrap();
        group.start_ease_to_duration(b, Degrees(180.0), 250, 1000).unwrap();

        let mut out = Recorder::default();
        let done = group
            .update_and_wait_for_all_to_stop(1000, &mut out, &mut NoopDelay::new())
            .unwrap();
        assert_eq!(done, 1260);
        assert!(!group.is_any_moving());
        assert_eq!(group.current_angle(a).unwrap(), Degrees(0.0));
        assert_eq!(group.current_angle(b).unwrap(), Degrees(180.0));
    }

    #[test]
    fn test_blocking_ease_to() {
        let mut group: ServoGroup<2> = ServoGroup::new();
        let a = group.attach(0).unwrap();
        let mut out = Recorder::default();
        let mut delay = NoopDelay::new();

        let done = group
            .ease_to(a, Degrees(135.0), DegreesPerSec(90.0), 0, &mut out, &mut delay)
            .unwrap();
        assert_eq!(done, 500);
        assert_eq!(group.current_angle(a).unwrap(), Degrees(135.0));

        // already there
        let again = group
            .ease_to(a, Degrees(135.0), DegreesPerSec(90.0), 600, &mut out, &mut delay)
            .unwrap();
        assert_eq!(again, 600);

        let done = group
            .ease_to_duration(a, Degrees(45.0), 90, 700, &mut out, &mut delay)
            .unwrap();
        assert_eq!(done, 800);
    }

    #[test]
    fn test_synchronized_array_positions() {
        let mut group: ServoGroup<3> = ServoGroup::new();
        let a = group.attach(0).unwrap();
        let b = group.attach(1).unwrap();
        group.set_speed(b, DegreesPerSec(15.0)).unwrap();
        group.set_next_positions(&[Degrees(60.0), Degrees(75.0)]);

        let mut out = Recorder::default();
        let done = group
            .synchronize_and_ease_to_array_positions(None, 0, &mut out, &mut NoopDelay::new())
            .unwrap();
        assert_eq!(done, 1000);
        assert_eq!(group.move_duration(a).unwrap(), 1000);
        assert!((group.current_angle(a).unwrap().0 - 60.0).abs() < 0.1);
        assert!((group.current_angle(b).unwrap().0 - 75.0).abs() < 0.1);
    }

    #[test]
    fn test_stop_all() {
        let mut group: ServoGroup<2> = ServoGroup::new();
        let a = group.attach(0).unwrap();
        group.start_ease_to_duration(a, Degrees(0.0), 1000, 0).unwrap();
        let mut out = Recorder::default();
        group.tick_all(500, &mut out).unwrap();
        assert!(group.is_any_moving());

        group.stop_all();
        assert!(!group.is_any_moving());
        assert_eq!(group.trajectory(a).unwrap().current_pulse(), 1008);
    }

    #[test]
    fn test_set_easing_for_all_user_requires_curve() {
        static SQUARE: fn(f32) -> f32 = |p| p * p;
        let curve: UserEasing = &SQUARE;

        let mut group: ServoGroup<2> = ServoGroup::new();
        let a = group.attach(0).unwrap();
        let b = group.attach(1).unwrap();
        group.register_user_easing(a, curve).unwrap();

        let user = EasingType::new(EaseFamily::User, crate::easing::CallStyle::Out).unwrap();
        assert_eq!(
            group.set_easing_for_all(user),
            Err(Error::Servo(ServoError::NoUserEasing))
        );
        assert_eq!(group.trajectory(a).unwrap().easing(), EasingType::LINEAR);

        group.register_user_easing(b, curve).unwrap();
        group.set_easing_for_all(user).unwrap();
        assert_eq!(group.trajectory(b).unwrap().easing(), user);
    }

    #[test]
    fn test_failed_final_write_is_retried() {
        let mut group: ServoGroup<1> = ServoGroup::new();
        let a = group.attach(0).unwrap();
        group.write_angle(a, Degrees(0.0), &mut Recorder::default()).unwrap();
        group.start_ease_to_duration(a, Degrees(180.0), 1000, 0).unwrap();

        // second write on channel 0 is the finishing one
        let mut out = FailsOnce::new(0, 1);
        assert!(group.tick_all(500, &mut out).unwrap());
        assert_eq!(
            group.tick_all(1000, &mut out),
            Err(Error::Output(OutputError::Bus))
        );
        assert!(!group.is_moving(a).unwrap());
        assert_eq!(out.writes.as_slice(), &[(0, 1472)]);

        assert!(!group.tick_all(1020, &mut out).unwrap());
        assert!(!group.tick_all(1040, &mut out).unwrap());
        assert_eq!(out.writes.as_slice(), &[(0, 1472), (0, 2400)]);
    }

    #[test]
    fn test_failed_write_does_not_block_other_servos() {
        let mut group: ServoGroup<2> = ServoGroup::new();
        let a = group.attach(0).unwrap();
        let b = group.attach(1).unwrap();
        group.start_ease_to_duration(a, Degrees(0.0), 100, 0).unwrap();
        group.start_ease_to_duration(b, Degrees(180.0), 100, 0).unwrap();

        let mut out = FailsOnce::new(0, 0);
        assert_eq!(
            group.tick_all(50, &mut out),
            Err(Error::Output(OutputError::Bus))
        );
        assert_eq!(out.writes.as_slice(), &[(1, 1936)]);

        // the missed pulse is superseded by the next one
        assert!(!group.tick_all(100, &mut out).unwrap());
        assert_eq!(out.writes.as_slice(), &[(1, 1936), (0, 544), (1, 2400)]);
    }

    #[test]
    fn test_ease_to_rejects_busy_servo_at_target() {
        let mut group: ServoGroup<1> = ServoGroup::new();
        let a = group.attach(0).unwrap();
        group.start_ease_to_duration(a, Degrees(0.0), 1000, 0).unwrap();
        group.tick_all(500, &mut Recorder::default()).unwrap();
        let here = group.current_angle(a).unwrap();

        assert_eq!(
            group.ease_to(
                a,
                here,
                DegreesPerSec(90.0),
                500,
                &mut Recorder::default(),
                &mut NoopDelay::new()
            ),
            Err(Error::Motion(MotionError::AlreadyMoving))
        );
        assert!(group.is_moving(a).unwrap());
    }

    #[test]
    fn test_output_error_propagates() {
        let mut group: ServoGroup<2> = ServoGroup::new();
        let a = group.attach(0).unwrap();
        group.start_ease_to_duration(a, Degrees(0.0), 100, 0).unwrap();
        assert_eq!(
            group.tick_all(50, &mut Broken),
            Err(Error::Output(OutputError::Bus))
        );
        assert_eq!(
            group.start_ease_to_duration(a, Degrees(10.0), 100, 60),
            Err(Error::Motion(MotionError::AlreadyMoving))
        );
    }
}
