//! Diagnostic snapshot of one servo.

use core::fmt;

use crate::config::units::Degrees;
use crate::easing::EasingType;

use super::state::MotionState;

/// Calibration and move state of a servo at one instant.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ServoReport {
    /// Slot in the group.
    pub index: u8,
    /// Output channel.
    pub channel: u8,
    /// Pulse for 0 degrees.
    pub zero_pulse: u16,
    /// Pulse for 180 degrees.
    pub one_eighty_pulse: u16,
    /// Angle range mirrored.
    pub reversed: bool,
    /// Output-only pulse offset.
    pub trim: i16,
    /// Selected easing.
    pub easing: EasingType,
    /// Idle or moving.
    pub state: MotionState,
    /// Current untrimmed pulse.
    pub current_pulse: u16,
    /// Current angle.
    pub current_angle: Degrees,
    /// Start pulse of the last configured move.
    pub start_pulse: u16,
    /// End pulse of the last configured move.
    pub end_pulse: u16,
    /// `end_pulse - start_pulse`.
    pub delta: i32,
    /// Start timestamp of the last started move.
    pub start_ms: u32,
    /// Duration of the last configured move.
    pub duration_ms: u32,
}

impl fmt::Display for ServoReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "servo {} ch {}: 0deg={} 180deg={}",
            self.index, self.channel, self.zero_pulse, self.one_eighty_pulse
        )?;
        if self.reversed {
            f.write_str(" reversed")?;
        }
        if self.trim != 0 {
            write!(f, " trim={}", self.trim)?;
        }
        write!(
            f,
            " easing={:#04x} | {} at {} ({:.1} deg)",
            self.easing.code(),
            self.state.name(),
            self.current_pulse,
            self.current_angle.0
        )?;
        if self.state == MotionState::Moving {
            write!(
                f,
                " {} -> {} (delta {}) from {} ms for {} ms",
                self.start_pulse, self.end_pulse, self.delta, self.start_ms, self.duration_ms
            )?;
        }
        Ok(())
    }
}

#[cfg(all(test, feature = "std"))]
mod tests {
    use super::super::{PulseMapper, Trajectory};
    use crate::config::units::Degrees;
    use crate::easing::EasingType;

    #[test]
    fn test_report_display() {
        let mut t = Trajectory::new(2, 5, PulseMapper::new(544, 2400));
        t.set_trim(-8);
        let idle = std::format!("{}", t.report());
        assert!(idle.starts_with("servo 2 ch 5: 0deg=544 180deg=2400 trim=-8"));
        assert!(idle.contains("Idle at 1472 (90.0 deg)"));

        t.set_easing(EasingType::CUBIC_IN_OUT).unwrap();
        t.configure_by_duration(Degrees(180.0), 800).unwrap();
        t.start(100).unwrap();
        let moving = std::format!("{}", t.report());
        assert!(moving.contains("easing=0x42"));
        assert!(moving.contains("1472 -> 2400 (delta 928) from 100 ms for 800 ms"));
    }
}
