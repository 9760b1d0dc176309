//! Servo module for servo-easing.
//!
//! Provides the angle/pulse calibration, the per-servo eased trajectory and
//! its diagnostic report.

mod pulse;
mod report;
mod state;
mod trajectory;

pub use pulse::{angle_to_pulse, pulse_to_angle, PulseMapper};
pub use report::ServoReport;
pub use state::MotionState;
pub use trajectory::{MoveTiming, Tick, Trajectory, UserEasing};
