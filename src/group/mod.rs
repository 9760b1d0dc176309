//! Servo groups.
//!
//! A [`ServoGroup`] owns the trajectories of up to `N` servos. It attaches
//! them, starts single and synchronized moves, and ticks them all against a
//! [`PulseOutput`](crate::output::PulseOutput).

mod registry;
mod scheduler;
mod sync;

pub use registry::{ServoGroup, ServoHandle, DEFAULT_CAPACITY, DEFAULT_SPEED};
pub use sync::MoveRequest;
