//! State shared between the control flow and the periodic update.
//!
//! Only the current pulse and the moving flag are written by `tick`, so only
//! these two live in atomics. Load/store only, which every target supports.

use core::sync::atomic::{AtomicBool, AtomicU16, Ordering};

/// Phase of a trajectory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MotionState {
    /// Holding the current pulse.
    Idle,
    /// Executing an eased move.
    Moving,
}

impl MotionState {
    /// State name for display/debugging.
    pub fn name(self) -> &'static str {
        match self {
            MotionState::Idle => "Idle",
            MotionState::Moving => "Moving",
        }
    }
}

/// Current pulse and moving flag of one servo.
#[derive(Debug)]
pub(crate) struct SharedState {
    current: AtomicU16,
    moving: AtomicBool,
}

impl SharedState {
    pub(crate) const fn new(pulse: u16) -> Self {
        Self {
            current: AtomicU16::new(pulse),
            moving: AtomicBool::new(false),
        }
    }

    #[inline]
    pub(crate) fn current(&self) -> u16 {
        self.current.load(Ordering::Acquire)
    }

    #[inline]
    pub(crate) fn is_moving(&self) -> bool {
        self.moving.load(Ordering::Acquire)
    }

    #[inline]
    pub(crate) fn state(&self) -> MotionState {
        if self.is_moving() {
            MotionState::Moving
        } else {
            MotionState::Idle
        }
    }

    #[inline]
    pub(crate) fn set_current(&self, pulse: u16) {
        self.current.store(pulse, Ordering::Release);
    }

    /// Publish the final pulse, then clear the flag.
    #[inline]
    pub(crate) fn finish(&self, pulse: u16) {
        self.current.store(pulse, Ordering::Release);
        self.moving.store(false, Ordering::Release);
    }

    #[inline]
    pub(crate) fn begin(&self) {
        self.moving.store(true, Ordering::Release);
    }

    #[inline]
    pub(crate) fn stop(&self) {
        self.moving.store(false, Ordering::Release);
    }
}
