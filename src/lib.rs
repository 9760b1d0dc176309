//! # servo-easing
//!
//! Eased and synchronized RC servo motion with embedded-hal 1.0 support.
//!
//! ## Features
//!
//! - **Easing curves**: quadratic, cubic, quartic, sine, circular, back, elastic,
//!   bounce and user-supplied curves, each usable as IN, OUT, IN_OUT or BOUNCING
//! - **Synchronized moves**: several servos share one duration and arrive together
//! - **Interrupt friendly**: `tick_all` only needs `&self` and never blocks
//! - **embedded-hal 1.0**: `SetDutyCycle` pins or a PCA9685 over `I2c`
//! - **Configuration-driven**: Define servo calibration and easing in TOML files
//! - **no_std compatible**: Core library works without standard library
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use servo_easing::{Degrees, DegreesPerSec, MoveRequest, ServoGroup};
//!
//! // Load configuration from TOML
//! let config = servo_easing::load_config("servos.toml")?;
//!
//! let mut group: ServoGroup = ServoGroup::new();
//! let pan = group.attach_named(&config, "pan")?;
//! let tilt = group.attach_named(&config, "tilt")?;
//!
//! // Both servos arrive at the same time
//! group.synchronize_group(
//!     &[
//!         MoveRequest::at_speed(pan, Degrees(30.0), DegreesPerSec(60.0)),
//!         MoveRequest::at_speed(tilt, Degrees(120.0), DegreesPerSec(60.0)),
//!     ],
//!     now_ms,
//! )?;
//!
//! // Every 20 ms
//! group.tick_all(now_ms, &mut output)?;
//! ```
//!
//! ## Feature Flags
//!
//! - `std` (default): Enables file I/O and TOML parsing
//! - `alloc`: Enables heap allocation for no_std with allocator
//! - `defmt`: Enables defmt logging for embedded targets

#![cfg_attr(not(feature = "std"), no_std)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]
// Allow large error types - necessary for no_std with heapless strings
#![allow(clippy::result_large_err)]

#[macro_use]
mod log;

// Core modules
pub mod config;
pub mod easing;
pub mod error;
pub mod group;
pub mod output;
pub mod servo;

// Re-exports for ergonomic API
pub use config::{validate_config, ServoConfig, SystemConfig};
pub use easing::{CallStyle, EaseFamily, Easing, EasingType};
pub use error::{Error, Result};
pub use group::{MoveRequest, ServoGroup, ServoHandle};
pub use output::{Pca9685, PulseOutput, PwmOutput};
pub use servo::{MotionState, MoveTiming, PulseMapper, ServoReport, Tick, Trajectory};

// Configuration loading (std only)
#[cfg(feature = "std")]
pub use config::load_config;

// Unit types
pub use config::units::{Degrees, DegreesPerSec, UnitExt};
