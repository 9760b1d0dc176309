//! Configuration module for servo-easing.
//!
//! Provides types for loading and validating servo calibration and easing
//! settings from TOML files (with `std` feature) or pre-parsed data.

mod servo;
mod system;
pub mod units;
#[cfg(feature = "std")]
mod loader;
mod validation;

pub use servo::{
    PulseScale, ServoConfig, DEFAULT_MICROSECONDS_FOR_0_DEGREE,
    DEFAULT_MICROSECONDS_FOR_180_DEGREE,
};
pub use system::SystemConfig;
pub use validation::{validate_config, validate_servo};

#[cfg(feature = "std")]
pub use loader::{load_config, parse_config};

// Re-export unit types at config level
pub use units::{Degrees, DegreesPerSec};
