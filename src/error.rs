//! Error types for servo-easing library.
//!
//! Provides unified error handling across configuration, servo registration,
//! move planning and pulse output.

use core::fmt;

/// Result type alias using the library's Error type.
pub type Result<T> = core::result::Result<T, Error>;

/// Unified error type for all servo-easing operations.
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    /// Configuration parsing or validation error
    Config(ConfigError),
    /// Servo registration or lookup error
    Servo(ServoError),
    /// Move planning error
    Motion(MotionError),
    /// Pulse output backend error
    Output(OutputError),
}

/// Configuration-related errors.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// Failed to parse TOML configuration
    ParseError(heapless::String<128>),
    /// Pulse endpoints are unusable (equal, or zero)
    InvalidPulseRange {
        /// Pulse for 0 degrees
        zero: u16,
        /// Pulse for 180 degrees
        one_eighty: u16,
    },
    /// Output channel out of range
    InvalidChannel(u8),
    /// Two servos configured on the same channel
    DuplicateChannel(u8),
    /// Packed easing code or family/style pairing is not supported
    InvalidEasing(u8),
    /// Servo name not found in configuration
    ServoNotFound(heapless::String<32>),
    /// Speed must be > 0
    InvalidSpeed(f32),
    /// File I/O error (std only)
    #[cfg(feature = "std")]
    IoError(heapless::String<128>),
}

/// Servo registry errors.
#[derive(Debug, Clone, PartialEq)]
pub enum ServoError {
    /// No free slot left in the group
    RegistryFull,
    /// Channel number exceeds the supported range
    InvalidChannel(u8),
    /// Channel already has a servo attached
    ChannelInUse(u8),
    /// Handle does not refer to a servo of this group
    UnknownServo(u8),
    /// User easing selected but none registered
    NoUserEasing,
}

/// Move planning errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MotionError {
    /// Servo is still executing a move
    AlreadyMoving,
    /// Requested speed is zero or negative
    ZeroSpeed,
    /// Supplied or computed move duration is zero
    ZeroDuration,
    /// Start requested without a configured move
    NotConfigured,
}

/// Pulse output errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputError {
    /// Register write over the bus failed
    Bus,
    /// PWM duty cycle update failed
    Pwm,
    /// No output bound to this channel
    UnboundChannel(u8),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Config(e) => write!(f, "Configuration error: {}", e),
            Error::Servo(e) => write!(f, "Servo error: {}", e),
            Error::Motion(e) => write!(f, "Motion error: {}", e),
            Error::Output(e) => write!(f, "Output error: {}", e),
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::ParseError(msg) => write!(f, "Parse error: {}", msg),
            ConfigError::InvalidPulseRange { zero, one_eighty } => {
                write!(f, "Invalid pulse range: 0 deg = {}, 180 deg = {}", zero, one_eighty)
            }
            ConfigError::InvalidChannel(c) => write!(f, "Invalid channel: {}. Must be 0-15", c),
            ConfigError::DuplicateChannel(c) => write!(f, "Channel {} used by more than one servo", c),
            ConfigError::InvalidEasing(code) => write!(f, "Invalid easing type: {:#04x}", code),
            ConfigError::ServoNotFound(name) => write!(f, "Servo '{}' not found", name),
            ConfigError::InvalidSpeed(v) => write!(f, "Invalid speed: {}. Must be > 0", v),
            #[cfg(feature = "std")]
            ConfigError::IoError(msg) => write!(f, "I/O error: {}", msg),
        }
    }
}

impl fmt::Display for ServoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServoError::RegistryFull => write!(f, "All servo slots are in use"),
            ServoError::InvalidChannel(c) => write!(f, "Invalid channel {}", c),
            ServoError::ChannelInUse(c) => write!(f, "Channel {} already attached", c),
            ServoError::UnknownServo(i) => write!(f, "No servo in slot {}", i),
            ServoError::NoUserEasing => write!(f, "No user easing function registered"),
        }
    }
}

impl fmt::Display for MotionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MotionError::AlreadyMoving => write!(f, "Servo is already moving"),
            MotionError::ZeroSpeed => write!(f, "Speed must be greater than zero"),
            MotionError::ZeroDuration => write!(f, "Move duration is zero"),
            MotionError::NotConfigured => write!(f, "No move configured"),
        }
    }
}

impl fmt::Display for OutputError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputError::Bus => write!(f, "Bus write failed"),
            OutputError::Pwm => write!(f, "PWM duty cycle update failed"),
            OutputError::UnboundChannel(c) => write!(f, "No output bound to channel {}", c),
        }
    }
}

// Conversion impls
impl From<ConfigError> for Error {
    fn from(e: ConfigError) -> Self {
        Error::Config(e)
    }
}

impl From<ServoError> for Error {
    fn from(e: ServoError) -> Self {
        Error::Servo(e)
    }
}

impl From<MotionError> for Error {
    fn from(e: MotionError) -> Self {
        Error::Motion(e)
    }
}

impl From<OutputError> for Error {
    fn from(e: OutputError) -> Self {
        Error::Output(e)
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}

#[cfg(feature = "std")]
impl std::error::Error for ConfigError {}

#[cfg(feature = "std")]
impl std::error::Error for ServoError {}

#[cfg(feature = "std")]
impl std::error::Error for MotionError {}

#[cfg(feature = "std")]
impl std::error::Error for OutputError {}
