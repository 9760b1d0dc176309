//! Easing module for servo-easing.
//!
//! Provides the built-in easing families, the call styles that derive OUT,
//! IN_OUT and BOUNCING curves from them, and the [`Easing`] capability used for
//! user-supplied curves.

pub mod functions;
mod style;

use serde::Deserialize;

use crate::error::ConfigError;

pub use style::CallStyle;

/// A curve mapping completion fraction to progress fraction.
///
/// Implemented for every `Fn(f32) -> f32` and for [`EaseFamily`].
pub trait Easing {
    /// Progress for completion fraction `p` in `[0, 1]`.
    fn ease(&self, p: f32) -> f32;
}

impl<F> Easing for F
where
    F: Fn(f32) -> f32,
{
    #[inline]
    fn ease(&self, p: f32) -> f32 {
        self(p)
    }
}

/// Built-in easing families, plus the slot for a user-registered curve.
///
/// The discriminant is the value of the family bits in a packed easing code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EaseFamily {
    /// Constant velocity.
    #[default]
    Linear = 0x00,
    /// `p²`
    Quadratic = 0x01,
    /// `p³`
    Cubic = 0x02,
    /// `p⁴`
    Quartic = 0x03,
    /// Quarter cosine.
    Sine = 0x08,
    /// Quarter circle.
    Circular = 0x09,
    /// Cubic with undershoot.
    Back = 0x0A,
    /// Damped oscillation.
    Elastic = 0x0B,
    /// Bouncing ball; the base curve is already an OUT shape.
    Bounce = 0x0C,
    /// Curve registered by the application.
    User = 0x0F,
}

impl EaseFamily {
    /// Mask selecting the family bits of a packed easing code.
    pub const MASK: u8 = 0x0F;

    /// Decode the family bits of a packed easing code.
    pub fn from_code(code: u8) -> Option<Self> {
        Some(match code & Self::MASK {
            0x00 => EaseFamily::Linear,
            0x01 => EaseFamily::Quadratic,
            0x02 => EaseFamily::Cubic,
            0x03 => EaseFamily::Quartic,
            0x08 => EaseFamily::Sine,
            0x09 => EaseFamily::Circular,
            0x0A => EaseFamily::Back,
            0x0B => EaseFamily::Elastic,
            0x0C => EaseFamily::Bounce,
            0x0F => EaseFamily::User,
            _ => return None,
        })
    }

    /// Family bits for a packed easing code.
    #[inline]
    pub const fn code(self) -> u8 {
        self as u8
    }
}

impl Easing for EaseFamily {
    /// Base curve of the family. `User` has no built-in curve and behaves as linear.
    fn ease(&self, p: f32) -> f32 {
        match self {
            EaseFamily::Linear | EaseFamily::User => functions::linear(p),
            EaseFamily::Quadratic => functions::quadratic_in(p),
            EaseFamily::Cubic => functions::cubic_in(p),
            EaseFamily::Quartic => functions::quartic_in(p),
            EaseFamily::Sine => functions::sine_in(p),
            EaseFamily::Circular => functions::circular_in(p),
            EaseFamily::Back => functions::back_in(p),
            EaseFamily::Elastic => functions::elastic_in(p),
            EaseFamily::Bounce => functions::bounce_out(p),
        }
    }
}

/// A validated family/style pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EasingType {
    family: EaseFamily,
    style: CallStyle,
}

impl EasingType {
    /// Constant velocity.
    pub const LINEAR: Self = Self::raw(EaseFamily::Linear, CallStyle::Direct);
    /// Quadratic, accelerating.
    pub const QUADRATIC_IN: Self = Self::raw(EaseFamily::Quadratic, CallStyle::Direct);
    /// Quadratic, decelerating.
    pub const QUADRATIC_OUT: Self = Self::raw(EaseFamily::Quadratic, CallStyle::Out);
    /// Quadratic, accelerate then decelerate.
    pub const QUADRATIC_IN_OUT: Self = Self::raw(EaseFamily::Quadratic, CallStyle::InOut);
    /// Quadratic, out and back.
    pub const QUADRATIC_BOUNCING: Self = Self::raw(EaseFamily::Quadratic, CallStyle::Bouncing);
    /// Cubic, accelerating.
    pub const CUBIC_IN: Self = Self::raw(EaseFamily::Cubic, CallStyle::Direct);
    /// Cubic, decelerating.
    pub const CUBIC_OUT: Self = Self::raw(EaseFamily::Cubic, CallStyle::Out);
    /// Cubic, accelerate then decelerate.
    pub const CUBIC_IN_OUT: Self = Self::raw(EaseFamily::Cubic, CallStyle::InOut);
    /// Quartic, accelerate then decelerate.
    pub const QUARTIC_IN_OUT: Self = Self::raw(EaseFamily::Quartic, CallStyle::InOut);
    /// Sine, accelerate then decelerate.
    pub const SINE_IN_OUT: Self = Self::raw(EaseFamily::Sine, CallStyle::InOut);
    /// Circular, accelerate then decelerate.
    pub const CIRCULAR_IN_OUT: Self = Self::raw(EaseFamily::Circular, CallStyle::InOut);
    /// Back, overshooting the target before settling.
    pub const BACK_OUT: Self = Self::raw(EaseFamily::Back, CallStyle::Out);
    /// Elastic, oscillating around the target before settling.
    pub const ELASTIC_OUT: Self = Self::raw(EaseFamily::Elastic, CallStyle::Out);
    /// Ball dropped onto the target.
    pub const BOUNCE_OUT: Self = Self::raw(EaseFamily::Bounce, CallStyle::Direct);
    /// Ball bouncing off the start.
    pub const BOUNCE_IN: Self = Self::raw(EaseFamily::Bounce, CallStyle::Out);

    const fn raw(family: EaseFamily, style: CallStyle) -> Self {
        Self { family, style }
    }

    /// Build an easing type, rejecting pairings that have no meaning.
    ///
    /// Linear only supports `Direct`. Bounce only supports `Direct` (bounce
    /// out) and `Out` (bounce in).
    pub fn new(family: EaseFamily, style: CallStyle) -> Result<Self, ConfigError> {
        let valid = match family {
            EaseFamily::Linear => style == CallStyle::Direct,
            EaseFamily::Bounce => matches!(style, CallStyle::Direct | CallStyle::Out),
            _ => true,
        };
        if valid {
            Ok(Self::raw(family, style))
        } else {
            Err(ConfigError::InvalidEasing(family.code() | style.code()))
        }
    }

    /// Decode a packed easing code (style in the upper three bits, family in the lower four).
    pub fn from_code(code: u8) -> Result<Self, ConfigError> {
        if code & !(CallStyle::MASK | EaseFamily::MASK) != 0 {
            return Err(ConfigError::InvalidEasing(code));
        }
        let family = EaseFamily::from_code(code).ok_or(ConfigError::InvalidEasing(code))?;
        let style = CallStyle::from_code(code).ok_or(ConfigError::InvalidEasing(code))?;
        Self::new(family, style)
    }

    /// Packed easing code.
    #[inline]
    pub const fn code(self) -> u8 {
        self.style.code() | self.family.code()
    }

    /// Easing family.
    #[inline]
    pub const fn family(self) -> EaseFamily {
        self.family
    }

    /// Call style.
    #[inline]
    pub const fn style(self) -> CallStyle {
        self.style
    }

    /// Progress at completion fraction `p` using the family's built-in curve.
    #[inline]
    pub fn progress(self, p: f32) -> f32 {
        self.style.apply(&self.family, p)
    }

    /// Progress at completion fraction `p`, substituting `user` for the `User` family.
    pub fn progress_with(self, user: Option<&dyn Easing>, p: f32) -> f32 {
        match (self.family, user) {
            (EaseFamily::User, Some(f)) => self.style.apply(f, p),
            _ => self.progress(p),
        }
    }
}

impl Default for EasingType {
    fn default() -> Self {
        Self::LINEAR
    }
}

impl TryFrom<u8> for EasingType {
    type Error = ConfigError;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        Self::from_code(code)
    }
}
