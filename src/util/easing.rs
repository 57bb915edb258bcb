//! Easing functions for animation interpolation.
//!
//! Provides the easing curves used by entrance steps and ambient loops. Every
//! curve has a string id (`"power3.out"`, `"sine.inOut"`, `"back.out(1.7)"`)
//! so options files can name them.

use std::f32::consts::PI;
use std::fmt;
use std::str::FromStr;

use crate::error::RevealError;

/// Easing function variants for animation curves.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EasingFunction {
    /// Linear interpolation (no easing).
    Linear,
    /// Quadratic ease-in (slow start, fast end).
    QuadraticIn,
    /// Quadratic ease-out (fast start, slow end).
    QuadraticOut,
    /// Square root ease-out (fast start, gradual slow).
    SqrtOut,
    /// Cubic Hermite interpolation with configurable control points.
    /// Formula: c1·3t(1-t)² + c2·3(1-t)t² + t³
    CubicHermite {
        /// First control point.
        c1: f32,
        /// Second control point.
        c2: f32,
    },
    /// `powerN.in`: t^(N+1).
    PowerIn(u8),
    /// `powerN.out`: 1 - (1-t)^(N+1).
    PowerOut(u8),
    /// Sinusoidal ease-in-out, used by breathing and floating loops.
    SineInOut,
    /// Ease-out that overshoots the end value before settling.
    ///
    /// The only curve whose output leaves [0.0, 1.0].
    BackOut {
        /// Overshoot amount; 1.70158 is the conventional default.
        overshoot: f32,
    },
}

impl EasingFunction {
    /// Default easing function: CubicHermite with c1=0.33, c2=1.0 for natural ease-out feel.
    pub const DEFAULT: EasingFunction =
        EasingFunction::CubicHermite { c1: 0.33, c2: 1.0 };

    /// Evaluate the easing function at time t.
    ///
    /// Input t is clamped to [0.0, 1.0].
    /// Returns the eased value, also in [0.0, 1.0] except for `BackOut`.
    #[inline]
    pub fn evaluate(&self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);

        match *self {
            EasingFunction::Linear => t,
            EasingFunction::QuadraticIn => t * t,
            EasingFunction::QuadraticOut => {
                let omt = 1.0 - t;
                1.0 - omt * omt
            }
            EasingFunction::SqrtOut => t.sqrt(),
            EasingFunction::CubicHermite { c1, c2 } => {
                let omt = 1.0 - t;
                c1 * 3.0 * t * omt * omt + c2 * 3.0 * omt * t * t + t * t * t
            }
            EasingFunction::PowerIn(level) => t.powi(i32::from(level) + 1),
            EasingFunction::PowerOut(level) => {
                1.0 - (1.0 - t).powi(i32::from(level) + 1)
            }
            EasingFunction::SineInOut => -((PI * t).cos() - 1.0) / 2.0,
            EasingFunction::BackOut { overshoot } => {
                let u = t - 1.0;
                u * u * ((overshoot + 1.0) * u + overshoot) + 1.0
            }
        }
    }
}

impl Default for EasingFunction {
    #[inline]
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl fmt::Display for EasingFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::Linear => f.write_str("linear"),
            Self::QuadraticIn => f.write_str("quad.in"),
            Self::QuadraticOut => f.write_str("quad.out"),
            Self::SqrtOut => f.write_str("sqrt.out"),
            Self::CubicHermite { c1, c2 } => write!(f, "hermite({c1},{c2})"),
            Self::PowerIn(level) => write!(f, "power{level}.in"),
            Self::PowerOut(level) => write!(f, "power{level}.out"),
            Self::SineInOut => f.write_str("sine.inOut"),
            Self::BackOut { overshoot } => write!(f, "back.out({overshoot})"),
        }
    }
}

/// Split `name(a,b)` into `("name", ["a", "b"])`. Ids without parentheses
/// yield no arguments.
fn split_call(id: &str) -> Option<(&str, Vec<&str>)> {
    match id.split_once('(') {
        None => Some((id, Vec::new())),
        Some((name, rest)) => {
            let args = rest.strip_suffix(')')?;
            Some((name, args.split(',').map(str::trim).collect()))
        }
    }
}

fn parse_arg(arg: Option<&&str>, id: &str) -> Result<f32, RevealError> {
    arg.and_then(|a| a.parse::<f32>().ok())
        .filter(|v| v.is_finite())
        .ok_or_else(|| RevealError::UnknownEase(id.to_owned()))
}

impl FromStr for EasingFunction {
    type Err = RevealError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let id = s.trim();
        let unknown = || RevealError::UnknownEase(id.to_owned());
        let (name, args) = split_call(id).ok_or_else(unknown)?;

        let ease = match name {
            "linear" | "none" => EasingFunction::Linear,
            "quad.in" => EasingFunction::QuadraticIn,
            "quad.out" => EasingFunction::QuadraticOut,
            "sqrt.out" => EasingFunction::SqrtOut,
            "sine.inOut" => EasingFunction::SineInOut,
            "back.out" => EasingFunction::BackOut {
                overshoot: if args.is_empty() {
                    1.701_58
                } else {
                    parse_arg(args.first(), id)?
                },
            },
            "hermite" => {
                if args.len() != 2 {
                    return Err(unknown());
                }
                EasingFunction::CubicHermite {
                    c1: parse_arg(args.first(), id)?,
                    c2: parse_arg(args.get(1), id)?,
                }
            }
            _ => {
                let (level, dir) = name
                    .strip_prefix("power")
                    .and_then(|rest| rest.split_once('.'))
                    .ok_or_else(unknown)?;
                let level: u8 = level
                    .parse()
                    .ok()
                    .filter(|l| (1..=4).contains(l))
                    .ok_or_else(unknown)?;
                match dir {
                    "in" => EasingFunction::PowerIn(level),
                    "out" => EasingFunction::PowerOut(level),
                    _ => return Err(unknown()),
                }
            }
        };

        if !args.is_empty()
            && !matches!(ease, EasingFunction::BackOut { .. } | EasingFunction::CubicHermite { .. })
        {
            return Err(unknown());
        }
        Ok(ease)
    }
}

impl serde::Serialize for EasingFunction {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> serde::Deserialize<'de> for EasingFunction {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let id = String::deserialize(deserializer)?;
        id.parse().map_err(serde::de::Error::custom)
    }
}
