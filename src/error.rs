//! Crate-level error types.

use std::fmt;

/// Errors produced by the scroll-reveal crate.
#[derive(Debug)]
pub enum RevealError {
    /// Generic I/O failure.
    Io(std::io::Error),
    /// TOML options parsing/serialization failure.
    OptionsParse(String),
    /// An option value outside its accepted range.
    InvalidOption {
        /// Dotted option path, e.g. `trigger.threshold`.
        field: &'static str,
        /// Why the value was rejected.
        reason: String,
    },
    /// A root margin string that is not valid CSS margin shorthand.
    RootMargin(String),
    /// An easing id that names no known curve.
    UnknownEase(String),
    /// A sequence step whose resolved start time falls before zero.
    NegativeStepStart {
        /// Declaration index of the offending step.
        index: usize,
        /// The resolved start time in milliseconds.
        start_ms: i64,
    },
    /// A sequence step whose start or end does not fit the timeline.
    TimelineOverflow {
        /// Declaration index of the offending step.
        index: usize,
    },
}

impl fmt::Display for RevealError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "I/O error: {e}"),
            Self::OptionsParse(msg) => write!(f, "options parse error: {msg}"),
            Self::InvalidOption { field, reason } => {
                write!(f, "invalid option `{field}`: {reason}")
            }
            Self::RootMargin(input) => write!(f, "invalid root margin: {input:?}"),
            Self::UnknownEase(id) => write!(f, "unknown easing: {id:?}"),
            Self::NegativeStepStart { index, start_ms } => {
                write!(f, "step {index} resolves to a negative start ({start_ms}ms)")
            }
            Self::TimelineOverflow { index } => {
                write!(f, "step {index} resolves beyond the representable timeline")
            }
        }
    }
}

impl std::error::Error for RevealError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for RevealError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}
