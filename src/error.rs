//! Error types for header state and configuration updates.

extern crate alloc;

use alloc::string::String;
use core::fmt;

/// Errors raised by mode transitions and configuration setters.
///
/// A rejected operation never mutates state and never writes to the
/// settings store.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum HeaderError {
    /// Mode selection outside the persisted range `1..=6`.
    InvalidMode(i64),
    /// Numeric configuration value outside its accepted range.
    OutOfRange {
        field: &'static str,
        value: i64,
        min: i64,
        max: i64,
    },
    /// Unknown key for a closed option set (separator, padding).
    UnknownOption { field: &'static str, value: String },
}

impl fmt::Display for HeaderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidMode(value) => write!(f, "invalid header mode: {} (expected 1..=6)", value),
            Self::OutOfRange {
                field,
                value,
                min,
                max,
            } => write!(
                f,
                "{} out of range: {} (expected {}..={})",
                field, value, min, max
            ),
            Self::UnknownOption { field, value } => {
                write!(f, "unknown {} option: {:?}", field, value)
            }
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for HeaderError {}
