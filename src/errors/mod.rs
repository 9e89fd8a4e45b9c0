//! Error types used throughout this library
use std::error::Error;
use std::fmt;

/// Errors that can occur when creating a histogram.
#[derive(Debug, Eq, PartialEq, Clone, Copy)]
pub enum CreationError {
    /// Number of significant digits must be in the range `[1, 5]`. It is capped at 5 because 5
    /// significant digits is already more than almost anyone needs, and memory usage scales
    /// exponentially as this increases.
    SigFigOutOfRange,
    /// Lowest trackable value must be <= `u64::max_value() / 2` because the highest value is
    /// a `u64` and the lowest value must be no bigger than half the highest.
    LowExceedsMax,
    /// Highest trackable value must be >= 2 * lowest trackable value for some internal
    /// calculations to work out. In practice, high is typically much higher than 2 * low.
    HighLessThanTwiceLow,
    /// Cannot represent sigfig worth of values beyond the lowest trackable value. Decrease the
    /// significant figures, lowest trackable value, or both.
    ///
    /// This could happen if low is very large (like 2^60) and sigfigs is 5, which requires 18
    /// additional bits, which would then require more bits than will fit in a u64.
    CannotRepresentSigFigBeyondLow,
    /// The `usize` type is too small to represent the desired configuration. Use fewer significant
    /// figures or a lower max.
    UsizeTypeTooSmall,
}

impl fmt::Display for CreationError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            CreationError::SigFigOutOfRange => {
                write!(f, "Number of significant digits must be in the range [1, 5]")
            }
            CreationError::LowExceedsMax => write!(
                f,
                "Lowest trackable value must be <= u64::max_value() / 2"
            ),
            CreationError::HighLessThanTwiceLow => write!(
                f,
                "Highest trackable value must be >= 2 * lowest trackable value"
            ),
            CreationError::CannotRepresentSigFigBeyondLow => write!(
                f,
                "Cannot represent sigfig worth of values beyond the lowest trackable value"
            ),
            CreationError::UsizeTypeTooSmall => write!(
                f,
                "The usize type is too small to represent the desired configuration"
            ),
        }
    }
}

impl Error for CreationError {}

/// Errors that can occur while recording a value and its associated count.
#[derive(Debug, Eq, PartialEq, Clone, Copy)]
pub enum RecordError {
    /// The value to record is larger than the histogram's highest trackable value. Nothing was
    /// recorded.
    ValueOutOfRange,
}

impl fmt::Display for RecordError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            RecordError::ValueOutOfRange => write!(
                f,
                "The value to record exceeds the highest trackable value"
            ),
        }
    }
}

impl Error for RecordError {}

/// Errors that can occur when merging another histogram into this one.
#[derive(Debug, Eq, PartialEq, Clone, Copy)]
pub enum MergeError {
    /// The other histogram was configured with a different lowest value, highest value or number
    /// of significant digits, so its counts do not line up with ours. Nothing was merged.
    GeometryMismatch,
}

impl fmt::Display for MergeError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            MergeError::GeometryMismatch => write!(
                f,
                "The other histogram's configuration does not match this histogram's"
            ),
        }
    }
}

impl Error for MergeError {}
