use super::WordWidth;
use crate::{Counter, CreationError, Histogram};
use num_traits::ToPrimitive;
use std::io;
use std::{error, fmt};

/// Errors that can happen while reading a snapshot or importing it.
#[derive(Debug)]
pub enum DecodeError {
    /// The input ended in the middle of the header or of a varint.
    Truncated,
    /// The word width tag was neither 2 nor 4.
    InvalidWordWidth(u8),
    /// The word width tag does not match the width implied by the configuration.
    WordWidthMismatch,
    /// The encoded counts run past the end of the counts array.
    IndexOutOfRange,
    /// The encoded counts cover fewer bins than the counts array has.
    LengthMismatch {
        /// Bins in the counts array of the encoded configuration.
        expected: usize,
        /// Bins covered by the encoded counts.
        actual: usize,
    },
    /// A count exceeded what can be represented in the chosen counter type.
    UnsuitableCounterType,
    /// The histogram instance could not be created because the encoded parameters were invalid
    /// (e.g. lowest value, highest value, etc.)
    InvalidParameters(CreationError),
    /// The cookie (first 4 bytes) of the binary envelope was not recognized.
    InvalidCookie,
    /// The text form was not valid base64.
    #[cfg(feature = "serialization")]
    Base64(base64::DecodeError),
    /// An i/o operation failed.
    IoError(io::Error),
}

impl From<io::Error> for DecodeError {
    fn from(e: io::Error) -> Self {
        if e.kind() == io::ErrorKind::UnexpectedEof {
            DecodeError::Truncated
        } else {
            DecodeError::IoError(e)
        }
    }
}

#[cfg(feature = "serialization")]
impl From<base64::DecodeError> for DecodeError {
    fn from(e: base64::DecodeError) -> Self {
        DecodeError::Base64(e)
    }
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            DecodeError::Truncated => write!(f, "The encoded histogram ended unexpectedly"),
            DecodeError::InvalidWordWidth(tag) => {
                write!(f, "Invalid word width tag {}, expected 2 or 4", tag)
            }
            DecodeError::WordWidthMismatch => write!(
                f,
                "The word width does not match the histogram's configuration"
            ),
            DecodeError::IndexOutOfRange => write!(
                f,
                "The encoded counts run past the end of the counts array"
            ),
            DecodeError::LengthMismatch { expected, actual } => write!(
                f,
                "The encoded counts cover {} bins, expected {}",
                actual, expected
            ),
            DecodeError::UnsuitableCounterType => write!(
                f,
                "A count exceeded what can be represented in the chosen counter type"
            ),
            DecodeError::InvalidParameters(e) => {
                write!(f, "The encoded parameters were invalid: {}", e)
            }
            DecodeError::InvalidCookie => write!(
                f,
                "The cookie (first 4 bytes) did not match the snapshot format"
            ),
            #[cfg(feature = "serialization")]
            DecodeError::Base64(e) => write!(f, "Invalid base64: {}", e),
            DecodeError::IoError(e) => write!(f, "An i/o operation failed: {}", e),
        }
    }
}

impl error::Error for DecodeError {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self {
            DecodeError::InvalidParameters(e) => Some(e),
            #[cfg(feature = "serialization")]
            DecodeError::Base64(e) => Some(e),
            DecodeError::IoError(e) => Some(e),
            _ => None,
        }
    }
}

/// Replay an encoded counts array into `h`, which must be freshly created for the encoded
/// configuration, and recompute its statistics.
pub fn decode_counts<T: Counter>(bytes: &[u8], h: &mut Histogram<T>) -> Result<(), DecodeError> {
    let (&tag, stream) = bytes.split_first().ok_or(DecodeError::Truncated)?;
    let width = WordWidth::from_tag(tag).ok_or(DecodeError::InvalidWordWidth(tag))?;
    if width != WordWidth::for_counts_len(h.counts.len()) {
        return Err(DecodeError::WordWidthMismatch);
    }

    let counts_len = h.counts.len();
    let mut position = 0;
    let mut dest_index: usize = 0;

    while position < stream.len() {
        let count_or_zeros = zig_zag_decode(varint_read(stream, &mut position)?);

        if count_or_zeros < 0 {
            // i64::min_value() has no positive counterpart; no real run is anywhere near that
            let zero_count = count_or_zeros
                .checked_neg()
                .and_then(|n| n.to_usize())
                .ok_or(DecodeError::IndexOutOfRange)?;
            dest_index = dest_index
                .checked_add(zero_count)
                .filter(|&i| i <= counts_len)
                .ok_or(DecodeError::IndexOutOfRange)?;
        } else {
            let slot = h
                .counts
                .get_mut(dest_index)
                .ok_or(DecodeError::IndexOutOfRange)?;
            *slot = T::from_i64(count_or_zeros).ok_or(DecodeError::UnsuitableCounterType)?;
            dest_index += 1;
        }
    }

    if dest_index != counts_len {
        return Err(DecodeError::LengthMismatch {
            expected: counts_len,
            actual: dest_index,
        });
    }

    h.restat();
    Ok(())
}

/// Read a LEB128-64b9B varint starting at `*position`, advancing it past the varint.
#[inline]
pub fn varint_read(bytes: &[u8], position: &mut usize) -> Result<u64, DecodeError> {
    let mut value: u64 = 0;
    for chunk in 0..8 {
        let b = *bytes.get(*position).ok_or(DecodeError::Truncated)?;
        *position += 1;

        value |= u64::from(b & 0x7F) << (7 * chunk);
        if b & 0x80 == 0 {
            return Ok(value);
        }
    }

    // special case: use last byte as is
    let b = *bytes.get(*position).ok_or(DecodeError::Truncated)?;
    *position += 1;
    Ok(value | (u64::from(b) << 56))
}

#[inline]
pub fn zig_zag_decode(encoded: u64) -> i64 {
    ((encoded >> 1) as i64) ^ -((encoded & 1) as i64)
}
