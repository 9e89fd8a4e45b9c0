use super::WordWidth;
use crate::{Counter, Histogram};
use std::io;
use std::{error, fmt};

/// Errors that occur while exporting a histogram or writing a snapshot.
#[derive(Debug)]
pub enum EncodeError {
    /// A count above i64::max_value() cannot be zig-zag encoded, and therefore cannot be
    /// exported.
    CountNotSerializable,
    /// The encoded counts are longer than the binary envelope's 32 bit length field allows.
    PayloadTooLong,
    /// An i/o operation failed.
    IoError(io::Error),
}

impl From<io::Error> for EncodeError {
    fn from(e: io::Error) -> Self {
        EncodeError::IoError(e)
    }
}

impl fmt::Display for EncodeError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            EncodeError::CountNotSerializable => write!(
                f,
                "A count above i64::max_value() cannot be zig-zag encoded"
            ),
            EncodeError::PayloadTooLong => {
                write!(f, "The encoded counts do not fit in a 32 bit length")
            }
            EncodeError::IoError(e) => write!(f, "An i/o operation failed: {}", e),
        }
    }
}

impl error::Error for EncodeError {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self {
            EncodeError::IoError(e) => Some(e),
            _ => None,
        }
    }
}

/// Append the width tag and the encoded counts of `h` to `buf`.
///
/// Every bin is covered: a run of two or more empty bins becomes a single negative skip marker
/// (split when it is longer than `width` allows), a lone empty bin is written as a plain 0.
pub fn encode_counts<T: Counter>(
    h: &Histogram<T>,
    width: WordWidth,
    buf: &mut Vec<u8>,
) -> Result<(), EncodeError> {
    let counts = &h.counts;
    let max_run = width.max_run();
    let mut scratch = [0_u8; 9];
    let mut index = 0;

    buf.push(width.tag());

    while index < counts.len() {
        let count = counts[index];
        index += 1;

        let count_or_zeros: i64 = if count == T::zero() {
            let mut zero_count: u64 = 1;
            while index < counts.len() && counts[index] == T::zero() && zero_count < max_run {
                zero_count += 1;
                index += 1;
            }

            if zero_count > 1 {
                // at most u32::max_value(), so this fits
                -(zero_count as i64)
            } else {
                0
            }
        } else {
            count
                .to_i64()
                .ok_or(EncodeError::CountNotSerializable)?
        };

        let len = varint_write(zig_zag_encode(count_or_zeros), &mut scratch);
        buf.extend_from_slice(&scratch[..len]);
    }

    Ok(())
}

/// Write a number as a LEB128-64b9B little endian base 128 varint to buf. This is not
/// quite the same as Protobuf's LEB128 as it encodes 64 bit values in a max of 9 bytes, not 10:
/// the first eight bytes carry 7 bits each, and a ninth byte, if needed, carries the remaining 8
/// bits as-is.
/// Returns the number of bytes written (in [1, 9]).
#[inline]
pub fn varint_write(input: u64, buf: &mut [u8; 9]) -> usize {
    let mut rest = input;
    for (i, byte) in buf.iter_mut().take(8).enumerate() {
        if rest < 0x80 {
            *byte = rest as u8;
            return i + 1;
        }
        // high bit set: more bytes are coming
        *byte = 0x80 | (rest & 0x7F) as u8;
        rest >>= 7;
    }

    buf[8] = rest as u8;
    9
}

/// Map signed numbers to unsigned: 0 to 0, -1 to 1, 1 to 2, -2 to 3, etc
#[inline]
pub fn zig_zag_encode(num: i64) -> u64 {
    // If num < 0, num >> 63 is all 1 and vice versa.
    ((num << 1) ^ (num >> 63)) as u64
}
