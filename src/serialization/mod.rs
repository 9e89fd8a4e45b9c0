//! Snapshot support.
//!
//! A `Snapshot` is a compact, self-describing copy of a histogram: the three configuration values
//! plus a run-length compressed encoding of the counts array. It is intended for archival or for
//! shipping histograms to another process for aggregation. A typical use case would be to
//! periodically export a histogram, send it somewhere, and reset it.
//!
//! Histograms are designed to be merged, and an efficient storage format facilitates this. As an
//! example, you might be capturing histograms once a minute to have a granular view into your
//! performance over time, but you might also want to see longer trends over an hour or day. Simply
//! import the last 60 minutes worth to recreate their in-memory `Histogram` form, merge them all
//! together into one `Histogram`, and perform whatever calculations you wish on the result. This
//! would allow you to correctly calculate the 99.99th percentile for the entire hour, for
//! instance, which is not something you can do if you have only stored percentiles (as opposed to
//! the entire histogram) for each minute.
//!
//! # Format
//!
//! `Snapshot::compressed_counts` starts with a single byte naming the word width (2 or 4 bytes)
//! chosen for the histogram: histograms with at most 65535 bins use the narrow width. The rest of
//! the bytes are zig-zag encoded LEB128-64b9B varints, one per bin or per run of empty bins. A
//! non-negative number is the count of the next bin; a negative number `-n` skips `n` empty bins.
//! Runs never exceed the largest number the word width can hold. The stream always covers the
//! whole counts array, so the space used depends mainly on precision and on how many bins hold
//! samples, not on the value range.
//!
//! `Snapshot` derives serde's `Serialize` and `Deserialize`, so it can be embedded in any
//! serde-backed document. `write_to` and `read_from` give it a standalone big-endian binary
//! envelope, and with the `serialization` feature (on by default) `to_base64` and `from_base64`
//! produce a zlib-compressed, base64-encoded line of text.
//!
//! # Examples
//!
//! Exporting several histograms into a `Vec<u8>` and importing them again, at which point they
//! are merged into one histogram (for further hypothetical analysis).
//!
//! ```
//! use hdrhist::{Histogram, Snapshot};
//! use std::io::Cursor;
//!
//! // Naturally, do real error handling instead of unwrap() everywhere
//!
//! let num_histograms = 4;
//! let mut buf = Vec::new();
//!
//! // Make some histograms and save them to the buffer
//! for _ in 0..num_histograms {
//!     let mut h = Histogram::<u64>::new_with_bounds(1, u64::max_value(), 3).unwrap();
//!     h.record_n(42, 7).unwrap();
//!     h.export().unwrap().write_to(&mut buf).unwrap();
//! }
//!
//! // Read them back out again
//! let mut cursor = Cursor::new(&buf);
//! let mut accumulator = Histogram::<u64>::new_with_bounds(1, u64::max_value(), 3).unwrap();
//!
//! for _ in 0..num_histograms {
//!     let snapshot = Snapshot::read_from(&mut cursor).unwrap();
//!     let h: Histogram<u64> = Histogram::import(&snapshot).unwrap();
//!
//!     // behold, they are restored as they were originally
//!     assert_eq!(7, h.count_at(42));
//!     assert_eq!(0, h.count_at(1000));
//!
//!     accumulator.merge(&h).unwrap();
//! }
//!
//! // all the counts are there
//! assert_eq!(num_histograms * 7, accumulator.count_at(42));
//! ```

use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};
use num_traits::ToPrimitive;
use serde::{Deserialize, Serialize};
use std::io::{Read, Write};
use tracing::{debug, trace};

use crate::{Counter, CreationError, Histogram};


#[cfg(test)]
#[path = "rand_varint.rs"]
mod rand_varint;

#[cfg(all(test, feature = "bench_private"))]
mod benchmarks;

mod encoder;
pub use self::encoder::EncodeError;

mod decoder;
pub use self::decoder::DecodeError;

#[cfg(feature = "serialization")]
mod text;

/// First four bytes of the binary envelope written by `Snapshot::write_to`.
pub const SNAPSHOT_COOKIE: u32 = 0x4844_5231;

/// Size of the binary envelope header: cookie, lowest, highest, significant figures and payload
/// length.
pub const SNAPSHOT_HEADER_SIZE: usize = 4 + 8 + 8 + 4 + 4;

/// The width of the words used to bound run lengths in the counts encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WordWidth {
    /// 16 bit words, used when the counts array has at most 65535 bins.
    Narrow,
    /// 32 bit words.
    Wide,
}

impl WordWidth {
    /// The width a histogram with `counts_len` bins is encoded with.
    pub fn for_counts_len(counts_len: usize) -> WordWidth {
        if counts_len <= usize::from(u16::max_value()) {
            WordWidth::Narrow
        } else {
            WordWidth::Wide
        }
    }

    /// Parse the tag byte at the start of an encoded counts array.
    pub fn from_tag(tag: u8) -> Option<WordWidth> {
        match tag {
            2 => Some(WordWidth::Narrow),
            4 => Some(WordWidth::Wide),
            _ => None,
        }
    }

    /// The tag byte: the width in bytes.
    pub fn tag(self) -> u8 {
        match self {
            WordWidth::Narrow => 2,
            WordWidth::Wide => 4,
        }
    }

    /// The longest run of empty bins a single skip marker may cover.
    pub fn max_run(self) -> u64 {
        match self {
            WordWidth::Narrow => u64::from(u16::max_value()),
            WordWidth::Wide => u64::from(u32::max_value()),
        }
    }
}

/// A self-describing copy of a histogram's configuration and counts.
///
/// Produced by `Histogram::export` and turned back into a histogram by `Histogram::import`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Lowest trackable value of the exported histogram.
    pub lowest_trackable_value: u64,
    /// Highest trackable value of the exported histogram.
    pub highest_trackable_value: u64,
    /// Significant figures of the exported histogram.
    pub significant_figures: u8,
    /// Word width tag followed by the varint stream of counts and skips.
    pub compressed_counts: Vec<u8>,
}

impl<T: Counter> Histogram<T> {
    /// Export the configuration and counts of this histogram into a `Snapshot`.
    ///
    /// Fails only if a count is too large to be encoded (above `i64::max_value()`).
    pub fn export(&self) -> Result<Snapshot, EncodeError> {
        let width = WordWidth::for_counts_len(self.counts.len());
        let mut compressed_counts = Vec::new();
        encoder::encode_counts(self, width, &mut compressed_counts)?;

        trace!(
            counts_len = self.counts.len(),
            encoded_len = compressed_counts.len(),
            "exported histogram snapshot"
        );

        Ok(Snapshot {
            lowest_trackable_value: self.lowest_trackable_value,
            highest_trackable_value: self.highest_trackable_value,
            significant_figures: self.significant_figures,
            compressed_counts,
        })
    }

    /// Rebuild a histogram from a `Snapshot`.
    ///
    /// The configuration is validated like any other, and the counts stream must cover exactly
    /// the counts array of that configuration. The total count and the extremes are recomputed
    /// from the counts. No partially populated histogram is ever returned.
    pub fn import(snapshot: &Snapshot) -> Result<Histogram<T>, DecodeError> {
        let mut h = Histogram::new_with_bounds(
            snapshot.lowest_trackable_value,
            snapshot.highest_trackable_value,
            snapshot.significant_figures,
        )
        .map_err(DecodeError::InvalidParameters)?;

        decoder::decode_counts(&snapshot.compressed_counts, &mut h).map_err(|e| {
            debug!(
                lowest_trackable_value = snapshot.lowest_trackable_value,
                highest_trackable_value = snapshot.highest_trackable_value,
                significant_figures = snapshot.significant_figures,
                error = %e,
                "failed to import histogram snapshot"
            );
            e
        })?;

        Ok(h)
    }
}

impl Snapshot {
    /// Write this snapshot in the binary envelope to the provided writer.
    /// Returns the number of bytes written, or an error.
    ///
    /// Note that `Vec<u8>` is a reasonable `Write` implementation for simple usage.
    pub fn write_to<W: Write>(&self, writer: &mut W) -> Result<usize, EncodeError> {
        let payload_len = self
            .compressed_counts
            .len()
            .to_u32()
            .ok_or(EncodeError::PayloadTooLong)?;

        writer.write_u32::<BigEndian>(SNAPSHOT_COOKIE)?;
        writer.write_u64::<BigEndian>(self.lowest_trackable_value)?;
        writer.write_u64::<BigEndian>(self.highest_trackable_value)?;
        writer.write_u32::<BigEndian>(u32::from(self.significant_figures))?;
        writer.write_u32::<BigEndian>(payload_len)?;
        writer.write_all(&self.compressed_counts)?;

        Ok(SNAPSHOT_HEADER_SIZE + self.compressed_counts.len())
    }

    /// Read a snapshot in the binary envelope from the provided reader.
    ///
    /// Only the envelope is checked here; the contents are validated by `Histogram::import`.
    /// Note that `&[u8]` and `Cursor` are convenient implementations of `Read` if you have some
    /// bytes already in slice or `Vec` form.
    pub fn read_from<R: Read>(reader: &mut R) -> Result<Snapshot, DecodeError> {
        let cookie = reader.read_u32::<BigEndian>()?;
        if cookie != SNAPSHOT_COOKIE {
            return Err(DecodeError::InvalidCookie);
        }

        let lowest_trackable_value = reader.read_u64::<BigEndian>()?;
        let highest_trackable_value = reader.read_u64::<BigEndian>()?;
        let significant_figures = reader
            .read_u32::<BigEndian>()?
            .to_u8()
            .ok_or(DecodeError::InvalidParameters(
                CreationError::SigFigOutOfRange,
            ))?;
        let payload_len = reader.read_u32::<BigEndian>()?;

        // don't trust the length enough to allocate it up front
        let mut compressed_counts = Vec::new();
        let read = reader
            .take(u64::from(payload_len))
            .read_to_end(&mut compressed_counts)?;
        if read.to_u32() != Some(payload_len) {
            return Err(DecodeError::Truncated);
        }

        Ok(Snapshot {
            lowest_trackable_value,
            highest_trackable_value,
            significant_figures,
            compressed_counts,
        })
    }
}
