//! hdrhist is a High Dynamic Range histogram for native Rust. It records and analyzes sampled
//! data value counts across a large, configurable value range with configurable precision within
//! the range. The resulting "HDR" histogram allows for fast and accurate analysis of the extreme
//! ranges of data with non-normal distributions, like latency.
//!
//! # HdrHistogram
//!
//! What follows is a description from [the HdrHistogram
//! website](https://hdrhistogram.github.io/HdrHistogram/). The documentation of the [Java
//! HdrHistogram](https://github.com/HdrHistogram/HdrHistogram) explains the same concepts in more
//! depth.
//!
//! HdrHistogram supports the recording and analyzing of sampled data value counts across a
//! configurable integer value range with configurable value precision within the range. Value
//! precision is expressed as the number of significant digits in the value recording, and provides
//! control over value quantization behavior across the value range and the subsequent value
//! resolution at any given level.
//!
//! For example, a Histogram could be configured to track the counts of observed integer values
//! between 0 and 3,600,000,000 while maintaining a value precision of 3 significant digits across
//! that range. Value quantization within the range will thus be no larger than 1/1,000th (or 0.1%)
//! of any value. This example Histogram could be used to track and analyze the counts of observed
//! response times ranging between 1 microsecond and 1 hour in magnitude, while maintaining a value
//! resolution of 1 microsecond up to 1 millisecond, a resolution of 1 millisecond (or better) up
//! to one second, and a resolution of 1 second (or better) up to 1,000 seconds. At its maximum
//! tracked value (1 hour), it would still maintain a resolution of 3.6 seconds (or better).
//!
//! A Histogram's memory footprint is constant, with no allocation operations involved in
//! recording data values or in iterating through them. The memory footprint is fixed regardless of
//! the number of data value samples recorded, and depends solely on the dynamic range and
//! precision chosen. The amount of work involved in recording a sample is constant, and directly
//! computes storage index locations such that no iteration or searching is ever involved in
//! recording data values.
//!
//! # Interacting with the library
//!
//! A histogram is generally used in one of two modes: recording samples, or querying for
//! analytics. In distributed deployments, the recording may be performed remotely (and possibly in
//! multiple locations), to then be aggregated later in a central location for analysis.
//!
//! ## Recording samples
//!
//! A histogram instance is created using the `::new` methods on the `Histogram` struct, or from a
//! `Config`. `new_with_max` sets an upper bound on the values to be recorded and tracks values as
//! low as 1; `new_with_bounds` also sets the lowest value that must be distinguished from 0, such
//! that a smaller range needs to be covered (thus reducing the overall allocation size). The shape
//! of a histogram never changes after construction: recording a value above the configured
//! maximum fails and leaves the histogram untouched.
//!
//! For example the example below shows how to create a `Histogram` that can count values in the
//! `[1..3600000]` range with 1% precision, which could be used to track latencies in the range `[1
//! msec..1 hour]`).
//!
//! ```
//! use hdrhist::Histogram;
//! let mut hist = Histogram::<u64>::new_with_bounds(1, 60 * 60 * 1000, 2).unwrap();
//!
//! // samples can be recorded using .record, which will error if the value is too large
//! hist.record(54321).expect("value 54321 should be in range");
//!
//! // for ergonomics, samples can also be recorded with +=
//! // this call will panic if the value is out of range!
//! hist += 54321;
//!
//! // if the code that generates the values is subject to Coordinated Omission,
//! // the self-correcting record method should be used instead.
//! // for example, if the expected sampling interval is 10 msec:
//! hist.record_correct(54321, 10).expect("value 54321 should be in range");
//! ```
//!
//! Note the `u64` annotation. This type can be changed to reduce the storage overhead for all the
//! histogram bins, at the cost of a risk of saturating if a large number of samples end up in the
//! same bin.
//!
//! ## Querying samples
//!
//! At any time, the histogram can be queried to return interesting statistical measurements, such
//! as the total number of recorded samples, or the value at a given quantile. Quantiles are
//! expressed on a 0 to 100 scale throughout this crate.
//!
//! ```
//! use hdrhist::Histogram;
//! let hist = Histogram::<u64>::new_with_max(1_000_000, 2).unwrap();
//! // ...
//! println!("# of samples: {}", hist.len());
//! println!("99.9'th percentile: {}", hist.value_at_quantile(99.9));
//! ```
//!
//! Several useful iterators are also provided for quickly getting an overview of the dataset. The
//! simplest one is `iter_recorded()`, which yields one item for every non-empty sample bin.
//!
//! ```
//! use hdrhist::Histogram;
//! let hist = Histogram::<u64>::new_with_max(1_000_000, 2).unwrap();
//! // ...
//! for v in hist.iter_recorded() {
//!     println!("{}'th percentile of data is {} with {} samples",
//!         v.quantile(), v.value_iterated_to(), v.count_at_value());
//! }
//! ```
//!
//! ## Combining and shipping histograms
//!
//! Histograms with the same configuration can be merged, which is the recommended way to record
//! from several threads: give every writer its own histogram and `merge` them periodically. A
//! histogram is not internally synchronized; all mutation goes through `&mut self`.
//!
//! A histogram can be exported to a compact `Snapshot` and imported again, possibly on another
//! machine. See the `serialization` module.
//!
//! ```
//! use hdrhist::Histogram;
//! let mut a = Histogram::<u64>::new_with_max(1000, 3).unwrap();
//! let mut b = Histogram::<u64>::new_with_max(1000, 3).unwrap();
//! a.record(10).unwrap();
//! b.record(20).unwrap();
//!
//! a.merge(&b).unwrap();
//! assert_eq!(2, a.len());
//!
//! let snapshot = a.export().unwrap();
//! let restored = Histogram::<u64>::import(&snapshot).unwrap();
//! assert_eq!(a, restored);
//! ```

#![deny(missing_docs, trivial_casts, trivial_numeric_casts, unused_extern_crates)]
#![cfg_attr(feature = "bench_private", feature(test))]

#[cfg(all(test, feature = "bench_private"))]
extern crate test;

use num_traits::ToPrimitive;
use serde::{Deserialize, Serialize};
use std::cmp;
use std::mem;
use std::ops::AddAssign;
use tracing::debug;

pub mod config;
mod core;
pub mod errors;
pub mod iterators;
pub mod serialization;

pub use crate::config::Config;
pub use crate::core::counter::*;
pub use crate::errors::*;
pub use crate::serialization::Snapshot;

/// `Histogram` is the core data structure in hdrhist. It records values, and performs analytics.
///
/// At its heart, it keeps the count for recorded samples in "buckets" of values. The resolution
/// and distribution of these buckets is tuned based on the desired highest trackable value, as
/// well as the user-specified number of significant decimal digits to preserve. The values for the
/// buckets are kept in a way that resembles floats and doubles: there is a mantissa and an
/// exponent, and each bucket represents a different exponent. The "sub-buckets" within a bucket
/// represent different values for the mantissa.
///
/// To a first approximation, the sub-buckets of the first bucket would hold the values `0`, `1`,
/// `2`, `3`, …, the sub-buckets of the second bucket would hold `0`, `2`, `4`, `6`, …, the third
/// would hold `0`, `4`, `8`, and so on. However, the low half of each bucket (except bucket 0) is
/// unnecessary, since those values are already covered by the sub-buckets of all the preceding
/// buckets. Thus, `Histogram` keeps the top half of every such bucket.
///
/// For the purposes of explanation, consider a `Histogram` with 2048 sub-buckets for every bucket,
/// and a lowest trackable value of 1. As mentioned above, more sub-buckets are needed to express
/// more significant digits.
///
/// - The 0th bucket covers 0...2047 in multiples of 1, using all 2048 sub-buckets
/// - The 1st bucket covers 2048..4095 in multiples of 2, using only the top 1024 sub-buckets
/// - The 2nd bucket covers 4096..8191 in multiple of 4, using only the top 1024 sub-buckets
/// - ...
///
/// Bucket 0 is "special" here. It is the only one that has 2048 entries. All the rest have
/// 1024 entries (because their bottom half overlaps with and is already covered by the all of
/// the previous buckets put together). In other words, the `k`'th bucket could represent `0 *
/// 2^k` to `2048 * 2^k` in 2048 buckets with `2^k` precision, but the midpoint of `1024 * 2^k
/// = 2048 * 2^(k-1)`, which is the k-1'th bucket's end. So, we would use the previous bucket
/// for those lower values as it has better precision.
///
/// `Histogram` is not thread-safe. Recording is a handful of arithmetic operations and
/// a single counter increment, with no locking. Wrap it in a mutex, or better, keep one histogram
/// per writer and `merge` them.
#[derive(Debug, Clone)]
pub struct Histogram<T: Counter> {
    highest_trackable_value: u64,
    lowest_trackable_value: u64,
    significant_figures: u8,

    // in [1, 64]
    bucket_count: u8,
    // 2^(sub_bucket_half_count_magnitude + 1) = [2, 2^18]
    sub_bucket_count: u32,
    // sub_bucket_count / 2 = [1, 2^17]
    sub_bucket_half_count: u32,
    // In [0, 17]
    sub_bucket_half_count_magnitude: u8,
    // The bottom sub bucket's bits set, shifted by unit magnitude.
    // The highest bit will be (one-indexed) sub bucket count magnitude + unit_magnitude.
    sub_bucket_mask: u64,

    // Number of leading zeros that would be used by the largest value in bucket 0.
    // in [1, 63]
    leading_zero_count_base: u8,

    // Largest exponent of 2 that's smaller than the lowest trackable value. in [0, 62]
    unit_magnitude: u8,

    // Raw extremes of the recorded values; u64::max_value() and 0 while nothing is recorded.
    min_value: u64,
    max_value: u64,

    total_count: u64,
    counts: Vec<T>,
}

/// One step of a cumulative distribution, as produced by `Histogram::cumulative_distribution`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bracket {
    /// The quantile (on a 0 to 100 scale) this step was emitted for.
    pub quantile: f64,
    /// The number of samples at or below `value_at`.
    pub count: u64,
    /// The highest value equivalent to the samples reaching `quantile`.
    pub value_at: u64,
}

/// The count of a single slot of the histogram, as produced by `Histogram::distribution`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Bar {
    /// Lowest value counted in this slot.
    pub from: u64,
    /// Highest value counted in this slot (inclusive).
    pub to: u64,
    /// Number of samples recorded in this slot.
    pub count: u64,
}

// accessors

impl<T: Counter> Histogram<T> {
    /// Get the current number of distinct values that can be represented in the histogram.
    pub fn counts_len(&self) -> usize {
        self.counts.len()
    }

    /// Get the lowest trackable value, exactly as it was configured.
    pub fn lowest_trackable_value(&self) -> u64 {
        self.lowest_trackable_value
    }

    /// Get the highest trackable value.
    pub fn highest_trackable_value(&self) -> u64 {
        self.highest_trackable_value
    }

    /// Get the number of significant value digits kept by this histogram.
    pub fn significant_figures(&self) -> u8 {
        self.significant_figures
    }

    /// Get the number of buckets used by the histogram to cover the highest trackable value.
    ///
    /// This method differs from `.counts_len()` in that it does not count the sub buckets within
    /// each bucket.
    pub fn bucket_count(&self) -> u8 {
        self.bucket_count
    }

    /// Get the configuration this histogram was built from.
    pub fn config(&self) -> Config {
        Config::new(
            self.lowest_trackable_value,
            self.highest_trackable_value,
            self.significant_figures,
        )
    }

    /// Get the total number of samples recorded.
    pub fn len(&self) -> u64 {
        self.total_count
    }

    /// Returns true if this histogram has no recorded values.
    pub fn is_empty(&self) -> bool {
        self.total_count == 0
    }

    /// Get the static memory footprint of this histogram: the struct itself plus the counts array.
    ///
    /// The struct part is `mem::size_of::<Histogram<T>>()`, so it depends on the target's layout;
    /// only the counts array part is fixed by the configuration.
    pub fn byte_size(&self) -> usize {
        mem::size_of::<Self>() + self.counts.len() * mem::size_of::<T>()
    }

    /// Get the index of the last histogram bin.
    fn last_index(&self) -> usize {
        self.counts
            .len()
            .checked_sub(1)
            .expect("Empty counts array?")
    }

    /// Get the count of a single bin by index, if the index is in range.
    pub fn count_at_index(&self, index: usize) -> Option<T> {
        self.counts.get(index).cloned()
    }
}

// Construction

impl<T: Counter> Histogram<T> {
    /// Construct a `Histogram` given a known maximum value to be tracked, and a number of
    /// significant decimal digits. The histogram will be constructed to implicitly track
    /// (distinguish from 0) values as low as 1.
    ///
    /// See `new_with_bounds` for info on `high` and `sigfig`.
    pub fn new_with_max(high: u64, sigfig: u8) -> Result<Histogram<T>, CreationError> {
        Self::new_with_bounds(1, high, sigfig)
    }

    /// Construct a `Histogram` with known upper and lower bounds for recorded sample values.
    ///
    /// `low` is the lowest value that can be discerned (distinguished from 0) by the histogram,
    /// and must be a positive integer that is >= 1 for meaningful resolution. A `low` of 0 is
    /// accepted and treated as 1 internally. It may be internally rounded down to nearest power of
    /// 2. Providing a lowest discernible value (`low`) is useful is situations where the units
    /// used for the histogram's values are much smaller that the minimal accuracy required. E.g.
    /// when tracking time values stated in nanosecond units, where the minimal accuracy required
    /// is a microsecond, the proper value for `low` would be 1000.
    ///
    /// `high` is the highest value to be tracked by the histogram, and must be a
    /// positive integer that is `>= (2 * low)`.
    ///
    /// `sigfig` Specifies the number of significant figures to maintain. This is the number of
    /// significant decimal digits to which the histogram will maintain value resolution and
    /// separation. Must be in the range [1, 5]. If you're not sure, use 3. As `sigfig` increases,
    /// memory usage grows exponentially, so choose carefully if there will be many histograms in
    /// memory at once or if storage is constrained.
    pub fn new_with_bounds(low: u64, high: u64, sigfig: u8) -> Result<Histogram<T>, CreationError> {
        Config::new(low, high, sigfig).build()
    }

    /// Construct a `Histogram` with the same range settings as a given source histogram,
    /// duplicating the source's configuration (but NOT its contents).
    pub fn new_from<F: Counter>(source: &Histogram<F>) -> Histogram<T> {
        let mut h = Histogram {
            highest_trackable_value: source.highest_trackable_value,
            lowest_trackable_value: source.lowest_trackable_value,
            significant_figures: source.significant_figures,

            bucket_count: source.bucket_count,
            sub_bucket_count: source.sub_bucket_count,
            sub_bucket_half_count: source.sub_bucket_half_count,
            sub_bucket_half_count_magnitude: source.sub_bucket_half_count_magnitude,
            sub_bucket_mask: source.sub_bucket_mask,
            leading_zero_count_base: source.leading_zero_count_base,
            unit_magnitude: source.unit_magnitude,

            min_value: u64::max_value(),
            max_value: 0,

            total_count: 0,
            counts: Vec::new(),
        };

        h.alloc(source.counts.len());
        h
    }

    pub(crate) fn from_config(config: Config) -> Result<Histogram<T>, CreationError> {
        config.validate()?;

        let unit_magnitude = config.unit_magnitude() as u8;
        let sub_bucket_half_count_magnitude = config.sub_bucket_half_count_magnitude() as u8;

        // sub_bucket_half_count_magnitude is at most 17, so this fits comfortably
        let sub_bucket_count = 1_u32 << (sub_bucket_half_count_magnitude + 1);

        // validate() ensures unit_magnitude + sub_bucket_half_count_magnitude + 1 <= 63, so this
        // shift cannot overflow
        let sub_bucket_mask = (u64::from(sub_bucket_count) - 1) << unit_magnitude;

        let mut h = Histogram {
            highest_trackable_value: config.highest_trackable_value,
            lowest_trackable_value: config.lowest_trackable_value,
            significant_figures: config.significant_figures,

            bucket_count: 0,
            sub_bucket_count,
            sub_bucket_half_count: sub_bucket_count / 2,
            sub_bucket_half_count_magnitude,
            sub_bucket_mask,
            // Establish leading_zero_count_base, used in bucket_for() fast path:
            // subtract the bits that would be used by the largest value in bucket 0.
            leading_zero_count_base: 64 - unit_magnitude - sub_bucket_half_count_magnitude - 1,
            unit_magnitude,

            min_value: u64::max_value(),
            max_value: 0,

            total_count: 0,
            counts: Vec::new(),
        };

        // determine exponent range needed to support the trackable value with no overflow:
        let len = h.establish_size(config.highest_trackable_value)?;
        h.alloc(len);
        Ok(h)
    }

    fn alloc(&mut self, len: usize) {
        self.counts = vec![T::zero(); len];
    }

    /// Set the bucket count and compute the length of the counts array needed to represent
    /// `high`.
    fn establish_size(&mut self, high: u64) -> Result<usize, CreationError> {
        self.bucket_count = self.buckets_to_cover(high);

        // If we have N such that sub_bucket_count * 2^N > high, we need storage for N+1 buckets,
        // each with enough slots to hold the top half of the sub_bucket_count (the lower half is
        // covered by previous buckets), and the +1 being used for the lower half of the 0'th
        // bucket. Or, equivalently, we need 1 more bucket to capture the max value if we consider
        // the sub-bucket length to be halved.
        (usize::from(self.bucket_count) + 1)
            .checked_mul(self.sub_bucket_half_count as usize)
            .ok_or(CreationError::UsizeTypeTooSmall)
    }

    fn buckets_to_cover(&self, value: u64) -> u8 {
        // the k'th bucket can express from 0 * 2^k to sub_bucket_count * 2^k in units of 2^k
        let mut smallest_untrackable_value =
            u64::from(self.sub_bucket_count) << self.unit_magnitude;

        // always have at least 1 bucket
        let mut buckets_needed = 1;
        while smallest_untrackable_value <= value {
            if smallest_untrackable_value > u64::max_value() / 2 {
                // next shift will overflow, meaning that bucket could represent values up to ones
                // greater than u64::max_value, so it's the last bucket
                return buckets_needed + 1;
            }
            smallest_untrackable_value <<= 1;
            buckets_needed += 1;
        }
        buckets_needed
    }
}

// administrative

impl<T: Counter> Histogram<T> {
    /// Reset the contents and statistics of this histogram, preserving its configuration.
    pub fn reset(&mut self) {
        for c in self.counts.iter_mut() {
            *c = T::zero();
        }
        self.total_count = 0;
        self.min_value = u64::max_value();
        self.max_value = 0;
    }

    /// Recompute the total count and extremes from the counts array.
    ///
    /// The extremes become the lowest values of the first and last non-empty bins, which is all
    /// the precision a counts array carries.
    fn restat(&mut self) {
        let mut total: u64 = 0;
        let mut first = None;
        let mut last = None;
        for (index, count) in self.counts.iter().enumerate() {
            if *count != T::zero() {
                total = total.saturating_add(count.as_u64());
                if first.is_none() {
                    first = Some(index);
                }
                last = Some(index);
            }
        }

        self.total_count = total;
        self.min_value = first.map_or(u64::max_value(), |i| self.value_for(i));
        self.max_value = last.map_or(0, |i| self.value_for(i));
    }
}

// recording

impl<T: Counter> AddAssign<u64> for Histogram<T> {
    /// Record a single sample. Panics if the value is larger than the highest trackable value.
    fn add_assign(&mut self, value: u64) {
        self.record(value).unwrap();
    }
}

impl<T: Counter> Histogram<T> {
    /// Record `value` in the histogram.
    ///
    /// Returns an error if `value` exceeds the highest trackable value, in which case the
    /// histogram is not modified.
    pub fn record(&mut self, value: u64) -> Result<(), RecordError> {
        self.record_n(value, T::one())
    }

    /// Record multiple samples for a value in the histogram, adding to the value's current count.
    ///
    /// `count` is the number of occurrences of this value to record. A count of zero is validated
    /// like any other but records nothing.
    ///
    /// Returns an error if `value` exceeds the highest trackable value, in which case the
    /// histogram is not modified.
    pub fn record_n(&mut self, value: u64, count: T) -> Result<(), RecordError> {
        if value > self.highest_trackable_value {
            return Err(RecordError::ValueOutOfRange);
        }

        let index = self.index_for(value).ok_or(RecordError::ValueOutOfRange)?;
        let slot = self
            .counts
            .get_mut(index)
            .ok_or(RecordError::ValueOutOfRange)?;
        if count == T::zero() {
            return Ok(());
        }

        let before = *slot;
        *slot = before.saturating_add(count);
        // only account for what actually landed in the bin so the total tracks the counts
        let added = (*slot - before).as_u64();

        self.total_count = self.total_count.saturating_add(added);
        self.update_min_max(value);
        Ok(())
    }

    /// Record a value in the histogram while correcting for coordinated omission.
    ///
    /// See `record_n_correct` for further documentation.
    pub fn record_correct(&mut self, value: u64, interval: u64) -> Result<(), RecordError> {
        self.record_n_correct(value, T::one(), interval)
    }

    /// Record multiple values in the histogram while correcting for coordinated omission.
    ///
    /// To compensate for the loss of sampled values when a recorded value is larger than the
    /// expected interval between value samples, this method will auto-generate an additional
    /// series of decreasingly-smaller (down to `interval`) value records. The first record is
    /// `value` itself; if that fails nothing is recorded at all, and the synthetic values can
    /// never fail since they are all smaller than `value`.
    ///
    /// Returns an error if `value` exceeds the highest trackable value.
    pub fn record_n_correct(
        &mut self,
        value: u64,
        count: T,
        interval: u64,
    ) -> Result<(), RecordError> {
        self.record_n(value, count)?;
        if interval == 0 || value <= interval {
            return Ok(());
        }

        let mut missing_value = value - interval;
        while missing_value >= interval {
            self.record_n(missing_value, count)?;
            missing_value -= interval;
        }

        Ok(())
    }

    #[inline]
    fn update_min_max(&mut self, value: u64) {
        if value > self.max_value {
            self.max_value = value;
        }
        if value < self.min_value {
            self.min_value = value;
        }
    }
}

// combining

impl<T: Counter> Histogram<T> {
    /// Merge the contents of another histogram into this one.
    ///
    /// Both histograms must have been created with the same lowest trackable value, highest
    /// trackable value and number of significant figures. If they were not, an error is returned
    /// and this histogram is left unchanged. The other histogram is never modified.
    ///
    /// Merging is commutative and associative, so the order in which per-writer histograms are
    /// combined does not matter.
    pub fn merge(&mut self, other: &Histogram<T>) -> Result<(), MergeError> {
        if self.config() != other.config() {
            debug!(
                ours = ?self.config(),
                theirs = ?other.config(),
                "refusing to merge histograms with different configurations"
            );
            return Err(MergeError::GeometryMismatch);
        }
        debug_assert_eq!(self.counts.len(), other.counts.len());

        let mut observed_other_total_count: u64 = 0;
        for (ours, theirs) in self.counts.iter_mut().zip(other.counts.iter()) {
            if *theirs != T::zero() {
                let before = *ours;
                *ours = before.saturating_add(*theirs);
                observed_other_total_count =
                    observed_other_total_count.saturating_add((*ours - before).as_u64());
            }
        }

        self.total_count = self.total_count.saturating_add(observed_other_total_count);
        self.min_value = cmp::min(self.min_value, other.min_value);
        self.max_value = cmp::max(self.max_value, other.max_value);
        Ok(())
    }
}

// comparison

impl<T: Counter, F: Counter> PartialEq<Histogram<F>> for Histogram<T> {
    fn eq(&self, other: &Histogram<F>) -> bool {
        if self.lowest_trackable_value != other.lowest_trackable_value
            || self.highest_trackable_value != other.highest_trackable_value
            || self.significant_figures != other.significant_figures
            || self.unit_magnitude != other.unit_magnitude
            || self.sub_bucket_count != other.sub_bucket_count
            || self.sub_bucket_mask != other.sub_bucket_mask
            || self.bucket_count != other.bucket_count
            || self.counts.len() != other.counts.len()
        {
            return false;
        }
        if self.total_count != other.total_count {
            return false;
        }
        if self.min() != other.min() || self.max() != other.max() {
            return false;
        }
        self.counts
            .iter()
            .zip(other.counts.iter())
            .all(|(a, b)| a.as_u64() == b.as_u64())
    }
}

impl<T: Counter> Eq for Histogram<T> {}

// iterators

impl<T: Counter> Histogram<T> {
    /// Iterate through histogram values by quantile levels.
    ///
    /// The iteration mechanic for this iterator may appear somewhat confusing, but it yields
    /// fairly pleasing output. The iterator starts with a *quantile step size* of 100/halving.
    /// It then visits the quantiles 0, 100/(2 * ticks), 2*100/(2 * ticks), ... until it reaches
    /// 50. At that point, the step size is halved, and it continues until the distance to 100
    /// has been halved again, and so on. Once the last recorded value has been reached, one
    /// additional step to 100 is yielded.
    ///
    /// `ticks_per_half_distance` must be at least 1.
    ///
    /// ```
    /// use hdrhist::Histogram;
    /// let mut h = Histogram::<u64>::new_with_max(1000, 3).unwrap();
    /// for v in 1..=4 {
    ///     h.record(v).unwrap();
    /// }
    ///
    /// let steps: Vec<(f64, u64)> = h
    ///     .iter_quantiles(1)
    ///     .map(|v| (v.quantile_iterated_to(), v.value_iterated_to()))
    ///     .collect();
    /// assert_eq!(vec![(0.0, 1), (50.0, 2), (75.0, 3), (87.5, 4), (100.0, 4)], steps);
    /// ```
    pub fn iter_quantiles(
        &self,
        ticks_per_half_distance: u32,
    ) -> iterators::HistogramIterator<T, iterators::quantile::Iter<T>> {
        iterators::quantile::Iter::new(self, ticks_per_half_distance)
    }

    /// Iterate through all recorded histogram values using the finest granularity steps
    /// supported by the underlying representation. The iteration steps through all non-zero
    /// recorded value counts, and terminates when all recorded histogram values are exhausted.
    pub fn iter_recorded(&self) -> iterators::HistogramIterator<T, iterators::recorded::Iter> {
        iterators::recorded::Iter::new(self)
    }

    /// Iterate through every bin, empty or not, from the lowest one up to and including the last
    /// bin with a non-zero count.
    pub fn iter_all(&self) -> iterators::HistogramIterator<T, iterators::all::Iter> {
        iterators::all::Iter::new(self)
    }
}

// minor data statistics

impl<T: Counter> Histogram<T> {
    /// Get the lowest recorded value level in the histogram. If the histogram has no recorded
    /// values, the value returned is 0.
    pub fn min(&self) -> u64 {
        if self.total_count == 0 {
            0
        } else {
            self.lowest_equivalent(self.min_value)
        }
    }

    /// Get the highest recorded value level in the histogram. If the histogram has no recorded
    /// values, the value returned is 0.
    pub fn max(&self) -> u64 {
        if self.total_count == 0 {
            0
        } else {
            self.highest_equivalent(self.max_value)
        }
    }

    /// Get the lowest value that is equivalent to the given value within the histogram's
    /// resolution. Equivalent here means that value samples recorded for any two equivalent
    /// values are counted in a common total count.
    pub fn lowest_equivalent(&self, value: u64) -> u64 {
        let bucket_index = self.bucket_for(value);
        let sub_bucket_index = self.sub_bucket_for(value, bucket_index);
        self.value_from_loc(bucket_index, sub_bucket_index)
    }

    /// Get the highest value that is equivalent to the given value within the histogram's
    /// resolution. Equivalent here means that value samples recorded for any two equivalent
    /// values are counted in a common total count.
    pub fn highest_equivalent(&self, value: u64) -> u64 {
        // cannot overflow: the last bin of the top bucket ends exactly at u64::max_value()
        self.lowest_equivalent(value) + (self.equivalent_range(value) - 1)
    }

    /// Get a value that lies in the middle (rounded up) of the range of values equivalent the
    /// given value. Equivalent here means that value samples recorded for any two equivalent
    /// values are counted in a common total count.
    pub fn median_equivalent(&self, value: u64) -> u64 {
        self.lowest_equivalent(value) + (self.equivalent_range(value) >> 1)
    }

    /// Get the next value that is *not* equivalent to the given value within the histogram's
    /// resolution. Equivalent means that value samples recorded for any two equivalent values are
    /// counted in a common total count.
    ///
    /// Saturates at `u64::max_value()` for values in the last bin.
    pub fn next_non_equivalent(&self, value: u64) -> u64 {
        self.lowest_equivalent(value)
            .saturating_add(self.equivalent_range(value))
    }

    /// Get the size (in value units) of the range of values that are equivalent to the given
    /// value within the histogram's resolution. Equivalent here means that value samples recorded
    /// for any two equivalent values are counted in a common total count.
    pub fn equivalent_range(&self, value: u64) -> u64 {
        let bucket_index = self.bucket_for(value);
        1_u64 << (self.unit_magnitude + bucket_index)
    }

    /// Determine if two values are equivalent with the histogram's resolution. Equivalent here
    /// means that value samples recorded for any two equivalent values are counted in a common
    /// total count.
    pub fn equivalent(&self, value1: u64, value2: u64) -> bool {
        self.lowest_equivalent(value1) == self.lowest_equivalent(value2)
    }
}

// major data statistics

impl<T: Counter> Histogram<T> {
    /// Get the computed mean value of all recorded values in the histogram.
    ///
    /// Every bin contributes its median equivalent value once per sample. The weighted sum is
    /// accumulated exactly while it fits in a `u128`, so the only rounding happens in the final
    /// division; past that it is accumulated as `f64`. Returns 0 for an empty histogram.
    pub fn mean(&self) -> f64 {
        if self.total_count == 0 {
            return 0.0;
        }

        let population = self.population();
        let exact = self.iter_recorded().try_fold(0_u128, |total, v| {
            total.checked_add(
                u128::from(self.median_equivalent(v.value_iterated_to()))
                    * u128::from(v.count_at_value().as_u64()),
            )
        });

        match exact {
            Some(weighted_total) => weighted_total as f64 / population,
            None => self.iter_recorded().fold(0.0_f64, |total, v| {
                total
                    + self.median_equivalent(v.value_iterated_to()) as f64
                        * v.count_at_value().as_f64()
                        / population
            }),
        }
    }

    /// Sum of all bin counts. Unlike `total_count` this does not saturate at `u64::MAX`.
    fn population(&self) -> f64 {
        self.counts
            .iter()
            .map(|c| u128::from(c.as_u64()))
            .sum::<u128>() as f64
    }

    /// Get the computed standard deviation of all recorded values in the histogram.
    ///
    /// Returns 0 for an empty histogram.
    pub fn stdev(&self) -> f64 {
        if self.total_count == 0 {
            return 0.0;
        }

        let mean = self.mean();
        let geom_dev_tot = self.iter_recorded().fold(0.0_f64, |gdt, v| {
            let dev = self.median_equivalent(v.value_iterated_to()) as f64 - mean;
            gdt + (dev * dev) * v.count_at_value().as_f64()
        });

        (geom_dev_tot / self.population()).sqrt()
    }

    /// Get the value at a given quantile, expressed on a 0 to 100 scale.
    ///
    /// The quantile is clamped to `[0, 100]` (NaN counts as 0). The number of samples that must
    /// be covered is `quantile / 100 * len()`, rounded to the nearest integer and at least 1. The
    /// value returned is the highest value equivalent to the bin where the running count first
    /// reaches that number, so every sample counted towards the quantile is smaller than or
    /// equivalent to it.
    ///
    /// Returns 0 for an empty histogram.
    ///
    /// ```
    /// use hdrhist::Histogram;
    /// let mut h = Histogram::<u64>::new_with_max(10_000_000, 3).unwrap();
    /// for v in 0..1_000_000 {
    ///     h.record(v).unwrap();
    /// }
    /// assert_eq!(500_223, h.value_at_quantile(50.0));
    /// assert_eq!(999_935, h.value_at_quantile(99.99));
    /// ```
    pub fn value_at_quantile(&self, quantile: f64) -> u64 {
        // NaN.max(0.0) is 0.0
        let quantile = quantile.max(0.0).min(100.0);

        // round to nearest
        let count_at_quantile = ((quantile / 100.0) * self.total_count as f64 + 0.5) as u64;

        // Make sure we at least reach the first recorded entry
        let count_at_quantile = cmp::max(count_at_quantile, 1);

        let mut total_to_current_index: u64 = 0;
        for (index, count) in self.counts.iter().enumerate() {
            total_to_current_index = total_to_current_index.saturating_add(count.as_u64());
            if total_to_current_index >= count_at_quantile {
                return self.highest_equivalent(self.value_for(index));
            }
        }

        0
    }

    /// Get the quantile (on a 0 to 100 scale) of samples at and below a given value.
    ///
    /// Two values are considered "equivalent" if `self.equivalent` would return true. Values above
    /// the highest trackable value count every sample. Returns 100 for an empty histogram.
    pub fn quantile_below(&self, value: u64) -> f64 {
        if self.total_count == 0 {
            return 100.0;
        }

        let target_index = self.index_for_or_last(value);
        let total_to_current_index = self.counts[..=target_index]
            .iter()
            .fold(0_u64, |t, c| t.saturating_add(c.as_u64()));

        100.0 * total_to_current_index as f64 / self.total_count as f64
    }

    /// Get the count of recorded values within a range of value levels (inclusive to within the
    /// histogram's resolution).
    ///
    /// `low` gives the lower value bound on the range for which to provide the recorded count.
    /// Will be rounded down with `lowest_equivalent`. Similarly, `high` gives the higher value
    /// bound on the range, and will be rounded up with `highest_equivalent`. Bounds above the
    /// highest trackable value are clamped to the last bin.
    pub fn count_between(&self, low: u64, high: u64) -> u64 {
        let low_index = self.index_for_or_last(low);
        let high_index = self.index_for_or_last(high);
        if low_index > high_index {
            return 0;
        }

        self.counts[low_index..=high_index]
            .iter()
            .fold(0_u64, |t, c| t.saturating_add(c.as_u64()))
    }

    /// Get the count of recorded values at a specific value (to within the histogram resolution
    /// at the value level). Values above the highest trackable value read the last bin.
    pub fn count_at(&self, value: u64) -> T {
        self.counts[self.index_for_or_last(value)]
    }

    /// Produce the cumulative distribution of the recorded samples.
    ///
    /// The distribution is stepped at quantiles 0, 50, 75, 87.5, … (halving the distance to 100
    /// each time), each step carrying the number of samples reached and the value at that
    /// quantile. It always ends with a step at quantile 100 whose count is `len()`.
    ///
    /// ```
    /// use hdrhist::{Bracket, Histogram};
    /// let mut h = Histogram::<u64>::new_with_max(1000, 3).unwrap();
    /// h.record(7).unwrap();
    /// assert_eq!(
    ///     vec![
    ///         Bracket { quantile: 0.0, count: 1, value_at: 7 },
    ///         Bracket { quantile: 100.0, count: 1, value_at: 7 },
    ///     ],
    ///     h.cumulative_distribution()
    /// );
    /// ```
    pub fn cumulative_distribution(&self) -> Vec<Bracket> {
        if self.total_count == 0 {
            return vec![Bracket {
                quantile: 100.0,
                count: 0,
                value_at: 0,
            }];
        }

        self.iter_quantiles(1)
            .map(|v| Bracket {
                quantile: v.quantile_iterated_to(),
                count: v.total_count_to_value(),
                value_at: v.value_iterated_to(),
            })
            .collect()
    }

    /// Produce one `Bar` per bin, starting with the lowest bin and ending with the last bin that
    /// holds samples. Empty bins in between are included so the bars tile the recorded range
    /// without gaps.
    pub fn distribution(&self) -> Vec<Bar> {
        self.iter_all()
            .map(|v| Bar {
                from: self.lowest_equivalent(v.value_iterated_to()),
                to: v.value_iterated_to(),
                count: v.count_at_value().as_u64(),
            })
            .collect()
    }
}

// helpers

impl<T: Counter> Histogram<T> {
    /// Computes the matching histogram value for the given histogram bin.
    ///
    /// `index` must be no larger than `u32::max_value()`; no possible histogram uses that much
    /// storage anyway. So, any index that comes from a valid histogram location will work.
    #[inline]
    pub fn value_for(&self, index: usize) -> u64 {
        // Dividing by sub bucket half count will yield 1 in top half of first bucket, 2 in
        // in the top half (i.e., the only half that's used) of the 2nd bucket, etc, so subtract 1
        // to get 0-indexed bucket indexes. This will be -1 for the bottom half of the first bucket.
        let mut bucket_index = (index >> self.sub_bucket_half_count_magnitude) as isize - 1;

        // Calculate the remainder of dividing by sub_bucket_half_count, shifted into the top half
        // of the corresponding bucket. This will (temporarily) map indexes in the lower half of
        // first bucket into the top half.
        let mut sub_bucket_index =
            ((index as u32) & (self.sub_bucket_half_count - 1)) + self.sub_bucket_half_count;
        if bucket_index < 0 {
            // lower half of first bucket case; move sub bucket index back
            sub_bucket_index -= self.sub_bucket_half_count;
            bucket_index = 0;
        }
        self.value_from_loc(bucket_index as u8, sub_bucket_index)
    }

    /// Find the bin index for `value`, or `None` if the index would not fit in `usize`. The index
    /// may still be past the end of the counts array for values above the trackable range.
    #[inline]
    fn index_for(&self, value: u64) -> Option<usize> {
        let bucket_index = self.bucket_for(value);
        let sub_bucket_index = self.sub_bucket_for(value, bucket_index);

        debug_assert!(sub_bucket_index < self.sub_bucket_count);
        debug_assert!(bucket_index == 0 || (sub_bucket_index >= self.sub_bucket_half_count));

        // Calculate the index for the first entry that will be used in the bucket (halfway through
        // sub_bucket_count). For bucket_index 0, all sub_bucket_count entries may be used, but
        // bucket_base_index is still set in the middle.
        let bucket_base_index =
            (i64::from(bucket_index) + 1) << self.sub_bucket_half_count_magnitude;

        // Calculate the offset in the bucket. This subtraction will result in a positive value in
        // all buckets except the 0th bucket (since a value in that bucket may be less than half
        // the bucket's 0 to sub_bucket_count range). However, this works out since we give bucket
        // 0 twice as much space.
        let offset_in_bucket = i64::from(sub_bucket_index) - i64::from(self.sub_bucket_half_count);

        let index = bucket_base_index + offset_in_bucket;
        // This is always non-negative because offset_in_bucket is only negative (and only down
        // to -sub_bucket_half_count) for bucket 0, whose base index is sub_bucket_half_count.
        debug_assert!(index >= 0);
        index.to_usize()
    }

    /// Like `index_for`, but clamped to the last bin.
    #[inline]
    fn index_for_or_last(&self, value: u64) -> usize {
        self.index_for(value)
            .map_or(self.last_index(), |i| cmp::min(i, self.last_index()))
    }

    /// Compute the lowest (and therefore highest precision) bucket index whose sub-buckets can
    /// represent the value.
    #[inline]
    fn bucket_for(&self, value: u64) -> u8 {
        // Calculates the number of powers of two by which the value is greater than the biggest
        // value that fits in bucket 0. This is the bucket index since each successive bucket can
        // hold a value 2x greater. The mask maps small values to bucket 0.
        // Will not underflow because sub_bucket_mask caps the leading zeros to no more than
        // leading_zero_count_base.
        self.leading_zero_count_base - (value | self.sub_bucket_mask).leading_zeros() as u8
    }

    /// Compute the position inside a bucket at which the given value should be recorded, indexed
    /// from position 0 in the bucket (in the first half, which is not used past the first
    /// bucket). For bucket_index > 0, the result will be in the top half of the bucket.
    #[inline]
    fn sub_bucket_for(&self, value: u64, bucket_index: u8) -> u32 {
        // Since bucket_index is simply how many powers of 2 greater value is than what will fit in
        // bucket 0 (that is, what will fit in [0, sub_bucket_count)), we shift off that many
        // powers of two, and end up with a number in [0, sub_bucket_count).
        // For bucket_index 0, this is just value. For bucket index k > 0, we know value won't fit
        // in bucket (k - 1) by definition, so this calculation won't end up in the lower half of
        // [0, sub_bucket_count) because that would mean it would also fit in bucket (k - 1).
        // As unit magnitude grows, the maximum possible bucket index should shrink because it is
        // based off of sub_bucket_mask, so this shouldn't lead to an overlarge shift.
        (value >> (bucket_index + self.unit_magnitude)) as u32
    }

    /// Compute the value corresponding to the provided bucket and sub bucket indices.
    /// The indices given must map to an actual u64; providing contrived indices that would map to
    /// a value larger than u64::max_value() will yield garbage.
    #[inline]
    fn value_from_loc(&self, bucket_index: u8, sub_bucket_index: u32) -> u64 {
        // Sum won't overflow; bucket_index and unit_magnitude are both <= 64.
        // However, the resulting shift may overflow given bogus input, e.g. if unit magnitude is
        // large and the input sub_bucket_index is for an entry in the counts index that shouldn't
        // be used (because this calculation will overflow).
        u64::from(sub_bucket_index) << (bucket_index + self.unit_magnitude)
    }
}

#[cfg(test)]
#[path = "tests/tests.rs"]
mod tests;
