//! Walks over the bins of a histogram.
//!
//! Every iterator here is a `HistogramIterator` driven by a `PickyIterator` that decides, bin by
//! bin, whether an item should be yielded. The statistics on `Histogram` (mean, cumulative
//! distribution, distribution) are built on top of these.

use crate::core::counter::Counter;
use crate::Histogram;

/// An iterator that yields every bin, up to the last one holding samples.
pub mod all;
/// An iterator that yields at quantile steps that halve the distance to 100.
pub mod quantile;
/// An iterator that yields every bin holding at least one sample.
pub mod recorded;

/// Extra information about the picked point in the histogram provided by the picker.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PickMetadata {
    /// Supply the quantile iterated to in the last `pick()`, if the picker can supply a more
    /// precise value than the running quantile of the bin.
    quantile_iterated_to: Option<f64>,
}

impl PickMetadata {
    fn new(quantile_iterated_to: Option<f64>) -> PickMetadata {
        PickMetadata {
            quantile_iterated_to,
        }
    }
}

/// A trait for designing an subset iterator over values in a `Histogram`.
pub trait PickyIterator<T: Counter> {
    /// Return `Some` if an `IterationValue` should be emitted at this point.
    ///
    /// `index` is a valid index in the relevant histogram. `total_count_to_index` is the sum of
    /// the counts of all bins up to and including `index`, and `count_at_index` is the count of
    /// the bin itself.
    ///
    /// This will be called with the same index until it returns `None`, so the picker can yield
    /// several items for a single bin.
    fn pick(
        &mut self,
        index: usize,
        total_count_to_index: u64,
        count_at_index: T,
    ) -> Option<PickMetadata>;

    /// Should we keep iterating even though the last bin with a non-zero count has already been
    /// picked at least once?
    ///
    /// This will be called at most once per remaining index.
    fn more(&mut self, index_to_pick: usize) -> bool;
}

/// `HistogramIterator` provides a base iterator for a `Histogram`.
///
/// It will iterate over all the bins of the histogram's counts array, handing each one to the
/// picker. Once the last bin holding samples has been yielded, it only continues while
/// `PickyIterator::more` returns true, so trailing empty bins cost nothing unless the picker asks
/// for them.
pub struct HistogramIterator<'a, T: 'a + Counter, P: PickyIterator<T>> {
    hist: &'a Histogram<T>,
    total_count_to_index: u64,
    // None for an empty histogram
    last_populated_index: Option<usize>,
    last_picked_index: Option<usize>,
    current_index: usize,
    fresh: bool,
    ended: bool,
    picker: P,
}

/// The value emitted at each step when iterating over a `Histogram`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IterationValue<T: Counter> {
    value_iterated_to: u64,
    quantile: f64,
    quantile_iterated_to: f64,
    count_at_value: T,
    total_count_to_value: u64,
}

impl<T: Counter> IterationValue<T> {
    /// Create a new IterationValue.
    pub fn new(
        value_iterated_to: u64,
        quantile: f64,
        quantile_iterated_to: f64,
        count_at_value: T,
        total_count_to_value: u64,
    ) -> IterationValue<T> {
        IterationValue {
            value_iterated_to,
            quantile,
            quantile_iterated_to,
            count_at_value,
            total_count_to_value,
        }
    }

    /// The highest value that is equivalent to the bin this step stopped at.
    pub fn value_iterated_to(&self) -> u64 {
        self.value_iterated_to
    }

    /// Quantile (0 to 100) of the samples in all bins up to and including this one.
    pub fn quantile(&self) -> f64 {
        self.quantile
    }

    /// The quantile level the iterator was aiming for when it stopped at this bin.
    ///
    /// This is the same as `quantile()` except for the quantile iterator, where it is the step
    /// that was reached.
    pub fn quantile_iterated_to(&self) -> f64 {
        self.quantile_iterated_to
    }

    /// Number of samples in this bin.
    pub fn count_at_value(&self) -> T {
        self.count_at_value
    }

    /// Number of samples in all bins up to and including this one.
    pub fn total_count_to_value(&self) -> u64 {
        self.total_count_to_value
    }
}

impl<'a, T: Counter, P: PickyIterator<T>> HistogramIterator<'a, T, P> {
    fn new(h: &'a Histogram<T>, picker: P) -> HistogramIterator<'a, T, P> {
        HistogramIterator {
            hist: h,
            total_count_to_index: 0,
            last_populated_index: h.counts.iter().rposition(|c| *c != T::zero()),
            last_picked_index: None,
            current_index: 0,
            picker,
            fresh: true,
            ended: false,
        }
    }

    /// Whether an item at or past the last bin holding samples has been yielded already.
    fn samples_exhausted(&self) -> bool {
        match (self.last_picked_index, self.last_populated_index) {
            (_, None) => true,
            (Some(picked), Some(last)) => picked >= last,
            (None, Some(_)) => false,
        }
    }

    fn current(&self, count_at_index: T, metadata: PickMetadata) -> IterationValue<T> {
        let value = self
            .hist
            .highest_equivalent(self.hist.value_for(self.current_index));
        let quantile = 100.0 * self.total_count_to_index as f64 / self.hist.len() as f64;

        IterationValue {
            value_iterated_to: value,
            quantile,
            quantile_iterated_to: metadata.quantile_iterated_to.unwrap_or(quantile),
            count_at_value: count_at_index,
            total_count_to_value: self.total_count_to_index,
        }
    }
}

impl<'a, T: 'a, P> Iterator for HistogramIterator<'a, T, P>
where
    T: Counter,
    P: PickyIterator<T>,
{
    type Item = IterationValue<T>;

    fn next(&mut self) -> Option<Self::Item> {
        // Most bins are empty, so instead of walking to the end of the counts array we only walk
        // until the last bin with samples has been yielded. Past that point the picker decides
        // through more() whether to keep going. The running count can't be used to detect this:
        // it saturates along with the total.
        while !self.ended {
            if self.current_index == self.hist.counts.len() {
                self.ended = true;
                return None;
            }

            if self.samples_exhausted() {
                if !self.picker.more(self.current_index) {
                    self.ended = true;
                    return None;
                }
            } else if self.fresh {
                let count = self.hist.counts[self.current_index];
                self.total_count_to_index = self.total_count_to_index.saturating_add(count.as_u64());
                // don't count this bin twice if the picker yields more than once for it
                self.fresh = false;
            }

            let count = self.hist.counts[self.current_index];
            if let Some(metadata) =
                self.picker
                    .pick(self.current_index, self.total_count_to_index, count)
            {
                let val = self.current(count, metadata);

                // current_index is left alone: the picker sees the same bin again on the next
                // call and may yield it more than once.
                self.last_picked_index = Some(self.current_index);
                return Some(val);
            }

            self.current_index += 1;
            self.fresh = true;
        }
        None
    }
}
