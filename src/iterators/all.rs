use crate::core::counter::Counter;
use crate::iterators::{HistogramIterator, PickMetadata, PickyIterator};
use crate::Histogram;

/// An iterator that will yield every bin, empty or not, stopping after the last bin that holds
/// samples.
pub struct Iter(Option<usize>);

impl Iter {
    /// Construct a new full iterator. See `Histogram::iter_all` for details.
    pub fn new<T: Counter>(hist: &Histogram<T>) -> HistogramIterator<T, Iter> {
        HistogramIterator::new(hist, Iter(None))
    }
}

impl<T: Counter> PickyIterator<T> for Iter {
    fn pick(&mut self, index: usize, _: u64, _: T) -> Option<PickMetadata> {
        if self.0 == Some(index) {
            return None;
        }
        self.0 = Some(index);
        Some(PickMetadata::new(None))
    }

    fn more(&mut self, _: usize) -> bool {
        // the empty tail of the counts array is never interesting
        false
    }
}
