use crate::core::counter::Counter;
use crate::iterators::{HistogramIterator, PickMetadata, PickyIterator};
use crate::Histogram;

/// An iterator that will yield at quantile steps through the histogram's value range.
pub struct Iter<'a, T: 'a + Counter> {
    hist: &'a Histogram<T>,

    ticks_per_half_distance: u32,
    quantile_to_iterate_to: f64,
    reached_last_recorded_value: bool,
}

impl<'a, T: 'a + Counter> Iter<'a, T> {
    /// Construct a new iterator. See `Histogram::iter_quantiles` for details.
    pub fn new(
        hist: &'a Histogram<T>,
        ticks_per_half_distance: u32,
    ) -> HistogramIterator<'a, T, Iter<'a, T>> {
        assert!(
            ticks_per_half_distance > 0,
            "Ticks per half distance must be > 0"
        );

        HistogramIterator::new(
            hist,
            Iter {
                hist,
                ticks_per_half_distance,
                quantile_to_iterate_to: 0.0,
                reached_last_recorded_value: false,
            },
        )
    }
}

impl<'a, T: 'a + Counter> PickyIterator<T> for Iter<'a, T> {
    fn pick(&mut self, _: usize, running_total: u64, count_at_index: T) -> Option<PickMetadata> {
        if count_at_index == T::zero() {
            return None;
        }

        let current_quantile = 100.0 * running_total as f64 / self.hist.len() as f64;
        if current_quantile < self.quantile_to_iterate_to {
            return None;
        }

        let quantile_iterated_to = self.quantile_to_iterate_to;

        // Each step covers a fixed number of ticks in the current "half distance" to 100, so the
        // steps are 0, 50, 75, 87.5, ... with one tick per half distance.
        //
        // num_halvings is how many times the distance to 100 has been halved so far: 0 below 50,
        // 1 at 50, 2 at 75, and so on. There are then 2^(num_halvings + 1) half-slices to tick
        // through at the current scale.
        if quantile_iterated_to < 100.0 {
            let num_halvings = (100.0 / (100.0 - quantile_iterated_to)).log2() as u32;
            self.quantile_to_iterate_to = 1_u64
                .checked_shl(num_halvings.saturating_add(1))
                .and_then(|slices| slices.checked_mul(u64::from(self.ticks_per_half_distance)))
                .map_or(100.0, |total_ticks| {
                    quantile_iterated_to + 100.0 / total_ticks as f64
                });
        }

        Some(PickMetadata::new(Some(quantile_iterated_to)))
    }

    fn more(&mut self, _: usize) -> bool {
        // We want one additional last step to 100
        if !self.reached_last_recorded_value && self.hist.len() != 0 {
            self.quantile_to_iterate_to = 100.0;
            self.reached_last_recorded_value = true;
            true
        } else {
            false
        }
    }
}
