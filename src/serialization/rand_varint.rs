//! Random numbers spread evenly over every encoded varint length, for exercising the codec.

use rand::distributions::{Distribution, Uniform};
use rand::Rng;

/// Smallest and largest numbers whose varint encoding takes exactly `byte_length` bytes.
pub fn varint_length_bounds(byte_length: u32) -> (u64, u64) {
    assert!((1..=9).contains(&byte_length));

    let smallest = match byte_length {
        1 => 0,
        n => 1_u64 << (7 * (n - 1)),
    };
    let largest = match byte_length {
        9 => u64::max_value(),
        n => (1_u64 << (7 * n)) - 1,
    };
    (smallest, largest)
}

/// Uniformly random numbers are almost all 9 bytes long once encoded. This picks the length
/// first, so every length from 1 to 9 bytes shows up about as often.
pub struct RandomVarintEncodedLengthIter<R: Rng> {
    ranges: Vec<Uniform<u64>>,
    range_for_picking_range: Uniform<usize>,
    rng: R,
}

impl<R: Rng> RandomVarintEncodedLengthIter<R> {
    pub fn new(rng: R) -> RandomVarintEncodedLengthIter<R> {
        let ranges: Vec<Uniform<u64>> = (1..=9)
            .map(varint_length_bounds)
            .map(|(smallest, largest)| Uniform::new_inclusive(smallest, largest))
            .collect();

        RandomVarintEncodedLengthIter {
            range_for_picking_range: Uniform::new(0, ranges.len()),
            ranges,
            rng,
        }
    }
}

impl<R: Rng> Iterator for RandomVarintEncodedLengthIter<R> {
    type Item = u64;

    fn next(&mut self) -> Option<Self::Item> {
        let value_range = self.ranges[self.range_for_picking_range.sample(&mut self.rng)];
        Some(value_range.sample(&mut self.rng))
    }
}

#[test]
fn varint_length_bounds_are_contiguous() {
    let mut previous_largest = None;
    for byte_length in 1..=9 {
        let (smallest, largest) = varint_length_bounds(byte_length);
        assert!(smallest <= largest);
        if let Some(previous) = previous_largest {
            assert_eq!(previous + 1, smallest);
        }
        previous_largest = Some(largest);
    }
    assert_eq!(Some(u64::max_value()), previous_largest);
}
