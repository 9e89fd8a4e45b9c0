use hdrhist::{Bar, Bracket, Histogram};

use ieee754::Ieee754;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

/// The value a quantile query should produce, computed naively from the sorted samples.
fn reference_value_at_quantile(h: &Histogram<u64>, sorted: &[u64], quantile: f64) -> u64 {
    let target = ((quantile / 100.0) * sorted.len() as f64 + 0.5) as usize;
    let target = target.max(1);
    h.highest_equivalent(sorted[target - 1])
}

#[test]
fn value_at_quantile_2_values() {
    let mut h = Histogram::<u64>::new_with_bounds(1, u64::max_value(), 3).unwrap();

    h.record(1).unwrap();
    h.record(2).unwrap();

    assert_eq!(1, h.value_at_quantile(25.0));
    assert_eq!(1, h.value_at_quantile(50.0));

    // 75% of 2 samples is 1.5, which rounds up to the second sample
    assert_eq!(2, h.value_at_quantile(75.0));
    let just_below = 75.0_f64.prev();
    assert_eq!(1, h.value_at_quantile(just_below));
}

#[test]
fn value_at_quantile_5_values() {
    let mut h = Histogram::<u64>::new_with_bounds(1, u64::max_value(), 3).unwrap();

    h.record(1).unwrap();
    h.record_n(2, 4).unwrap();

    assert_eq!(1, h.value_at_quantile(0.0));
    assert_eq!(1, h.value_at_quantile(25.0));
    assert_eq!(2, h.value_at_quantile(30.0));
    assert_eq!(2, h.value_at_quantile(100.0));
}

#[test]
fn value_at_quantile_clamps() {
    let mut h = Histogram::<u64>::new_with_bounds(1, 100_000, 3).unwrap();
    h.record(10).unwrap();
    h.record(20_000).unwrap();

    assert_eq!(h.value_at_quantile(0.0), h.value_at_quantile(-5.0));
    assert_eq!(h.value_at_quantile(0.0), h.value_at_quantile(f64::NAN));
    assert_eq!(h.value_at_quantile(100.0), h.value_at_quantile(250.0));
    assert_eq!(
        h.value_at_quantile(100.0),
        h.value_at_quantile(f64::INFINITY)
    );
    assert_eq!(h.highest_equivalent(20_000), h.value_at_quantile(100.0));
}

#[test]
fn value_at_quantile_matches_sorted_samples() {
    let mut rng = SmallRng::seed_from_u64(0x5eed);
    let mut h = Histogram::<u64>::new_with_bounds(1, u64::max_value(), 3).unwrap();
    let mut samples = Vec::new();

    for _ in 0..10_000 {
        // spread over many magnitudes
        let v = rng.gen::<u64>() >> rng.gen_range(0..64);
        h.record(v).unwrap();
        samples.push(v);
    }
    samples.sort_unstable();

    for _ in 0..1_000 {
        let q = rng.gen_range(0.0..=100.0);
        assert_eq!(
            reference_value_at_quantile(&h, &samples, q),
            h.value_at_quantile(q),
            "quantile {}",
            q
        );
    }
}

#[test]
fn value_at_quantile_is_monotonic() {
    let mut rng = SmallRng::seed_from_u64(42);
    let mut h = Histogram::<u64>::new_with_bounds(1, 1_000_000_000, 2).unwrap();
    for _ in 0..5_000 {
        h.record(rng.gen_range(0..=1_000_000_000)).unwrap();
    }

    let mut quantile = 0.0_f64;
    let mut previous = h.value_at_quantile(quantile);
    while quantile < 100.0 {
        quantile += rng.gen_range(0.0..0.05);
        let current = h.value_at_quantile(quantile);
        assert!(
            current >= previous,
            "{} at quantile {} is below {}",
            current,
            quantile,
            previous
        );
        previous = current;
    }
}

#[test]
fn value_at_quantile_monotonic_at_rounding_boundaries() {
    let mut h = Histogram::<u64>::new_with_bounds(1, 100_000, 3).unwrap();
    for v in 0..3 {
        h.record(v * 1000).unwrap();
    }

    // step ulp by ulp across the points where the target count changes
    for &boundary in [100.0 / 6.0, 50.0, 250.0 / 3.0].iter() {
        let mut q = boundary;
        for _ in 0..32 {
            q = q.prev();
        }

        let mut previous = h.value_at_quantile(q);
        for _ in 0..64 {
            q = q.next();
            let current = h.value_at_quantile(q);
            assert!(current >= previous);
            previous = current;
        }
    }
}

#[test]
fn cumulative_distribution_million() {
    let mut h = Histogram::<u64>::new_with_bounds(1, 100_000_000, 3).unwrap();
    for v in 0..1_000_000 {
        h.record(v).unwrap();
    }

    let expected = vec![
        (0.0, 1, 0),
        (50.0, 500_224, 500_223),
        (75.0, 750_080, 750_079),
        (87.5, 875_008, 875_007),
        (93.75, 937_984, 937_983),
        (96.875, 969_216, 969_215),
        (98.4375, 984_576, 984_575),
        (99.21875, 992_256, 992_255),
        (99.609375, 996_352, 996_351),
        (99.8046875, 998_400, 998_399),
        (99.90234375, 999_424, 999_423),
        (99.951171875, 999_936, 999_935),
        (99.9755859375, 999_936, 999_935),
        (99.98779296875, 999_936, 999_935),
        (99.993896484375, 1_000_000, 1_000_447),
        (100.0, 1_000_000, 1_000_447),
    ]
    .into_iter()
    .map(|(quantile, count, value_at)| Bracket {
        quantile,
        count,
        value_at,
    })
    .collect::<Vec<_>>();

    assert_eq!(expected, h.cumulative_distribution());
}

#[test]
fn cumulative_distribution_ends_at_total() {
    let mut rng = SmallRng::seed_from_u64(7);
    let mut h = Histogram::<u32>::new_with_bounds(1, 10_000_000, 2).unwrap();
    for _ in 0..2_000 {
        h.record(rng.gen_range(0..10_000_000)).unwrap();
    }

    let brackets = h.cumulative_distribution();
    let last = brackets.last().unwrap();
    assert_eq!(100.0, last.quantile);
    assert_eq!(h.len(), last.count);
    assert_eq!(h.max(), last.value_at);

    for pair in brackets.windows(2) {
        assert!(pair[0].quantile < pair[1].quantile);
        assert!(pair[0].count <= pair[1].count);
        assert!(pair[0].value_at <= pair[1].value_at);
    }
}

#[test]
fn cumulative_distribution_empty() {
    let h = Histogram::<u64>::new_with_bounds(1, 100_000, 3).unwrap();
    assert_eq!(
        vec![Bracket {
            quantile: 100.0,
            count: 0,
            value_at: 0,
        }],
        h.cumulative_distribution()
    );
}

#[test]
fn distribution_equal_width_bars() {
    let mut h = Histogram::<u64>::new_with_bounds(8, 1024, 3).unwrap();
    for v in 0..1024 {
        h.record(v).unwrap();
    }

    let bars = h.distribution();
    assert_eq!(128, bars.len());
    for (i, bar) in bars.iter().enumerate() {
        assert_eq!(8, bar.count);
        assert_eq!(i as u64 * 8, bar.from);
        assert_eq!(i as u64 * 8 + 7, bar.to);
    }
}

#[test]
fn distribution_includes_empty_slots_between_samples() {
    let mut h = Histogram::<u64>::new_with_bounds(1, 100_000, 3).unwrap();
    h.record(2).unwrap();
    h.record_n(5, 3).unwrap();

    assert_eq!(
        vec![
            Bar { from: 0, to: 0, count: 0 },
            Bar { from: 1, to: 1, count: 0 },
            Bar { from: 2, to: 2, count: 1 },
            Bar { from: 3, to: 3, count: 0 },
            Bar { from: 4, to: 4, count: 0 },
            Bar { from: 5, to: 5, count: 3 },
        ],
        h.distribution()
    );
}

#[test]
fn distribution_empty() {
    let h = Histogram::<u64>::new_with_bounds(1, 100_000, 3).unwrap();
    assert!(h.distribution().is_empty());
}

#[test]
fn iter_quantiles_with_more_ticks() {
    let mut h = Histogram::<u64>::new_with_bounds(1, 100_000, 3).unwrap();
    for v in 1..=8 {
        h.record(v).unwrap();
    }

    let steps: Vec<f64> = h
        .iter_quantiles(2)
        .map(|v| v.quantile_iterated_to())
        .collect();
    assert_eq!(0.0, steps[0]);
    assert_eq!(25.0, steps[1]);
    assert_eq!(50.0, steps[2]);
    assert_eq!(62.5, steps[3]);
    assert_eq!(Some(&100.0), steps.last());
}
