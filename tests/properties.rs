//! Laws that hold for any valid configuration and any recorded samples.

use hdrhist::Histogram;
use proptest::prelude::*;

fn arb_config() -> impl Strategy<Value = (u64, u64, u8)> {
    (0_u32..20, 1_u8..=4).prop_flat_map(|(low_magnitude, sigfig)| {
        let low = 1_u64 << low_magnitude;
        (Just(low), (2 * low)..=(low << 24), Just(sigfig))
    })
}

/// A configuration and up to 200 in-range samples, each with a count.
fn arb_populated() -> impl Strategy<Value = ((u64, u64, u8), Vec<(u64, u32)>)> {
    arb_config().prop_flat_map(|config| {
        let high = config.1;
        (
            Just(config),
            prop::collection::vec((0..=high, 1_u32..1_000), 0..200),
        )
    })
}

fn build(config: (u64, u64, u8), samples: &[(u64, u32)]) -> Histogram<u64> {
    let (low, high, sigfig) = config;
    let mut h = Histogram::new_with_bounds(low, high, sigfig).unwrap();
    for &(value, count) in samples {
        h.record_n(value, u64::from(count)).unwrap();
    }
    h
}

proptest! {
    #[test]
    fn total_is_sum_of_recorded_counts((config, samples) in arb_populated()) {
        let h = build(config, &samples);
        let expected: u64 = samples.iter().map(|&(_, c)| u64::from(c)).sum();
        prop_assert_eq!(expected, h.len());

        let iterated: u64 = h.iter_recorded().map(|v| v.count_at_value()).sum();
        prop_assert_eq!(expected, iterated);
    }

    #[test]
    fn merge_is_commutative(
        (config, samples) in arb_populated(),
        split in 0_usize..200,
    ) {
        let split = split.min(samples.len());
        let a = build(config, &samples[..split]);
        let b = build(config, &samples[split..]);

        let mut ab = a.clone();
        ab.merge(&b).unwrap();
        let mut ba = b.clone();
        ba.merge(&a).unwrap();

        prop_assert_eq!(&ab, &ba);
        prop_assert_eq!(&ab, &build(config, &samples));
    }

    #[test]
    fn export_import_roundtrip((config, samples) in arb_populated()) {
        let h = build(config, &samples);
        let snapshot = h.export().unwrap();
        let imported: Histogram<u64> = Histogram::import(&snapshot).unwrap();

        prop_assert_eq!(&h, &imported);
        prop_assert_eq!(h.min(), imported.min());
        prop_assert_eq!(h.max(), imported.max());
        prop_assert_eq!(h.len(), imported.len());
    }

    #[test]
    fn reset_matches_fresh((config, samples) in arb_populated()) {
        let mut h = build(config, &samples);
        h.reset();
        prop_assert_eq!(&build(config, &[]), &h);
    }

    #[test]
    fn quantiles_are_monotonic(
        (config, samples) in arb_populated(),
        mut quantiles in prop::collection::vec(0.0_f64..=100.0, 1..50),
    ) {
        let h = build(config, &samples);
        quantiles.sort_by(|a, b| a.partial_cmp(b).unwrap());

        let values: Vec<u64> = quantiles.iter().map(|&q| h.value_at_quantile(q)).collect();
        for pair in values.windows(2) {
            prop_assert!(pair[0] <= pair[1]);
        }
    }

    #[test]
    fn recorded_value_stays_in_its_slot(config in arb_config(), fraction in 0.0_f64..=1.0) {
        let (low, high, sigfig) = config;
        let mut h = Histogram::<u64>::new_with_bounds(low, high, sigfig).unwrap();
        let value = (high as f64 * fraction) as u64;
        let value = value.min(high);
        h.record(value).unwrap();

        prop_assert_eq!(h.highest_equivalent(value), h.value_at_quantile(100.0));
        prop_assert!(h.lowest_equivalent(value) <= value);
        prop_assert!(value <= h.highest_equivalent(value));
        prop_assert_eq!(1, h.count_at(value));
    }
}
