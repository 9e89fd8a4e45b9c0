use super::encoder::varint_write;
use super::rand_varint::RandomVarintEncodedLengthIter;
use crate::Histogram;
use rand::rngs::SmallRng;
use rand::SeedableRng;
use test::Bencher;

#[bench]
fn varint_write_rand_1000(b: &mut Bencher) {
    do_varint_write_rand(b, 1000)
}

#[bench]
fn varint_write_rand_1000_000(b: &mut Bencher) {
    do_varint_write_rand(b, 1000_000)
}

#[bench]
fn export_sparse_wide(b: &mut Bencher) {
    let mut h = Histogram::<u64>::new_with_bounds(1, 1_000_000_000, 5).unwrap();
    for v in (0..1_000_000_000).step_by(1_000_003) {
        h.record(v).unwrap();
    }

    b.iter(|| h.export().unwrap());
}

fn do_varint_write_rand(b: &mut Bencher, num: usize) {
    let vec: Vec<u64> = RandomVarintEncodedLengthIter::new(SmallRng::seed_from_u64(7))
        .take(num)
        .collect();

    let mut buf = [0; 9];
    b.iter(|| {
        for i in vec.iter() {
            let _ = varint_write(*i, &mut buf);
        }
    });
}
