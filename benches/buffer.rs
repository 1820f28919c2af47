use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use sdsbuf::Sds;

fn bench_sds_creation(c: &mut Criterion) {
    let mut group = c.benchmark_group("sds/new");

    for size in [64, 256, 1024, 4096, 16384].iter() {
        let data: Vec<u8> = (0..*size).map(|i| i as u8).collect();
        group.throughput(Throughput::Bytes(*size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &data, |b, data| {
            b.iter(|| Sds::new(black_box(data)))
        });
    }

    group.finish();
}

fn bench_sds_cat_len(c: &mut Criterion) {
    let chunk: Vec<u8> = (0..256).map(|i| i as u8).collect();

    let mut group = c.benchmark_group("sds/cat_len");

    for iterations in [10, 100, 1000].iter() {
        group.throughput(Throughput::Bytes((256 * iterations) as u64));
        group.bench_with_input(
            BenchmarkId::from_parameter(iterations),
            iterations,
            |b, &iterations| {
                b.iter(|| {
                    let mut s = Sds::empty();
                    for _ in 0..iterations {
                        s.cat_len(black_box(&chunk)).unwrap();
                    }
                    s
                })
            },
        );
    }

    group.finish();
}

fn bench_sds_reserve_commit(c: &mut Criterion) {
    let mut group = c.benchmark_group("sds/reserve_commit");

    for size in [16, 512, 16384].iter() {
        group.throughput(Throughput::Bytes(*size as u64 * 64));
        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, &size| {
            b.iter(|| {
                let mut s = Sds::empty();
                for _ in 0..64 {
                    let mut spare = s.reserve_spare(size).unwrap();
                    spare.fill(b'x');
                    spare.commit(size).unwrap();
                }
                s
            })
        });
    }

    group.finish();
}

fn bench_sds_cpy_len(c: &mut Criterion) {
    let mut group = c.benchmark_group("sds/cpy_len");

    for size in [64, 1024, 16384].iter() {
        let data: Vec<u8> = vec![b'a'; *size];
        let mut s = Sds::new_len(None, *size).unwrap();
        group.throughput(Throughput::Bytes(*size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &data, |b, data| {
            b.iter(|| s.cpy_len(black_box(data)).unwrap())
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_sds_creation,
    bench_sds_cat_len,
    bench_sds_reserve_commit,
    bench_sds_cpy_len
);
criterion_main!(benches);
