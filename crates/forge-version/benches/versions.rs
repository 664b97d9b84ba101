use criterion::{black_box, criterion_group, criterion_main, Criterion};
use forge_version::{Comparator, VersionSpec, Versions};

fn bench_compare(c: &mut Criterion) {
    let cases = [
        ("1.2.3", "1.2.4", "<"),
        ("2.4.0-alpha", "2.4.0", "<"),
        ("2.0.0-SNAPSHOT", "2.0.0", "<"),
        ("1.0.0", "1", ">="),
        ("1.2.3-rc1", "1.2.3", "<"),
        ("1.2.3-sp1", "1.2.3", ">"),
    ];

    c.bench_function("comparator", |b| {
        b.iter(|| {
            for (a, bver, op) in cases {
                black_box(Comparator::compare(black_box(a), black_box(op), black_box(bver)));
            }
        })
    });
}

fn bench_rsort(c: &mut Criterion) {
    let versions = [
        "1.0.0", "1.0.1", "1.1.0-SNAPSHOT", "2.0.0-beta1", "2.0.0", "1.10.0", "0.9.9", "3.0-rc2",
    ];

    c.bench_function("rsort", |b| b.iter(|| black_box(Versions::rsort(black_box(&versions)))));
}

fn bench_range(c: &mut Criterion) {
    c.bench_function("range_matches", |b| {
        let spec = VersionSpec::parse("[1.0,2.0),[3.0,)").unwrap();
        b.iter(|| black_box(spec.matches(black_box("1.5.3"))))
    });
}

criterion_group!(benches, bench_compare, bench_rsort, bench_range);
criterion_main!(benches);
