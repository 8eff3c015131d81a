//! Gate classification and end-to-end evaluation benchmarks

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use querygate::demo::{CREATE_USERS_SQL, FILTER_FRED, SEED_USERS_SQL};
use querygate::gate::{FILTER_BY_NAME, FULL_TABLE_READ};
use querygate::{Database, QueryGate};

fn classify_benchmarks(c: &mut Criterion) {
    let gate = QueryGate::users();
    let mut group = c.benchmark_group("classify");

    let attack = format!("{} or 'hack'='hack';", FILTER_FRED);
    for (name, candidate) in [
        ("full_table_read", FULL_TABLE_READ),
        ("filter", FILTER_FRED),
        ("tautology", attack.as_str()),
        ("unrecognized", "DROP TABLE USERS"),
    ] {
        group.bench_with_input(BenchmarkId::from_parameter(name), candidate, |b, candidate| {
            b.iter(|| gate.classify(black_box(candidate)).is_ok())
        });
    }

    for len in [16, 1024, 64 * 1024] {
        let candidate = format!("{}{}", FILTER_BY_NAME, "x".repeat(len));
        group.throughput(Throughput::Bytes(len as u64));
        group.bench_with_input(BenchmarkId::new("long_parameter", len), &candidate, |b, candidate| {
            b.iter(|| gate.classify(black_box(candidate)).is_ok())
        });
    }

    group.finish();
}

fn evaluate_benchmarks(c: &mut Criterion) {
    let gate = QueryGate::users();
    let mut db = Database::in_memory().unwrap();
    db.execute(CREATE_USERS_SQL).unwrap();
    db.execute(SEED_USERS_SQL).unwrap();

    let mut group = c.benchmark_group("evaluate");
    group.bench_function("full_table_read", |b| {
        b.iter(|| gate.evaluate(&mut db, black_box(FULL_TABLE_READ)).unwrap())
    });
    group.bench_function("filter", |b| {
        b.iter(|| gate.evaluate(&mut db, black_box(FILTER_FRED)).unwrap())
    });
    group.bench_function("ungated_filter", |b| {
        b.iter(|| db.execute(black_box(FILTER_FRED)).unwrap())
    });
    group.finish();
}

criterion_group!(benches, classify_benchmarks, evaluate_benchmarks);
criterion_main!(benches);
