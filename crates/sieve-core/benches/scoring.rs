use sieve_core::score::{derived_value, prime_count};
use sieve_core::{PoolConfig, PrimeScorer, Record, ScoreParams, Scorer, WorkerPool};

fn synthetic_records(n: usize) -> Vec<Record> {
    (0..n)
        .map(|i| Record::new(format!("Company {i}"), (i % 7) as i64 + 1, i as f64 * 1.25))
        .collect()
}

#[divan::bench(args = [500, 2_000, 8_000])]
fn prime_count_upto(n: i64) -> u64 {
    prime_count(divan::black_box(n))
}

#[divan::bench]
fn score_single(bencher: divan::Bencher) {
    let scorer = PrimeScorer::default();
    let record = Record::new("Pied Piper", 3, 53.5);
    bencher.bench(|| scorer.score(divan::black_box(&record)));
}

#[divan::bench]
fn derived_only(bencher: divan::Bencher) {
    let record = Record::new("Pied Piper", 3, 53.5);
    bencher.bench(|| derived_value(divan::black_box(&record), 5));
}

#[divan::bench(args = [1, 2, 4, 8])]
fn pool_run_all(bencher: divan::Bencher, workers: usize) {
    let config = PoolConfig {
        workers,
        result_capacity: 1_000,
        ..PoolConfig::default()
    };
    let pool = WorkerPool::new(config, ScoreParams::default()).unwrap();
    bencher
        .with_inputs(|| synthetic_records(200))
        .bench_values(|records| pool.run_all(records).unwrap());
}

fn main() {
    divan::main();
}
