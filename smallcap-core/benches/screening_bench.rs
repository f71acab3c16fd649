//! Criterion benchmarks for the screening hot paths.
//!
//! Benchmarks:
//! 1. Normalization of provider bundles
//! 2. Rule evaluation over tables of increasing size
//! 3. Cache key hashing for long symbol lists

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use smallcap_core::data::normalize::keys;
use smallcap_core::data::{normalize, CacheKey, RawFundamentals};
use smallcap_core::domain::FinancialTable;
use smallcap_core::screening::{rejection_counts, screen, RuleSet};

// ── Helpers ──────────────────────────────────────────────────────────

fn make_raw(i: usize) -> RawFundamentals {
    let wobble = (i as f64 * 0.37).sin();
    RawFundamentals::new(format!("S{i:04}"))
        .with(keys::NAME, "Synthetic Holdings Inc.")
        .with(keys::SECTOR, "Industrials")
        .with(keys::MARKET_CAP, 1e9 + wobble * 9e8)
        .with(keys::YOY_GROWTH, 0.1 + wobble * 0.1)
        .with(keys::DEBT_TO_EQUITY, 1.0 + wobble)
        .with(keys::CURRENT_RATIO, "1.8")
        .with(keys::GROSS_MARGIN, 0.3 + wobble * 0.2)
        .with(keys::FREE_CASH_FLOW, wobble * 1e7)
        .with(keys::INSIDER_OWNERSHIP, 0.06)
}

fn make_table(n: usize) -> FinancialTable {
    (0..n)
        .map(|i| normalize(&format!("S{i:04}"), &make_raw(i)))
        .collect()
}

// ── 1. Normalization ─────────────────────────────────────────────────

fn bench_normalize(c: &mut Criterion) {
    let raws: Vec<RawFundamentals> = (0..100).map(make_raw).collect();

    c.bench_function("normalize_100", |b| {
        b.iter(|| {
            for raw in &raws {
                black_box(normalize(&raw.symbol, black_box(raw)));
            }
        });
    });
}

// ── 2. Screening ─────────────────────────────────────────────────────

fn bench_screen(c: &mut Criterion) {
    let mut group = c.benchmark_group("screen");
    let rules = RuleSet::small_cap();

    for &rows in &[10, 100, 1000] {
        let table = make_table(rows);
        group.bench_with_input(BenchmarkId::new("small_cap", rows), &rows, |b, _| {
            b.iter(|| screen(black_box(&table), black_box(&rules)));
        });
        group.bench_with_input(BenchmarkId::new("rejection_counts", rows), &rows, |b, _| {
            b.iter(|| rejection_counts(black_box(&table), black_box(&rules)));
        });
    }

    group.finish();
}

// ── 3. Cache keys ────────────────────────────────────────────────────

fn bench_cache_key(c: &mut Criterion) {
    let symbols: Vec<String> = (0..500).map(|i| format!("S{i:04}")).collect();

    c.bench_function("cache_key_500", |b| {
        b.iter(|| CacheKey::for_symbols(black_box(&symbols)));
    });
}

criterion_group!(benches, bench_normalize, bench_screen, bench_cache_key);
criterion_main!(benches);
